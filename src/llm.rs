//! Minimal chat-completions client for the description jobs.
//!
//! Speaks the OpenAI-compatible `POST {base_url}/chat/completions` dialect, which the
//! Hugging Face router also serves. Calls are instrumented and log model name,
//! latency and response size (not the API key).

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::util::trunc_for_log;

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";
const DEFAULT_MODEL: &str = "google/gemma-2-2b-it";

#[derive(Debug, Error)]
pub enum LlmError {
  #[error("LLM_API_KEY is not set")]
  MissingApiKey,
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("HTTP {status}: {message}")]
  Status { status: u16, message: String },
  #[error("completion had no text")]
  Empty,
}

/// Anything that turns a prompt into free text. The batch jobs only see this trait,
/// so tests can script responses without a network.
pub trait TextGenerator {
  async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Clone)]
pub struct ChatClient {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
}

impl ChatClient {
  /// Build the client from LLM_API_KEY / LLM_BASE_URL / LLM_MODEL.
  pub fn from_env() -> Result<Self, LlmError> {
    let api_key = std::env::var("LLM_API_KEY").map_err(|_| LlmError::MissingApiKey)?;
    let base_url = std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
    let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;

    Ok(Self { client, api_key, base_url, model })
  }

  /// Plain-text chat completion with a single user message.
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn chat_plain(&self, prompt: &str) -> Result<String, LlmError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![ChatMessageReq { role: "user".into(), content: prompt.into() }],
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, concat!("weakest-hint/", env!("CARGO_PKG_VERSION")))
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or(body);
      return Err(LlmError::Status { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "LLM usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default().trim().to_string();

    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Model response received");
    debug!(preview = %trunc_for_log(&text, 80), "Raw completion");

    if text.is_empty() {
      return Err(LlmError::Empty);
    }
    Ok(text)
  }
}

impl TextGenerator for ChatClient {
  async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
    self.chat_plain(prompt).await
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Pull the human-readable message out of an API error body.
/// Handles both `{"error": {"message": ..}}` and `{"error": ".."}` shapes.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EBody }
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum EBody {
    Obj { message: String },
    Text(String),
  }
  match serde_json::from_str::<EWrap>(body).ok()?.error {
    EBody::Obj { message } => Some(message),
    EBody::Text(message) => Some(message),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_error_messages() {
    assert_eq!(
      extract_api_error(r#"{"error": {"message": "Rate limit reached", "type": "rate_limit"}}"#).as_deref(),
      Some("Rate limit reached")
    );
    assert_eq!(extract_api_error(r#"{"error": "Model is loading"}"#).as_deref(), Some("Model is loading"));
    assert_eq!(extract_api_error("<html>502</html>"), None);
  }

  #[test]
  fn parses_completion_body() {
    let body: ChatCompletionResponse = serde_json::from_str(
      r#"{"choices":[{"index":0,"message":{"role":"assistant","content":" Two lines chasing one ball \n"}}]}"#,
    )
    .unwrap();
    assert!(body.usage.is_none());
    assert_eq!(body.choices[0].message.content.as_deref(), Some(" Two lines chasing one ball \n"));
  }
}
