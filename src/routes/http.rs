//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::logic::{self, QuizError};
use crate::protocol::*;
use crate::state::AppState;

#[derive(Debug)]
pub struct ApiError {
  status: StatusCode,
  message: String,
}

impl From<QuizError> for ApiError {
  fn from(e: QuizError) -> Self {
    let status = match &e {
      QuizError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
      QuizError::UnknownSession(_) => StatusCode::NOT_FOUND,
      QuizError::ChoiceOutOfRange { .. } => StatusCode::BAD_REQUEST,
      QuizError::Finished => StatusCode::CONFLICT,
    };
    if status.is_server_error() {
      error!(target: "quiz", error = %e, "Quiz request failed");
    }
    Self { status, message: e.to_string() }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status, Json(json!({ "error": self.message }))).into_response()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, games: state.catalog.len() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_quiz(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
  let question = logic::start_quiz(&state).await?;
  info!(target: "quiz", session = %question.session_id, "HTTP quiz started");
  Ok((StatusCode::CREATED, Json(question)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<QuestionOut>, ApiError> {
  Ok(Json(logic::current_question(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(choice_idx = body.choice_idx))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  let out = logic::submit_answer(&state, &id, body.choice_idx).await?;
  info!(target: "quiz", session = %id, correct = out.correct, score = out.score, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_results(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<ResultsOut>, ApiError> {
  Ok(Json(logic::results(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_reset_quiz(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  logic::reset(&state, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}
