//! Quiz flow shared by the HTTP handlers: start, show question, answer, results, reset.

use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::{QuizSession, CHOICES_PER_QUESTION};
use crate::protocol::{AnswerOut, QuestionOut, ResultsOut};
use crate::questions::{generate_questions, InsufficientCatalogError};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum QuizError {
  #[error(transparent)]
  Catalog(#[from] InsufficientCatalogError),
  #[error("unknown or expired session: {0}")]
  UnknownSession(String),
  #[error("choice {choice} is out of range (0..{max})")]
  ChoiceOutOfRange { choice: usize, max: usize },
  #[error("quiz already finished")]
  Finished,
}

#[instrument(level = "info", skip(state))]
pub async fn start_quiz(state: &AppState) -> Result<QuestionOut, QuizError> {
  let questions = generate_questions(&state.catalog, &state.descriptions, &mut rand::thread_rng())?;
  let session = state.create_session(questions).await;
  info!(target: "quiz", session = %session.id, "Quiz started");
  question_out(&session)
}

#[instrument(level = "info", skip(state))]
pub async fn current_question(state: &AppState, session_id: &str) -> Result<QuestionOut, QuizError> {
  state
    .with_session(session_id, |s| question_out(s))
    .await
    .ok_or_else(|| QuizError::UnknownSession(session_id.to_string()))?
}

#[instrument(level = "info", skip(state))]
pub async fn submit_answer(state: &AppState, session_id: &str, choice_idx: usize) -> Result<AnswerOut, QuizError> {
  if choice_idx >= CHOICES_PER_QUESTION {
    return Err(QuizError::ChoiceOutOfRange { choice: choice_idx, max: CHOICES_PER_QUESTION });
  }

  let (outcome, score) = state
    .with_session(session_id, |s| s.answer(choice_idx).map(|o| (o, s.score)))
    .await
    .ok_or_else(|| QuizError::UnknownSession(session_id.to_string()))?
    .ok_or(QuizError::Finished)?;

  info!(target: "quiz", session = %session_id, correct = outcome.correct, score, "Answer recorded");

  let (heading, message) = if outcome.correct {
    ("Correct!", format!("'{}' is the right answer!", outcome.correct_answer))
  } else {
    ("Incorrect!", format!("The correct answer is '{}'.", outcome.correct_answer))
  };

  Ok(AnswerOut {
    correct: outcome.correct,
    heading: heading.into(),
    message,
    correct_answer: outcome.correct_answer,
    score,
    next: outcome.next,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn results(state: &AppState, session_id: &str) -> Result<ResultsOut, QuizError> {
  let (score, total, finished) = state
    .with_session(session_id, |s| (s.score, s.questions.len(), s.is_finished()))
    .await
    .ok_or_else(|| QuizError::UnknownSession(session_id.to_string()))?;

  let (emoji, message) = verdict(score, total);
  Ok(ResultsOut { score, total, finished, emoji: emoji.into(), message: message.into() })
}

#[instrument(level = "info", skip(state))]
pub async fn reset(state: &AppState, session_id: &str) -> Result<(), QuizError> {
  if state.remove_session(session_id).await {
    info!(target: "quiz", session = %session_id, "Quiz reset");
    Ok(())
  } else {
    Err(QuizError::UnknownSession(session_id.to_string()))
  }
}

fn question_out(s: &QuizSession) -> Result<QuestionOut, QuizError> {
  let q = s.current_question().ok_or(QuizError::Finished)?;
  Ok(QuestionOut {
    session_id: s.id.clone(),
    number: s.current_index + 1,
    total: s.questions.len(),
    description: q.description.clone(),
    choices: q.choices.clone(),
  })
}

/// Emoji and one-liner for the results screen.
pub fn verdict(score: usize, total: usize) -> (&'static str, &'static str) {
  if score >= total {
    ("🏆", "Every answer landed like a headshot. Boom!")
  } else if score >= 4 {
    ("🌟", "One slip, but the rest were clean combos.")
  } else if score >= 3 {
    ("👾", "Not quite a speed run.")
  } else if score >= 2 {
    ("🕹️", "Button masher!")
  } else {
    ("📺", "Every expert was once a beginner.")
  }
}
