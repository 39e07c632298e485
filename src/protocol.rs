//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::NextAction;

/// One question as shown to the player. The correct answer is not included.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    /// 1-based round number.
    pub number: usize,
    pub total: usize,
    pub description: String,
    pub choices: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "choiceIdx")]
    pub choice_idx: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub heading: String,
    pub message: String,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    pub score: usize,
    pub next: NextAction,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsOut {
    pub score: usize,
    pub total: usize,
    pub finished: bool,
    pub emoji: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub games: usize,
}
