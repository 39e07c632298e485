//! Domain models: catalog games, the description table, quiz questions and sessions.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Number of rounds in one quiz.
pub const QUESTIONS_PER_QUIZ: usize = 5;

/// Number of choices shown per question (correct answer + three decoys).
pub const CHOICES_PER_QUESTION: usize = 4;

/// One catalog entry. On disk the title lives under the `game` key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
  #[serde(rename = "game")]
  pub title: String,
  pub genre: String,
}

impl Game {
  #[cfg(test)]
  pub fn new(title: &str, genre: &str) -> Self {
    Self { title: title.into(), genre: genre.into() }
  }
}

/// Title -> candidate descriptions, already cleaned.
/// A BTreeMap keeps the persisted file ordered by title.
pub type DescriptionTable = BTreeMap<String, Vec<String>>;

/// A single multiple-choice round.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
  pub description: String,
  pub correct_answer: String,
  pub choices: Vec<String>,
}

/// Server-side state of one player's quiz.
#[derive(Clone, Debug)]
pub struct QuizSession {
  pub id: String,
  pub questions: Vec<Question>,
  pub current_index: usize,
  pub score: usize,
  pub last_seen: Instant,
}

/// What the player should be offered after answering.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
  NextQuestion,
  SeeResults,
}

/// Outcome of one answer submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub correct_answer: String,
  pub next: NextAction,
}

impl QuizSession {
  pub fn new(id: String, questions: Vec<Question>) -> Self {
    Self { id, questions, current_index: 0, score: 0, last_seen: Instant::now() }
  }

  pub fn is_finished(&self) -> bool {
    self.current_index >= self.questions.len()
  }

  pub fn current_question(&self) -> Option<&Question> {
    self.questions.get(self.current_index)
  }

  /// Apply the player's pick for the current question.
  /// Returns None when the quiz is already over or `choice_idx` is out of range;
  /// the session is left untouched in both cases.
  pub fn answer(&mut self, choice_idx: usize) -> Option<AnswerOutcome> {
    let q = self.questions.get(self.current_index)?;
    let chosen = q.choices.get(choice_idx)?;
    let correct = *chosen == q.correct_answer;
    let correct_answer = q.correct_answer.clone();

    if correct {
      self.score += 1;
    }
    self.current_index += 1;

    let next = if self.is_finished() { NextAction::SeeResults } else { NextAction::NextQuestion };
    Some(AnswerOutcome { correct, correct_answer, next })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn q(correct: &str, choices: [&str; 4]) -> Question {
    Question {
      description: "Blast rocks make smaller problems".into(),
      correct_answer: correct.into(),
      choices: choices.iter().map(|c| c.to_string()).collect(),
    }
  }

  #[test]
  fn game_reads_title_from_game_key() {
    let g: Game = serde_json::from_str(r#"{"game": "Doom", "genre": "Shooter"}"#).unwrap();
    assert_eq!(g, Game::new("Doom", "Shooter"));
  }

  #[test]
  fn answering_advances_and_scores() {
    let mut s = QuizSession::new(
      "s1".into(),
      vec![q("Pong", ["Doom", "Pong", "Halo", "Myst"]), q("Halo", ["Halo", "Doom", "Pong", "Myst"])],
    );

    let first = s.answer(1).unwrap();
    assert!(first.correct);
    assert_eq!(first.next, NextAction::NextQuestion);
    assert_eq!((s.current_index, s.score), (1, 1));

    let second = s.answer(3).unwrap();
    assert!(!second.correct);
    assert_eq!(second.correct_answer, "Halo");
    assert_eq!(second.next, NextAction::SeeResults);
    assert_eq!((s.current_index, s.score), (2, 1));
    assert!(s.is_finished());
    assert!(s.answer(0).is_none());
  }

  #[test]
  fn out_of_range_choice_leaves_session_untouched() {
    let mut s = QuizSession::new("s1".into(), vec![q("Pong", ["Doom", "Pong", "Halo", "Myst"])]);
    assert!(s.answer(4).is_none());
    assert_eq!((s.current_index, s.score), (0, 0));
  }
}
