//! Quiz question generation: one correct title, one same-genre decoy and two
//! decoys from other genres per round, with no title answered twice.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cleaner::FALLBACK_DESCRIPTION;
use crate::domain::{DescriptionTable, Game, Question, CHOICES_PER_QUESTION, QUESTIONS_PER_QUIZ};

/// Smallest catalog that can fill every round: the last round still needs
/// one correct answer plus three decoys left in the pool.
pub const MIN_CATALOG_SIZE: usize = QUESTIONS_PER_QUIZ + CHOICES_PER_QUESTION - 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsufficientCatalogError {
  #[error("catalog has {available} games, at least {needed} are required")]
  TooFewGames { needed: usize, available: usize },
  #[error("only {available} decoy(s) outside genre '{genre}' left for '{title}', 2 are required")]
  TooFewOtherGenres { title: String, genre: String, available: usize },
}

/// Build one quiz worth of questions.
///
/// Correct answers are drawn without replacement from a copy of the catalog.
/// Decoys stay in the pool and may show up again in later rounds. The
/// same-genre decoy (or its cross-genre stand-in) is excluded from the two
/// cross-genre draws so a title never appears twice among the choices.
pub fn generate_questions<R: Rng + ?Sized>(
  catalog: &[Game],
  table: &DescriptionTable,
  rng: &mut R,
) -> Result<Vec<Question>, InsufficientCatalogError> {
  if catalog.len() < MIN_CATALOG_SIZE {
    return Err(InsufficientCatalogError::TooFewGames {
      needed: MIN_CATALOG_SIZE,
      available: catalog.len(),
    });
  }

  let mut pool: Vec<&Game> = catalog.iter().collect();
  let mut questions = Vec::with_capacity(QUESTIONS_PER_QUIZ);

  for round in 0..QUESTIONS_PER_QUIZ {
    let answer = pool.remove(rng.gen_range(0..pool.len()));

    let same_genre: Vec<&Game> = pool.iter().copied().filter(|g| g.genre == answer.genre).collect();
    let other_genre: Vec<&Game> = pool.iter().copied().filter(|g| g.genre != answer.genre).collect();

    let genre_decoy = match same_genre.choose(rng) {
      Some(g) => *g,
      None => *other_genre.choose(rng).ok_or_else(|| too_few_others(answer, 0))?,
    };

    let candidates: Vec<&Game> = other_genre
      .into_iter()
      .filter(|g| !std::ptr::eq(*g, genre_decoy))
      .collect();
    if candidates.len() < 2 {
      return Err(too_few_others(answer, candidates.len()));
    }
    let mut choices: Vec<String> = candidates
      .choose_multiple(rng, 2)
      .map(|g| g.title.clone())
      .collect();

    choices.push(answer.title.clone());
    choices.push(genre_decoy.title.clone());
    choices.shuffle(rng);

    let description = match table.get(&answer.title).and_then(|d| d.choose(rng)) {
      Some(d) => d.clone(),
      None => {
        warn!(target: "quiz", title = %answer.title, "No stored description; using fallback");
        FALLBACK_DESCRIPTION.to_string()
      }
    };

    debug!(target: "quiz", round, title = %answer.title, genre = %answer.genre, "Question built");
    questions.push(Question { description, correct_answer: answer.title.clone(), choices });
  }

  Ok(questions)
}

fn too_few_others(answer: &Game, available: usize) -> InsufficientCatalogError {
  InsufficientCatalogError::TooFewOtherGenres {
    title: answer.title.clone(),
    genre: answer.genre.clone(),
    available,
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;

  fn catalog() -> Vec<Game> {
    [
      ("Doom", "Shooter"), ("Halo", "Shooter"), ("Quake", "Shooter"), ("Half-Life", "Shooter"),
      ("Tetris", "Puzzle"), ("Portal", "Puzzle"), ("Myst", "Puzzle"), ("Minesweeper", "Puzzle"),
      ("Pong", "Sports"), ("FIFA", "Sports"), ("Rocket League", "Sports"), ("Tony Hawk", "Sports"),
    ]
    .iter()
    .map(|(t, g)| Game::new(t, g))
    .collect()
  }

  fn full_table(games: &[Game]) -> DescriptionTable {
    games
      .iter()
      .map(|g| {
        let descs = (1..=5).map(|i| format!("{} clue number {i} here", g.title)).collect();
        (g.title.clone(), descs)
      })
      .collect()
  }

  fn assert_well_formed(questions: &[Question], table: &DescriptionTable) {
    assert_eq!(questions.len(), QUESTIONS_PER_QUIZ);

    let answers: HashSet<&str> = questions.iter().map(|q| q.correct_answer.as_str()).collect();
    assert_eq!(answers.len(), QUESTIONS_PER_QUIZ, "correct answers repeat");

    for q in questions {
      assert_eq!(q.choices.len(), CHOICES_PER_QUESTION);
      let distinct: HashSet<&String> = q.choices.iter().collect();
      assert_eq!(distinct.len(), CHOICES_PER_QUESTION, "duplicate choice in {q:?}");
      assert_eq!(q.choices.iter().filter(|c| **c == q.correct_answer).count(), 1);
      if let Some(descs) = table.get(&q.correct_answer) {
        assert!(descs.contains(&q.description));
      }
    }
  }

  #[test]
  fn builds_five_well_formed_questions() {
    let games = catalog();
    let table = full_table(&games);
    for seed in 0..200 {
      let mut rng = StdRng::seed_from_u64(seed);
      let qs = generate_questions(&games, &table, &mut rng).unwrap();
      assert_well_formed(&qs, &table);
    }
  }

  #[test]
  fn includes_a_same_genre_decoy_when_available() {
    let games: Vec<Game> = ["Shooter", "Puzzle", "Sports"]
      .iter()
      .flat_map(|genre| (0..6).map(move |i| Game::new(&format!("{genre} {i}"), genre)))
      .collect();
    let table = full_table(&games);
    let genre_of = |t: &str| games.iter().find(|g| g.title == t).map(|g| g.genre.clone()).unwrap();

    // Six titles per genre: even five answers of one genre leave a same-genre decoy.
    for seed in 0..50 {
      let mut rng = StdRng::seed_from_u64(seed);
      for q in generate_questions(&games, &table, &mut rng).unwrap() {
        let genre = genre_of(&q.correct_answer);
        let same = q.choices.iter().filter(|c| genre_of(c) == genre).count();
        assert_eq!(same, 2, "{q:?}");
      }
    }
  }

  #[test]
  fn singleton_genres_never_duplicate_choices() {
    let mut games = catalog();
    games.extend([Game::new("Pac-Man", "Arcade"), Game::new("Asteroids", "Space"), Game::new("Zork", "Text")]);
    let table = full_table(&games);
    for seed in 0..500 {
      let mut rng = StdRng::seed_from_u64(seed);
      let qs = generate_questions(&games, &table, &mut rng).unwrap();
      assert_well_formed(&qs, &table);
    }
  }

  #[test]
  fn same_seed_same_quiz() {
    let games = catalog();
    let table = full_table(&games);
    let a = generate_questions(&games, &table, &mut StdRng::seed_from_u64(42)).unwrap();
    let b = generate_questions(&games, &table, &mut StdRng::seed_from_u64(42)).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn missing_descriptions_use_fallback() {
    let games = catalog();
    let mut rng = StdRng::seed_from_u64(3);
    let qs = generate_questions(&games, &DescriptionTable::new(), &mut rng).unwrap();
    assert!(qs.iter().all(|q| q.description == FALLBACK_DESCRIPTION));
  }

  #[test]
  fn small_catalog_is_rejected() {
    let games: Vec<Game> = catalog().into_iter().take(MIN_CATALOG_SIZE - 1).collect();
    let err = generate_questions(&games, &DescriptionTable::new(), &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert_eq!(err, InsufficientCatalogError::TooFewGames { needed: MIN_CATALOG_SIZE, available: 7 });
  }

  #[test]
  fn single_genre_catalog_has_no_cross_genre_decoys() {
    let games: Vec<Game> = (0..10).map(|i| Game::new(&format!("Shooter {i}"), "Shooter")).collect();
    let err = generate_questions(&games, &DescriptionTable::new(), &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, InsufficientCatalogError::TooFewOtherGenres { available: 0, .. }));
  }
}
