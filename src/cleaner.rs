//! Turns a model's free-text answer into a short description phrase.
//!
//! Models routinely ignore the "exactly five words" instruction: they wrap the
//! answer in quotes, add markdown, continue with a second sentence or stop on
//! a dangling "and". `clean` trims all of that down to 4–7 words or gives up
//! with [`FALLBACK_DESCRIPTION`].

/// Stored instead of a description when cleaning or generation fails.
pub const FALLBACK_DESCRIPTION: &str = "Mystery game with secrets";

pub const MIN_WORDS: usize = 4;
pub const MAX_WORDS: usize = 7;

/// Words a description must not end on.
const STOP_WORDS: &[&str] = &[
  "a", "an", "the", "and", "or", "to", "at", "on", "in", "with", "for", "by", "of",
];

pub fn is_fallback(description: &str) -> bool {
  description == FALLBACK_DESCRIPTION
}

/// Total and deterministic: any input yields either a 4–7 word phrase or the fallback.
pub fn clean(raw: &str) -> String {
  let line = raw.split('\n').next().unwrap_or_default().replace('*', "");
  let sentence = strip_wrapping_quotes(first_sentence(&line));

  let mut words: Vec<&str> = sentence.split_whitespace().take(MAX_WORDS).collect();

  while words.len() > MIN_WORDS && words.last().is_some_and(|w| is_stop_word(w)) {
    words.pop();
  }

  if words.len() < MIN_WORDS {
    return FALLBACK_DESCRIPTION.to_string();
  }

  let mut out = capitalize(words[0]);
  for w in &words[1..] {
    out.push(' ');
    out.push_str(w);
  }
  out
}

/// Text before the first period that is followed by whitespace. Markdown stars
/// are already gone, so "Dr.* Who" cuts the same as "Dr. Who".
fn first_sentence(text: &str) -> &str {
  let mut chars = text.char_indices().peekable();
  while let Some((i, c)) = chars.next() {
    if c == '.' && chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
      return &text[..i];
    }
  }
  text
}

fn strip_wrapping_quotes(s: &str) -> &str {
  for quote in ['"', '\''] {
    if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
      return &s[1..s.len() - 1];
    }
  }
  s
}

fn is_stop_word(word: &str) -> bool {
  let bare = word.to_lowercase();
  let bare = bare.trim_end_matches(|c: char| matches!(c, ',' | '.' | '!' | '?'));
  STOP_WORDS.contains(&bare)
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    None => String::new(),
  }
}
