//! Schema validation for model output.
//!
//! The prompt only asks the model for a shape; these predicates are what
//! actually decide whether a candidate is served. Each takes the parsed JSON
//! candidate (`None` when the text did not parse) and either accepts it into
//! the typed payload or rejects it.

use std::collections::HashSet;

use serde_json::Value;

use crate::domain::{SentenceFillRound, TriviaRound, WordMatchRound, WordPair, BLANK_MARKER};
use crate::error::RoundError;
use crate::util::{count_occurrences, strip_code_fence};

pub const WORD_MATCH_PAIRS: usize = 4;
pub const TRIVIA_OPTIONS: usize = 4;
pub const SENTENCE_BLANKS: usize = 3;
pub const MIN_DISTRACTORS: usize = 3;
pub const MAX_DISTRACTORS: usize = 4;

/// Parse raw model text (optionally fenced) into JSON.
pub fn parse_candidate(text: &str) -> Result<Value, RoundError> {
  Ok(serde_json::from_str::<Value>(strip_code_fence(text))?)
}

fn require_candidate(candidate: Option<&Value>) -> Result<&Value, RoundError> {
  candidate.ok_or_else(|| RoundError::Parse("no JSON candidate".into()))
}

fn non_empty_str(v: &Value, field: &str) -> Result<String, RoundError> {
  match v.get(field).and_then(Value::as_str).map(str::trim) {
    Some(s) if !s.is_empty() => Ok(s.to_string()),
    _ => Err(RoundError::validation(format!("'{field}' must be a non-empty string"))),
  }
}

fn optional_str(v: &Value, field: &str) -> String {
  v.get(field).and_then(Value::as_str).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn string_list(v: &Value, field: &str) -> Result<Vec<String>, RoundError> {
  let arr = v
    .get(field)
    .and_then(Value::as_array)
    .ok_or_else(|| RoundError::validation(format!("'{field}' must be an array")))?;
  arr
    .iter()
    .map(|item| match item.as_str().map(str::trim) {
      Some(s) if !s.is_empty() => Ok(s.to_string()),
      _ => Err(RoundError::validation(format!("'{field}' must contain non-empty strings"))),
    })
    .collect()
}

/// Exactly 4 pairs, each with non-empty `sourceWord`/`targetWord`, distinct by `sourceWord`.
pub fn word_match(candidate: Option<&Value>) -> Result<WordMatchRound, RoundError> {
  let v = require_candidate(candidate)?;
  let arr = v.as_array().ok_or_else(|| RoundError::validation("word-match candidate must be an array"))?;
  if arr.len() != WORD_MATCH_PAIRS {
    return Err(RoundError::validation(format!("expected {WORD_MATCH_PAIRS} pairs, got {}", arr.len())));
  }

  let mut seen = HashSet::new();
  let mut pairs = Vec::with_capacity(WORD_MATCH_PAIRS);
  for item in arr {
    let source_word = non_empty_str(item, "sourceWord")?;
    let target_word = non_empty_str(item, "targetWord")?;
    if !seen.insert(source_word.clone()) {
      return Err(RoundError::validation(format!("duplicate sourceWord '{source_word}'")));
    }
    pairs.push(WordPair { source_word, target_word });
  }
  Ok(WordMatchRound(pairs))
}

/// Exactly 4 distinct options and an integer `correctIndex` in 0..=3.
pub fn trivia(candidate: Option<&Value>) -> Result<TriviaRound, RoundError> {
  let v = require_candidate(candidate)?;
  let prompt_word = non_empty_str(v, "promptWord")?;
  let options = string_list(v, "options")?;
  if options.len() != TRIVIA_OPTIONS {
    return Err(RoundError::validation(format!("expected {TRIVIA_OPTIONS} options, got {}", options.len())));
  }
  let distinct: HashSet<&String> = options.iter().collect();
  if distinct.len() != options.len() {
    return Err(RoundError::validation("options must be distinct"));
  }

  // as_u64 rejects negatives and fractions, which is exactly the integer rule.
  let correct_index = v
    .get("correctIndex")
    .and_then(Value::as_u64)
    .ok_or_else(|| RoundError::validation("'correctIndex' must be a non-negative integer"))?;
  if correct_index as usize >= TRIVIA_OPTIONS {
    return Err(RoundError::validation(format!("correctIndex {correct_index} out of range")));
  }

  Ok(TriviaRound {
    prompt_word,
    options,
    correct_index: correct_index as usize,
    clue_sentence: optional_str(v, "clueSentence"),
    clue_emoji: optional_str(v, "clueEmoji"),
  })
}

/// Template with exactly 3 blank markers, 3 missing words, 3–4 distractors
/// that do not repeat a missing word.
pub fn sentence_fill(candidate: Option<&Value>) -> Result<SentenceFillRound, RoundError> {
  let v = require_candidate(candidate)?;
  let template = non_empty_str(v, "template")?;
  let blanks = count_occurrences(&template, BLANK_MARKER);
  if blanks != SENTENCE_BLANKS {
    return Err(RoundError::validation(format!("template has {blanks} blanks, expected {SENTENCE_BLANKS}")));
  }

  let missing_words = string_list(v, "missingWords")?;
  if missing_words.len() != SENTENCE_BLANKS {
    return Err(RoundError::validation(format!(
      "expected {SENTENCE_BLANKS} missingWords, got {}",
      missing_words.len()
    )));
  }

  let distractors = string_list(v, "distractors")?;
  if !(MIN_DISTRACTORS..=MAX_DISTRACTORS).contains(&distractors.len()) {
    return Err(RoundError::validation(format!("expected 3-4 distractors, got {}", distractors.len())));
  }
  if let Some(clash) = distractors.iter().find(|d| missing_words.contains(*d)) {
    return Err(RoundError::validation(format!("distractor '{clash}' is also a missing word")));
  }

  Ok(SentenceFillRound { template, missing_words, distractors })
}
