//! Domain models: round kinds, the per-kind payloads returned to clients,
//! and the photo-word bank entry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal placeholder marking a fill-in position in a sentence template.
pub const BLANK_MARKER: &str = "___";

/// Which mini-game a round belongs to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RoundKind {
  WordMatch,
  Trivia,
  SentenceFill,
  PhotoWord,
}

impl RoundKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      RoundKind::WordMatch => "word-match",
      RoundKind::Trivia => "trivia",
      RoundKind::SentenceFill => "sentence-fill",
      RoundKind::PhotoWord => "photo-word",
    }
  }
}

impl fmt::Display for RoundKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One Hebrew → English pair of a word-match round.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordPair {
  pub source_word: String,
  pub target_word: String,
}

/// Exactly four pairs, distinct by `source_word`. Serialized as a bare array.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WordMatchRound(pub Vec<WordPair>);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TriviaRound {
  pub prompt_word: String,
  pub options: Vec<String>,
  pub correct_index: usize,
  #[serde(default)]
  pub clue_sentence: String,
  #[serde(default)]
  pub clue_emoji: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SentenceFillRound {
  pub template: String,
  pub missing_words: Vec<String>,
  pub distractors: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoWordRound {
  pub image_reference: String,
  pub target_word: String,
  pub letter_pool: Vec<char>,
}

/// Photo-word bank entry: the Hebrew word, its English gloss (drives the image
/// prompt) and an emoji used by the placeholder image.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PhotoWord {
  pub word: String,
  pub english: String,
  #[serde(default)]
  pub emoji: String,
}
