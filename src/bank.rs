//! Static content bank: pre-authored rounds used whenever the model path fails.
//!
//! The bank is bundled into the binary (`data/content_bank.json`), optionally
//! extended by entries from the agent config, checked once at startup and
//! never mutated afterwards.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::info;

use crate::config::AgentConfig;
use crate::domain::{PhotoWord, SentenceFillRound, TriviaRound, WordPair};
use crate::error::RoundError;
use crate::hebrew::{letters, letters_absent_from, strip_diacritics};
use crate::puzzle::DECOY_COUNT;
use crate::validate::{self, WORD_MATCH_PAIRS};

const BUNDLED_BANK: &str = include_str!("../data/content_bank.json");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ContentBank {
  #[serde(default)]
  pub word_pairs: Vec<WordPair>,
  #[serde(default)]
  pub trivia: Vec<TriviaRound>,
  #[serde(default)]
  pub sentences: Vec<SentenceFillRound>,
  #[serde(default)]
  pub photo_words: Vec<PhotoWord>,
}

impl ContentBank {
  /// Bundled bank plus any entries from the agent config, checked.
  pub fn load(cfg: Option<&AgentConfig>) -> Result<Self, RoundError> {
    let mut bank = Self::from_json(BUNDLED_BANK)?;
    if let Some(cfg) = cfg {
      bank.extend_from(cfg);
    }
    bank.check()?;
    info!(
      target: "round",
      word_pairs = bank.word_pairs.len(),
      trivia = bank.trivia.len(),
      sentences = bank.sentences.len(),
      photo_words = bank.photo_words.len(),
      "Startup content bank inventory"
    );
    Ok(bank)
  }

  pub fn from_json(json: &str) -> Result<Self, RoundError> {
    serde_json::from_str(json).map_err(|e| RoundError::config(format!("content bank is malformed: {e}")))
  }

  pub fn extend_from(&mut self, cfg: &AgentConfig) {
    self.word_pairs.extend(cfg.word_pairs.iter().cloned());
    self.trivia.extend(cfg.trivia.iter().cloned());
    self.sentences.extend(cfg.sentences.iter().cloned());
    // A word listed twice would defeat the anti-repeat cursor.
    for pw in &cfg.photo_words {
      let key = strip_diacritics(&pw.word);
      if !self.photo_words.iter().any(|p| strip_diacritics(&p.word) == key) {
        self.photo_words.push(pw.clone());
      }
    }
  }

  /// Every kind must be non-empty and every entry must satisfy the schema
  /// its kind is validated against at runtime.
  pub fn check(&self) -> Result<(), RoundError> {
    let distinct_sources: HashSet<&str> = self
      .word_pairs
      .iter()
      .filter(|p| !p.source_word.trim().is_empty() && !p.target_word.trim().is_empty())
      .map(|p| p.source_word.as_str())
      .collect();
    if distinct_sources.len() < WORD_MATCH_PAIRS {
      return Err(RoundError::config(format!(
        "word-match bank needs at least {WORD_MATCH_PAIRS} distinct non-empty pairs, has {}",
        distinct_sources.len()
      )));
    }

    if self.trivia.is_empty() {
      return Err(RoundError::config("trivia bank is empty"));
    }
    for (i, t) in self.trivia.iter().enumerate() {
      let v = serde_json::to_value(t).map_err(|e| RoundError::config(e.to_string()))?;
      validate::trivia(Some(&v)).map_err(|e| RoundError::config(format!("trivia entry {i}: {e}")))?;
    }

    if self.sentences.is_empty() {
      return Err(RoundError::config("sentence-fill bank is empty"));
    }
    for (i, s) in self.sentences.iter().enumerate() {
      let v = serde_json::to_value(s).map_err(|e| RoundError::config(e.to_string()))?;
      validate::sentence_fill(Some(&v)).map_err(|e| RoundError::config(format!("sentence entry {i}: {e}")))?;
    }

    if self.photo_words.is_empty() {
      return Err(RoundError::config("photo-word list is empty"));
    }
    for pw in &self.photo_words {
      if letters(&pw.word).is_empty() {
        return Err(RoundError::config(format!("photo word '{}' has no Hebrew letters", pw.word)));
      }
      if letters_absent_from(&pw.word).len() < DECOY_COUNT {
        return Err(RoundError::config(format!("photo word '{}' leaves no room for decoys", pw.word)));
      }
    }
    Ok(())
  }
}

/// Absolute last resort if the photo-word list is somehow empty at runtime.
pub fn hard_fallback_photo_word() -> PhotoWord {
  PhotoWord { word: "כלב".into(), english: "dog".into(), emoji: "🐶".into() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bundled_bank_loads_and_checks() {
    let bank = ContentBank::load(None).expect("bundled bank must be valid");
    assert_eq!(bank.photo_words.len(), 39);
    assert!(bank.word_pairs.len() >= WORD_MATCH_PAIRS);
  }

  #[test]
  fn empty_bank_is_configuration_error() {
    let bank = ContentBank::from_json("{}").unwrap();
    assert!(matches!(bank.check(), Err(RoundError::Configuration(_))));
  }

  #[test]
  fn malformed_json_is_configuration_error() {
    assert!(matches!(ContentBank::from_json("[oops"), Err(RoundError::Configuration(_))));
  }

  #[test]
  fn invalid_entry_fails_the_check() {
    let mut bank = ContentBank::load(None).unwrap();
    bank.trivia.push(TriviaRound {
      prompt_word: "כלב".into(),
      options: vec!["a".into(), "b".into()],
      correct_index: 0,
      clue_sentence: String::new(),
      clue_emoji: String::new(),
    });
    assert!(matches!(bank.check(), Err(RoundError::Configuration(_))));
  }

  #[test]
  fn config_entries_extend_without_duplicate_photo_words() {
    let mut bank = ContentBank::load(None).unwrap();
    let cfg = crate::config::parse_agent_config(
      "[[photo_words]]\nword = \"צב\"\nenglish = \"turtle\"\n\n[[photo_words]]\nword = \"כלב\"\nenglish = \"dog\"\n",
    )
    .unwrap();
    bank.extend_from(&cfg);
    assert_eq!(bank.photo_words.len(), 40);
    assert!(bank.check().is_ok());
  }
}
