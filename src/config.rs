//! Loading agent configuration (prompts + optional extra bank entries) from TOML.
//!
//! Example `AGENT_CONFIG_PATH` file:
//!
//! ```toml
//! [prompts]
//! trivia_user_template = "Make a trivia question for a 6 year old..."
//!
//! [[photo_words]]
//! word = "צב"
//! english = "turtle"
//! emoji = "🐢"
//! ```

use serde::Deserialize;
use tracing::info;

use crate::domain::{PhotoWord, SentenceFillRound, TriviaRound, WordPair};
use crate::error::RoundError;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub word_pairs: Vec<WordPair>,
  #[serde(default)]
  pub trivia: Vec<TriviaRound>,
  #[serde(default)]
  pub sentences: Vec<SentenceFillRound>,
  #[serde(default)]
  pub photo_words: Vec<PhotoWord>,
}

/// Prompts sent to the model. Templates use `{key}` placeholders; the exact
/// field names and counts live here because the model is not bound to a schema.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub word_match_system: String,
  pub word_match_user_template: String,
  pub trivia_system: String,
  pub trivia_user_template: String,
  pub sentence_system: String,
  pub sentence_user_template: String,
  pub image_prompt_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      word_match_system: "You create Hebrew vocabulary games for young children. Respond ONLY with strict JSON, no prose, no code fences.".into(),
      word_match_user_template: "Pick {count} different simple Hebrew nouns a 5-8 year old knows. Return a JSON array of exactly {count} objects with fields \"sourceWord\" (the Hebrew word, no niqqud) and \"targetWord\" (its English translation). Every sourceWord must be different.".into(),
      trivia_system: "You create Hebrew vocabulary trivia for young children. Respond ONLY with strict JSON, no prose, no code fences.".into(),
      trivia_user_template: "Pick one simple Hebrew noun. Return a JSON object with fields: \"promptWord\" (the Hebrew word), \"options\" (array of exactly {count} different English words, one of which is the translation), \"correctIndex\" (integer 0-{max_index}, the position of the translation in options), \"clueSentence\" (a short Hebrew sentence using the word), \"clueEmoji\" (one emoji for the word).".into(),
      sentence_system: "You create Hebrew fill-in-the-blank sentences for young children. Respond ONLY with strict JSON, no prose, no code fences.".into(),
      sentence_user_template: "Write one short, simple Hebrew sentence and replace exactly {count} words with the blank marker {blank}. Return a JSON object with fields: \"template\" (the sentence containing exactly {count} occurrences of {blank}), \"missingWords\" (array of exactly {count} Hebrew words filling the blanks in reading order), \"distractors\" (array of 3 or 4 Hebrew words that do not fit any blank).".into(),
      image_prompt_template: "A bright, friendly cartoon illustration of a single {english} on a plain white background, for a children's picture book. No text or letters.".into(),
    }
  }
}

/// Load `AgentConfig` from AGENT_CONFIG_PATH.
///
/// Unset variable: `Ok(None)`. A path that cannot be read or parsed is a
/// configuration error, surfaced at startup.
pub fn load_agent_config_from_env() -> Result<Option<AgentConfig>, RoundError> {
  let Ok(path) = std::env::var("AGENT_CONFIG_PATH") else {
    return Ok(None);
  };
  load_agent_config(&path).map(Some)
}

pub fn load_agent_config(path: &str) -> Result<AgentConfig, RoundError> {
  let s = std::fs::read_to_string(path)
    .map_err(|e| RoundError::config(format!("failed to read {path}: {e}")))?;
  let cfg = parse_agent_config(&s).map_err(|e| RoundError::config(format!("failed to parse {path}: {e}")))?;
  info!(
    target: "lingualoop_backend",
    %path,
    word_pairs = cfg.word_pairs.len(),
    trivia = cfg.trivia.len(),
    sentences = cfg.sentences.len(),
    photo_words = cfg.photo_words.len(),
    "Loaded agent config (TOML)"
  );
  Ok(cfg)
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_toml_yields_defaults() {
    let cfg = parse_agent_config("").unwrap();
    assert!(cfg.word_pairs.is_empty());
    assert!(cfg.prompts.trivia_user_template.contains("correctIndex"));
  }

  #[test]
  fn partial_prompt_override_keeps_other_defaults() {
    let cfg = parse_agent_config("[prompts]\ntrivia_system = \"custom\"\n").unwrap();
    assert_eq!(cfg.prompts.trivia_system, "custom");
    assert_eq!(cfg.prompts.sentence_system, Prompts::default().sentence_system);
  }

  #[test]
  fn parses_extra_bank_entries() {
    let toml = r#"
[[word_pairs]]
sourceWord = "צב"
targetWord = "turtle"

[[trivia]]
promptWord = "צב"
options = ["turtle", "frog", "snake", "duck"]
correctIndex = 0

[[photo_words]]
word = "צב"
english = "turtle"
emoji = "🐢"
"#;
    let cfg = parse_agent_config(toml).unwrap();
    assert_eq!(cfg.word_pairs[0].target_word, "turtle");
    assert_eq!(cfg.trivia[0].clue_emoji, "");
    assert_eq!(cfg.photo_words[0].emoji, "🐢");
  }

  #[test]
  fn unreadable_path_is_configuration_error() {
    let err = load_agent_config("/definitely/not/here.toml").unwrap_err();
    assert!(matches!(err, RoundError::Configuration(_)));
  }
}
