//! Error taxonomy for round generation.
//!
//! Upstream, parse and validation failures are absorbed by the orchestrator
//! (they trigger the static fallback). Only `Configuration` is fatal, and only
//! at startup.

#[derive(Debug, thiserror::Error)]
pub enum RoundError {
  /// Network failure, timeout, non-success status, or no usable candidate.
  #[error("Upstream error: {0}")]
  Upstream(String),

  /// Well-formed JSON that violates the kind's schema.
  #[error("Validation error: {0}")]
  Validation(String),

  /// Model text that is not valid JSON.
  #[error("Parse error: {0}")]
  Parse(String),

  /// Missing/empty/malformed content bank or agent config.
  #[error("Configuration error: {0}")]
  Configuration(String),
}

impl RoundError {
  pub fn upstream(message: impl ToString) -> Self {
    Self::Upstream(message.to_string())
  }

  pub fn validation(message: impl ToString) -> Self {
    Self::Validation(message.to_string())
  }

  pub fn config(message: impl ToString) -> Self {
    Self::Configuration(message.to_string())
  }

  /// Short label used as a structured log field.
  pub fn label(&self) -> &'static str {
    match self {
      Self::Upstream(_) => "upstream",
      Self::Validation(_) => "validation",
      Self::Parse(_) => "parse",
      Self::Configuration(_) => "configuration",
    }
  }
}

impl From<serde_json::Error> for RoundError {
  fn from(e: serde_json::Error) -> Self {
    Self::Parse(e.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_match_variants() {
    assert_eq!(RoundError::upstream("x").label(), "upstream");
    assert_eq!(RoundError::validation("x").label(), "validation");
    assert_eq!(RoundError::config("x").label(), "configuration");
    let parse: RoundError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    assert_eq!(parse.label(), "parse");
  }

  #[test]
  fn display_includes_message() {
    let e = RoundError::upstream("OpenAI HTTP 500");
    assert_eq!(e.to_string(), "Upstream error: OpenAI HTTP 500");
  }
}
