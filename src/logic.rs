//! Round orchestration shared by all HTTP handlers.
//!
//! Text rounds: request → parse → validate, and on any failure (no client,
//! upstream error, unparsable text, schema violation) a bank entry instead.
//! Photo-word: session cursor → image (placeholder on failure) → letter pool.
//!
//! Every function returns the payload plus an origin label for logging; the
//! label never reaches the response body.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::bank::hard_fallback_photo_word;
use crate::domain::{
  PhotoWord, PhotoWordRound, RoundKind, SentenceFillRound, TriviaRound, WordMatchRound, BLANK_MARKER,
};
use crate::error::RoundError;
use crate::fallback;
use crate::puzzle::{build_letter_pool, placeholder_image};
use crate::state::AppState;
use crate::util::{fill_template, trunc_for_log};
use crate::validate::{self, SENTENCE_BLANKS, TRIVIA_OPTIONS, WORD_MATCH_PAIRS};

pub const ORIGIN_AI: &str = "ai";
pub const ORIGIN_FALLBACK: &str = "fallback";

type Check<T> = fn(Option<&Value>) -> Result<T, RoundError>;

/// One model attempt for a text round. Any error means "fall back".
async fn request_and_validate<T>(
  state: &AppState,
  kind: RoundKind,
  system: &str,
  instruction: &str,
  check: Check<T>,
) -> Result<T, RoundError> {
  let requester = state
    .requester
    .as_ref()
    .ok_or_else(|| RoundError::upstream("no AI client configured"))?;

  let text = requester.request_round(system, instruction).await?;
  let candidate = match validate::parse_candidate(&text) {
    Ok(v) => Some(v),
    Err(e) => {
      debug!(target: "round", %kind, error = %e, preview = %trunc_for_log(&text, 80), "Model text is not JSON");
      None
    }
  };
  check(candidate.as_ref())
}

fn log_fallback(kind: RoundKind, e: &RoundError) {
  match e {
    RoundError::Upstream(_) => warn!(target: "round", %kind, reason = e.label(), error = %e, "Model call failed; serving bank round"),
    _ => warn!(target: "round", %kind, reason = e.label(), error = %e, "Model output rejected; serving bank round"),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn word_match_round(state: &AppState) -> (WordMatchRound, &'static str) {
  let count = WORD_MATCH_PAIRS.to_string();
  let instruction = fill_template(&state.prompts.word_match_user_template, &[("count", count.as_str())]);
  let result = request_and_validate(
    state,
    RoundKind::WordMatch,
    &state.prompts.word_match_system,
    &instruction,
    validate::word_match,
  )
  .await;

  match result {
    Ok(round) => (round, ORIGIN_AI),
    Err(e) => {
      log_fallback(RoundKind::WordMatch, &e);
      (fallback_word_match(state), ORIGIN_FALLBACK)
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn trivia_round(state: &AppState) -> (TriviaRound, &'static str) {
  let count = TRIVIA_OPTIONS.to_string();
  let max_index = (TRIVIA_OPTIONS - 1).to_string();
  let instruction = fill_template(
    &state.prompts.trivia_user_template,
    &[("count", count.as_str()), ("max_index", max_index.as_str())],
  );
  let result = request_and_validate(
    state,
    RoundKind::Trivia,
    &state.prompts.trivia_system,
    &instruction,
    validate::trivia,
  )
  .await;

  match result {
    Ok(round) => (round, ORIGIN_AI),
    Err(e) => {
      log_fallback(RoundKind::Trivia, &e);
      (fallback_trivia(state), ORIGIN_FALLBACK)
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn sentence_fill_round(state: &AppState) -> (SentenceFillRound, &'static str) {
  let count = SENTENCE_BLANKS.to_string();
  let instruction = fill_template(
    &state.prompts.sentence_user_template,
    &[("count", count.as_str()), ("blank", BLANK_MARKER)],
  );
  let result = request_and_validate(
    state,
    RoundKind::SentenceFill,
    &state.prompts.sentence_system,
    &instruction,
    validate::sentence_fill,
  )
  .await;

  match result {
    Ok(round) => (round, ORIGIN_AI),
    Err(e) => {
      log_fallback(RoundKind::SentenceFill, &e);
      (fallback_sentence_fill(state), ORIGIN_FALLBACK)
    }
  }
}

/// Photo-word never falls back to a different word: the cursor picks the
/// word, and only the image degrades to a placeholder.
#[instrument(level = "info", skip(state))]
pub async fn photo_word_round(state: &AppState, session: Option<&str>) -> (PhotoWordRound, &'static str) {
  let pw = match state.sessions.next_photo_word(session, &state.bank.photo_words).await {
    Some(pw) => pw,
    None => {
      warn!(target: "round", "Photo-word list empty at runtime; using hard fallback word");
      hard_fallback_photo_word()
    }
  };

  let (image_reference, origin) = match &state.images {
    Some(images) => {
      let prompt = fill_template(
        &state.prompts.image_prompt_template,
        &[("english", pw.english.as_str()), ("word", pw.word.as_str())],
      );
      match images.generate_image(&prompt).await {
        Ok(reference) => (reference, ORIGIN_AI),
        Err(e) => {
          warn!(target: "round", kind = %RoundKind::PhotoWord, word = %pw.word, reason = e.label(), error = %e, "Image generation failed; using placeholder");
          (placeholder_image(&pw), ORIGIN_FALLBACK)
        }
      }
    }
    None => (placeholder_image(&pw), ORIGIN_FALLBACK),
  };

  let round = assemble_photo_word(&pw, image_reference);
  info!(target: "round", kind = %RoundKind::PhotoWord, word = %round.target_word, pool_len = round.letter_pool.len(), %origin, "Photo-word round built");
  (round, origin)
}

// Sync helpers keep the thread-local RNG out of the async state machines.

fn fallback_word_match(state: &AppState) -> WordMatchRound {
  fallback::word_match(&state.bank, &mut rand::thread_rng())
}

fn fallback_trivia(state: &AppState) -> TriviaRound {
  fallback::trivia(&state.bank, &mut rand::thread_rng())
}

fn fallback_sentence_fill(state: &AppState) -> SentenceFillRound {
  fallback::sentence_fill(&state.bank, &mut rand::thread_rng())
}

fn assemble_photo_word(pw: &PhotoWord, image_reference: String) -> PhotoWordRound {
  PhotoWordRound {
    image_reference,
    target_word: pw.word.clone(),
    letter_pool: build_letter_pool(&pw.word, &mut rand::thread_rng()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;
  use std::sync::Arc;

  use crate::bank::ContentBank;
  use crate::config::Prompts;
  use crate::hebrew::letters;
  use crate::openai::{ImageGenerator, MockImageGenerator, MockRoundRequester, RoundRequester};
  use crate::puzzle::DECOY_COUNT;

  fn state_with(
    requester: Option<Arc<dyn RoundRequester>>,
    images: Option<Arc<dyn ImageGenerator>>,
  ) -> AppState {
    AppState::from_parts(ContentBank::load(None).unwrap(), Prompts::default(), requester, images)
  }

  fn replying(text: &'static str) -> Option<Arc<dyn RoundRequester>> {
    let mut mock = MockRoundRequester::new();
    mock.expect_request_round().returning(move |_, _| Ok(text.to_string()));
    Some(Arc::new(mock))
  }

  fn failing() -> Option<Arc<dyn RoundRequester>> {
    let mut mock = MockRoundRequester::new();
    mock.expect_request_round().returning(|_, _| Err(RoundError::upstream("timeout")));
    Some(Arc::new(mock))
  }

  fn field_names(v: &Value) -> Vec<String> {
    let mut keys: Vec<String> = v.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
  }

  #[tokio::test]
  async fn valid_word_match_from_model_is_served() {
    let text = r#"```json
[{"sourceWord":"צב","targetWord":"turtle"},{"sourceWord":"צפרדע","targetWord":"frog"},
 {"sourceWord":"נחש","targetWord":"snake"},{"sourceWord":"ברווז","targetWord":"duck"}]
```"#;
    let state = state_with(replying(text), None);
    let (round, origin) = word_match_round(&state).await;
    assert_eq!(origin, ORIGIN_AI);
    assert_eq!(round.0[0].source_word, "צב");
  }

  #[tokio::test]
  async fn invalid_word_match_falls_back_with_same_shape() {
    let state = state_with(replying(r#"[{"sourceWord":"צב","targetWord":"turtle"}]"#), None);
    let (round, origin) = word_match_round(&state).await;
    assert_eq!(origin, ORIGIN_FALLBACK);
    assert_eq!(round.0.len(), 4);
    let sources: HashSet<_> = round.0.iter().map(|p| &p.source_word).collect();
    assert_eq!(sources.len(), 4);
  }

  #[tokio::test]
  async fn trivia_with_two_options_triggers_fallback() {
    let state = state_with(
      replying(r#"{"promptWord":"כלב","options":["a","b"],"correctIndex":0,"clueSentence":"","clueEmoji":""}"#),
      None,
    );
    let (round, origin) = trivia_round(&state).await;
    assert_eq!(origin, ORIGIN_FALLBACK);
    assert_eq!(round.options.len(), 4);
    assert!(round.correct_index <= 3);
    assert!(state.bank.trivia.contains(&round));
  }

  #[tokio::test]
  async fn fallback_and_ai_trivia_are_structurally_identical() {
    let ai_state = state_with(
      replying(r#"{"promptWord":"צב","options":["turtle","frog","snake","duck"],"correctIndex":0,"clueSentence":"הצב הולך לאט.","clueEmoji":"🐢"}"#),
      None,
    );
    let (ai, origin) = trivia_round(&ai_state).await;
    assert_eq!(origin, ORIGIN_AI);

    let (fb, origin) = trivia_round(&state_with(failing(), None)).await;
    assert_eq!(origin, ORIGIN_FALLBACK);

    let ai = serde_json::to_value(ai).unwrap();
    let fb = serde_json::to_value(fb).unwrap();
    assert_eq!(field_names(&ai), field_names(&fb));
    assert_eq!(ai["options"].as_array().unwrap().len(), fb["options"].as_array().unwrap().len());
  }

  #[tokio::test]
  async fn sentence_fill_rejects_wrong_blank_count() {
    let state = state_with(
      replying(r#"{"template":"אני ___ תפוח","missingWords":["אוכל","x","y"],"distractors":["a","b","c"]}"#),
      None,
    );
    let (round, origin) = sentence_fill_round(&state).await;
    assert_eq!(origin, ORIGIN_FALLBACK);
    assert_eq!(round.template.matches(BLANK_MARKER).count(), 3);
    assert_eq!(round.missing_words.len(), 3);
  }

  #[tokio::test]
  async fn non_json_model_text_falls_back() {
    let state = state_with(replying("Sure! Here's a fun sentence for you."), None);
    let (_, origin) = sentence_fill_round(&state).await;
    assert_eq!(origin, ORIGIN_FALLBACK);
  }

  #[tokio::test]
  async fn no_client_always_falls_back() {
    let state = state_with(None, None);
    assert_eq!(word_match_round(&state).await.1, ORIGIN_FALLBACK);
    assert_eq!(trivia_round(&state).await.1, ORIGIN_FALLBACK);
    assert_eq!(sentence_fill_round(&state).await.1, ORIGIN_FALLBACK);
    assert_eq!(photo_word_round(&state, None).await.1, ORIGIN_FALLBACK);
  }

  #[tokio::test]
  async fn prompt_carries_counts_and_blank_marker() {
    let mut mock = MockRoundRequester::new();
    mock
      .expect_request_round()
      .withf(|_, instruction| instruction.contains("exactly 3") && instruction.contains(BLANK_MARKER))
      .times(1)
      .returning(|_, _| Err(RoundError::upstream("unused")));
    let state = state_with(Some(Arc::new(mock)), None);
    sentence_fill_round(&state).await;
  }

  #[tokio::test]
  async fn photo_word_pool_contains_word_plus_two_decoys() {
    let state = state_with(None, None);
    for _ in 0..20 {
      let (round, _) = photo_word_round(&state, Some("pool-check")).await;
      let target = letters(&round.target_word);
      assert_eq!(round.letter_pool.len(), target.len() + DECOY_COUNT);
      let extras = round.letter_pool.iter().filter(|c| !target.contains(c)).count();
      assert_eq!(extras, DECOY_COUNT);
      assert!(round.image_reference.starts_with("data:image/svg+xml;base64,"));
    }
  }

  #[tokio::test]
  async fn photo_word_never_repeats_within_one_pass() {
    let state = state_with(None, None);
    let n = state.bank.photo_words.len();
    assert_eq!(n, 39);
    let mut seen = HashSet::new();
    for _ in 0..n {
      let (round, _) = photo_word_round(&state, Some("kid-1")).await;
      assert!(seen.insert(round.target_word.clone()), "repeated {}", round.target_word);
    }
    // The 40th round starts a new pass and necessarily reuses a word.
    let (round, _) = photo_word_round(&state, Some("kid-1")).await;
    assert!(seen.contains(&round.target_word));
  }

  #[tokio::test]
  async fn image_failure_keeps_word_and_uses_placeholder() {
    let mut images = MockImageGenerator::new();
    images.expect_generate_image().returning(|_| Err(RoundError::upstream("content policy")));
    let state = state_with(None, Some(Arc::new(images)));
    let (round, origin) = photo_word_round(&state, None).await;
    assert_eq!(origin, ORIGIN_FALLBACK);
    let pw = state.bank.photo_words.iter().find(|p| p.word == round.target_word).unwrap();
    assert_eq!(round.image_reference, placeholder_image(pw));
  }

  #[tokio::test]
  async fn generated_image_is_used_and_prompt_names_the_word() {
    let mut images = MockImageGenerator::new();
    images
      .expect_generate_image()
      .withf(|prompt| prompt.contains("cartoon") && !prompt.contains("{english}"))
      .returning(|_| Ok("https://images.example/dog.png".to_string()));
    let state = state_with(None, Some(Arc::new(images)));
    let (round, origin) = photo_word_round(&state, None).await;
    assert_eq!(origin, ORIGIN_AI);
    assert_eq!(round.image_reference, "https://images.example/dog.png");
  }
}
