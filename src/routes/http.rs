//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Round endpoints always answer 200; the origin is logged, never returned.

use std::sync::Arc;
use axum::{extract::{Query, State}, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, ai: state.ai_enabled() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session_id = state.sessions.create().await;
  info!(target: "round", %session_id, "Session created");
  Json(SessionOut { session_id })
}

#[instrument(level = "info", skip(state))]
pub async fn http_word_match(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (round, origin) = word_match_round(&state).await;
  info!(target: "round", kind = "word-match", %origin, "HTTP round served");
  Json(round)
}

#[instrument(level = "info", skip(state))]
pub async fn http_trivia(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (round, origin) = trivia_round(&state).await;
  info!(target: "round", kind = "trivia", prompt_word = %round.prompt_word, %origin, "HTTP round served");
  Json(round)
}

#[instrument(level = "info", skip(state))]
pub async fn http_sentence_fill(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (round, origin) = sentence_fill_round(&state).await;
  info!(target: "round", kind = "sentence-fill", %origin, "HTTP round served");
  Json(round)
}

#[instrument(level = "info", skip(state), fields(has_session = q.session.is_some()))]
pub async fn http_photo_word(
  State(state): State<Arc<AppState>>,
  Query(q): Query<PhotoWordQuery>,
) -> impl IntoResponse {
  let (round, origin) = photo_word_round(&state, q.session.as_deref()).await;
  info!(target: "round", kind = "photo-word", word = %round.target_word, %origin, "HTTP round served");
  Json(round)
}
