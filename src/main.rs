//! LinguaLoop · Ellie Says round-generation backend
//!
//! - Axum HTTP API serving one game round per request
//! - Optional OpenAI integration (via environment variables); falls back to
//!   the bundled content bank whenever the model path fails
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables OpenAI integration if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_FAST_MODEL   : default "gpt-4o-mini"
//!   OPENAI_IMAGE_MODEL  : default "dall-e-3"
//!   OPENAI_TIMEOUT_SECS : default 20
//!   AGENT_CONFIG_PATH   : path to TOML config (prompts + extra bank entries)
//!   STATIC_DIR          : front-end directory, default "./static"
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod hebrew;
mod config;
mod bank;
mod validate;
mod fallback;
mod puzzle;
mod session;
mod state;
mod protocol;
mod logic;
mod openai;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Bank/config problems are fatal here, before we accept any traffic.
  let state = match AppState::new() {
    Ok(s) => Arc::new(s),
    Err(e) => {
      error!(target: "lingualoop_backend", error = %e, "Startup failed");
      return Err(e.into());
    }
  };

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "lingualoop_backend", %addr, ai = state.ai_enabled(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "lingualoop_backend", error = %e, "Failed to listen for shutdown signal");
    return;
  }
  info!(target: "lingualoop_backend", "Shutdown signal received");
}
