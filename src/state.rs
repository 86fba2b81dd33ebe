//! Application state: content bank, prompts, optional OpenAI seams, and the
//! photo-word session cursors.
//!
//! Everything except the session store is immutable after startup.
//! If OpenAI is unavailable, every round is served from the bank.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::bank::ContentBank;
use crate::config::{load_agent_config_from_env, Prompts};
use crate::error::RoundError;
use crate::openai::{ImageGenerator, OpenAI, RoundRequester};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
  pub bank: Arc<ContentBank>,
  pub prompts: Prompts,
  pub requester: Option<Arc<dyn RoundRequester>>,
  pub images: Option<Arc<dyn ImageGenerator>>,
  pub sessions: SessionStore,
}

impl AppState {
  /// Build state from env: load config, load + check the bank, init OpenAI.
  /// A bad bank or config is a `Configuration` error and stops startup.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Result<Self, RoundError> {
    let cfg = load_agent_config_from_env()?;
    let prompts = cfg.as_ref().map(|c| c.prompts.clone()).unwrap_or_default();
    let bank = ContentBank::load(cfg.as_ref())?;

    let openai = OpenAI::from_env();
    let (requester, images): (Option<Arc<dyn RoundRequester>>, Option<Arc<dyn ImageGenerator>>) = match openai {
      Some(oa) => {
        info!(target: "lingualoop_backend", base_url = %oa.base_url, fast_model = %oa.fast_model, image_model = %oa.image_model, "OpenAI enabled.");
        let oa = Arc::new(oa);
        let requester: Arc<dyn RoundRequester> = oa.clone();
        let images: Arc<dyn ImageGenerator> = oa;
        (Some(requester), Some(images))
      }
      None => {
        info!(target: "lingualoop_backend", "OpenAI disabled (no OPENAI_API_KEY). Serving rounds from the content bank.");
        (None, None)
      }
    };

    Ok(Self::from_parts(bank, prompts, requester, images))
  }

  pub fn from_parts(
    bank: ContentBank,
    prompts: Prompts,
    requester: Option<Arc<dyn RoundRequester>>,
    images: Option<Arc<dyn ImageGenerator>>,
  ) -> Self {
    Self {
      bank: Arc::new(bank),
      prompts,
      requester,
      images,
      sessions: SessionStore::new(),
    }
  }

  pub fn ai_enabled(&self) -> bool {
    self.requester.is_some()
  }
}
