//! Minimal OpenAI client for round generation.
//!
//! Two calls only: chat.completions returning the raw text of the first
//! choice, and images.generations returning an image reference. Neither call
//! retries; the orchestrator falls back instead.
//!
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::RoundError;

const CLIENT_UA: &str = "lingualoop-backend/0.1";

/// Issues one content-generation request and returns the raw candidate text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundRequester: Send + Sync {
  async fn request_round(&self, system: &str, instruction: &str) -> Result<String, RoundError>;
}

/// Generates one picture and returns a reference to it (URL or data URI).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGenerator: Send + Sync {
  async fn generate_image(&self, prompt: &str) -> Result<String, RoundError>;
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub image_model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let fast_model =
      std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let image_model =
      std::env::var("OPENAI_IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".into());
    let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .unwrap_or(20);

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, fast_model, image_model })
  }

  async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response, RoundError> {
    let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
    let res = self.client.post(&url)
      .header(USER_AGENT, CLIENT_UA)
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(body).send().await.map_err(|e| RoundError::upstream(e))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(RoundError::upstream(format!("OpenAI HTTP {}: {}", status, msg)));
    }
    Ok(res)
  }
}

#[async_trait]
impl RoundRequester for OpenAI {
  /// Plain-text chat completion; the caller parses the text.
  #[instrument(level = "info", skip(self, system, instruction), fields(model = %self.fast_model, instr_len = instruction.len()))]
  async fn request_round(&self, system: &str, instruction: &str) -> Result<String, RoundError> {
    let req = ChatCompletionRequest {
      model: self.fast_model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: instruction.into() },
      ],
      temperature: 0.9,
    };

    let start = Instant::now();
    let res = self.post_json("/chat/completions", &req).await?;
    let body: ChatCompletionResponse = res.json().await.map_err(|e| RoundError::upstream(e))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }

    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty())
      .ok_or_else(|| RoundError::upstream("OpenAI returned no candidates"))?;

    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Model response received");
    Ok(text)
  }
}

#[async_trait]
impl ImageGenerator for OpenAI {
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.image_model, prompt_len = prompt.len()))]
  async fn generate_image(&self, prompt: &str) -> Result<String, RoundError> {
    let req = ImageGenerationRequest {
      model: self.image_model.clone(),
      prompt: prompt.to_string(),
      n: 1,
      size: "1024x1024".into(),
      response_format: "b64_json".into(),
    };

    let start = Instant::now();
    let res = self.post_json("/images/generations", &req).await?;
    let body: ImageGenerationResponse = res.json().await.map_err(|e| RoundError::upstream(e))?;
    let first = body.data.into_iter().next()
      .ok_or_else(|| RoundError::upstream("OpenAI returned no images"))?;

    let reference = image_reference(first)?;
    info!(elapsed = ?start.elapsed(), reference_len = reference.len(), "Image generated");
    Ok(reference)
  }
}

/// Prefer inline base64 (wrapped as a data URI, after checking it decodes),
/// then a hosted URL.
fn image_reference(img: ImageData) -> Result<String, RoundError> {
  if let Some(b64) = img.b64_json.filter(|s| !s.is_empty()) {
    let bytes = STANDARD
      .decode(b64.as_bytes())
      .map_err(|e| RoundError::upstream(format!("image payload is not base64: {e}")))?;
    if bytes.is_empty() {
      return Err(RoundError::upstream("image payload is empty"));
    }
    return Ok(format!("data:image/png;base64,{}", b64));
  }
  img.url
    .filter(|u| !u.is_empty())
    .ok_or_else(|| RoundError::upstream("image response had neither b64_json nor url"))
}

// --- DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  #[serde(default)] choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ImageGenerationRequest {
  model: String,
  prompt: String,
  n: u32,
  size: String,
  response_format: String,
}
#[derive(Deserialize)]
struct ImageGenerationResponse {
  #[serde(default)] data: Vec<ImageData>,
}
#[derive(Deserialize)]
struct ImageData {
  #[serde(default)] b64_json: Option<String>,
  #[serde(default)] url: Option<String>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_error_message() {
    let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Incorrect API key provided"));
    assert_eq!(extract_openai_error("<html>502</html>"), None);
  }

  #[test]
  fn image_reference_prefers_base64() {
    let img = ImageData { b64_json: Some("iVBORw0KGgo=".into()), url: Some("https://x/y.png".into()) };
    assert_eq!(image_reference(img).unwrap(), "data:image/png;base64,iVBORw0KGgo=");

    let img = ImageData { b64_json: None, url: Some("https://x/y.png".into()) };
    assert_eq!(image_reference(img).unwrap(), "https://x/y.png");
  }

  #[test]
  fn image_reference_rejects_garbage() {
    let img = ImageData { b64_json: Some("not base64 at all!".into()), url: None };
    assert!(matches!(image_reference(img), Err(RoundError::Upstream(_))));

    let img = ImageData { b64_json: None, url: None };
    assert!(image_reference(img).is_err());
  }

  #[test]
  fn chat_response_without_choices_parses() {
    let body: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
    assert!(body.choices.is_empty());
  }
}
