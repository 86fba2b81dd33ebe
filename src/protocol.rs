//! Public HTTP DTOs that are not round payloads themselves (serde ready).
//! Round payloads are serialized straight from `domain`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
pub struct PhotoWordQuery {
  /// Session id from `POST /sessions`; absent means the shared cursor.
  pub session: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
  #[serde(rename = "sessionId")]
  pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
  pub ok: bool,
  pub ai: bool,
}
