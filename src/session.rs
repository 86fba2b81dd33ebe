//! Photo-word anti-repeat cursors.
//!
//! Each cursor remembers which target words it has already served. Callers
//! that pass a session id get their own cursor; callers that don't share one
//! anonymous cursor. Every pick is a single read-modify-write under the store's
//! write lock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::PhotoWord;

/// Upper bound on tracked sessions; beyond it an arbitrary cursor is dropped.
const MAX_SESSIONS: usize = 10_000;

/// Key used when the caller does not supply a session id.
const ANONYMOUS: &str = "";

#[derive(Clone, Debug, Default)]
pub struct SessionCursor {
  shown: HashSet<String>,
}

impl SessionCursor {
  /// Pick a word this cursor has not served yet. When every word has been
  /// served the cursor restarts before picking.
  pub fn next_word<'a, R: Rng + ?Sized>(&mut self, words: &'a [PhotoWord], rng: &mut R) -> Option<&'a PhotoWord> {
    let mut unseen: Vec<&PhotoWord> = words.iter().filter(|w| !self.shown.contains(&w.word)).collect();
    if unseen.is_empty() {
      debug!(target: "round", shown = self.shown.len(), "All photo words shown; restarting cursor");
      self.shown.clear();
      unseen = words.iter().collect();
    }
    let chosen = *unseen.choose(rng)?;
    self.shown.insert(chosen.word.clone());
    Some(chosen)
  }

  pub fn shown_count(&self) -> usize {
    self.shown.len()
  }
}

#[derive(Clone, Default)]
pub struct SessionStore {
  cursors: Arc<RwLock<HashMap<String, SessionCursor>>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Mint a fresh session id and register an empty cursor for it.
  pub async fn create(&self) -> String {
    let id = Uuid::new_v4().to_string();
    let mut cursors = self.cursors.write().await;
    Self::make_room(&mut cursors);
    cursors.insert(id.clone(), SessionCursor::default());
    id
  }

  /// Pick the next photo word for `session` (anonymous cursor when `None`).
  pub async fn next_photo_word(&self, session: Option<&str>, words: &[PhotoWord]) -> Option<PhotoWord> {
    let key = session.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(ANONYMOUS);
    let mut cursors = self.cursors.write().await;
    if !cursors.contains_key(key) {
      Self::make_room(&mut cursors);
    }
    let cursor = cursors.entry(key.to_string()).or_default();
    let mut rng = rand::thread_rng();
    let picked = cursor.next_word(words, &mut rng).cloned();
    debug!(target: "round", anonymous = key.is_empty(), shown = cursor.shown_count(), total = words.len(), "Photo word picked");
    picked
  }

  fn make_room(cursors: &mut HashMap<String, SessionCursor>) {
    if cursors.len() < MAX_SESSIONS {
      return;
    }
    let victim = cursors.keys().find(|k| k.as_str() != ANONYMOUS).cloned();
    if let Some(k) = victim {
      warn!(target: "round", sessions = cursors.len(), "Session cap reached; dropping a cursor");
      cursors.remove(&k);
    }
  }

  #[cfg(test)]
  pub async fn len(&self) -> usize {
    self.cursors.read().await.len()
  }
}
