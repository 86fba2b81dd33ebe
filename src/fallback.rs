//! Fallback selection from the static content bank.
//!
//! Every function here is infallible: `ContentBank::check` guarantees at
//! startup that each kind has entries to sample from.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::bank::ContentBank;
use crate::domain::{SentenceFillRound, TriviaRound, WordMatchRound, WordPair};
use crate::validate::WORD_MATCH_PAIRS;

/// Shuffle the pair list and keep the first 4 distinct by `sourceWord`.
pub fn word_match<R: Rng + ?Sized>(bank: &ContentBank, rng: &mut R) -> WordMatchRound {
  let mut pool: Vec<&WordPair> = bank.word_pairs.iter().collect();
  pool.shuffle(rng);

  let mut seen = HashSet::new();
  let pairs = pool
    .into_iter()
    .filter(|p| !p.source_word.trim().is_empty() && !p.target_word.trim().is_empty())
    .filter(|&p| seen.insert(p.source_word.as_str()))
    .take(WORD_MATCH_PAIRS)
    .cloned()
    .collect();
  WordMatchRound(pairs)
}

pub fn trivia<R: Rng + ?Sized>(bank: &ContentBank, rng: &mut R) -> TriviaRound {
  bank.trivia[rng.gen_range(0..bank.trivia.len())].clone()
}

pub fn sentence_fill<R: Rng + ?Sized>(bank: &ContentBank, rng: &mut R) -> SentenceFillRound {
  bank.sentences[rng.gen_range(0..bank.sentences.len())].clone()
}
