//! Photo-word puzzle construction: the shuffled letter pool and the
//! placeholder image used when image generation is unavailable.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::PhotoWord;
use crate::hebrew::{letters, letters_absent_from};

/// Extra letters mixed into every pool.
pub const DECOY_COUNT: usize = 2;

/// Letters of `word` (niqqud stripped, duplicates kept) plus `DECOY_COUNT`
/// distinct letters that do not occur in the word, in random order.
pub fn build_letter_pool<R: Rng + ?Sized>(word: &str, rng: &mut R) -> Vec<char> {
  let mut pool = letters(word);
  let candidates = letters_absent_from(word);
  pool.extend(candidates.choose_multiple(rng, DECOY_COUNT).copied());
  pool.shuffle(rng);
  pool
}

/// Deterministic stand-in image: an SVG card with the word's emoji (or the
/// Hebrew word itself when no emoji is set), embedded as a data URI.
pub fn placeholder_image(pw: &PhotoWord) -> String {
  let label = if pw.emoji.is_empty() { &pw.word } else { &pw.emoji };
  let svg = format!(
    concat!(
      r##"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="512" viewBox="0 0 512 512">"##,
      r##"<rect width="512" height="512" rx="48" fill="#FFF4D6"/>"##,
      r##"<text x="256" y="300" font-size="220" text-anchor="middle">{}</text>"##,
      r##"</svg>"##
    ),
    escape_xml(label)
  );
  format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

fn escape_xml(s: &str) -> String {
  s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
