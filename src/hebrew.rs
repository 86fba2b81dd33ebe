//! Hebrew text helpers: niqqud stripping, letter extraction and the
//! decoy alphabet used by the photo-word letter pool.
//!
//! Example:
//!   input:  "שָׁלוֹם"
//!   output: "שלום"

/// The 22 base letters. Final forms are never offered as decoys.
pub const ALPHABET: [char; 22] = [
  'א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט', 'י', 'כ',
  'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ', 'ק', 'ר', 'ש', 'ת',
];

/// True for niqqud, cantillation marks and the other combining points of
/// the Hebrew block.
pub fn is_diacritic(ch: char) -> bool {
  matches!(ch, '\u{0591}'..='\u{05BD}' | '\u{05BF}' | '\u{05C1}'..='\u{05C2}' | '\u{05C4}'..='\u{05C5}' | '\u{05C7}')
}

/// True for Hebrew letters, including the five final forms.
pub fn is_letter(ch: char) -> bool {
  ('\u{05D0}'..='\u{05EA}').contains(&ch)
}

/// Remove niqqud and cantillation, keep everything else as-is.
pub fn strip_diacritics(text: &str) -> String {
  text.chars().filter(|c| !is_diacritic(*c)).collect()
}

/// Letters of a word in reading order, diacritics dropped, duplicates kept.
/// Punctuation such as geresh, maqaf or spaces is dropped too.
pub fn letters(word: &str) -> Vec<char> {
  word.chars().filter(|c| is_letter(*c)).collect()
}

/// Map a final form (ך ם ן ף ץ) to its base letter; other chars unchanged.
pub fn base_form(ch: char) -> char {
  match ch {
    'ך' => 'כ',
    'ם' => 'מ',
    'ן' => 'נ',
    'ף' => 'פ',
    'ץ' => 'צ',
    other => other,
  }
}

/// Base letters that do not occur in `word` in any form. A word ending in
/// `ם` excludes `מ` as well, so a decoy is never a disguised correct letter.
pub fn letters_absent_from(word: &str) -> Vec<char> {
  let used: Vec<char> = letters(word).into_iter().map(base_form).collect();
  ALPHABET.iter().copied().filter(|c| !used.contains(c)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_niqqud_but_keeps_letters() {
    assert_eq!(strip_diacritics("שָׁלוֹם"), "שלום");
    assert_eq!(strip_diacritics("כֶּלֶב"), "כלב");
    assert_eq!(strip_diacritics("dog"), "dog");
  }

  #[test]
  fn letters_keep_duplicates_and_finals() {
    assert_eq!(letters("אַבָּא"), vec!['א', 'ב', 'א']);
    assert_eq!(letters("שָׁלוֹם"), vec!['ש', 'ל', 'ו', 'ם']);
    assert_eq!(letters("גלידה!"), vec!['ג', 'ל', 'י', 'ד', 'ה']);
  }

  #[test]
  fn absent_letters_fold_final_forms() {
    let absent = letters_absent_from("שלום");
    assert!(!absent.contains(&'מ'));
    assert!(!absent.contains(&'ש'));
    assert!(!absent.contains(&'ם'));
    assert_eq!(absent.len(), ALPHABET.len() - 4);
  }

  #[test]
  fn alphabet_contains_only_base_letters() {
    for c in ALPHABET {
      assert!(is_letter(c));
      assert_eq!(base_form(c), c);
    }
  }
}
