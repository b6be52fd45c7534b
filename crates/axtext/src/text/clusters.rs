/*!
Character classes and cluster iteration.

Clusters are extended grapheme clusters as defined by UAX #29.
*/

use unicode_normalization::char::is_combining_mark;
use unicode_segmentation::{Graphemes, UnicodeSegmentation};

/// Predefined character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterClass {
  /// Control (Cc) and common format (Cf) characters.
  Control,
  /// Horizontal whitespace, including tab.
  Whitespace,
  WhitespaceAndNewlines,
  /// Decimal digits (general category Nd).
  DecimalDigits,
  Letters,
  LowercaseLetters,
  UppercaseLetters,
  Alphanumerics,
  Punctuation,
  Symbols,
  Newlines,
}

impl CharacterClass {
  pub fn contains(self, c: char) -> bool {
    match self {
      Self::Control => c.is_control() || is_format(c),
      Self::Whitespace => is_horizontal_whitespace(c),
      Self::WhitespaceAndNewlines => c.is_whitespace(),
      Self::DecimalDigits => is_decimal_digit(c),
      Self::Letters => c.is_alphabetic() || is_combining_mark(c),
      Self::LowercaseLetters => c.is_lowercase(),
      Self::UppercaseLetters => c.is_uppercase(),
      Self::Alphanumerics => c.is_alphanumeric() || is_combining_mark(c),
      Self::Punctuation => is_punctuation(c),
      Self::Symbols => is_symbol(c),
      Self::Newlines => is_newline(c),
    }
  }
}

pub(crate) const fn is_newline(c: char) -> bool {
  matches!(c, '\n' | '\u{0B}' | '\u{0C}' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Whitespace that does not break lines.
pub(crate) fn is_horizontal_whitespace(c: char) -> bool {
  c.is_whitespace() && !is_newline(c)
}

/// First code point of each run of ten Nd digits.
const DIGIT_ZEROS: [u32; 68] = [
  0x30, 0x660, 0x6F0, 0x7C0, 0x966, 0x9E6, 0xA66, 0xAE6, 0xB66, 0xBE6, 0xC66, 0xCE6, 0xD66,
  0xDE6, 0xE50, 0xED0, 0xF20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946, 0x19D0, 0x1A80, 0x1A90,
  0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0, 0xA9F0, 0xAA50, 0xABF0,
  0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0, 0x112F0, 0x11450, 0x114D0,
  0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50, 0x11DA0, 0x11F50, 0x16A60,
  0x16AC0, 0x16B50, 0x1E140, 0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0, 0x1D7CE, 0x1D7D8, 0x1D7E2,
  0x1D7EC, 0x1D7F6,
];

pub(crate) fn is_decimal_digit(c: char) -> bool {
  if c.is_ascii() {
    return c.is_ascii_digit();
  }
  let code = u32::from(c);
  DIGIT_ZEROS.iter().any(|&zero| (zero..zero + 10).contains(&code))
}

const fn is_format(c: char) -> bool {
  matches!(
    c,
    '\u{AD}' | '\u{600}'..='\u{605}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}'
      | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
  )
}

const fn is_ascii_symbol(c: char) -> bool {
  matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~')
}

fn is_punctuation(c: char) -> bool {
  if c.is_ascii() {
    return c.is_ascii_punctuation() && !is_ascii_symbol(c);
  }
  matches!(
    c,
    '\u{A1}' | '\u{A7}' | '\u{AB}' | '\u{B6}' | '\u{B7}' | '\u{BB}' | '\u{BF}'
      | '\u{2010}'..='\u{2027}' | '\u{2030}'..='\u{2043}' | '\u{2045}'..='\u{2051}'
      | '\u{2053}'..='\u{205E}' | '\u{3001}'..='\u{3003}' | '\u{3008}'..='\u{3011}'
      | '\u{FF01}'..='\u{FF03}' | '\u{FF05}'..='\u{FF0A}' | '\u{FF0C}'..='\u{FF0F}'
  )
}

fn is_symbol(c: char) -> bool {
  if c.is_ascii() {
    return is_ascii_symbol(c);
  }
  matches!(
    c,
    '\u{A2}'..='\u{A6}' | '\u{A8}' | '\u{A9}' | '\u{AC}' | '\u{AE}'..='\u{B1}' | '\u{B4}'
      | '\u{D7}' | '\u{F7}' | '\u{2044}' | '\u{2052}' | '\u{20A0}'..='\u{20C0}'
      | '\u{2100}'..='\u{214F}' | '\u{2190}'..='\u{23FF}' | '\u{2500}'..='\u{27BF}'
      | '\u{2900}'..='\u{2BFF}' | '\u{1F000}'..='\u{1FAFF}'
  )
}

/// Split `s` into extended grapheme clusters.
pub fn clusters(s: &str) -> Clusters<'_> {
  s.graphemes(true)
}

/// Iterator returned by [`clusters`].
pub type Clusters<'a> = Graphemes<'a>;

#[cfg(test)]
mod tests {
  use super::*;

  fn split(s: &str) -> Vec<&str> {
    clusters(s).collect()
  }

  #[test]
  fn combining_marks_stay_with_base() {
    assert_eq!(split("e\u{301}a"), vec!["e\u{301}", "a"]);
  }

  #[test]
  fn zwj_sequences_are_one_cluster() {
    let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
    assert_eq!(split(&format!("{family}!")), vec![family, "!"]);
  }

  #[test]
  fn flags_and_hangul_syllables_are_one_cluster() {
    let us = "\u{1F1FA}\u{1F1F8}";
    let fr = "\u{1F1EB}\u{1F1F7}";
    assert_eq!(split(&format!("{us}{fr}")), vec![us, fr]);
    assert_eq!(split("\u{1100}\u{1161}\u{11A8}x"), vec!["\u{1100}\u{1161}\u{11A8}", "x"]);
  }

  #[test]
  fn decimal_digits_exclude_other_numerics() {
    for c in ['0', '9', '\u{663}', '\u{FF15}', '\u{1D7D9}', '\u{1D7FF}'] {
      assert!(CharacterClass::DecimalDigits.contains(c), "{c:?}");
    }
    for c in ['\u{BD}', '\u{216B}', '\u{B2}', '\u{2460}', 'a'] {
      assert!(!CharacterClass::DecimalDigits.contains(c), "{c:?}");
    }
  }

  #[test]
  fn crlf_is_one_cluster() {
    assert_eq!(split("a\r\nb"), vec!["a", "\r\n", "b"]);
    assert_eq!(split("\r\r"), vec!["\r", "\r"]);
  }

  #[test]
  fn classes() {
    assert!(CharacterClass::Whitespace.contains('\t'));
    assert!(!CharacterClass::Whitespace.contains('\n'));
    assert!(CharacterClass::Newlines.contains('\u{2028}'));
    assert!(CharacterClass::Punctuation.contains(','));
    assert!(!CharacterClass::Punctuation.contains('+'));
    assert!(CharacterClass::Symbols.contains('+'));
    assert!(CharacterClass::Symbols.contains('\u{20AC}'));
    assert!(CharacterClass::Control.contains('\u{FEFF}'));
    assert!(CharacterClass::UppercaseLetters.contains('Ä'));
    assert!(CharacterClass::DecimalDigits.contains('7'));
  }
}
