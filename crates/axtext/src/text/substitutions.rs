/*!
Text substitutions applied before speech.
*/

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

use super::cluster_set::ExtendedGraphemeClusterSet;
use super::clusters::{clusters, is_decimal_digit};

/// Rewrites text before it is spoken.
pub trait Substitutions: Send + Sync + fmt::Debug {
  fn perform(&self, value: &str) -> String;
}

/// Word and cluster replacement tables.
///
/// Words are replaced first, then clusters of the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleSubstitutions {
  #[serde(default)]
  pub words: HashMap<String, String>,
  #[serde(default)]
  pub characters: HashMap<String, String>,
}

impl SimpleSubstitutions {
  pub fn new(words: HashMap<String, String>, characters: HashMap<String, String>) -> Self {
    Self { words, characters }
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty() && self.characters.is_empty()
  }

  fn replace_words(&self, value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (is_word, segment) in segments(value) {
      match self.words.get(segment) {
        Some(sub) if is_word => out.push_str(sub),
        _ => out.push_str(segment),
      }
    }
    out
  }

  fn replace_clusters(&self, value: &str) -> String {
    clusters(value)
      .map(|cluster| self.characters.get(cluster).map_or(cluster, String::as_str))
      .collect()
  }
}

impl Substitutions for SimpleSubstitutions {
  fn perform(&self, value: &str) -> String {
    let mut value = value.to_owned();
    if !self.words.is_empty() {
      value = self.replace_words(&value);
    }
    if !self.characters.is_empty() {
      value = self.replace_clusters(&value);
    }
    value
  }
}

/// Compatibility decomposition with combining marks stripped:
/// `"ﬁancé"` becomes `"fiance"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecomposingSubstitutions;

impl Substitutions for DecomposingSubstitutions {
  fn perform(&self, value: &str) -> String {
    value
      .nfkd()
      .filter(|&c| canonical_combining_class(c) == 0)
      .collect()
  }
}

/// Speech synthesizer inline commands.
#[derive(Debug, Clone, Copy)]
pub struct SynthesizerMarkup;

impl SynthesizerMarkup {
  /// Switch to spelling out characters.
  pub const CHARACTER_LITERAL: &'static str = "[[char ltrl]]";
  /// Switch back to normal reading.
  pub const CHARACTER_NORMAL: &'static str = "[[char norm]]";

  /// `value` spelled out character by character.
  pub fn literal(value: &str) -> String {
    format!("{}{value}{}", Self::CHARACTER_LITERAL, Self::CHARACTER_NORMAL)
  }
}

/// Spells out unit abbreviations after numbers, so "5m" is read as "five m"
/// rather than "five meters" or "five minutes".
///
/// A unit is `m`, `ms` or `mm` directly after the digits, or any of those or
/// `s` after a single space, and must be followed by whitespace or the end
/// of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbbreviationExpansion;

impl AbbreviationExpansion {
  const ATTACHED_UNITS: [&'static str; 3] = ["mm", "ms", "m"];
  const SPACED_UNITS: [&'static str; 4] = ["mm", "ms", "m", "s"];
}

impl Substitutions for AbbreviationExpansion {
  fn perform(&self, value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(at) = rest.find(is_decimal_digit) {
      let (before, digits) = rest.split_at(at);
      let end = digits.find(|c: char| !is_decimal_digit(c)).unwrap_or(digits.len());
      let (digits, after) = digits.split_at(end);
      out.push_str(before);
      out.push_str(digits);
      rest = after;

      let (space, candidate, units) = match rest.strip_prefix(' ') {
        Some(spaced) => (" ", spaced, Self::SPACED_UNITS.as_slice()),
        None => ("", rest, Self::ATTACHED_UNITS.as_slice()),
      };
      let unit = units.iter().find_map(|&unit| {
        candidate
          .strip_prefix(unit)
          .filter(|tail| ends_word(tail))
          .map(|tail| (unit, tail))
      });
      if let Some((unit, tail)) = unit {
        out.push_str(space);
        out.push_str(&SynthesizerMarkup::literal(unit));
        rest = tail;
      }
    }
    out.push_str(rest);
    out
  }
}

/// Whether `tail` starts with whitespace or is empty.
fn ends_word(tail: &str) -> bool {
  match clusters(tail).next() {
    Some(cluster) => cluster.chars().all(char::is_whitespace),
    None => true,
  }
}

/// Spells out runs of punctuation: `f()` becomes
/// `f[[char ltrl]]()[[char norm]]`.
#[derive(Debug, Clone)]
pub struct PunctuationExpansion {
  punctuation: ExtendedGraphemeClusterSet,
}

impl Default for PunctuationExpansion {
  fn default() -> Self {
    Self {
      punctuation: ExtendedGraphemeClusterSet::punctuation_characters(),
    }
  }
}

impl PunctuationExpansion {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Substitutions for PunctuationExpansion {
  fn perform(&self, value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut literal = false;
    for cluster in clusters(value) {
      let punctuation = self.punctuation.contains(cluster);
      if punctuation != literal {
        out.push_str(if punctuation {
          SynthesizerMarkup::CHARACTER_LITERAL
        } else {
          SynthesizerMarkup::CHARACTER_NORMAL
        });
        literal = punctuation;
      }
      out.push_str(cluster);
    }
    if literal {
      out.push_str(SynthesizerMarkup::CHARACTER_NORMAL);
    }
    out
  }
}

/// Substitutions applied in order.
#[derive(Debug, Default)]
pub struct SubstitutionChain {
  steps: Vec<Box<dyn Substitutions>>,
}

impl SubstitutionChain {
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn then(mut self, step: impl Substitutions + 'static) -> Self {
    self.steps.push(Box::new(step));
    self
  }

  pub fn push(&mut self, step: Box<dyn Substitutions>) {
    self.steps.push(step);
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

impl Substitutions for SubstitutionChain {
  fn perform(&self, value: &str) -> String {
    self
      .steps
      .iter()
      .fold(value.to_owned(), |acc, step| step.perform(&acc))
  }
}

fn is_word_char(c: char) -> bool {
  c.is_alphanumeric() || c == '_'
}

/// Alternating word and non-word segments. Apostrophes between word
/// characters stay inside the word ("don't").
fn segments(value: &str) -> Vec<(bool, &str)> {
  let mut out = Vec::new();
  let chars: Vec<(usize, char)> = value.char_indices().collect();
  let mut start = 0;
  let mut current: Option<bool> = None;
  for (n, &(i, c)) in chars.iter().enumerate() {
    let inner_apostrophe = matches!(c, '\'' | '\u{2019}')
      && current == Some(true)
      && chars.get(n + 1).is_some_and(|&(_, next)| is_word_char(next));
    let word = is_word_char(c) || inner_apostrophe;
    match current {
      Some(kind) if kind == word => {}
      Some(kind) => {
        out.push((kind, &value[start..i]));
        start = i;
        current = Some(word);
      }
      None => current = Some(word),
    }
  }
  if let Some(kind) = current {
    out.push((kind, &value[start..]));
  }
  out
}
