/*!
Sets of extended grapheme clusters.

Like a character set, but members may be clusters of several scalars
(`"e\u{301}"`, emoji sequences). Single scalars are tested against the
predefined classes plus explicit insertions and removals; longer clusters
are stored as strings.
*/

use std::collections::HashSet;

use super::clusters::{clusters, CharacterClass};

/// Set of clusters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedGraphemeClusterSet {
  classes: Vec<CharacterClass>,
  inserted: HashSet<char>,
  removed: HashSet<char>,
  multi: HashSet<String>,
}

impl ExtendedGraphemeClusterSet {
  /// Empty set.
  pub fn new() -> Self {
    Self::default()
  }

  /// Set of every character in `class`.
  pub fn from_class(class: CharacterClass) -> Self {
    Self {
      classes: vec![class],
      ..Self::default()
    }
  }

  pub fn control_characters() -> Self {
    Self::from_class(CharacterClass::Control)
  }

  pub fn whitespaces() -> Self {
    Self::from_class(CharacterClass::Whitespace)
  }

  pub fn whitespaces_and_newlines() -> Self {
    Self::from_class(CharacterClass::WhitespaceAndNewlines)
  }

  pub fn decimal_digits() -> Self {
    Self::from_class(CharacterClass::DecimalDigits)
  }

  pub fn letters() -> Self {
    Self::from_class(CharacterClass::Letters)
  }

  pub fn lowercase_letters() -> Self {
    Self::from_class(CharacterClass::LowercaseLetters)
  }

  pub fn uppercase_letters() -> Self {
    Self::from_class(CharacterClass::UppercaseLetters)
  }

  pub fn alphanumerics() -> Self {
    Self::from_class(CharacterClass::Alphanumerics)
  }

  pub fn punctuation_characters() -> Self {
    Self::from_class(CharacterClass::Punctuation)
  }

  pub fn symbols() -> Self {
    Self::from_class(CharacterClass::Symbols)
  }

  pub fn newlines() -> Self {
    Self::from_class(CharacterClass::Newlines)
  }

  /// Membership of one cluster.
  pub fn contains(&self, cluster: &str) -> bool {
    match single_scalar(cluster) {
      Some(c) => {
        if self.removed.contains(&c) {
          return false;
        }
        self.inserted.contains(&c) || self.classes.iter().any(|class| class.contains(c))
      }
      None => self.multi.contains(cluster),
    }
  }

  /// Whether every cluster of `s` is a member. True for the empty string.
  pub fn contains_all(&self, s: &str) -> bool {
    clusters(s).all(|cluster| self.contains(cluster))
  }

  /// Insert one cluster.
  pub fn insert(&mut self, cluster: &str) {
    match single_scalar(cluster) {
      Some(c) => {
        self.removed.remove(&c);
        self.inserted.insert(c);
      }
      None => {
        if !cluster.is_empty() {
          self.multi.insert(cluster.to_owned());
        }
      }
    }
  }

  /// Remove one cluster.
  pub fn remove(&mut self, cluster: &str) {
    match single_scalar(cluster) {
      Some(c) => {
        self.inserted.remove(&c);
        self.removed.insert(c);
      }
      None => {
        self.multi.remove(cluster);
      }
    }
  }

  /// Insert every cluster of `s`.
  pub fn insert_all(&mut self, s: &str) {
    for cluster in clusters(s) {
      self.insert(cluster);
    }
  }

  /// Remove every cluster of `s`.
  pub fn remove_all(&mut self, s: &str) {
    for cluster in clusters(s) {
      self.remove(cluster);
    }
  }
}

fn single_scalar(cluster: &str) -> Option<char> {
  let mut chars = cluster.chars();
  let c = chars.next()?;
  chars.next().is_none().then_some(c)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn predefined_sets_test_scalars() {
    let set = ExtendedGraphemeClusterSet::whitespaces();
    assert!(set.contains(" "));
    assert!(set.contains("\t"));
    assert!(!set.contains("\n"));
    assert!(ExtendedGraphemeClusterSet::newlines().contains("\n"));
    assert!(ExtendedGraphemeClusterSet::decimal_digits().contains_all("2018"));
  }

  #[test]
  fn multi_scalar_clusters_are_stored_separately() {
    let mut set = ExtendedGraphemeClusterSet::letters();
    let accented = "e\u{301}";
    assert!(!set.contains(accented));
    set.insert(accented);
    assert!(set.contains(accented));
    assert!(set.contains("e"));
    set.remove(accented);
    assert!(!set.contains(accented));
  }

  #[test]
  fn removal_overrides_class() {
    let mut set = ExtendedGraphemeClusterSet::punctuation_characters();
    assert!(set.contains("."));
    set.remove_all(".,");
    assert!(!set.contains("."));
    assert!(!set.contains(","));
    assert!(set.contains("!"));
    set.insert(".");
    assert!(set.contains("."));
  }

  #[test]
  fn custom_sets_start_empty() {
    let mut set = ExtendedGraphemeClusterSet::new();
    assert!(!set.contains("a"));
    set.insert_all("ab\u{1F44D}\u{1F3FD}");
    assert!(set.contains("a"));
    assert!(set.contains("\u{1F44D}\u{1F3FD}"));
    assert!(!set.contains("\u{1F44D}"));
    assert!(set.contains_all(""));
  }
}
