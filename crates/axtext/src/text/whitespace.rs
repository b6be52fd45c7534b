/*!
Leading whitespace classification.

Used to announce indentation when reading a line of code: "two levels",
"one level and two spaces", "mixed".
*/

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::clusters::is_horizontal_whitespace;

/// How the document indents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Indentation {
  #[default]
  Spaces,
  Tabs,
}

/// A run of identical whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
#[ts(export)]
pub enum Run {
  Spaces(usize),
  Tabs(usize),
  /// Any other horizontal whitespace, such as no-break space.
  Other(usize),
}

impl Run {
  fn of(c: char) -> Self {
    match c {
      ' ' => Self::Spaces(1),
      '\t' => Self::Tabs(1),
      _ => Self::Other(1),
    }
  }

  /// Extend this run with `c` if it is the same kind.
  fn absorb(&mut self, c: char) -> bool {
    match (self, Self::of(c)) {
      (Self::Spaces(n), Self::Spaces(_)) | (Self::Tabs(n), Self::Tabs(_)) | (Self::Other(n), Self::Other(_)) => {
        *n += 1;
        true
      }
      _ => false,
    }
  }
}

/// Classification of a line's leading whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum Leading {
  /// Not expressible as levels. Spaces indentation reports the runs; tab
  /// indentation reports none.
  Mixed(Vec<Run>),
  /// Whole indentation levels.
  Level(usize),
  /// Levels plus leftover spaces.
  LevelWithModulus(usize, usize),
  /// Fewer spaces than one level.
  Modulus(usize),
}

/// Leading whitespace statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct WhitespaceStatistics {
  pub tab_size: usize,
  pub indentation: Indentation,
  pub leading: Leading,
}

/// Splits a line into leading whitespace and remainder.
#[derive(Debug, Clone)]
pub struct WhitespaceClassifier {
  tab_size: usize,
  indentation: Indentation,
  value: String,
  split: usize,
}

impl WhitespaceClassifier {
  /// A `tab_size` of 0 is treated as 1.
  pub fn new(value: impl Into<String>, tab_size: usize, indentation: Indentation) -> Self {
    let value = value.into();
    let split = value
      .char_indices()
      .find(|&(_, c)| !is_horizontal_whitespace(c))
      .map_or(value.len(), |(i, _)| i);
    Self {
      tab_size: tab_size.max(1),
      indentation,
      value,
      split,
    }
  }

  pub fn value(&self) -> &str {
    &self.value
  }

  /// Leading whitespace, `None` when the line starts with content.
  pub fn leading_whitespace(&self) -> Option<&str> {
    self.value.get(..self.split).filter(|s| !s.is_empty())
  }

  /// Everything after the leading whitespace.
  pub fn remainder(&self) -> &str {
    self.value.get(self.split..).unwrap_or_default()
  }

  /// `None` without leading whitespace.
  pub fn statistics(&self) -> Option<WhitespaceStatistics> {
    let whitespace = self.leading_whitespace()?;
    let leading = match self.indentation {
      Indentation::Spaces => self.space_levels(whitespace)?,
      Indentation::Tabs => {
        if whitespace.chars().all(|c| c == '\t') {
          Leading::Level(whitespace.chars().count())
        } else {
          Leading::Mixed(Vec::new())
        }
      }
    };
    Some(WhitespaceStatistics {
      tab_size: self.tab_size,
      indentation: self.indentation,
      leading,
    })
  }

  fn space_levels(&self, whitespace: &str) -> Option<Leading> {
    // Seeded with an empty space run, so a line opening with a tab or other
    // whitespace reports `Spaces(0)` first.
    let mut runs = vec![Run::Spaces(0)];
    for c in whitespace.chars() {
      if !runs.last_mut().is_some_and(|run| run.absorb(c)) {
        runs.push(Run::of(c));
      }
    }
    let [Run::Spaces(spaces)] = runs.as_slice() else {
      return Some(Leading::Mixed(runs));
    };
    let level = spaces / self.tab_size;
    let modulus = spaces % self.tab_size;
    match (level, modulus) {
      (0, 0) => None,
      (0, m) => Some(Leading::Modulus(m)),
      (l, 0) => Some(Leading::Level(l)),
      (l, m) => Some(Leading::LevelWithModulus(l, m)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn leading(value: &str, tab: usize, indentation: Indentation) -> Option<Leading> {
    WhitespaceClassifier::new(value, tab, indentation)
      .statistics()
      .map(|s| s.leading)
  }

  #[test]
  fn no_leading_whitespace() {
    let c = WhitespaceClassifier::new("fn main", 4, Indentation::Spaces);
    assert_eq!(c.leading_whitespace(), None);
    assert_eq!(c.remainder(), "fn main");
    assert_eq!(c.statistics(), None);
  }

  #[test]
  fn spaces_split_into_levels() {
    assert_eq!(leading("        x", 4, Indentation::Spaces), Some(Leading::Level(2)));
    assert_eq!(
      leading("      x", 4, Indentation::Spaces),
      Some(Leading::LevelWithModulus(1, 2))
    );
    assert_eq!(leading("  x", 4, Indentation::Spaces), Some(Leading::Modulus(2)));
  }

  #[test]
  fn mixed_runs_are_reported() {
    assert_eq!(
      leading("  \t\t x", 4, Indentation::Spaces),
      Some(Leading::Mixed(vec![Run::Spaces(2), Run::Tabs(2), Run::Spaces(1)]))
    );
    assert_eq!(
      leading("\u{a0} x", 4, Indentation::Spaces),
      Some(Leading::Mixed(vec![Run::Spaces(0), Run::Other(1), Run::Spaces(1)]))
    );
  }

  #[test]
  fn leading_tab_under_spaces_reports_empty_space_run() {
    assert_eq!(
      leading("\tx", 4, Indentation::Spaces),
      Some(Leading::Mixed(vec![Run::Spaces(0), Run::Tabs(1)]))
    );
    assert_eq!(
      leading("\t\t  x", 2, Indentation::Spaces),
      Some(Leading::Mixed(vec![Run::Spaces(0), Run::Tabs(2), Run::Spaces(2)]))
    );
  }

  #[test]
  fn tabs_count_levels_or_give_up() {
    assert_eq!(leading("\t\t\tx", 4, Indentation::Tabs), Some(Leading::Level(3)));
    assert_eq!(leading("\t x", 4, Indentation::Tabs), Some(Leading::Mixed(vec![])));
  }

  #[test]
  fn all_whitespace_has_empty_remainder() {
    let c = WhitespaceClassifier::new("    ", 2, Indentation::Spaces);
    assert_eq!(c.remainder(), "");
    assert_eq!(c.leading_whitespace(), Some("    "));
    assert_eq!(c.statistics().unwrap().leading, Leading::Level(2));
  }

  #[test]
  fn newlines_are_not_leading_whitespace() {
    let c = WhitespaceClassifier::new("\n  x", 4, Indentation::Spaces);
    assert_eq!(c.leading_whitespace(), None);
  }

  proptest! {
    #[test]
    fn spaces_decompose_by_tab_size(spaces in 1usize..200, tab in 1usize..12) {
      let line = format!("{}x", " ".repeat(spaces));
      let total = match leading(&line, tab, Indentation::Spaces).unwrap() {
        Leading::Level(l) => l * tab,
        Leading::LevelWithModulus(l, m) => { prop_assert!(m < tab); l * tab + m }
        Leading::Modulus(m) => { prop_assert!(m < tab); m }
        Leading::Mixed(_) => unreachable!(),
      };
      prop_assert_eq!(total, spaces);
    }

    #[test]
    fn leading_and_remainder_rebuild_value(value in "[ \t]{0,6}[a-z ]{0,10}") {
      let c = WhitespaceClassifier::new(value.clone(), 4, Indentation::Spaces);
      let rebuilt = format!("{}{}", c.leading_whitespace().unwrap_or(""), c.remainder());
      prop_assert_eq!(rebuilt, value);
    }
  }
}
