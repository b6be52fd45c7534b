/*!
Element roles relevant to text navigation.

Platform role strings are mapped in `platform/macos/mapping.rs`.
*/

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Semantic role of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
  // === Structural ===
  Application,
  Window,
  Group,
  Toolbar,
  ScrollArea,
  /// Browser document (`AXWebArea`). Navigated with text markers.
  WebArea,

  // === Text ===
  StaticText,
  TextField,
  TextArea,
  Heading,
  Link,

  // === Controls ===
  Button,
  Checkbox,
  RadioButton,
  Image,

  #[default]
  Unknown,
}

impl Role {
  /// Roles whose value is text that can be echoed while navigating.
  ///
  /// # Example
  ///
  /// ```
  /// use axtext::a11y::Role;
  ///
  /// assert!(Role::TextArea.is_text());
  /// assert!(!Role::WebArea.is_text());
  /// ```
  pub const fn is_text(&self) -> bool {
    matches!(self, Self::StaticText | Self::TextField | Self::TextArea)
  }

  /// Roles whose selection is reported with text markers rather than
  /// integer ranges.
  pub const fn uses_text_markers(&self) -> bool {
    matches!(self, Self::WebArea)
  }
}
