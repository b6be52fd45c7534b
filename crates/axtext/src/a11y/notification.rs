/*!
Element notifications that observers can subscribe to.
*/

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Notification posted by an element or application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Notification {
  /// Selected text or caret moved (`AXSelectedTextChanged`).
  SelectedTextChanged,
  /// Keyboard focus moved to another element.
  FocusedElementChanged,
  /// Element value changed.
  ValueChanged,
  /// Element title changed.
  TitleChanged,
  /// Element was destroyed.
  Destroyed,
  /// Layout of the element changed.
  LayoutChanged,
}

impl Notification {
  /// All notifications.
  pub const ALL: &'static [Self] = &[
    Self::SelectedTextChanged,
    Self::FocusedElementChanged,
    Self::ValueChanged,
    Self::TitleChanged,
    Self::Destroyed,
    Self::LayoutChanged,
  ];

  /// Notifications that carry a user info dictionary worth decoding.
  pub const fn carries_info(&self) -> bool {
    matches!(self, Self::SelectedTextChanged | Self::LayoutChanged)
  }
}
