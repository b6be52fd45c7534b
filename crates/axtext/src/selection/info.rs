/*!
User info attached to `AXSelectedTextChanged`.

WebKit posts a rich dictionary describing what kind of change happened;
Chromium posts a partial one; `NSTextView` posts none. Values are decoded from
the platform dictionary into [`InfoValue`]s keyed by the platform key.
*/

use std::collections::HashMap;

use crate::element::ElementRef;
use crate::marker::TextMarkerRange;

/// Platform dictionary keys.
pub mod keys {
  pub const STATE_CHANGE_TYPE: &str = "AXTextStateChangeType";
  pub const EDIT_TYPE: &str = "AXTextEditType";
  pub const SELECTION_DIRECTION: &str = "AXTextSelectionDirection";
  pub const SELECTION_GRANULARITY: &str = "AXTextSelectionGranularity";
  pub const SELECTION_CHANGED_FOCUS: &str = "AXTextSelectionChangedFocus";
  pub const STATE_SYNC: &str = "AXTextStateSync";
  pub const CHANGE_ELEMENT: &str = "AXTextChangeElement";
  pub const SELECTED_TEXT_MARKER_RANGE: &str = "AXSelectedTextMarkerRange";

  /// Keys the macOS observer decodes. Anything else is dropped.
  pub const ALL: &[&str] = &[
    STATE_CHANGE_TYPE,
    EDIT_TYPE,
    SELECTION_DIRECTION,
    SELECTION_GRANULARITY,
    SELECTION_CHANGED_FOCUS,
    STATE_SYNC,
    CHANGE_ELEMENT,
    SELECTED_TEXT_MARKER_RANGE,
  ];
}

/// A decoded dictionary value.
#[derive(Debug, Clone)]
pub enum InfoValue {
  Integer(i64),
  Bool(bool),
  String(String),
  MarkerRange(TextMarkerRange),
  Element(ElementRef),
}

/// Notification user info. Empty when the notification carried none.
#[derive(Debug, Clone, Default)]
pub struct NotificationInfo {
  values: HashMap<String, InfoValue>,
}

impl NotificationInfo {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  #[must_use]
  pub fn with(mut self, key: impl Into<String>, value: InfoValue) -> Self {
    self.insert(key, value);
    self
  }

  pub fn insert(&mut self, key: impl Into<String>, value: InfoValue) {
    self.values.insert(key.into(), value);
  }

  pub fn get(&self, key: &str) -> Option<&InfoValue> {
    self.values.get(key)
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  /// Integer value. Booleans read as 0 or 1.
  pub fn integer(&self, key: &str) -> Option<i64> {
    match self.get(key)? {
      InfoValue::Integer(n) => Some(*n),
      InfoValue::Bool(b) => Some(i64::from(*b)),
      InfoValue::String(_) | InfoValue::MarkerRange(_) | InfoValue::Element(_) => None,
    }
  }

  /// Boolean value. Integers read as `n != 0`.
  pub fn bool(&self, key: &str) -> Option<bool> {
    match self.get(key)? {
      InfoValue::Bool(b) => Some(*b),
      InfoValue::Integer(n) => Some(*n != 0),
      InfoValue::String(_) | InfoValue::MarkerRange(_) | InfoValue::Element(_) => None,
    }
  }

  pub fn marker_range(&self, key: &str) -> Option<&TextMarkerRange> {
    match self.get(key)? {
      InfoValue::MarkerRange(range) => Some(range),
      _ => None,
    }
  }

  pub fn element(&self, key: &str) -> Option<&ElementRef> {
    match self.get(key)? {
      InfoValue::Element(element) => Some(element),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_and_booleans_interconvert() {
    let info = NotificationInfo::new()
      .with(keys::STATE_SYNC, InfoValue::Integer(1))
      .with(keys::SELECTION_CHANGED_FOCUS, InfoValue::Bool(true));
    assert_eq!(info.bool(keys::STATE_SYNC), Some(true));
    assert_eq!(info.integer(keys::SELECTION_CHANGED_FOCUS), Some(1));
    assert_eq!(info.len(), 2);
  }

  #[test]
  fn mismatched_kinds_read_as_missing() {
    let info = NotificationInfo::new().with(keys::EDIT_TYPE, InfoValue::String("typing".into()));
    assert_eq!(info.integer(keys::EDIT_TYPE), None);
    assert!(info.marker_range(keys::EDIT_TYPE).is_none());
    assert!(info.element(keys::CHANGE_ELEMENT).is_none());
  }
}
