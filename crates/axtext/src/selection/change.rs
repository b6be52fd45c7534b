/*!
Decoding selection changes.

Three sources, from richest to poorest:

1. WebKit: change type, edit type, direction and granularity in the user info.
2. Chromium: a change type of 0, decoded as a move. Direction and
   granularity are still required; when either is 0 only the changed element
   and selected range are kept.
3. No user info: the element's current selection, reported as a
   discontiguous move.

Integer-index elements never post rich info and always take path 3.
*/

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ts_rs::TS;

use super::info::{keys, NotificationInfo};
use crate::element::ElementRef;
use crate::marker::TextMarker;
use crate::position::{TextIndex, TextSpan};
use crate::types::{AxResult, ElementError, SelectionSummary};

/// Kind of text edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Edit {
  Delete,
  Insert,
  Typing,
  Dictation,
  Cut,
  Paste,
  /// Font, style, alignment or color changed.
  AttributesChange,
}

impl Edit {
  /// Map a raw `AXTextEditType`. 0 (unknown) and out-of-range values give `None`.
  pub const fn from_code(code: i64) -> Option<Self> {
    Some(match code {
      1 => Self::Delete,
      2 => Self::Insert,
      3 => Self::Typing,
      4 => Self::Dictation,
      5 => Self::Cut,
      6 => Self::Paste,
      7 => Self::AttributesChange,
      _ => return None,
    })
  }
}

/// Direction of a caret move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Direction {
  Beginning,
  End,
  Previous,
  Next,
  Discontiguous,
}

impl Direction {
  pub const fn from_code(code: i64) -> Option<Self> {
    Some(match code {
      1 => Self::Beginning,
      2 => Self::End,
      3 => Self::Previous,
      4 => Self::Next,
      5 => Self::Discontiguous,
      _ => return None,
    })
  }
}

/// Unit a caret move or selection extension stepped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Granularity {
  Character,
  Word,
  Line,
  Sentence,
  Paragraph,
  Page,
  Document,
  /// Whole document selected in one action.
  All,
}

impl Granularity {
  pub const fn from_code(code: i64) -> Option<Self> {
    Some(match code {
      1 => Self::Character,
      2 => Self::Word,
      3 => Self::Line,
      4 => Self::Sentence,
      5 => Self::Paragraph,
      6 => Self::Page,
      7 => Self::Document,
      8 => Self::All,
      _ => return None,
    })
  }
}

/// Details of a move, extension or boundary hit.
#[derive(Debug, Clone)]
pub struct Navigation<I> {
  /// Element whose text changed, when the application says.
  pub element: Option<ElementRef>,
  pub selection: Option<TextSpan<I>>,
  pub direction: Option<Direction>,
  pub granularity: Option<Granularity>,
  pub focus_changed: bool,
  pub sync: bool,
}

impl<I> Navigation<I> {
  /// Discontiguous move to `selection`, as reported without user info.
  pub fn discontiguous(element: ElementRef, selection: TextSpan<I>) -> Self {
    Self {
      element: Some(element),
      selection: Some(selection),
      direction: Some(Direction::Discontiguous),
      granularity: None,
      focus_changed: false,
      sync: false,
    }
  }
}

/// A decoded `AXSelectedTextChanged`.
#[derive(Debug, Clone)]
pub enum SelectionChange<I> {
  Edit(Edit),
  Move(Navigation<I>),
  Extend(Navigation<I>),
  Boundary(Navigation<I>),
}

impl<I> SelectionChange<I> {
  /// Handle-free summary for events.
  pub fn summary(&self) -> SelectionSummary {
    match self {
      Self::Edit(edit) => SelectionSummary::Edit { edit: *edit },
      Self::Move(nav) => SelectionSummary::Move {
        direction: nav.direction,
        granularity: nav.granularity,
      },
      Self::Extend(nav) => SelectionSummary::Extend {
        direction: nav.direction,
        granularity: nav.granularity,
      },
      Self::Boundary(nav) => SelectionSummary::Boundary {
        direction: nav.direction,
        granularity: nav.granularity,
      },
    }
  }
}

/// Index types that selection changes can be decoded for.
pub trait SelectionIndex: TextIndex {
  /// Decode a notification posted by `element`. `Ok(None)` when the info
  /// describes nothing usable.
  fn decode(info: &NotificationInfo, element: &ElementRef) -> AxResult<Option<SelectionChange<Self>>>;

  /// Element to observe for selection changes of `element`.
  fn observed_element(element: &ElementRef) -> AxResult<ElementRef>;
}

impl SelectionIndex for usize {
  fn decode(_info: &NotificationInfo, element: &ElementRef) -> AxResult<Option<SelectionChange<Self>>> {
    current_selection_move(element).map(Some)
  }

  fn observed_element(element: &ElementRef) -> AxResult<ElementRef> {
    Ok(Arc::clone(element))
  }
}

impl SelectionIndex for TextMarker {
  fn decode(info: &NotificationInfo, element: &ElementRef) -> AxResult<Option<SelectionChange<Self>>> {
    if info.is_empty() {
      return current_selection_move(element).map(Some);
    }
    Ok(decode_rich_change(info, element))
  }

  /// WebKit posts on the web area itself; Blink only posts on the
  /// application. Caret browsing only exists in WebKit.
  fn observed_element(element: &ElementRef) -> AxResult<ElementRef> {
    match element.caret_browsing_enabled() {
      Ok(_) => Ok(Arc::clone(element)),
      Err(err) => {
        log::debug!("caret browsing probe failed ({err}), observing application");
        Ok(element.application()?)
      }
    }
  }
}

/// First current selection as a discontiguous move.
fn current_selection_move<I: TextIndex>(element: &ElementRef) -> AxResult<SelectionChange<I>> {
  let selection = I::selections(element)?
    .into_iter()
    .next()
    .ok_or(ElementError::NoValue)?;
  Ok(SelectionChange::Move(Navigation::discontiguous(
    Arc::clone(element),
    selection,
  )))
}

/// Decode a rich (WebKit or Chromium) user info dictionary.
pub fn decode_rich_change(
  info: &NotificationInfo,
  element: &ElementRef,
) -> Option<SelectionChange<TextMarker>> {
  match info.integer(keys::STATE_CHANGE_TYPE)? {
    0 | 2 => decode_navigation(info, element).map(SelectionChange::Move),
    1 => info
      .integer(keys::EDIT_TYPE)
      .and_then(Edit::from_code)
      .map(SelectionChange::Edit),
    3 => decode_navigation(info, element).map(SelectionChange::Extend),
    4 => decode_navigation(info, element).map(SelectionChange::Boundary),
    _ => None,
  }
}

/// Navigation with direction and granularity. Unknown (0) values fall back
/// to [`partial_navigation`]; missing or out-of-range values give `None`.
fn decode_navigation(info: &NotificationInfo, element: &ElementRef) -> Option<Navigation<TextMarker>> {
  let direction_code = info.integer(keys::SELECTION_DIRECTION)?;
  let granularity_code = info.integer(keys::SELECTION_GRANULARITY)?;
  if !(0..=5).contains(&direction_code) || !(0..=8).contains(&granularity_code) {
    return None;
  }
  let (Some(direction), Some(granularity)) = (
    Direction::from_code(direction_code),
    Granularity::from_code(granularity_code),
  ) else {
    return Some(partial_navigation(info, element));
  };
  Some(Navigation {
    direction: Some(direction),
    granularity: Some(granularity),
    focus_changed: info.bool(keys::SELECTION_CHANGED_FOCUS).unwrap_or(false),
    sync: info.bool(keys::STATE_SYNC).unwrap_or(false),
    ..partial_navigation(info, element)
  })
}

/// Element and selection only, as Chromium reports them.
fn partial_navigation(info: &NotificationInfo, element: &ElementRef) -> Navigation<TextMarker> {
  let selection = info
    .marker_range(keys::SELECTED_TEXT_MARKER_RANGE)
    .and_then(|range| TextSpan::from_marker_range(range, Arc::clone(element)).ok());
  Navigation {
    element: info.element(keys::CHANGE_ELEMENT).cloned(),
    selection,
    direction: None,
    granularity: None,
    focus_changed: false,
    sync: false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mock::MockElement;
  use crate::selection::InfoValue;

  fn web_area(text: &str) -> (Arc<MockElement>, ElementRef) {
    let mock = Arc::new(MockElement::new(7, text));
    let element: ElementRef = Arc::clone(&mock) as ElementRef;
    (mock, element)
  }

  fn rich(change: i64, direction: i64, granularity: i64, element: &MockElement) -> NotificationInfo {
    NotificationInfo::new()
      .with(keys::STATE_CHANGE_TYPE, InfoValue::Integer(change))
      .with(keys::SELECTION_DIRECTION, InfoValue::Integer(direction))
      .with(keys::SELECTION_GRANULARITY, InfoValue::Integer(granularity))
      .with(keys::SELECTION_CHANGED_FOCUS, InfoValue::Bool(true))
      .with(
        keys::SELECTED_TEXT_MARKER_RANGE,
        InfoValue::MarkerRange(element.marker_range(3..3)),
      )
  }

  #[test]
  fn rich_move_carries_direction_and_granularity() {
    let (mock, element) = web_area("one two three");
    let change = decode_rich_change(&rich(2, 4, 2, &mock), &element).unwrap();
    let SelectionChange::Move(nav) = change else {
      panic!("expected move, got {change:?}");
    };
    assert_eq!(nav.direction, Some(Direction::Next));
    assert_eq!(nav.granularity, Some(Granularity::Word));
    assert!(nav.focus_changed);
    assert!(!nav.sync);
    let selection = nav.selection.unwrap();
    assert_eq!(MockElement::marker_offset(&selection.start.index), Some(3));
  }

  #[test]
  fn extend_and_boundary_keep_their_kind() {
    let (mock, element) = web_area("abc");
    assert!(matches!(
      decode_rich_change(&rich(3, 3, 1, &mock), &element),
      Some(SelectionChange::Extend(_))
    ));
    assert!(matches!(
      decode_rich_change(&rich(4, 1, 7, &mock), &element),
      Some(SelectionChange::Boundary(_))
    ));
  }

  #[test]
  fn unknown_change_type_decodes_as_move() {
    let (mock, element) = web_area("abc");
    let info = rich(0, 4, 2, &mock);
    let Some(SelectionChange::Move(nav)) = decode_rich_change(&info, &element) else {
      panic!("expected move");
    };
    assert_eq!(nav.direction, Some(Direction::Next));
    assert_eq!(nav.granularity, Some(Granularity::Word));
    assert!(nav.focus_changed);
    assert!(nav.selection.is_some());

    let partial = rich(0, 0, 2, &mock);
    let Some(SelectionChange::Move(nav)) = decode_rich_change(&partial, &element) else {
      panic!("expected move");
    };
    assert_eq!(nav.direction, None);
    assert!(!nav.focus_changed);
  }

  #[test]
  fn unknown_change_type_without_navigation_keys_is_nothing() {
    let (_, element) = web_area("abc");
    let info = NotificationInfo::new().with(keys::STATE_CHANGE_TYPE, InfoValue::Integer(0));
    assert!(decode_rich_change(&info, &element).is_none());
  }

  #[test]
  fn unknown_direction_or_granularity_is_partial_move() {
    let (mock, element) = web_area("abc");
    for info in [rich(2, 0, 2, &mock), rich(2, 4, 0, &mock)] {
      let Some(SelectionChange::Move(nav)) = decode_rich_change(&info, &element) else {
        panic!("expected move");
      };
      assert_eq!(nav.direction, None);
      assert_eq!(nav.granularity, None);
    }
  }

  #[test]
  fn out_of_range_values_decode_to_nothing() {
    let (mock, element) = web_area("abc");
    assert!(decode_rich_change(&rich(9, 4, 2, &mock), &element).is_none());
    assert!(decode_rich_change(&rich(2, 6, 2, &mock), &element).is_none());
    assert!(decode_rich_change(&rich(2, 4, 9, &mock), &element).is_none());
    let missing = NotificationInfo::new().with(keys::STATE_CHANGE_TYPE, InfoValue::Integer(2));
    assert!(decode_rich_change(&missing, &element).is_none());
  }

  #[test]
  fn edits_read_the_edit_type() {
    let (_, element) = web_area("abc");
    let info = NotificationInfo::new()
      .with(keys::STATE_CHANGE_TYPE, InfoValue::Integer(1))
      .with(keys::EDIT_TYPE, InfoValue::Integer(3));
    assert!(matches!(
      decode_rich_change(&info, &element),
      Some(SelectionChange::Edit(Edit::Typing))
    ));
    let unknown = NotificationInfo::new()
      .with(keys::STATE_CHANGE_TYPE, InfoValue::Integer(1))
      .with(keys::EDIT_TYPE, InfoValue::Integer(0));
    assert!(decode_rich_change(&unknown, &element).is_none());
  }

  #[test]
  fn missing_info_uses_current_selection() {
    let (mock, element) = web_area("hello");
    mock.select(1..4);
    let change = TextMarker::decode(&NotificationInfo::new(), &element).unwrap().unwrap();
    let SelectionChange::Move(nav) = change else {
      panic!("expected move");
    };
    assert_eq!(nav.direction, Some(Direction::Discontiguous));
    assert_eq!(nav.granularity, None);
    assert_eq!(nav.selection.unwrap().string().unwrap(), "ell");
  }

  #[test]
  fn no_selection_is_no_value() {
    let (mock, element) = web_area("hello");
    mock.clear_selection();
    let err = TextMarker::decode(&NotificationInfo::new(), &element).unwrap_err();
    assert!(matches!(err, crate::AxError::Element(ElementError::NoValue)));
    let err = usize::decode(&NotificationInfo::new(), &element).unwrap_err();
    assert!(matches!(err, crate::AxError::Element(ElementError::NoValue)));
  }

  #[test]
  fn integer_changes_ignore_info() {
    let (mock, element) = web_area("hello");
    mock.select(2..2);
    let info = NotificationInfo::new().with(keys::STATE_CHANGE_TYPE, InfoValue::Integer(1));
    let Some(SelectionChange::Move(nav)) = usize::decode(&info, &element).unwrap() else {
      panic!("expected move");
    };
    assert_eq!(nav.selection.unwrap().to_range(), 2..2);
  }

  #[test]
  fn caret_browsing_probe_picks_observed_element() {
    let app: ElementRef = Arc::new(MockElement::new(7, ""));
    let webkit: ElementRef = Arc::new(MockElement::new(7, "x").with_caret_browsing(false));
    let blink: ElementRef = Arc::new(MockElement::new(7, "x").with_application(Arc::clone(&app)));
    let observed = TextMarker::observed_element(&webkit).unwrap();
    assert!(crate::element::same_element(&observed, &webkit));
    let observed = TextMarker::observed_element(&blink).unwrap();
    assert!(crate::element::same_element(&observed, &app));
  }

  #[test]
  fn summary_drops_handles() {
    let change: SelectionChange<usize> = SelectionChange::Edit(Edit::Paste);
    assert_eq!(change.summary(), SelectionSummary::Edit { edit: Edit::Paste });
  }
}
