/*!
Element abstraction.

[`Element`] is the text-facing slice of an accessibility element: the
attributes and parameterized attributes that text navigation needs. Every
attribute has a default that fails with [`ElementError::NotImplemented`], so
an implementation only supplies what its platform (or test double) supports.
*/

use std::any::Any;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::a11y::Role;
use crate::marker::{TextMarker, TextMarkerRange};
use crate::types::{Bounds, ElementError, ElementResult, ProcessId};

/// Shared, type-erased element.
pub type ElementRef = Arc<dyn Element>;

/// Lets platform code recover its concrete element type.
#[doc(hidden)]
pub trait AsAny: Any {
  fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

/// An accessibility element that may contain text.
pub trait Element: AsAny + Send + Sync + fmt::Debug {
  /// Process that owns the element.
  fn process_id(&self) -> ProcessId;

  /// Semantic role.
  fn role(&self) -> ElementResult<Role> {
    Err(ElementError::NotImplemented)
  }

  /// Localized description of the role.
  fn role_description(&self) -> ElementResult<String> {
    Err(ElementError::NotImplemented)
  }

  /// Platform subrole string.
  fn subrole(&self) -> ElementResult<String> {
    Err(ElementError::NotImplemented)
  }

  fn title(&self) -> ElementResult<String> {
    Err(ElementError::NotImplemented)
  }

  fn description(&self) -> ElementResult<String> {
    Err(ElementError::NotImplemented)
  }

  /// Value rendered as a string.
  fn value(&self) -> ElementResult<String> {
    Err(ElementError::NotImplemented)
  }

  fn number_of_characters(&self) -> ElementResult<usize> {
    Err(ElementError::NotImplemented)
  }

  /// Text for a range of character offsets.
  fn string_for_range(&self, range: Range<usize>) -> ElementResult<String> {
    let _ = range;
    Err(ElementError::NotImplemented)
  }

  /// Text between two markers.
  fn string_for_marker_range(&self, range: &TextMarkerRange) -> ElementResult<String> {
    let _ = range;
    Err(ElementError::NotImplemented)
  }

  /// Selected ranges as character offsets. Most elements report one.
  fn selected_text_ranges(&self) -> ElementResult<Vec<Range<usize>>> {
    Err(ElementError::NotImplemented)
  }

  /// Selected ranges as text markers.
  fn selected_text_marker_ranges(&self) -> ElementResult<Vec<TextMarkerRange>> {
    Err(ElementError::NotImplemented)
  }

  fn set_selected_text_marker_ranges(&self, ranges: &[TextMarkerRange]) -> ElementResult<()> {
    let _ = ranges;
    Err(ElementError::NotImplemented)
  }

  /// Range covering two markers, ordered by the owning application.
  ///
  /// This is the only way to order markers: their bytes carry no ordering
  /// that is meaningful outside the application.
  fn marker_range_for_unordered_markers(
    &self,
    first: &TextMarker,
    second: &TextMarker,
  ) -> ElementResult<TextMarkerRange> {
    let _ = (first, second);
    Err(ElementError::NotImplemented)
  }

  fn line_for_index(&self, index: usize) -> ElementResult<usize> {
    let _ = index;
    Err(ElementError::NotImplemented)
  }

  fn range_for_line(&self, line: usize) -> ElementResult<Range<usize>> {
    let _ = line;
    Err(ElementError::NotImplemented)
  }

  fn line_for_marker(&self, marker: &TextMarker) -> ElementResult<usize> {
    let _ = marker;
    Err(ElementError::NotImplemented)
  }

  fn marker_range_for_line(&self, line: usize) -> ElementResult<TextMarkerRange> {
    let _ = line;
    Err(ElementError::NotImplemented)
  }

  /// First marker in the element's text.
  fn start_text_marker(&self) -> ElementResult<TextMarker> {
    Err(ElementError::NotImplemented)
  }

  /// Last marker in the element's text.
  fn end_text_marker(&self) -> ElementResult<TextMarker> {
    Err(ElementError::NotImplemented)
  }

  /// Caret browsing preference of a web area.
  ///
  /// When enabled, arrow keys move a document-style caret. Only WebKit web
  /// areas answer this, which makes it a cheap engine probe.
  fn caret_browsing_enabled(&self) -> ElementResult<bool> {
    Err(ElementError::NotImplemented)
  }

  fn set_caret_browsing_enabled(&self, enabled: bool) -> ElementResult<()> {
    let _ = enabled;
    Err(ElementError::NotImplemented)
  }

  /// Whether the application exposes its enhanced accessibility tree.
  fn enhanced_user_interface(&self) -> ElementResult<bool> {
    Err(ElementError::NotImplemented)
  }

  fn set_enhanced_user_interface(&self, enabled: bool) -> ElementResult<()> {
    let _ = enabled;
    Err(ElementError::NotImplemented)
  }

  fn is_keyboard_focused(&self) -> ElementResult<bool> {
    Err(ElementError::NotImplemented)
  }

  /// Screen frame.
  fn frame(&self) -> ElementResult<Bounds> {
    Err(ElementError::NotImplemented)
  }

  /// Application element of the owning process.
  fn application(&self) -> ElementResult<ElementRef> {
    Err(ElementError::NotImplemented)
  }

  /// Static text, text fields and text areas.
  fn has_text_role(&self) -> bool {
    self.role().is_ok_and(|role| role.is_text())
  }
}

/// Whether two references point at the same element object.
#[cfg(any(test, feature = "mock"))]
pub(crate) fn same_element(a: &ElementRef, b: &ElementRef) -> bool {
  std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
