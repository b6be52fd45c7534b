/*!
`Element` backed by a live `AXUIElement`.
*/

use std::ops::Range;
use std::sync::Arc;

use super::handles::{
  marker_array, marker_range_from, number, range_from, range_value, ranges_from, string_from,
  usize_from, ElementHandle,
};
use super::mapping::role_from_macos;
use crate::a11y::Role;
use crate::element::{Element, ElementRef};
use crate::marker::{TextMarker, TextMarkerRange};
use crate::types::{Bounds, ElementError, ElementResult, ProcessId};

/// Attribute names used by [`SystemElement`].
mod ax_attribute {
  pub(super) const ROLE: &str = "AXRole";
  pub(super) const ROLE_DESCRIPTION: &str = "AXRoleDescription";
  pub(super) const SUBROLE: &str = "AXSubrole";
  pub(super) const TITLE: &str = "AXTitle";
  pub(super) const DESCRIPTION: &str = "AXDescription";
  pub(super) const VALUE: &str = "AXValue";
  pub(super) const NUMBER_OF_CHARACTERS: &str = "AXNumberOfCharacters";
  pub(super) const SELECTED_TEXT_RANGES: &str = "AXSelectedTextRanges";
  pub(super) const SELECTED_TEXT_RANGE: &str = "AXSelectedTextRange";
  pub(super) const SELECTED_TEXT_MARKER_RANGE: &str = "AXSelectedTextMarkerRange";
  pub(super) const START_TEXT_MARKER: &str = "AXStartTextMarker";
  pub(super) const END_TEXT_MARKER: &str = "AXEndTextMarker";
  pub(super) const CARET_BROWSING_ENABLED: &str = "AXCaretBrowsingEnabled";
  pub(super) const ENHANCED_USER_INTERFACE: &str = "AXEnhancedUserInterface";
  pub(super) const FOCUSED: &str = "AXFocused";
}

/// Parameterized attribute names used by [`SystemElement`].
mod ax_parameterized {
  pub(super) const STRING_FOR_RANGE: &str = "AXStringForRange";
  pub(super) const STRING_FOR_TEXT_MARKER_RANGE: &str = "AXStringForTextMarkerRange";
  pub(super) const TEXT_MARKER_RANGE_FOR_UNORDERED_TEXT_MARKERS: &str =
    "AXTextMarkerRangeForUnorderedTextMarkers";
  pub(super) const LINE_FOR_INDEX: &str = "AXLineForIndex";
  pub(super) const RANGE_FOR_LINE: &str = "AXRangeForLine";
  pub(super) const LINE_FOR_TEXT_MARKER: &str = "AXLineForTextMarker";
  pub(super) const TEXT_MARKER_RANGE_FOR_LINE: &str = "AXTextMarkerRangeForLine";
}

/// Accessibility element of another process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SystemElement {
  handle: ElementHandle,
}

impl SystemElement {
  pub(super) const fn new(handle: ElementHandle) -> Self {
    Self { handle }
  }

  /// Application element for `pid`.
  pub fn application_for(pid: ProcessId) -> Self {
    Self::new(ElementHandle::application(pid.0))
  }

  /// Element that currently has keyboard focus in the application.
  pub fn focused_element(&self) -> ElementResult<Self> {
    self.handle.element("AXFocusedUIElement").map(Self::new)
  }

  pub(super) const fn handle(&self) -> &ElementHandle {
    &self.handle
  }
}

impl Element for SystemElement {
  fn process_id(&self) -> ProcessId {
    ProcessId(self.handle.pid())
  }

  fn role(&self) -> ElementResult<Role> {
    self
      .handle
      .string(ax_attribute::ROLE)
      .map(|role| role_from_macos(&role))
  }

  fn role_description(&self) -> ElementResult<String> {
    self.handle.string(ax_attribute::ROLE_DESCRIPTION)
  }

  fn subrole(&self) -> ElementResult<String> {
    self.handle.string(ax_attribute::SUBROLE)
  }

  fn title(&self) -> ElementResult<String> {
    self.handle.string(ax_attribute::TITLE)
  }

  fn description(&self) -> ElementResult<String> {
    self.handle.string(ax_attribute::DESCRIPTION)
  }

  fn value(&self) -> ElementResult<String> {
    self.handle.string(ax_attribute::VALUE)
  }

  fn number_of_characters(&self) -> ElementResult<usize> {
    self.handle.integer(ax_attribute::NUMBER_OF_CHARACTERS)
  }

  fn string_for_range(&self, range: Range<usize>) -> ElementResult<String> {
    let parameter = range_value(range)?;
    let value = self
      .handle
      .parameterized(ax_parameterized::STRING_FOR_RANGE, &parameter)?;
    string_from(&value)
  }

  fn string_for_marker_range(&self, range: &TextMarkerRange) -> ElementResult<String> {
    let value = self.handle.parameterized(
      ax_parameterized::STRING_FOR_TEXT_MARKER_RANGE,
      range.inner().as_cf(),
    )?;
    string_from(&value)
  }

  fn selected_text_ranges(&self) -> ElementResult<Vec<Range<usize>>> {
    match self.handle.attribute(ax_attribute::SELECTED_TEXT_RANGES) {
      Ok(value) => ranges_from(value),
      Err(ElementError::AttributeUnsupported) => {
        let value = self.handle.attribute(ax_attribute::SELECTED_TEXT_RANGE)?;
        Ok(vec![range_from(&value)?])
      }
      Err(err) => Err(err),
    }
  }

  fn selected_text_marker_ranges(&self) -> ElementResult<Vec<TextMarkerRange>> {
    self
      .handle
      .marker_range(ax_attribute::SELECTED_TEXT_MARKER_RANGE)
      .map(|range| vec![range])
  }

  /// Web areas hold a single selection; only the first range is applied.
  fn set_selected_text_marker_ranges(&self, ranges: &[TextMarkerRange]) -> ElementResult<()> {
    let range = ranges.first().ok_or(ElementError::IllegalArgument)?;
    self
      .handle
      .set_attribute(ax_attribute::SELECTED_TEXT_MARKER_RANGE, range.inner().as_cf())
  }

  fn marker_range_for_unordered_markers(
    &self,
    first: &TextMarker,
    second: &TextMarker,
  ) -> ElementResult<TextMarkerRange> {
    let parameter = marker_array(&[first, second]);
    let value = self.handle.parameterized(
      ax_parameterized::TEXT_MARKER_RANGE_FOR_UNORDERED_TEXT_MARKERS,
      &parameter,
    )?;
    marker_range_from(value)
  }

  fn line_for_index(&self, index: usize) -> ElementResult<usize> {
    let value = self
      .handle
      .parameterized(ax_parameterized::LINE_FOR_INDEX, &number(index))?;
    usize_from(&value)
  }

  fn range_for_line(&self, line: usize) -> ElementResult<Range<usize>> {
    let value = self
      .handle
      .parameterized(ax_parameterized::RANGE_FOR_LINE, &number(line))?;
    range_from(&value)
  }

  fn line_for_marker(&self, marker: &TextMarker) -> ElementResult<usize> {
    let value = self
      .handle
      .parameterized(ax_parameterized::LINE_FOR_TEXT_MARKER, marker.inner().as_cf())?;
    usize_from(&value)
  }

  fn marker_range_for_line(&self, line: usize) -> ElementResult<TextMarkerRange> {
    let value = self
      .handle
      .parameterized(ax_parameterized::TEXT_MARKER_RANGE_FOR_LINE, &number(line))?;
    marker_range_from(value)
  }

  fn start_text_marker(&self) -> ElementResult<TextMarker> {
    self.handle.marker(ax_attribute::START_TEXT_MARKER)
  }

  fn end_text_marker(&self) -> ElementResult<TextMarker> {
    self.handle.marker(ax_attribute::END_TEXT_MARKER)
  }

  fn caret_browsing_enabled(&self) -> ElementResult<bool> {
    self.handle.boolean(ax_attribute::CARET_BROWSING_ENABLED)
  }

  fn set_caret_browsing_enabled(&self, enabled: bool) -> ElementResult<()> {
    self
      .handle
      .set_boolean(ax_attribute::CARET_BROWSING_ENABLED, enabled)
  }

  fn enhanced_user_interface(&self) -> ElementResult<bool> {
    self.handle.boolean(ax_attribute::ENHANCED_USER_INTERFACE)
  }

  fn set_enhanced_user_interface(&self, enabled: bool) -> ElementResult<()> {
    self
      .handle
      .set_boolean(ax_attribute::ENHANCED_USER_INTERFACE, enabled)
  }

  fn is_keyboard_focused(&self) -> ElementResult<bool> {
    self.handle.boolean(ax_attribute::FOCUSED)
  }

  fn frame(&self) -> ElementResult<Bounds> {
    self.handle.bounds()
  }

  fn application(&self) -> ElementResult<ElementRef> {
    let pid = self.handle.pid();
    if pid == 0 {
      return Err(ElementError::InvalidUiElement);
    }
    Ok(Arc::new(Self::application_for(ProcessId(pid))))
  }
}
