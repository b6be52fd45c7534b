/*!
In-memory element and observer doubles.

`MockElement` holds plain text. Its text markers are the big-endian `u64`
character offset, so marker ranges can be built and read back without an
application on the other end. `MockObserver` delivers notifications posted
with [`MockObserver::post`].
*/

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::a11y::{Notification, Role};
use crate::element::{same_element, Element, ElementRef};
use crate::marker::{TextMarker, TextMarkerRange};
use crate::observer::{ObserverCallback, ObserverProvider, Subscription};
use crate::selection::NotificationInfo;
use crate::types::{Bounds, ElementError, ElementResult, ObserverError, ObserverResult, ProcessId};

#[derive(Debug)]
struct MockState {
  selection: Option<Range<usize>>,
  caret_browsing: Option<bool>,
  enhanced_user_interface: bool,
  focused: bool,
}

/// Text element backed by a string.
#[derive(Debug)]
pub struct MockElement {
  process_id: ProcessId,
  role: Role,
  text: String,
  frame: Bounds,
  application: Option<ElementRef>,
  state: Mutex<MockState>,
}

impl MockElement {
  /// Text area with the caret at the start.
  pub fn new(process_id: u32, text: impl Into<String>) -> Self {
    Self {
      process_id: ProcessId(process_id),
      role: Role::TextArea,
      text: text.into(),
      frame: Bounds::default(),
      application: None,
      state: Mutex::new(MockState {
        selection: Some(0..0),
        caret_browsing: None,
        enhanced_user_interface: false,
        focused: false,
      }),
    }
  }

  #[must_use]
  pub fn with_role(mut self, role: Role) -> Self {
    self.role = role;
    self
  }

  /// Answer the caret browsing probe, like a WebKit web area.
  #[must_use]
  pub fn with_caret_browsing(self, enabled: bool) -> Self {
    self.state.lock().caret_browsing = Some(enabled);
    self
  }

  #[must_use]
  pub fn with_application(mut self, application: ElementRef) -> Self {
    self.application = Some(application);
    self
  }

  #[must_use]
  pub fn with_frame(mut self, frame: Bounds) -> Self {
    self.frame = frame;
    self
  }

  pub fn select(&self, range: Range<usize>) {
    self.state.lock().selection = Some(range);
  }

  pub fn clear_selection(&self) {
    self.state.lock().selection = None;
  }

  pub fn set_focused(&self, focused: bool) {
    self.state.lock().focused = focused;
  }

  /// Marker for a character offset.
  #[allow(clippy::missing_panics_doc)]
  pub fn marker(offset: usize) -> TextMarker {
    let bytes = u64::try_from(offset).unwrap_or(u64::MAX).to_be_bytes();
    match TextMarker::from_bytes(&bytes) {
      Ok(marker) => marker,
      Err(err) => unreachable!("eight bytes always make a marker: {err}"),
    }
  }

  /// Offset encoded in a marker minted by [`MockElement::marker`].
  pub fn marker_offset(marker: &TextMarker) -> Option<usize> {
    let bytes: [u8; 8] = marker.bytes().try_into().ok()?;
    usize::try_from(u64::from_be_bytes(bytes)).ok()
  }

  pub fn marker_range(&self, range: Range<usize>) -> TextMarkerRange {
    match TextMarkerRange::new(&Self::marker(range.start), &Self::marker(range.end)) {
      Ok(range) => range,
      Err(err) => unreachable!("mock markers always make a range: {err}"),
    }
  }

  fn char_count(&self) -> usize {
    self.text.chars().count()
  }

  fn offsets(range: &TextMarkerRange) -> ElementResult<Range<usize>> {
    let (start, end) = range.bounds().map_err(|_| ElementError::IllegalArgument)?;
    let start = Self::marker_offset(&start).ok_or(ElementError::IllegalArgument)?;
    let end = Self::marker_offset(&end).ok_or(ElementError::IllegalArgument)?;
    Ok(start..end)
  }

  /// Character range of each line, newline included.
  fn lines(&self) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, c) in self.text.chars().enumerate() {
      if c == '\n' {
        lines.push(start..i + 1);
        start = i + 1;
      }
    }
    lines.push(start..self.char_count());
    lines
  }
}

impl Element for MockElement {
  fn process_id(&self) -> ProcessId {
    self.process_id
  }

  fn role(&self) -> ElementResult<Role> {
    Ok(self.role)
  }

  fn value(&self) -> ElementResult<String> {
    Ok(self.text.clone())
  }

  fn number_of_characters(&self) -> ElementResult<usize> {
    Ok(self.char_count())
  }

  fn string_for_range(&self, range: Range<usize>) -> ElementResult<String> {
    if range.start > range.end || range.end > self.char_count() {
      return Err(ElementError::IllegalArgument);
    }
    Ok(
      self
        .text
        .chars()
        .skip(range.start)
        .take(range.end - range.start)
        .collect(),
    )
  }

  fn string_for_marker_range(&self, range: &TextMarkerRange) -> ElementResult<String> {
    self.string_for_range(Self::offsets(range)?)
  }

  fn selected_text_ranges(&self) -> ElementResult<Vec<Range<usize>>> {
    Ok(self.state.lock().selection.clone().into_iter().collect())
  }

  fn selected_text_marker_ranges(&self) -> ElementResult<Vec<TextMarkerRange>> {
    Ok(
      self
        .selected_text_ranges()?
        .into_iter()
        .map(|range| self.marker_range(range))
        .collect(),
    )
  }

  fn set_selected_text_marker_ranges(&self, ranges: &[TextMarkerRange]) -> ElementResult<()> {
    let first = ranges.first().map(Self::offsets).transpose()?;
    self.state.lock().selection = first;
    Ok(())
  }

  fn marker_range_for_unordered_markers(
    &self,
    first: &TextMarker,
    second: &TextMarker,
  ) -> ElementResult<TextMarkerRange> {
    let a = Self::marker_offset(first).ok_or(ElementError::IllegalArgument)?;
    let b = Self::marker_offset(second).ok_or(ElementError::IllegalArgument)?;
    Ok(self.marker_range(a.min(b)..a.max(b)))
  }

  fn line_for_index(&self, index: usize) -> ElementResult<usize> {
    let lines = self.lines();
    if index == self.char_count() {
      return Ok(lines.len() - 1);
    }
    lines
      .iter()
      .position(|line| line.contains(&index))
      .ok_or(ElementError::IllegalArgument)
  }

  fn range_for_line(&self, line: usize) -> ElementResult<Range<usize>> {
    self.lines().get(line).cloned().ok_or(ElementError::IllegalArgument)
  }

  fn line_for_marker(&self, marker: &TextMarker) -> ElementResult<usize> {
    self.line_for_index(Self::marker_offset(marker).ok_or(ElementError::IllegalArgument)?)
  }

  fn marker_range_for_line(&self, line: usize) -> ElementResult<TextMarkerRange> {
    Ok(self.marker_range(self.range_for_line(line)?))
  }

  fn start_text_marker(&self) -> ElementResult<TextMarker> {
    Ok(Self::marker(0))
  }

  fn end_text_marker(&self) -> ElementResult<TextMarker> {
    Ok(Self::marker(self.char_count()))
  }

  fn caret_browsing_enabled(&self) -> ElementResult<bool> {
    self.state.lock().caret_browsing.ok_or(ElementError::AttributeUnsupported)
  }

  fn set_caret_browsing_enabled(&self, enabled: bool) -> ElementResult<()> {
    let mut state = self.state.lock();
    if state.caret_browsing.is_none() {
      return Err(ElementError::AttributeUnsupported);
    }
    state.caret_browsing = Some(enabled);
    Ok(())
  }

  fn enhanced_user_interface(&self) -> ElementResult<bool> {
    Ok(self.state.lock().enhanced_user_interface)
  }

  fn set_enhanced_user_interface(&self, enabled: bool) -> ElementResult<()> {
    self.state.lock().enhanced_user_interface = enabled;
    Ok(())
  }

  fn is_keyboard_focused(&self) -> ElementResult<bool> {
    Ok(self.state.lock().focused)
  }

  fn frame(&self) -> ElementResult<Bounds> {
    Ok(self.frame)
  }

  fn application(&self) -> ElementResult<ElementRef> {
    self.application.clone().ok_or(ElementError::NoValue)
  }
}

struct Registration {
  element: ElementRef,
  notification: Notification,
  callback: ObserverCallback,
}

type Registrations = Arc<Mutex<HashMap<u64, Registration>>>;

/// Observer that delivers notifications posted by the test.
#[derive(Default)]
pub struct MockObserver {
  next_id: AtomicU64,
  registrations: Registrations,
  failure: Mutex<Option<ObserverError>>,
}

impl MockObserver {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every later `subscribe` fail with `error`.
  pub fn fail_with(&self, error: ObserverError) {
    *self.failure.lock() = Some(error);
  }

  /// Deliver `notification` from `element` to matching subscribers.
  pub fn post(&self, element: &ElementRef, notification: Notification, info: &NotificationInfo) {
    let callbacks: Vec<ObserverCallback> = self
      .registrations
      .lock()
      .values()
      .filter(|r| r.notification == notification && same_element(&r.element, element))
      .map(|r| Arc::clone(&r.callback))
      .collect();
    for callback in callbacks {
      callback(element, info);
    }
  }

  pub fn subscriber_count(&self) -> usize {
    self.registrations.lock().len()
  }

  pub fn subscriber_count_for(&self, element: &ElementRef) -> usize {
    self
      .registrations
      .lock()
      .values()
      .filter(|r| same_element(&r.element, element))
      .count()
  }
}

impl std::fmt::Debug for MockObserver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MockObserver")
      .field("subscribers", &self.subscriber_count())
      .finish_non_exhaustive()
  }
}

impl ObserverProvider for MockObserver {
  fn subscribe(
    &self,
    element: &ElementRef,
    notification: Notification,
    callback: ObserverCallback,
  ) -> ObserverResult<Subscription> {
    if let Some(error) = *self.failure.lock() {
      return Err(error);
    }
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    self.registrations.lock().insert(
      id,
      Registration {
        element: Arc::clone(element),
        notification,
        callback,
      },
    );
    let registrations = Arc::clone(&self.registrations);
    Ok(Subscription::new(notification, move || {
      registrations.lock().remove(&id);
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn markers_encode_offsets() {
    let marker = MockElement::marker(1234);
    assert_eq!(MockElement::marker_offset(&marker), Some(1234));
    assert_eq!(MockElement::marker_offset(&TextMarker::from_bytes(&[1]).unwrap()), None);
  }

  #[test]
  fn strings_are_character_based() {
    let el = MockElement::new(1, "héllo");
    assert_eq!(el.string_for_range(1..3).unwrap(), "él");
    assert_eq!(el.string_for_range(2..9), Err(ElementError::IllegalArgument));
    assert_eq!(el.number_of_characters().unwrap(), 5);
  }

  #[test]
  fn lines_include_their_newline() {
    let el = MockElement::new(1, "ab\ncd\n");
    assert_eq!(el.range_for_line(0).unwrap(), 0..3);
    assert_eq!(el.range_for_line(1).unwrap(), 3..6);
    assert_eq!(el.line_for_index(4).unwrap(), 1);
    assert_eq!(el.line_for_marker(&MockElement::marker(1)).unwrap(), 0);
    let range = el.marker_range_for_line(1).unwrap();
    assert_eq!(el.string_for_marker_range(&range).unwrap(), "cd\n");
  }

  #[test]
  fn setting_marker_selection_updates_ranges() {
    let el = MockElement::new(1, "abcdef");
    el.set_selected_text_marker_ranges(&[el.marker_range(2..5)]).unwrap();
    assert_eq!(el.selected_text_ranges().unwrap(), vec![2..5]);
  }

  #[test]
  fn focus_frame_and_enhanced_ui_are_settable() {
    let el = MockElement::new(1, "").with_frame(Bounds::new(1.0, 2.0, 30.0, 40.0));
    assert_eq!(el.frame().unwrap(), Bounds::new(1.0, 2.0, 30.0, 40.0));
    assert_eq!(el.is_keyboard_focused(), Ok(false));
    el.set_focused(true);
    assert_eq!(el.is_keyboard_focused(), Ok(true));
    el.set_enhanced_user_interface(true).unwrap();
    assert_eq!(el.enhanced_user_interface(), Ok(true));
  }

  #[test]
  fn caret_browsing_requires_web_area() {
    let el = MockElement::new(1, "");
    assert_eq!(el.caret_browsing_enabled(), Err(ElementError::AttributeUnsupported));
    let web = MockElement::new(1, "").with_role(Role::WebArea).with_caret_browsing(false);
    web.set_caret_browsing_enabled(true).unwrap();
    assert_eq!(web.caret_browsing_enabled(), Ok(true));
  }

  #[test]
  fn observer_routes_by_element_and_notification() {
    let observer = MockObserver::new();
    let a: ElementRef = Arc::new(MockElement::new(1, "a"));
    let b: ElementRef = Arc::new(MockElement::new(1, "b"));
    let hits = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&hits);
    let sub = observer
      .subscribe(
        &a,
        Notification::ValueChanged,
        Arc::new(move |_: &ElementRef, _: &NotificationInfo| {
          counter.fetch_add(1, Ordering::SeqCst);
        }),
      )
      .unwrap();
    observer.post(&a, Notification::ValueChanged, &NotificationInfo::new());
    observer.post(&b, Notification::ValueChanged, &NotificationInfo::new());
    observer.post(&a, Notification::TitleChanged, &NotificationInfo::new());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    drop(sub);
    assert_eq!(observer.subscriber_count(), 0);
  }

  #[test]
  fn failures_are_reported() {
    let observer = MockObserver::new();
    observer.fail_with(ObserverError::NotificationUnsupported);
    let el: ElementRef = Arc::new(MockElement::new(1, ""));
    let err = observer
      .subscribe(&el, Notification::Destroyed, Arc::new(|_: &ElementRef, _: &NotificationInfo| {}))
      .unwrap_err();
    assert_eq!(err, ObserverError::NotificationUnsupported);
  }
}
