/*!
Selection change handler.

Follows one element's selection and echoes the text a caret move traversed.
The handler keeps the previous selection; on each move it speaks the text
between the previous and new selection starts.
*/

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use super::change::{Direction, Granularity, Navigation, SelectionChange, SelectionIndex};
use super::info::NotificationInfo;
use crate::a11y::Notification;
use crate::element::ElementRef;
use crate::observer::{ObserverCallback, ObserverProvider, Subscription};
use crate::output::{Job, OutputSink, Payload};
use crate::position::TextSpan;
use crate::types::AxResult;

/// Receives every decoded change, before it is handled.
pub type ChangeListener<I> = Arc<dyn Fn(&SelectionChange<I>) + Send + Sync>;

struct State<I> {
  previous: Option<TextSpan<I>>,
  subscription: Option<Subscription>,
}

struct Inner<I> {
  element: ElementRef,
  observer: Arc<dyn ObserverProvider>,
  state: Mutex<State<I>>,
  output: Mutex<Option<OutputSink>>,
  listener: Mutex<Option<ChangeListener<I>>>,
}

/// Tracks selection changes of one element. Clone is cheap and shares state.
pub struct SelectionChangeHandler<I> {
  inner: Arc<Inner<I>>,
}

impl<I> Clone for SelectionChangeHandler<I> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<I> std::fmt::Debug for SelectionChangeHandler<I> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SelectionChangeHandler")
      .field("element", &self.inner.element)
      .field("started", &self.inner.state.lock().subscription.is_some())
      .finish_non_exhaustive()
  }
}

impl<I: SelectionIndex> SelectionChangeHandler<I> {
  pub fn new(element: ElementRef, observer: Arc<dyn ObserverProvider>) -> Self {
    Self {
      inner: Arc::new(Inner {
        element,
        observer,
        state: Mutex::new(State {
          previous: None,
          subscription: None,
        }),
        output: Mutex::new(None),
        listener: Mutex::new(None),
      }),
    }
  }

  pub fn element(&self) -> &ElementRef {
    &self.inner.element
  }

  pub fn set_output(&self, sink: OutputSink) {
    *self.inner.output.lock() = Some(sink);
  }

  pub fn set_listener(&self, listener: ChangeListener<I>) {
    *self.inner.listener.lock() = Some(listener);
  }

  pub fn is_started(&self) -> bool {
    self.inner.state.lock().subscription.is_some()
  }

  pub fn previous_selection(&self) -> Option<TextSpan<I>> {
    self.inner.state.lock().previous.clone()
  }

  /// Subscribe to `SelectedTextChanged`. Starting twice is a no-op.
  pub fn start(&self) -> AxResult<()> {
    if self.is_started() {
      return Ok(());
    }
    let target = I::observed_element(&self.inner.element)?;
    let weak: Weak<Inner<I>> = Arc::downgrade(&self.inner);
    let callback: ObserverCallback = Arc::new(move |element: &ElementRef, info: &NotificationInfo| {
      let Some(inner) = weak.upgrade() else {
        return;
      };
      match I::decode(info, element) {
        Ok(Some(change)) => Self { inner }.handle(&change),
        Ok(None) => log::debug!("selection change carried nothing usable"),
        Err(err) => log::debug!("failed to decode selection change: {err}"),
      }
    });
    let subscription =
      self
        .inner
        .observer
        .subscribe(&target, Notification::SelectedTextChanged, callback)?;

    let mut state = self.inner.state.lock();
    if state.subscription.is_none() {
      state.subscription = Some(subscription);
    }
    Ok(())
  }

  /// Drop the subscription. The previous selection is kept.
  pub fn stop(&self) {
    let subscription = self.inner.state.lock().subscription.take();
    drop(subscription);
  }

  /// React to a decoded change. Only moves are echoed.
  pub fn handle(&self, change: &SelectionChange<I>) {
    let listener = self.inner.listener.lock().clone();
    if let Some(listener) = listener {
      listener(change);
    }
    match change {
      SelectionChange::Move(navigation) => self.handle_move(navigation),
      SelectionChange::Edit(_) | SelectionChange::Extend(_) | SelectionChange::Boundary(_) => {}
    }
  }

  /// Echo the text between the previous selection and the new one.
  ///
  /// The first selection seen is only recorded. Moves without a selection
  /// or to the same selection are ignored.
  pub fn handle_move(&self, navigation: &Navigation<I>) {
    let previous = {
      let mut state = self.inner.state.lock();
      let Some(previous) = state.previous.clone() else {
        state.previous.clone_from(&navigation.selection);
        return;
      };
      previous
    };
    let Some(selection) = navigation.selection.clone() else {
      return;
    };
    if previous == selection {
      return;
    }

    let range = match (navigation.direction, navigation.granularity) {
      (Some(direction), Some(granularity)) => {
        self.range_for_move(&previous, &selection, direction, granularity)
      }
      _ => TextSpan::from_unordered(&previous.start, &selection.start),
    };
    match range {
      Ok(range) => self.echo(&range),
      Err(err) => log::debug!("no range for move: {err}"),
    }

    self.inner.state.lock().previous = Some(selection);
  }

  /// Span to speak for a move with known direction and granularity.
  #[allow(clippy::unused_self)]
  pub fn range_for_move(
    &self,
    previous: &TextSpan<I>,
    selection: &TextSpan<I>,
    _direction: Direction,
    _granularity: Granularity,
  ) -> AxResult<TextSpan<I>> {
    TextSpan::from_unordered(&previous.start, &selection.start)
  }

  /// Speak the text of `range`. Failures are logged and dropped.
  pub fn echo(&self, range: &TextSpan<I>) {
    let text = match range.string() {
      Ok(text) => text,
      Err(err) => {
        log::debug!("echo failed for {range:?}: {err}");
        return;
      }
    };
    let sink = self.inner.output.lock().clone();
    if let Some(sink) = sink {
      sink(Job::new(vec![Payload::speech(text)]));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::marker::TextMarker;
  use crate::mock::{MockElement, MockObserver};
  use crate::selection::{keys, Edit, InfoValue};
  use crate::types::ElementError;

  struct Fixture {
    mock: Arc<MockElement>,
    element: ElementRef,
    observer: Arc<MockObserver>,
    spoken: Arc<Mutex<Vec<String>>>,
  }

  fn fixture(text: &str) -> Fixture {
    let mock = Arc::new(MockElement::new(42, text).with_caret_browsing(false));
    Fixture {
      element: Arc::clone(&mock) as ElementRef,
      mock,
      observer: Arc::new(MockObserver::new()),
      spoken: Arc::new(Mutex::new(Vec::new())),
    }
  }

  fn handler<I: SelectionIndex>(fx: &Fixture) -> SelectionChangeHandler<I> {
    let handler = SelectionChangeHandler::new(Arc::clone(&fx.element), Arc::clone(&fx.observer) as _);
    let spoken = Arc::clone(&fx.spoken);
    handler.set_output(Arc::new(move |job: Job| {
      for payload in job.payloads {
        if let Payload::Speech(text, _) = payload {
          spoken.lock().push(text);
        }
      }
    }));
    handler
  }

  fn caret_at(fx: &Fixture, offset: usize) {
    fx.mock.select(offset..offset);
    fx.observer.post(&fx.element, Notification::SelectedTextChanged, &NotificationInfo::new());
  }

  #[test]
  fn first_selection_is_recorded_silently() {
    let fx = fixture("hello world");
    let h = handler::<usize>(&fx);
    h.start().unwrap();
    caret_at(&fx, 3);
    assert!(fx.spoken.lock().is_empty());
    assert_eq!(h.previous_selection().unwrap().to_range(), 3..3);
  }

  #[test]
  fn caret_moves_echo_traversed_text() {
    let fx = fixture("hello world");
    let h = handler::<usize>(&fx);
    h.start().unwrap();
    caret_at(&fx, 0);
    caret_at(&fx, 5);
    caret_at(&fx, 2);
    assert_eq!(*fx.spoken.lock(), vec!["hello".to_string(), "llo".to_string()]);
  }

  #[test]
  fn unchanged_selection_is_ignored() {
    let fx = fixture("hello");
    let h = handler::<usize>(&fx);
    h.start().unwrap();
    caret_at(&fx, 1);
    caret_at(&fx, 1);
    assert!(fx.spoken.lock().is_empty());
  }

  #[test]
  fn marker_moves_echo_through_element() {
    let fx = fixture("one two three");
    let h = handler::<TextMarker>(&fx);
    h.start().unwrap();
    let post = |offset: usize, direction: i64, granularity: i64| {
      let info = NotificationInfo::new()
        .with(keys::STATE_CHANGE_TYPE, InfoValue::Integer(2))
        .with(keys::SELECTION_DIRECTION, InfoValue::Integer(direction))
        .with(keys::SELECTION_GRANULARITY, InfoValue::Integer(granularity))
        .with(
          keys::SELECTED_TEXT_MARKER_RANGE,
          InfoValue::MarkerRange(fx.mock.marker_range(offset..offset)),
        );
      fx.observer.post(&fx.element, Notification::SelectedTextChanged, &info);
    };
    post(0, 5, 0);
    post(4, 4, 2);
    post(8, 0, 0);
    assert_eq!(*fx.spoken.lock(), vec!["one ".to_string(), "two ".to_string()]);
  }

  #[test]
  fn edits_and_extensions_are_not_echoed() {
    let fx = fixture("abc");
    let h = handler::<usize>(&fx);
    h.handle(&SelectionChange::Edit(Edit::Typing));
    let span = TextSpan::from_range(0..2, Arc::clone(&fx.element));
    let nav = Navigation::discontiguous(Arc::clone(&fx.element), span);
    h.handle(&SelectionChange::Extend(nav));
    assert!(h.previous_selection().is_none());
    assert!(fx.spoken.lock().is_empty());
  }

  #[test]
  fn failed_echo_still_updates_previous() {
    let fx = fixture("abc");
    let h = handler::<usize>(&fx);
    let to = |range: std::ops::Range<usize>| {
      Navigation::discontiguous(Arc::clone(&fx.element), TextSpan::from_range(range, Arc::clone(&fx.element)))
    };
    h.handle_move(&to(0..0));
    h.handle_move(&to(40..40));
    assert!(fx.spoken.lock().is_empty());
    assert_eq!(h.previous_selection().unwrap().to_range(), 40..40);
  }

  #[test]
  fn start_twice_subscribes_once_and_stop_unsubscribes() {
    let fx = fixture("abc");
    let h = handler::<usize>(&fx);
    h.start().unwrap();
    h.start().unwrap();
    assert_eq!(fx.observer.subscriber_count(), 1);
    h.stop();
    assert!(!h.is_started());
    assert_eq!(fx.observer.subscriber_count(), 0);
  }

  #[test]
  fn marker_handler_falls_back_to_application() {
    let app: ElementRef = Arc::new(MockElement::new(42, ""));
    let mock = Arc::new(MockElement::new(42, "text").with_application(Arc::clone(&app)));
    let observer = Arc::new(MockObserver::new());
    let h = SelectionChangeHandler::<TextMarker>::new(mock as ElementRef, Arc::clone(&observer) as _);
    h.start().unwrap();
    assert_eq!(observer.subscriber_count_for(&app), 1);
  }

  #[test]
  fn marker_handler_start_fails_without_application() {
    let fx = fixture("text");
    let bare: ElementRef = Arc::new(MockElement::new(1, "text"));
    let h = SelectionChangeHandler::<TextMarker>::new(bare, Arc::clone(&fx.observer) as _);
    let err = h.start().unwrap_err();
    assert!(matches!(err, crate::AxError::Element(ElementError::NoValue)));
    assert!(!h.is_started());
  }

  #[test]
  fn dropped_handler_ignores_late_notifications() {
    let fx = fixture("abc");
    {
      let h = handler::<usize>(&fx);
      h.start().unwrap();
      caret_at(&fx, 0);
    }
    caret_at(&fx, 2);
    assert!(fx.spoken.lock().is_empty());
  }
}
