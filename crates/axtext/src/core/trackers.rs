/*!
Selection trackers: one `SelectionChangeHandler` per tracked element, wired
to the instance's substitutions and event channel.

Handlers are removed from the table before they are stopped, so no lock is
held while observers are torn down.
*/

use std::collections::HashMap;
use std::sync::Arc;

use super::{emit, AxText};
use crate::element::ElementRef;
use crate::marker::TextMarker;
use crate::output::{Job, OutputSink};
use crate::position::TextIndex;
use crate::selection::{SelectionChange, SelectionChangeHandler, SelectionIndex};
use crate::text::Substitutions;
use crate::types::{AxResult, Event, IndexKind, TrackerId, TrackerInfo};

enum TrackerHandler {
  Integer(SelectionChangeHandler<usize>),
  TextMarker(SelectionChangeHandler<TextMarker>),
}

impl TrackerHandler {
  fn element(&self) -> &ElementRef {
    match self {
      Self::Integer(h) => h.element(),
      Self::TextMarker(h) => h.element(),
    }
  }

  const fn kind(&self) -> IndexKind {
    match self {
      Self::Integer(_) => IndexKind::Integer,
      Self::TextMarker(_) => IndexKind::TextMarker,
    }
  }

  fn stop(&self) {
    match self {
      Self::Integer(h) => h.stop(),
      Self::TextMarker(h) => h.stop(),
    }
  }
}

#[derive(Default)]
pub(super) struct Trackers {
  next_id: u64,
  entries: HashMap<TrackerId, TrackerHandler>,
}

impl Trackers {
  fn allocate(&mut self) -> TrackerId {
    self.next_id += 1;
    TrackerId(self.next_id)
  }
}

impl AxText {
  /// Follow `element`'s selection in the index space its role reports:
  /// text markers for web areas, integer ranges otherwise (including when
  /// the role cannot be read).
  pub fn track(&self, element: ElementRef) -> AxResult<TrackerId> {
    if element.role().is_ok_and(|role| role.uses_text_markers()) {
      self.track_text_markers(element)
    } else {
      self.track_integer_indices(element)
    }
  }

  /// Follow `element`'s selection through `AXSelectedTextMarkerRange`.
  ///
  /// Elements without caret browsing are observed through their
  /// application. Caret moves are echoed as [`Event::Output`].
  pub fn track_text_markers(&self, element: ElementRef) -> AxResult<TrackerId> {
    self.start_tracker::<TextMarker>(element, TrackerHandler::TextMarker)
  }

  /// Follow `element`'s selection through `AXSelectedTextRanges`.
  pub fn track_integer_indices(&self, element: ElementRef) -> AxResult<TrackerId> {
    self.start_tracker::<usize>(element, TrackerHandler::Integer)
  }

  /// Stop a tracker. Returns false if it was not running.
  pub fn untrack(&self, tracker_id: TrackerId) -> bool {
    let Some(handler) = self.trackers.lock().entries.remove(&tracker_id) else {
      return false;
    };
    handler.stop();
    log::debug!("stopped tracker {tracker_id}");
    self.emit(Event::TrackerStopped { tracker_id });
    true
  }

  /// Live trackers, ordered by id.
  pub fn tracked(&self) -> Vec<TrackerInfo> {
    let mut infos: Vec<TrackerInfo> = self
      .trackers
      .lock()
      .entries
      .iter()
      .map(|(&tracker_id, handler)| TrackerInfo {
        tracker_id,
        process_id: handler.element().process_id(),
        index: handler.kind(),
      })
      .collect();
    infos.sort_by_key(|info| info.tracker_id);
    infos
  }

  fn start_tracker<I: SelectionIndex>(
    &self,
    element: ElementRef,
    wrap: fn(SelectionChangeHandler<I>) -> TrackerHandler,
  ) -> AxResult<TrackerId> {
    let tracker_id = self.trackers.lock().allocate();
    let process_id = element.process_id();

    let handler = SelectionChangeHandler::<I>::new(element, Arc::clone(&self.observer));
    handler.set_output(self.output_sink(tracker_id));
    let tx = self.events_tx.clone();
    handler.set_listener(Arc::new(move |change: &SelectionChange<I>| {
      emit(
        &tx,
        Event::SelectionChanged {
          tracker_id,
          change: change.summary(),
        },
      );
    }));
    handler.start()?;

    self.trackers.lock().entries.insert(tracker_id, wrap(handler));
    log::debug!("started tracker {tracker_id} for pid {process_id}");
    self.emit(Event::TrackerStarted {
      tracker_id,
      process_id,
      index: <I as TextIndex>::KIND,
    });
    Ok(tracker_id)
  }

  fn output_sink(&self, tracker_id: TrackerId) -> OutputSink {
    let tx = self.events_tx.clone();
    let substitutions = Arc::clone(&self.substitutions);
    Arc::new(move |job: Job| {
      let payloads = job
        .payloads
        .into_iter()
        .map(|payload| payload.map_speech(|text| substitutions.perform(text)))
        .collect();
      emit(
        &tx,
        Event::Output {
          tracker_id,
          payloads,
          interrupt: job.interrupt,
        },
      );
    })
  }
}
