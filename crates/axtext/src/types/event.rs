/*! Events broadcast by an `AxText` instance. */

use super::{ProcessId, TrackerId};
use crate::output::Payload;
use crate::selection::{Direction, Edit, Granularity};
use serde::Serialize;
use ts_rs::TS;

/// Which index space a tracker follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum IndexKind {
  /// Integer character offsets (`AXSelectedTextRanges`).
  Integer,
  /// Opaque text markers (`AXSelectedTextMarkerRange`).
  TextMarker,
}

/// A live tracker, as listed by `AxText::tracked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct TrackerInfo {
  pub tracker_id: TrackerId,
  pub process_id: ProcessId,
  pub index: IndexKind,
}

/// Summary of a decoded selection change, without the platform handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum SelectionSummary {
  Edit {
    edit: Edit,
  },
  Move {
    direction: Option<Direction>,
    granularity: Option<Granularity>,
  },
  Extend {
    direction: Option<Direction>,
    granularity: Option<Granularity>,
  },
  Boundary {
    direction: Option<Direction>,
    granularity: Option<Granularity>,
  },
}

/// Events emitted when tracked selections change.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "event", content = "data")]
#[ts(export)]
pub enum Event {
  #[serde(rename = "tracker:started")]
  TrackerStarted {
    tracker_id: TrackerId,
    process_id: ProcessId,
    index: IndexKind,
  },
  #[serde(rename = "tracker:stopped")]
  TrackerStopped { tracker_id: TrackerId },

  #[serde(rename = "selection:changed")]
  SelectionChanged {
    tracker_id: TrackerId,
    change: SelectionSummary,
  },

  /// Output produced by a tracker, after substitutions.
  #[serde(rename = "output")]
  Output {
    tracker_id: TrackerId,
    payloads: Vec<Payload>,
    interrupt: bool,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn events_are_tagged() {
    let event = Event::TrackerStopped {
      tracker_id: TrackerId(7),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "tracker:stopped");
    assert_eq!(json["data"]["tracker_id"], 7);
  }

  #[test]
  fn selection_summary_is_tagged_by_kind() {
    let event = Event::SelectionChanged {
      tracker_id: TrackerId(1),
      change: SelectionSummary::Move {
        direction: Some(Direction::Next),
        granularity: Some(Granularity::Word),
      },
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["data"]["change"]["kind"], "move");
    assert_eq!(json["data"]["change"]["direction"], "next");
    assert_eq!(json["data"]["change"]["granularity"], "word");
  }
}
