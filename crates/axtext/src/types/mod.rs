/*! Core types for axtext.

Regenerate TypeScript types: `cargo test export_bindings`
*/

#![allow(missing_docs)]

mod error;
mod event;
mod geometry;
mod ids;

pub use error::{
  AccessibilityError, AxError, AxResult, ElementError, ElementResult, ObserverError,
  ObserverResult,
};
pub use event::{Event, IndexKind, SelectionSummary, TrackerInfo};
pub use geometry::Bounds;
pub use ids::{ProcessId, TrackerId};
