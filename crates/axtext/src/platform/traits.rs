/*!
Platform abstraction traits.

These traits define the contract between the marker types and platform
implementations. Platform code (macOS FFI, the portable in-memory backend)
implements them; the rest of the crate only sees `TextMarker` and
`TextMarkerRange`.
*/

use std::fmt::Debug;

use crate::marker::CfTypeId;

/// Construction and decomposition of text markers.
///
/// Handles are reference counted; `Clone` is cheap. Every constructor returns
/// `None` when the underlying framework returns null.
pub(crate) trait MarkerBackend {
  /// Marker handle.
  type Marker: Clone + Debug + Send + Sync + 'static;
  /// Marker range handle.
  type MarkerRange: Clone + Debug + Send + Sync + 'static;

  /// Create a marker from raw bytes.
  fn create_marker(bytes: &[u8]) -> Option<Self::Marker>;

  /// Copy the raw bytes out of a marker.
  fn marker_bytes(marker: &Self::Marker) -> Vec<u8>;

  /// Framework equality for markers.
  fn markers_equal(a: &Self::Marker, b: &Self::Marker) -> bool;

  /// Create a range spanning two markers.
  fn create_marker_range(start: &Self::Marker, end: &Self::Marker) -> Option<Self::MarkerRange>;

  /// Copy the start marker of a range.
  fn copy_start_marker(range: &Self::MarkerRange) -> Option<Self::Marker>;

  /// Copy the end marker of a range.
  fn copy_end_marker(range: &Self::MarkerRange) -> Option<Self::Marker>;

  /// Framework equality for ranges.
  fn ranges_equal(a: &Self::MarkerRange, b: &Self::MarkerRange) -> bool;

  /// Type identifier shared by all markers.
  fn marker_type_id() -> CfTypeId;

  /// Type identifier shared by all marker ranges.
  fn marker_range_type_id() -> CfTypeId;

  /// Runtime type identifier of a specific marker.
  fn type_id_of_marker(marker: &Self::Marker) -> CfTypeId;

  /// Runtime type identifier of a specific range.
  fn type_id_of_range(range: &Self::MarkerRange) -> CfTypeId;
}
