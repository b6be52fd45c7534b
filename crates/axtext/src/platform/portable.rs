/*!
In-memory marker backend for targets without the macOS accessibility
framework.

Markers are shared byte buffers and ranges hold their two markers. Type
identifiers are fixed values so type checks behave the same as on macOS.
*/

use std::fmt;
use std::sync::Arc;

use super::MarkerBackend;
use crate::marker::CfTypeId;

/// `'TMrk'`
const MARKER_TYPE_ID: CfTypeId = 0x544D_726B;
/// `'TMrg'`
const MARKER_RANGE_TYPE_ID: CfTypeId = 0x544D_7267;

pub(crate) struct Portable;

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct PortableMarker(Arc<[u8]>);

impl fmt::Debug for PortableMarker {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "PortableMarker({:02x?})", &*self.0)
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PortableMarkerRange(Arc<(PortableMarker, PortableMarker)>);

impl MarkerBackend for Portable {
  type Marker = PortableMarker;
  type MarkerRange = PortableMarkerRange;

  fn create_marker(bytes: &[u8]) -> Option<Self::Marker> {
    Some(PortableMarker(Arc::from(bytes)))
  }

  fn marker_bytes(marker: &Self::Marker) -> Vec<u8> {
    marker.0.to_vec()
  }

  fn markers_equal(a: &Self::Marker, b: &Self::Marker) -> bool {
    a == b
  }

  fn create_marker_range(start: &Self::Marker, end: &Self::Marker) -> Option<Self::MarkerRange> {
    Some(PortableMarkerRange(Arc::new((start.clone(), end.clone()))))
  }

  fn copy_start_marker(range: &Self::MarkerRange) -> Option<Self::Marker> {
    Some(range.0 .0.clone())
  }

  fn copy_end_marker(range: &Self::MarkerRange) -> Option<Self::Marker> {
    Some(range.0 .1.clone())
  }

  fn ranges_equal(a: &Self::MarkerRange, b: &Self::MarkerRange) -> bool {
    a == b
  }

  fn marker_type_id() -> CfTypeId {
    MARKER_TYPE_ID
  }

  fn marker_range_type_id() -> CfTypeId {
    MARKER_RANGE_TYPE_ID
  }

  fn type_id_of_marker(_marker: &Self::Marker) -> CfTypeId {
    MARKER_TYPE_ID
  }

  fn type_id_of_range(_range: &Self::MarkerRange) -> CfTypeId {
    MARKER_RANGE_TYPE_ID
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ranges_share_marker_buffers() {
    let start = Portable::create_marker(&[1, 2]).unwrap();
    let end = Portable::create_marker(&[3]).unwrap();
    let range = Portable::create_marker_range(&start, &end).unwrap();
    let copied = Portable::copy_start_marker(&range).unwrap();
    assert!(Arc::ptr_eq(&copied.0, &start.0));
  }

  #[test]
  fn type_ids_differ() {
    assert_ne!(Portable::marker_type_id(), Portable::marker_range_type_id());
  }
}
