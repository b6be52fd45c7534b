/*!
Text marker bindings for macOS.

`AXTextMarker` and `AXTextMarkerRange` are CoreFoundation types exported by
ApplicationServices without public headers. The functions are linked
directly; every returned object follows the Create/Copy rule and is wrapped
in `CFRetained` so it is released on drop.
*/

#![allow(unsafe_code)]
#![allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]

use objc2_core_foundation::{CFRetained, CFType};
use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;
use std::sync::OnceLock;

use super::MacOS;
use crate::marker::CfTypeId;
use crate::platform::MarkerBackend;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
  fn AXTextMarkerGetTypeID() -> CfTypeId;
  fn AXTextMarkerRangeGetTypeID() -> CfTypeId;
  fn AXTextMarkerCreate(allocator: *const c_void, bytes: *const u8, length: isize) -> *mut c_void;
  fn AXTextMarkerGetLength(marker: *const c_void) -> isize;
  fn AXTextMarkerGetBytePtr(marker: *const c_void) -> *const u8;
  fn AXTextMarkerRangeCreate(
    allocator: *const c_void,
    start: *const c_void,
    end: *const c_void,
  ) -> *mut c_void;
  fn AXTextMarkerRangeCopyStartMarker(range: *const c_void) -> *mut c_void;
  fn AXTextMarkerRangeCopyEndMarker(range: *const c_void) -> *mut c_void;
}

// Not exposed by objc2-core-foundation with raw pointers
extern "C" {
  pub(super) fn CFGetTypeID(cf: *const c_void) -> CfTypeId;
  fn CFEqual(cf1: *const c_void, cf2: *const c_void) -> u8;
}

static MARKER_TYPE_ID: OnceLock<CfTypeId> = OnceLock::new();
static MARKER_RANGE_TYPE_ID: OnceLock<CfTypeId> = OnceLock::new();

/// Retained CoreFoundation object used for both markers and ranges.
#[derive(Clone)]
pub(crate) struct CfHandle(CFRetained<CFType>);

impl CfHandle {
  /// Take ownership of a +1 pointer. `None` for null.
  ///
  /// # Safety
  /// `ptr` must be null or a valid CF object returned under the Create rule.
  pub(super) unsafe fn from_create(ptr: *mut c_void) -> Option<Self> {
    let ptr = NonNull::new(ptr.cast::<CFType>())?;
    Some(Self(CFRetained::from_raw(ptr)))
  }

  /// Wrap an already retained object (attribute values, dictionary entries).
  pub(super) const fn from_retained(value: CFRetained<CFType>) -> Self {
    Self(value)
  }

  pub(super) fn as_ptr(&self) -> *const c_void {
    CFRetained::as_ptr(&self.0).as_ptr().cast::<c_void>()
  }

  pub(super) fn as_cf(&self) -> &CFType {
    &self.0
  }

  pub(super) fn cf_type_id(&self) -> CfTypeId {
    unsafe { CFGetTypeID(self.as_ptr()) }
  }

  fn cf_equal(&self, other: &Self) -> bool {
    unsafe { CFEqual(self.as_ptr(), other.as_ptr()) != 0 }
  }
}

impl fmt::Debug for CfHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "CfHandle({:p}, type {})", self.as_ptr(), self.cf_type_id())
  }
}

unsafe impl Send for CfHandle {}
unsafe impl Sync for CfHandle {}

impl MarkerBackend for MacOS {
  type Marker = CfHandle;
  type MarkerRange = CfHandle;

  fn create_marker(bytes: &[u8]) -> Option<Self::Marker> {
    unsafe {
      CfHandle::from_create(AXTextMarkerCreate(
        std::ptr::null(),
        bytes.as_ptr(),
        bytes.len() as isize,
      ))
    }
  }

  fn marker_bytes(marker: &Self::Marker) -> Vec<u8> {
    unsafe {
      let len = AXTextMarkerGetLength(marker.as_ptr());
      let ptr = AXTextMarkerGetBytePtr(marker.as_ptr());
      if ptr.is_null() || len <= 0 {
        return Vec::new();
      }
      std::slice::from_raw_parts(ptr, len as usize).to_vec()
    }
  }

  fn markers_equal(a: &Self::Marker, b: &Self::Marker) -> bool {
    a.cf_equal(b)
  }

  fn create_marker_range(start: &Self::Marker, end: &Self::Marker) -> Option<Self::MarkerRange> {
    unsafe {
      CfHandle::from_create(AXTextMarkerRangeCreate(
        std::ptr::null(),
        start.as_ptr(),
        end.as_ptr(),
      ))
    }
  }

  fn copy_start_marker(range: &Self::MarkerRange) -> Option<Self::Marker> {
    unsafe { CfHandle::from_create(AXTextMarkerRangeCopyStartMarker(range.as_ptr())) }
  }

  fn copy_end_marker(range: &Self::MarkerRange) -> Option<Self::Marker> {
    unsafe { CfHandle::from_create(AXTextMarkerRangeCopyEndMarker(range.as_ptr())) }
  }

  fn ranges_equal(a: &Self::MarkerRange, b: &Self::MarkerRange) -> bool {
    a.cf_equal(b)
  }

  fn marker_type_id() -> CfTypeId {
    *MARKER_TYPE_ID.get_or_init(|| unsafe { AXTextMarkerGetTypeID() })
  }

  fn marker_range_type_id() -> CfTypeId {
    *MARKER_RANGE_TYPE_ID.get_or_init(|| unsafe { AXTextMarkerRangeGetTypeID() })
  }

  fn type_id_of_marker(marker: &Self::Marker) -> CfTypeId {
    marker.cf_type_id()
  }

  fn type_id_of_range(range: &Self::MarkerRange) -> CfTypeId {
    range.cf_type_id()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn created_markers_have_marker_type() {
    let marker = MacOS::create_marker(&[0, 1, 2, 3]).unwrap();
    assert_eq!(marker.cf_type_id(), MacOS::marker_type_id());
    assert_eq!(MacOS::marker_bytes(&marker), vec![0, 1, 2, 3]);
  }

  #[test]
  fn ranges_copy_their_endpoints() {
    let start = MacOS::create_marker(&[1; 8]).unwrap();
    let end = MacOS::create_marker(&[2; 8]).unwrap();
    let range = MacOS::create_marker_range(&start, &end).unwrap();
    assert_eq!(range.cf_type_id(), MacOS::marker_range_type_id());
    let copied = MacOS::copy_end_marker(&range).unwrap();
    assert!(MacOS::markers_equal(&copied, &end));
    assert!(!MacOS::markers_equal(&copied, &start));
  }
}
