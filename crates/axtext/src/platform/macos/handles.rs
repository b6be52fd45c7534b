/*! Opaque platform handles with safe accessor methods.

All element-level unsafe code is encapsulated here. Attribute reads map the
raw `AXError` through [`ElementError::from_code`]; a successful read that
yields the wrong CoreFoundation type is reported as
[`ElementError::NoValue`].
*/

#![allow(unsafe_code)]
#![allow(
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss,
  clippy::ref_as_ptr
)]

use objc2_application_services::{AXError, AXObserver, AXUIElement, AXValue as AXValueRef, AXValueType};
use objc2_core_foundation::{
  CFArray, CFBoolean, CFHash, CFNumber, CFRange, CFRetained, CFString, CFType, CGPoint, CGSize,
};
use std::ffi::c_void;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::ptr::NonNull;

use super::markers::{CFGetTypeID, CfHandle};
use crate::marker::{CfTypeId, TextMarker, TextMarkerRange};
use crate::types::{Bounds, ElementError, ElementResult};

// FFI binding for CFEqual (not exposed by objc2-core-foundation)
extern "C" {
  fn CFEqual(cf1: *const c_void, cf2: *const c_void) -> u8;
}

const fn check(result: AXError) -> ElementResult<()> {
  ElementError::check(result.0)
}

/// Opaque handle to a UI element. Clone is cheap (reference counted).
#[derive(Clone)]
pub(crate) struct ElementHandle {
  inner: CFRetained<AXUIElement>,
  /// Cached `CFHash` (computed once at construction)
  cached_hash: u64,
  /// Cached PID (extracted once at construction)
  cached_pid: u32,
}

impl ElementHandle {
  pub(super) fn new(element: CFRetained<AXUIElement>) -> Self {
    let cached_hash = CFHash(Some(&*element)) as u64;
    let cached_pid = unsafe {
      let mut pid: i32 = 0;
      let result = element.pid(NonNull::new_unchecked(&raw mut pid));
      if result == AXError::Success {
        pid as u32
      } else {
        0 // Invalid elements have no owner
      }
    };

    Self {
      inner: element,
      cached_hash,
      cached_pid,
    }
  }

  /// Application element for a process.
  pub(super) fn application(pid: u32) -> Self {
    Self::new(unsafe { AXUIElement::new_application(pid as i32) })
  }

  pub(super) fn inner(&self) -> &AXUIElement {
    &self.inner
  }

  pub(super) const fn pid(&self) -> u32 {
    self.cached_pid
  }

  /// Compare with another handle using `CFEqual` (local, no IPC).
  pub(super) fn cf_equal(&self, other: &Self) -> bool {
    let self_ptr = CFRetained::as_ptr(&self.inner).as_ptr().cast::<c_void>();
    let other_ptr = CFRetained::as_ptr(&other.inner).as_ptr().cast::<c_void>();
    unsafe { CFEqual(self_ptr, other_ptr) != 0 }
  }

  /// Fetch a raw attribute value.
  pub(super) fn attribute(&self, attr: &str) -> ElementResult<CFRetained<CFType>> {
    let attr = CFString::from_str(attr);
    unsafe {
      let mut value: *const CFType = std::ptr::null();
      let out = NonNull::new(&raw mut value).ok_or(ElementError::Failure)?;
      check(self.inner.copy_attribute_value(&attr, out))?;
      let value = NonNull::new(value.cast_mut()).ok_or(ElementError::NoValue)?;
      Ok(CFRetained::from_raw(value))
    }
  }

  /// Fetch a parameterized attribute value.
  pub(super) fn parameterized(
    &self,
    attr: &str,
    parameter: &CFType,
  ) -> ElementResult<CFRetained<CFType>> {
    let attr = CFString::from_str(attr);
    unsafe {
      let mut value: *const CFType = std::ptr::null();
      let out = NonNull::new(&raw mut value).ok_or(ElementError::Failure)?;
      check(
        self
          .inner
          .copy_parameterized_attribute_value(&attr, parameter, out),
      )?;
      let value = NonNull::new(value.cast_mut()).ok_or(ElementError::NoValue)?;
      Ok(CFRetained::from_raw(value))
    }
  }

  pub(super) fn set_attribute(&self, attr: &str, value: &CFType) -> ElementResult<()> {
    let attr = CFString::from_str(attr);
    check(unsafe { self.inner.set_attribute_value(&attr, value) })
  }

  pub(super) fn string(&self, attr: &str) -> ElementResult<String> {
    string_from(&*self.attribute(attr)?)
  }

  pub(super) fn boolean(&self, attr: &str) -> ElementResult<bool> {
    bool_from(&*self.attribute(attr)?)
  }

  pub(super) fn set_boolean(&self, attr: &str, value: bool) -> ElementResult<()> {
    self.set_attribute(attr, CFBoolean::new(value))
  }

  pub(super) fn integer(&self, attr: &str) -> ElementResult<usize> {
    usize_from(&*self.attribute(attr)?)
  }

  pub(super) fn element(&self, attr: &str) -> ElementResult<Self> {
    let value = self.attribute(attr)?;
    let element = value
      .downcast::<AXUIElement>()
      .map_err(|_| ElementError::NoValue)?;
    Ok(Self::new(element))
  }

  pub(super) fn marker(&self, attr: &str) -> ElementResult<TextMarker> {
    marker_from(self.attribute(attr)?)
  }

  pub(super) fn marker_range(&self, attr: &str) -> ElementResult<TextMarkerRange> {
    marker_range_from(self.attribute(attr)?)
  }

  /// Get bounds (position + size).
  pub(super) fn bounds(&self) -> ElementResult<Bounds> {
    let pos = self.attribute("AXPosition")?;
    let sz = self.attribute("AXSize")?;
    parse_bounds(&pos, &sz).ok_or(ElementError::NoValue)
  }
}

impl Hash for ElementHandle {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.cached_hash.hash(state);
  }
}

impl PartialEq for ElementHandle {
  fn eq(&self, other: &Self) -> bool {
    self.cached_hash == other.cached_hash && self.cf_equal(other)
  }
}

impl Eq for ElementHandle {}

impl std::fmt::Debug for ElementHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ElementHandle")
      .field("pid", &self.cached_pid)
      .field("hash", &format_args!("{:#x}", self.cached_hash))
      .finish()
  }
}

unsafe impl Send for ElementHandle {}
unsafe impl Sync for ElementHandle {}

/// Opaque handle to an observer.
#[derive(Clone)]
pub(crate) struct ObserverHandle(CFRetained<AXObserver>);

impl ObserverHandle {
  pub(super) const fn new(observer: CFRetained<AXObserver>) -> Self {
    Self(observer)
  }

  pub(super) fn inner(&self) -> &AXObserver {
    &self.0
  }
}

unsafe impl Send for ObserverHandle {}
unsafe impl Sync for ObserverHandle {}

// ============================================================================
// CoreFoundation conversions
// ============================================================================

fn type_id(value: &CFType) -> CfTypeId {
  unsafe { CFGetTypeID((value as *const CFType).cast::<c_void>()) }
}

pub(super) fn string_from(value: &CFType) -> ElementResult<String> {
  value
    .downcast_ref::<CFString>()
    .map(ToString::to_string)
    .ok_or(ElementError::NoValue)
}

pub(super) fn bool_from(value: &CFType) -> ElementResult<bool> {
  if let Some(b) = value.downcast_ref::<CFBoolean>() {
    return Ok(b.as_bool());
  }
  // Some applications answer with 0/1 numbers
  value
    .downcast_ref::<CFNumber>()
    .and_then(CFNumber::as_i64)
    .map(|n| n != 0)
    .ok_or(ElementError::NoValue)
}

pub(super) fn usize_from(value: &CFType) -> ElementResult<usize> {
  value
    .downcast_ref::<CFNumber>()
    .and_then(CFNumber::as_i64)
    .and_then(|n| usize::try_from(n).ok())
    .ok_or(ElementError::NoValue)
}

pub(super) fn number(value: usize) -> CFRetained<CFNumber> {
  CFNumber::new_i64(value as i64)
}

pub(super) fn marker_from(value: CFRetained<CFType>) -> ElementResult<TextMarker> {
  if type_id(&value) != TextMarker::cf_type_id() {
    return Err(ElementError::NoValue);
  }
  Ok(TextMarker::from_inner(CfHandle::from_retained(value)))
}

pub(super) fn marker_range_from(value: CFRetained<CFType>) -> ElementResult<TextMarkerRange> {
  if type_id(&value) != TextMarkerRange::cf_type_id() {
    return Err(ElementError::NoValue);
  }
  Ok(TextMarkerRange::from_inner(CfHandle::from_retained(value)))
}

/// Array of markers, as taken by `AXTextMarkerRangeForUnorderedTextMarkers`.
pub(super) fn marker_array(markers: &[&TextMarker]) -> CFRetained<CFType> {
  let objects: Vec<&CFType> = markers.iter().map(|m| m.inner().as_cf()).collect();
  let array = CFArray::from_objects(&objects);
  // SAFETY: every CFArray is a CFType
  unsafe { CFRetained::cast_unchecked(array) }
}

/// Wrap a character range in an `AXValue`.
pub(super) fn range_value(range: Range<usize>) -> ElementResult<CFRetained<AXValueRef>> {
  let mut cf_range = CFRange {
    location: range.start as isize,
    length: range.len() as isize,
  };
  unsafe {
    let ptr = NonNull::new((&raw mut cf_range).cast::<c_void>()).ok_or(ElementError::Failure)?;
    AXValueRef::new(AXValueType::CFRange, ptr).ok_or(ElementError::IllegalArgument)
  }
}

/// Unwrap a `CFRange` held in an `AXValue`.
pub(super) fn range_from(value: &CFType) -> ElementResult<Range<usize>> {
  let ax_value = value
    .downcast_ref::<AXValueRef>()
    .ok_or(ElementError::NoValue)?;
  unsafe {
    let mut range = CFRange {
      location: 0,
      length: 0,
    };
    let ptr = NonNull::new((&raw mut range).cast::<c_void>()).ok_or(ElementError::Failure)?;
    if ax_value.r#type() != AXValueType::CFRange || !ax_value.value(AXValueType::CFRange, ptr) {
      return Err(ElementError::NoValue);
    }
    let start = usize::try_from(range.location).map_err(|_| ElementError::NoValue)?;
    let len = usize::try_from(range.length).map_err(|_| ElementError::NoValue)?;
    Ok(start..start + len)
  }
}

/// Every `CFRange` in an array of `AXValue`s.
pub(super) fn ranges_from(value: CFRetained<CFType>) -> ElementResult<Vec<Range<usize>>> {
  let array = value
    .downcast::<CFArray>()
    .map_err(|_| ElementError::NoValue)?;
  // SAFETY: the elements are CF objects; each is checked by `range_from`
  let typed: CFRetained<CFArray<CFType>> = unsafe { CFRetained::cast_unchecked(array) };
  (0..typed.len())
    .filter_map(|i| typed.get(i))
    .map(|item| range_from(&item))
    .collect()
}

fn parse_bounds(position: &CFType, size: &CFType) -> Option<Bounds> {
  let pos = position.downcast_ref::<AXValueRef>()?;
  let sz = size.downcast_ref::<AXValueRef>()?;

  unsafe {
    if pos.r#type() != AXValueType::CGPoint || sz.r#type() != AXValueType::CGSize {
      return None;
    }
    let mut point = CGPoint { x: 0.0, y: 0.0 };
    let mut size_val = CGSize {
      width: 0.0,
      height: 0.0,
    };

    if !pos.value(
      AXValueType::CGPoint,
      NonNull::new((&raw mut point).cast::<c_void>())?,
    ) {
      return None;
    }
    if !sz.value(
      AXValueType::CGSize,
      NonNull::new((&raw mut size_val).cast::<c_void>())?,
    ) {
      return None;
    }

    Some(Bounds {
      x: point.x,
      y: point.y,
      w: size_val.width,
      h: size_val.height,
    })
  }
}
