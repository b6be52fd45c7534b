/*!
Text markers and text marker ranges.

A text marker is an opaque position inside an element's text, minted by the
application that owns the text (WebKit, Chromium, `NSTextView`). Markers are
only meaningful to that application; ordering and string extraction go
through the element (see [`crate::Element`]).

```
use axtext::{TextMarker, TextMarkerRange};

let start = TextMarker::from_bytes(&[0, 0, 0, 1])?;
let end = TextMarker::from_bytes(&[0, 0, 0, 9])?;
let range = TextMarkerRange::new(&start, &end)?;

assert_eq!(range.start()?, start);
assert_eq!(range.end()?, end);
assert_eq!(range.runtime_type_id(), TextMarkerRange::cf_type_id());
# Ok::<(), axtext::AxError>(())
```
*/

use std::fmt;

use crate::platform::{CurrentPlatform, MarkerBackend};
use crate::types::{AccessibilityError, AxResult, ElementError};

/// CoreFoundation runtime type identifier.
pub type CfTypeId = usize;

type Marker = <CurrentPlatform as MarkerBackend>::Marker;
type MarkerRange = <CurrentPlatform as MarkerBackend>::MarkerRange;

/// Opaque position in an element's text. Clone is cheap (reference counted).
#[derive(Clone)]
pub struct TextMarker {
  inner: Marker,
}

impl TextMarker {
  /// Create a marker from the raw bytes an application handed out earlier.
  ///
  /// Empty input is rejected with [`AccessibilityError::InvalidInput`].
  pub fn from_bytes(bytes: &[u8]) -> AxResult<Self> {
    if bytes.is_empty() {
      return Err(AccessibilityError::InvalidInput.into());
    }
    let inner = CurrentPlatform::create_marker(bytes).ok_or(ElementError::Failure)?;
    Ok(Self { inner })
  }

  /// Copy of the marker's raw bytes.
  pub fn bytes(&self) -> Vec<u8> {
    CurrentPlatform::marker_bytes(&self.inner)
  }

  /// Type identifier shared by all text markers. Looked up once.
  pub fn cf_type_id() -> CfTypeId {
    CurrentPlatform::marker_type_id()
  }

  /// Type identifier of this object as reported by the runtime.
  pub fn runtime_type_id(&self) -> CfTypeId {
    CurrentPlatform::type_id_of_marker(&self.inner)
  }

  pub(crate) const fn from_inner(inner: Marker) -> Self {
    Self { inner }
  }

  #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
  pub(crate) const fn inner(&self) -> &Marker {
    &self.inner
  }
}

impl PartialEq for TextMarker {
  fn eq(&self, other: &Self) -> bool {
    CurrentPlatform::markers_equal(&self.inner, &other.inner)
  }
}

impl Eq for TextMarker {}

impl fmt::Debug for TextMarker {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TextMarker({:02x?})", self.bytes())
  }
}

/// Opaque span between two text markers. Clone is cheap (reference counted).
#[derive(Clone)]
pub struct TextMarkerRange {
  inner: MarkerRange,
}

impl TextMarkerRange {
  /// Create a range from two markers. The markers are not reordered.
  pub fn new(start: &TextMarker, end: &TextMarker) -> AxResult<Self> {
    let inner =
      CurrentPlatform::create_marker_range(&start.inner, &end.inner).ok_or(ElementError::Failure)?;
    Ok(Self { inner })
  }

  /// Copy the start marker.
  pub fn start(&self) -> AxResult<TextMarker> {
    CurrentPlatform::copy_start_marker(&self.inner)
      .map(TextMarker::from_inner)
      .ok_or_else(|| ElementError::Failure.into())
  }

  /// Copy the end marker.
  pub fn end(&self) -> AxResult<TextMarker> {
    CurrentPlatform::copy_end_marker(&self.inner)
      .map(TextMarker::from_inner)
      .ok_or_else(|| ElementError::Failure.into())
  }

  /// Copy both markers.
  pub fn bounds(&self) -> AxResult<(TextMarker, TextMarker)> {
    Ok((self.start()?, self.end()?))
  }

  /// Type identifier shared by all text marker ranges. Looked up once.
  pub fn cf_type_id() -> CfTypeId {
    CurrentPlatform::marker_range_type_id()
  }

  /// Type identifier of this object as reported by the runtime.
  pub fn runtime_type_id(&self) -> CfTypeId {
    CurrentPlatform::type_id_of_range(&self.inner)
  }

  #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
  pub(crate) const fn from_inner(inner: MarkerRange) -> Self {
    Self { inner }
  }

  #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
  pub(crate) const fn inner(&self) -> &MarkerRange {
    &self.inner
  }
}

impl PartialEq for TextMarkerRange {
  fn eq(&self, other: &Self) -> bool {
    CurrentPlatform::ranges_equal(&self.inner, &other.inner)
  }
}

impl Eq for TextMarkerRange {}

impl fmt::Debug for TextMarkerRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.bounds() {
      Ok((start, end)) => f
        .debug_struct("TextMarkerRange")
        .field("start", &start)
        .field("end", &end)
        .finish(),
      Err(_) => f.debug_struct("TextMarkerRange").finish_non_exhaustive(),
    }
  }
}

/// Create a range from a start and end marker.
pub fn create_marker_range(start: &TextMarker, end: &TextMarker) -> AxResult<TextMarkerRange> {
  TextMarkerRange::new(start, end)
}

/// Create a marker from raw bytes.
pub fn create_marker(bytes: &[u8]) -> AxResult<TextMarker> {
  TextMarker::from_bytes(bytes)
}

/// Copy the start marker out of a range.
pub fn copy_start_marker(range: &TextMarkerRange) -> AxResult<TextMarker> {
  range.start()
}

/// Copy the end marker out of a range.
pub fn copy_end_marker(range: &TextMarkerRange) -> AxResult<TextMarker> {
  range.end()
}

/// Type identifier of text markers.
pub fn marker_type_id() -> CfTypeId {
  TextMarker::cf_type_id()
}

/// Type identifier of text marker ranges.
pub fn marker_range_type_id() -> CfTypeId {
  TextMarkerRange::cf_type_id()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::AxError;

  fn marker(offset: u32) -> TextMarker {
    TextMarker::from_bytes(&offset.to_be_bytes()).unwrap()
  }

  #[test]
  fn empty_bytes_are_invalid() {
    let err = TextMarker::from_bytes(&[]).unwrap_err();
    assert!(matches!(
      err,
      AxError::Accessibility(AccessibilityError::InvalidInput)
    ));
  }

  #[test]
  fn bytes_survive_construction() {
    let m = TextMarker::from_bytes(&[9, 8, 7]).unwrap();
    assert_eq!(m.bytes(), vec![9, 8, 7]);
  }

  #[test]
  fn markers_compare_by_content() {
    assert_eq!(marker(4), marker(4));
    assert_ne!(marker(4), marker(5));
  }

  #[test]
  fn range_returns_its_endpoints() {
    let range = create_marker_range(&marker(1), &marker(10)).unwrap();
    assert_eq!(copy_start_marker(&range).unwrap(), marker(1));
    assert_eq!(copy_end_marker(&range).unwrap(), marker(10));
  }

  #[test]
  fn range_keeps_reversed_endpoints() {
    let range = TextMarkerRange::new(&marker(10), &marker(1)).unwrap();
    let (start, end) = range.bounds().unwrap();
    assert_eq!(start, marker(10));
    assert_eq!(end, marker(1));
  }

  #[test]
  fn type_ids_are_stable_and_distinct() {
    assert_eq!(marker_type_id(), marker_type_id());
    assert_ne!(marker_type_id(), marker_range_type_id());
  }

  #[test]
  fn runtime_type_ids_match_class_ids() {
    let m = create_marker(&[1]).unwrap();
    assert_eq!(m.runtime_type_id(), marker_type_id());
    let r = TextMarkerRange::new(&m, &m).unwrap();
    assert_eq!(r.runtime_type_id(), marker_range_type_id());
  }

  #[cfg(not(target_os = "macos"))]
  #[test]
  fn equal_ranges() {
    let a = TextMarkerRange::new(&marker(1), &marker(2)).unwrap();
    let b = TextMarkerRange::new(&marker(1), &marker(2)).unwrap();
    let c = TextMarkerRange::new(&marker(1), &marker(3)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
  }
}
