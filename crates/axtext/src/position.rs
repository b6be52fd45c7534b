/*!
Positions and spans inside an element's text.

A [`Position`] pairs an index with the element it belongs to. Indices come in
two flavors, both implementing [`TextIndex`]:

- `usize`: character offsets, ordered numerically.
- [`TextMarker`]: opaque markers, ordered by asking the element for the range
  that spans both markers.
*/

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::element::ElementRef;
use crate::marker::{TextMarker, TextMarkerRange};
use crate::types::{AccessibilityError, AxResult, IndexKind};

/// Index type usable in a [`Position`].
pub trait TextIndex: Clone + fmt::Debug + Send + Sync + 'static {
  /// Index space, reported in tracker events.
  const KIND: IndexKind;

  /// Whether two indices denote the same place without consulting the element.
  fn same_index(&self, other: &Self) -> bool;

  /// Span covering two positions in document order.
  fn span(first: &Position<Self>, second: &Position<Self>) -> AxResult<TextSpan<Self>>;

  /// Text covered by a span.
  fn string(span: &TextSpan<Self>) -> AxResult<String>;

  /// Current selections of an element.
  fn selections(element: &ElementRef) -> AxResult<Vec<TextSpan<Self>>>;
}

/// An index inside a specific element's text.
#[derive(Clone)]
pub struct Position<I> {
  pub index: I,
  pub element: ElementRef,
}

impl<I: TextIndex> Position<I> {
  pub fn new(index: I, element: ElementRef) -> Self {
    Self { index, element }
  }
}

impl<I: TextIndex> PartialEq for Position<I> {
  fn eq(&self, other: &Self) -> bool {
    self.index.same_index(&other.index)
  }
}

impl<I: TextIndex> PartialOrd for Position<I> {
  /// `None` when the element cannot order the two positions.
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    if self == other {
      return Some(Ordering::Equal);
    }
    let span = I::span(self, other).ok()?;
    // Distinct indices the element reports as one place are unequal, so
    // they cannot be `Equal` either.
    if span.is_empty() {
      return None;
    }
    if span.start == *self {
      Some(Ordering::Less)
    } else {
      Some(Ordering::Greater)
    }
  }
}

impl<I: fmt::Debug> fmt::Debug for Position<I> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.index)
  }
}

/// Half-open span between two positions of the same element.
#[derive(Clone)]
pub struct TextSpan<I> {
  pub start: Position<I>,
  pub end: Position<I>,
}

impl<I: TextIndex> TextSpan<I> {
  /// Span with the given bounds, taken as is.
  pub const fn new(start: Position<I>, end: Position<I>) -> Self {
    Self { start, end }
  }

  /// Span covering both positions, start first.
  pub fn from_unordered(first: &Position<I>, second: &Position<I>) -> AxResult<Self> {
    I::span(first, second)
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  /// Text covered by the span, read from the start position's element.
  pub fn string(&self) -> AxResult<String> {
    I::string(self)
  }

  pub fn element(&self) -> &ElementRef {
    &self.start.element
  }
}

impl TextSpan<TextMarker> {
  /// Span for a marker range vended by `element`.
  pub fn from_marker_range(range: &TextMarkerRange, element: ElementRef) -> AxResult<Self> {
    if range.runtime_type_id() != TextMarkerRange::cf_type_id() {
      return Err(AccessibilityError::TypeMismatch.into());
    }
    let (start, end) = range.bounds()?;
    Ok(Self {
      start: Position::new(start, Arc::clone(&element)),
      end: Position::new(end, element),
    })
  }

  /// Rebuild the framework range.
  pub fn to_marker_range(&self) -> AxResult<TextMarkerRange> {
    TextMarkerRange::new(&self.start.index, &self.end.index)
  }
}

impl TextSpan<usize> {
  pub fn from_range(range: std::ops::Range<usize>, element: ElementRef) -> Self {
    Self {
      start: Position::new(range.start, Arc::clone(&element)),
      end: Position::new(range.end, element),
    }
  }

  pub const fn to_range(&self) -> std::ops::Range<usize> {
    self.start.index..self.end.index
  }
}

impl<I: TextIndex> PartialEq for TextSpan<I> {
  fn eq(&self, other: &Self) -> bool {
    self.start == other.start && self.end == other.end
  }
}

impl<I: fmt::Debug> fmt::Debug for TextSpan<I> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}..{:?}", self.start, self.end)
  }
}

impl TextIndex for usize {
  const KIND: IndexKind = IndexKind::Integer;

  fn same_index(&self, other: &Self) -> bool {
    self == other
  }

  fn span(first: &Position<Self>, second: &Position<Self>) -> AxResult<TextSpan<Self>> {
    Ok(if second.index < first.index {
      TextSpan::new(second.clone(), first.clone())
    } else {
      TextSpan::new(first.clone(), second.clone())
    })
  }

  fn string(span: &TextSpan<Self>) -> AxResult<String> {
    Ok(span.element().string_for_range(span.to_range())?)
  }

  fn selections(element: &ElementRef) -> AxResult<Vec<TextSpan<Self>>> {
    Ok(
      element
        .selected_text_ranges()?
        .into_iter()
        .map(|range| TextSpan::from_range(range, Arc::clone(element)))
        .collect(),
    )
  }
}

impl TextIndex for TextMarker {
  const KIND: IndexKind = IndexKind::TextMarker;

  fn same_index(&self, other: &Self) -> bool {
    self == other
  }

  fn span(first: &Position<Self>, second: &Position<Self>) -> AxResult<TextSpan<Self>> {
    let range = first
      .element
      .marker_range_for_unordered_markers(&first.index, &second.index)?;
    TextSpan::from_marker_range(&range, Arc::clone(&first.element))
  }

  fn string(span: &TextSpan<Self>) -> AxResult<String> {
    let range = span.to_marker_range()?;
    Ok(span.element().string_for_marker_range(&range)?)
  }

  fn selections(element: &ElementRef) -> AxResult<Vec<TextSpan<Self>>> {
    element
      .selected_text_marker_ranges()?
      .iter()
      .map(|range| TextSpan::from_marker_range(range, Arc::clone(element)))
      .collect()
  }
}
