/*!
axtext - accessibility text markers, positions and selection tracking

```ignore
use axtext::{AxText, Event};

// Create instance (uses the system observer on macOS)
let axtext = AxText::builder().decompose(true).build()?;

// Follow a web area's caret through text markers
let tracker = axtext.track_text_markers(web_area)?;

// Subscribe to events
let mut events = axtext.subscribe();
while let Ok(event) = events.recv().await {
    if let Event::Output { payloads, .. } = event {
        // hand payloads to a speech engine
    }
}

axtext.untrack(tracker);
```

The marker primitives work without an instance:

```
let start = axtext::create_marker(&[1, 2, 3, 4])?;
let end = axtext::create_marker(&[5, 6, 7, 8])?;
let range = axtext::create_marker_range(&start, &end)?;
assert_eq!(axtext::copy_end_marker(&range)?, end);
assert_ne!(axtext::marker_type_id(), axtext::marker_range_type_id());
# Ok::<(), axtext::AxError>(())
```
*/

mod core;
mod platform;

pub mod a11y;
pub mod element;
pub mod marker;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod observer;
pub mod output;
pub mod position;
pub mod selection;
pub mod text;

mod types;
pub use types::*;

pub use crate::core::{AxText, AxTextBuilder};
pub use crate::element::{Element, ElementRef};
pub use crate::marker::{
  copy_end_marker, copy_start_marker, create_marker, create_marker_range, marker_range_type_id,
  marker_type_id, CfTypeId, TextMarker, TextMarkerRange,
};
pub use crate::observer::{ObserverProvider, Subscription};
pub use crate::position::{Position, TextIndex, TextSpan};

#[cfg(target_os = "macos")]
pub use crate::platform::macos::{SystemElement, SystemObserver};

/// Library version string.
pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Library version as `major.minor`.
#[allow(clippy::cast_precision_loss)]
pub const VERSION_NUMBER: f64 = {
  let major = parse_version_component(env!("CARGO_PKG_VERSION_MAJOR"));
  let minor_str = env!("CARGO_PKG_VERSION_MINOR");
  let minor = parse_version_component(minor_str);
  let mut scale = 1_u64;
  let mut digits = minor_str.len();
  while digits > 0 {
    scale *= 10;
    digits -= 1;
  }
  major as f64 + minor as f64 / scale as f64
};

#[allow(clippy::indexing_slicing, clippy::cast_lossless)]
const fn parse_version_component(s: &str) -> u64 {
  let bytes = s.as_bytes();
  let mut value = 0_u64;
  let mut i = 0;
  while i < bytes.len() {
    value = value * 10 + (bytes[i] - b'0') as u64;
    i += 1;
  }
  value
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_number_matches_string() {
    let mut parts = VERSION_STRING.split('.');
    let major_minor = format!("{}.{}", parts.next().unwrap(), parts.next().unwrap());
    assert!((VERSION_NUMBER - major_minor.parse::<f64>().unwrap()).abs() < f64::EPSILON);
  }

  #[test]
  fn version_components_parse() {
    assert_eq!(parse_version_component("0"), 0);
    assert_eq!(parse_version_component("12"), 12);
  }
}
