/*!
macOS platform backend.

- `markers.rs` - `AXTextMarker` / `AXTextMarkerRange` bindings
- `handles.rs` - `ElementHandle` and CoreFoundation conversions
- `element.rs` - `SystemElement`
- `observer.rs` - `SystemObserver`
- `mapping.rs` - AX* string constants
*/

#![allow(unsafe_code)]

mod element;
mod handles;
mod mapping;
mod markers;
mod observer;

pub use element::SystemElement;
pub use observer::SystemObserver;

use objc2_application_services::AXIsProcessTrusted;

/// macOS platform marker type.
pub(crate) struct MacOS;

/// Whether this process may use the accessibility API.
pub(crate) fn has_permissions() -> bool {
  unsafe { AXIsProcessTrusted() }
}
