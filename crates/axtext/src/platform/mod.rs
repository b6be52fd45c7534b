/*!
Platform backends.

macOS talks to the accessibility framework directly. Other targets use an
in-memory marker implementation so marker-based logic stays testable, and
need an explicit [`ObserverProvider`](crate::observer::ObserverProvider).
*/

mod traits;

use std::sync::Arc;

use crate::observer::ObserverProvider;
use crate::types::AxResult;

pub(crate) use traits::MarkerBackend;

#[cfg(target_os = "macos")]
pub(crate) mod macos;
#[cfg(target_os = "macos")]
pub(crate) type CurrentPlatform = macos::MacOS;

#[cfg(not(target_os = "macos"))]
mod portable;
#[cfg(not(target_os = "macos"))]
pub(crate) type CurrentPlatform = portable::Portable;

#[cfg(target_os = "macos")]
pub(crate) fn has_permissions() -> bool {
  macos::has_permissions()
}

#[cfg(not(target_os = "macos"))]
pub(crate) const fn has_permissions() -> bool {
  true
}

/// Observer used when none is configured.
#[cfg(target_os = "macos")]
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn default_observer() -> AxResult<Arc<dyn ObserverProvider>> {
  Ok(Arc::new(macos::SystemObserver::new()))
}

#[cfg(not(target_os = "macos"))]
pub(crate) fn default_observer() -> AxResult<Arc<dyn ObserverProvider>> {
  Err(crate::types::AxError::NotSupported(
    "no system observer on this platform; configure one with AxTextBuilder::observer".into(),
  ))
}
