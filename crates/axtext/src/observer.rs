/*!
Notification observers.

An [`ObserverProvider`] registers callbacks for element notifications and
hands back a [`Subscription`]. Dropping the subscription unregisters the
callback.
*/

#[cfg(any(target_os = "macos", test))]
use std::collections::HashMap;
use std::fmt;
#[cfg(any(target_os = "macos", test))]
use std::hash::Hash;
use std::sync::Arc;

use crate::a11y::Notification;
use crate::element::ElementRef;
use crate::selection::NotificationInfo;
use crate::types::ObserverResult;

/// Called with the posting element and its decoded user info.
pub type ObserverCallback = Arc<dyn Fn(&ElementRef, &NotificationInfo) + Send + Sync>;

/// Source of element notifications.
pub trait ObserverProvider: Send + Sync + fmt::Debug {
  /// Register `callback` for `notification` posted by `element`.
  fn subscribe(
    &self,
    element: &ElementRef,
    notification: Notification,
    callback: ObserverCallback,
  ) -> ObserverResult<Subscription>;
}

/// Live registration. Unregisters on drop.
pub struct Subscription {
  notification: Notification,
  cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
  /// Subscription that runs `cancel` once, when cancelled or dropped.
  pub fn new(notification: Notification, cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
    Self {
      notification,
      cancel: Some(Box::new(cancel)),
    }
  }

  pub const fn notification(&self) -> Notification {
    self.notification
  }

  /// Unregister now.
  pub fn cancel(mut self) {
    self.run_cancel();
  }

  fn run_cancel(&mut self) {
    if let Some(cancel) = self.cancel.take() {
      cancel();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.run_cancel();
  }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subscription")
      .field("notification", &self.notification)
      .field("active", &self.cancel.is_some())
      .finish()
  }
}

/// Callbacks grouped by the platform registration they share.
///
/// The platform is asked to register a key once; later subscribers to the
/// same key only add a callback. The registration goes away with the last
/// callback.
#[cfg(any(target_os = "macos", test))]
pub(crate) struct CallbackRegistry<K> {
  next_id: u64,
  entries: HashMap<K, Vec<(u64, ObserverCallback)>>,
}

#[cfg(any(target_os = "macos", test))]
impl<K> Default for CallbackRegistry<K> {
  fn default() -> Self {
    Self {
      next_id: 1,
      entries: HashMap::new(),
    }
  }
}

#[cfg(any(target_os = "macos", test))]
impl<K: Eq + Hash> CallbackRegistry<K> {
  /// Add `callback` under `key`; returns its id.
  pub(crate) fn add(&mut self, key: K, callback: ObserverCallback) -> u64 {
    let id = self.next_id;
    self.next_id += 1;
    self.entries.entry(key).or_default().push((id, callback));
    id
  }

  /// Remove callback `id`. True when it was the last one under `key`.
  pub(crate) fn remove(&mut self, key: &K, id: u64) -> bool {
    let Some(callbacks) = self.entries.get_mut(key) else {
      return false;
    };
    let before = callbacks.len();
    callbacks.retain(|(existing, _)| *existing != id);
    if callbacks.len() == before {
      return false;
    }
    if callbacks.is_empty() {
      self.entries.remove(key);
      return true;
    }
    false
  }

  /// Snapshot of the callbacks under `key`, so none run under a lock.
  pub(crate) fn callbacks(&self, key: &K) -> Vec<ObserverCallback> {
    self
      .entries
      .get(key)
      .map(|callbacks| callbacks.iter().map(|(_, callback)| Arc::clone(callback)).collect())
      .unwrap_or_default()
  }
}
