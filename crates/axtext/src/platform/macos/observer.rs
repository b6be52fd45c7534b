/*!
Notification observer for macOS accessibility.

One `AXObserver` is created per process and added to the main run loop;
callbacks only fire while that run loop runs. Each (element, notification)
pair is registered with the framework once. Further subscribers share that
registration, and it is removed when the last of them goes away.

# Context Design

macOS hands the callback a raw `refcon` pointer. We pass a context id in it
and map the id back to the registered Rust callbacks through
`OBSERVER_CONTEXTS`, so nothing with a Rust lifetime crosses into C.
*/

#![allow(unsafe_code)]
#![allow(clippy::cast_possible_wrap)] // PIDs are always positive and < i32::MAX

use objc2_application_services::{AXError, AXObserver, AXUIElement};
use objc2_core_foundation::{
  kCFRunLoopDefaultMode, CFBoolean, CFDictionary, CFNumber, CFRetained, CFRunLoop, CFString,
  CFType,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, LazyLock};

use super::element::SystemElement;
use super::handles::{marker_range_from, ElementHandle, ObserverHandle};
use super::mapping::{notification_from_macos, notification_to_macos};
use crate::a11y::Notification;
use crate::element::{Element, ElementRef};
use crate::observer::{CallbackRegistry, ObserverCallback, ObserverProvider, Subscription};
use crate::selection::{keys, InfoValue, NotificationInfo};
use crate::types::{ObserverError, ObserverResult};

/// Next available context ID.
static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Global registry mapping context IDs to the callbacks sharing them.
static OBSERVER_CONTEXTS: LazyLock<Mutex<CallbackRegistry<u64>>> =
  LazyLock::new(|| Mutex::new(CallbackRegistry::default()));

/// Clone the callbacks out so the lock is not held while they run.
fn lookup_context(context_id: u64) -> Vec<ObserverCallback> {
  OBSERVER_CONTEXTS.lock().callbacks(&context_id)
}

const fn check(result: AXError) -> ObserverResult<()> {
  ObserverError::check(result.0)
}

type RegistrationKey = (ElementHandle, Notification);

/// One process's `AXObserver` and the framework registrations made on it,
/// each with the context id its callbacks are filed under.
struct ProcessObserver {
  observer: ObserverHandle,
  registrations: HashMap<RegistrationKey, u64>,
}

type Processes = Arc<Mutex<HashMap<u32, ProcessObserver>>>;

/// [`ObserverProvider`] backed by `AXObserver`.
///
/// Lock order: `processes`, then `OBSERVER_CONTEXTS`. Framework calls are
/// made under `processes`, so a new subscriber cannot race the removal of
/// the registration it would share.
#[derive(Default)]
pub struct SystemObserver {
  processes: Processes,
}

impl SystemObserver {
  pub fn new() -> Self {
    Self::default()
  }
}

impl std::fmt::Debug for SystemObserver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SystemObserver")
      .field("processes", &self.processes.lock().len())
      .finish()
  }
}

impl ObserverProvider for SystemObserver {
  fn subscribe(
    &self,
    element: &ElementRef,
    notification: Notification,
    callback: ObserverCallback,
  ) -> ObserverResult<Subscription> {
    let target: &dyn Element = &**element;
    let Some(target) = target.as_any().downcast_ref::<SystemElement>() else {
      return Err(ObserverError::IllegalArgument);
    };
    let handle = target.handle().clone();
    let pid = handle.pid();
    let key: RegistrationKey = (handle, notification);

    let mut processes = self.processes.lock();
    if !processes.contains_key(&pid) {
      let observer = create_observer(pid)?;
      processes.insert(
        pid,
        ProcessObserver {
          observer,
          registrations: HashMap::new(),
        },
      );
    }
    let context_id = register(&mut processes, pid, &key)?;
    let callback_id = OBSERVER_CONTEXTS.lock().add(context_id, callback);
    drop(processes);

    let processes = Arc::clone(&self.processes);
    Ok(Subscription::new(notification, move || {
      unsubscribe(&processes, pid, &key, context_id, callback_id);
    }))
  }
}

/// Context id for `key`, registering it with the framework on first use.
/// A process observer left without registrations by a failure is dropped.
fn register(
  processes: &mut HashMap<u32, ProcessObserver>,
  pid: u32,
  key: &RegistrationKey,
) -> ObserverResult<u64> {
  let process = processes.get_mut(&pid).ok_or(ObserverError::Failure)?;
  if let Some(&context_id) = process.registrations.get(key) {
    return Ok(context_id);
  }
  let (handle, notification) = key;
  let context_id = NEXT_CONTEXT_ID.fetch_add(1, AtomicOrdering::Relaxed);
  let name = CFString::from_static_str(notification_to_macos(*notification));
  let added = unsafe {
    process
      .observer
      .inner()
      .add_notification(handle.inner(), &name, context_id as *mut c_void)
  };
  if let Err(err) = check(added) {
    if process.registrations.is_empty() {
      if let Some(process) = processes.remove(&pid) {
        retire_observer(&process.observer);
      }
    }
    return Err(err);
  }
  log::trace!("registered {notification:?} on {handle:?} (context {context_id})");
  process.registrations.insert(key.clone(), context_id);
  Ok(context_id)
}

/// Drop one callback; the last one for a key removes the framework
/// registration, and the last registration of a process drops its observer.
fn unsubscribe(
  processes: &Processes,
  pid: u32,
  key: &RegistrationKey,
  context_id: u64,
  callback_id: u64,
) {
  let mut processes = processes.lock();
  if !OBSERVER_CONTEXTS.lock().remove(&context_id, callback_id) {
    return;
  }
  let Some(process) = processes.get_mut(&pid) else {
    return;
  };
  process.registrations.remove(key);
  let (handle, notification) = key;
  let name = CFString::from_static_str(notification_to_macos(*notification));
  let removed = unsafe { process.observer.inner().remove_notification(handle.inner(), &name) };
  if let Err(err) = check(removed) {
    log::debug!("failed to remove {notification:?} observer: {err}");
  }
  if process.registrations.is_empty() {
    if let Some(process) = processes.remove(&pid) {
      retire_observer(&process.observer);
      log::trace!("dropped observer for pid {pid}");
    }
  }
}

/// Detach an observer from the main run loop before it is released.
fn retire_observer(observer: &ObserverHandle) {
  unsafe {
    let run_loop_source = observer.inner().run_loop_source();
    if let Some(main_run_loop) = CFRunLoop::main() {
      main_run_loop.remove_source(Some(&run_loop_source), kCFRunLoopDefaultMode);
    }
  }
}

/// Create an `AXObserver` and add it to the main run loop.
fn create_observer(pid: u32) -> ObserverResult<ObserverHandle> {
  let observer = unsafe {
    let mut observer_ptr: *mut AXObserver = std::ptr::null_mut();
    let out = NonNull::new(&raw mut observer_ptr).ok_or(ObserverError::Failure)?;
    check(AXObserver::create_with_info_callback(
      pid as i32,
      Some(observer_callback),
      out,
    ))?;
    CFRetained::from_raw(NonNull::new(observer_ptr).ok_or(ObserverError::Failure)?)
  };

  // Add to main run loop - required for callbacks to fire
  unsafe {
    let run_loop_source = observer.run_loop_source();
    if let Some(main_run_loop) = CFRunLoop::main() {
      main_run_loop.add_source(Some(&run_loop_source), kCFRunLoopDefaultMode);
    }
  }

  Ok(ObserverHandle::new(observer))
}

unsafe extern "C-unwind" fn observer_callback(
  _observer: NonNull<AXObserver>,
  element: NonNull<AXUIElement>,
  notification: NonNull<CFString>,
  info: NonNull<CFDictionary>,
  refcon: *mut c_void,
) {
  use std::panic::AssertUnwindSafe;

  let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
    let callbacks = lookup_context(refcon as u64);
    if callbacks.is_empty() {
      return;
    }
    let notification_str = notification.as_ref().to_string();
    let Some(notification) = notification_from_macos(&notification_str) else {
      log::warn!("Unknown macOS notification: {notification_str}");
      return;
    };

    let info = if notification.carries_info() {
      decode_info(info.as_ref())
    } else {
      NotificationInfo::new()
    };
    let element: ElementRef = Arc::new(SystemElement::new(ElementHandle::new(
      CFRetained::retain(element),
    )));
    for callback in callbacks {
      callback(&element, &info);
    }
  }));

  if result.is_err() {
    log::warn!("Accessibility notification handler panicked (possibly invalid element)");
  }
}

/// Decode the keys we understand from a notification's user info.
fn decode_info(dict: &CFDictionary) -> NotificationInfo {
  let mut info = NotificationInfo::new();
  for &key in keys::ALL {
    let cf_key = CFString::from_str(key);
    let key_ptr = (&*cf_key as *const CFString).cast::<c_void>();
    let value = unsafe {
      if !CFDictionary::contains_ptr_key(dict, key_ptr) {
        continue;
      }
      let ptr = CFDictionary::value(dict, key_ptr).cast::<CFType>().cast_mut();
      let Some(ptr) = NonNull::new(ptr) else {
        continue;
      };
      // Get rule: retain before wrapping
      CFRetained::retain(ptr)
    };
    if let Some(value) = decode_value(value) {
      info.insert(key, value);
    }
  }
  info
}

fn decode_value(value: CFRetained<CFType>) -> Option<InfoValue> {
  if let Some(b) = value.downcast_ref::<CFBoolean>() {
    return Some(InfoValue::Bool(b.as_bool()));
  }
  if let Some(n) = value.downcast_ref::<CFNumber>() {
    return n.as_i64().map(InfoValue::Integer);
  }
  if let Some(s) = value.downcast_ref::<CFString>() {
    return Some(InfoValue::String(s.to_string()));
  }
  if value.downcast_ref::<AXUIElement>().is_some() {
    let element = value.downcast::<AXUIElement>().ok()?;
    return Some(InfoValue::Element(Arc::new(SystemElement::new(
      ElementHandle::new(element),
    ))));
  }
  marker_range_from(value).ok().map(InfoValue::MarkerRange)
}
