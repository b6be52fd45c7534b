/*!
Core `AxText` instance: owns selection trackers, text substitutions and
event broadcasting.

# Module Structure

- `mod.rs` - `AxText` struct, builder, events, text helpers
- `trackers.rs` - start/stop selection trackers

# Example

```ignore
let axtext = AxText::builder().decompose(true).build()?;
let mut events = axtext.subscribe();

let tracker = axtext.track_text_markers(element)?;
while let Ok(event) = events.recv().await {
    // handle event
}
axtext.untrack(tracker);
```
*/

mod trackers;

use std::fmt;
use std::sync::Arc;

use async_broadcast::{InactiveReceiver, Sender};
use parking_lot::Mutex;

use crate::observer::ObserverProvider;
use crate::platform;
use crate::text::{
  AbbreviationExpansion, DecomposingSubstitutions, Indentation, PunctuationExpansion,
  SimpleSubstitutions, SubstitutionChain, Substitutions, WhitespaceClassifier, WhitespaceStatistics,
};
use crate::types::{AxError, AxResult, Event};

use trackers::Trackers;

const EVENT_CHANNEL_CAPACITY: usize = 5000;
const DEFAULT_TAB_SIZE: usize = 4;

/// Main `AxText` instance.
///
/// Trackers stop when the last clone is dropped.
/// Clone is cheap (Arc bumps) - share freely across threads.
pub struct AxText {
  observer: Arc<dyn ObserverProvider>,
  substitutions: Arc<SubstitutionChain>,
  tab_size: usize,
  indentation: Indentation,
  trackers: Arc<Mutex<Trackers>>,
  events_tx: Sender<Event>,
  events_keepalive: InactiveReceiver<Event>,
}

impl Clone for AxText {
  fn clone(&self) -> Self {
    Self {
      observer: Arc::clone(&self.observer),
      substitutions: Arc::clone(&self.substitutions),
      tab_size: self.tab_size,
      indentation: self.indentation,
      trackers: Arc::clone(&self.trackers),
      events_tx: self.events_tx.clone(),
      events_keepalive: self.events_keepalive.clone(),
    }
  }
}

impl fmt::Debug for AxText {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AxText")
      .field("tab_size", &self.tab_size)
      .field("indentation", &self.indentation)
      .finish_non_exhaustive()
  }
}

/// Builder for configuring an `AxText` instance.
///
/// # Example
///
/// ```ignore
/// let axtext = AxText::builder()
///     .substitutions(table)
///     .tab_size(2)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct AxTextBuilder {
  observer: Option<Arc<dyn ObserverProvider>>,
  substitutions: SimpleSubstitutions,
  decompose: bool,
  expand_punctuation: bool,
  expand_abbreviations: bool,
  tab_size: usize,
  indentation: Indentation,
  event_capacity: usize,
}

impl Default for AxTextBuilder {
  fn default() -> Self {
    Self {
      observer: None,
      substitutions: SimpleSubstitutions::default(),
      decompose: false,
      expand_punctuation: false,
      expand_abbreviations: false,
      tab_size: DEFAULT_TAB_SIZE,
      indentation: Indentation::Spaces,
      event_capacity: EVENT_CHANNEL_CAPACITY,
    }
  }
}

impl AxTextBuilder {
  /// Notification source. Defaults to the system observer on macOS;
  /// required everywhere else.
  pub fn observer(mut self, observer: Arc<dyn ObserverProvider>) -> Self {
    self.observer = Some(observer);
    self
  }

  /// Word and cluster replacements applied to spoken text.
  pub fn substitutions(mut self, substitutions: SimpleSubstitutions) -> Self {
    self.substitutions = substitutions;
    self
  }

  /// Strip accents and compatibility forms after the replacement tables run.
  /// Default: false.
  pub const fn decompose(mut self, decompose: bool) -> Self {
    self.decompose = decompose;
    self
  }

  /// Spell out runs of punctuation with synthesizer markup. Default: false.
  pub const fn expand_punctuation(mut self, expand: bool) -> Self {
    self.expand_punctuation = expand;
    self
  }

  /// Spell out `m`, `s`, `ms` and `mm` after numbers. Default: false.
  pub const fn expand_abbreviations(mut self, expand: bool) -> Self {
    self.expand_abbreviations = expand;
    self
  }

  /// Columns per indentation level. Default: 4.
  pub const fn tab_size(mut self, tab_size: usize) -> Self {
    self.tab_size = tab_size;
    self
  }

  /// Default: spaces.
  pub const fn indentation(mut self, indentation: Indentation) -> Self {
    self.indentation = indentation;
    self
  }

  /// Events buffered before the oldest are dropped. Default: 5000.
  pub const fn event_capacity(mut self, capacity: usize) -> Self {
    self.event_capacity = capacity;
    self
  }

  /// Returns an error if accessibility permissions are not granted or no
  /// observer is available on this target.
  pub fn build(self) -> AxResult<AxText> {
    if !platform::has_permissions() {
      return Err(AxError::PermissionDenied);
    }
    let observer = match self.observer {
      Some(observer) => observer,
      None => platform::default_observer()?,
    };

    let mut chain = SubstitutionChain::new();
    if !self.substitutions.is_empty() {
      chain.push(Box::new(self.substitutions));
    }
    if self.decompose {
      chain.push(Box::new(DecomposingSubstitutions));
    }
    // Markup passes last; abbreviation markup must not be re-wrapped as
    // punctuation.
    if self.expand_punctuation {
      chain.push(Box::new(PunctuationExpansion::new()));
    }
    if self.expand_abbreviations {
      chain.push(Box::new(AbbreviationExpansion));
    }

    let (mut tx, rx) = async_broadcast::broadcast(self.event_capacity.max(1));
    tx.set_overflow(true);

    Ok(AxText {
      observer,
      substitutions: Arc::new(chain),
      tab_size: self.tab_size.max(1),
      indentation: self.indentation,
      trackers: Arc::new(Mutex::new(Trackers::default())),
      events_tx: tx,
      events_keepalive: rx.deactivate(),
    })
  }
}

impl AxText {
  /// Create an instance with default options.
  pub fn new() -> AxResult<Self> {
    Self::builder().build()
  }

  pub fn builder() -> AxTextBuilder {
    AxTextBuilder::default()
  }

  /// Subscribe to events from this instance.
  pub fn subscribe(&self) -> async_broadcast::Receiver<Event> {
    self.events_keepalive.activate_cloned()
  }

  /// Run the configured substitutions over `text`.
  pub fn substitute(&self, text: &str) -> String {
    self.substitutions.perform(text)
  }

  /// Leading whitespace statistics for `line` under the configured tab size
  /// and indentation. `None` when the line has no leading whitespace.
  pub fn classify_whitespace(&self, line: &str) -> Option<WhitespaceStatistics> {
    WhitespaceClassifier::new(line, self.tab_size, self.indentation).statistics()
  }

  fn emit(&self, event: Event) {
    emit(&self.events_tx, event);
  }
}

pub(crate) fn emit(tx: &Sender<Event>, event: Event) {
  if let Err(e) = tx.try_broadcast(event) {
    if e.is_full() {
      log::error!(
        "Event channel overflow - events are being dropped. \
         Consider increasing the event capacity or processing events faster."
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mock::MockObserver;
  use crate::text::Leading;
  use std::collections::HashMap;

  pub(super) fn axtext_with(observer: &Arc<MockObserver>) -> AxText {
    AxText::builder()
      .observer(Arc::clone(observer) as _)
      .build()
      .unwrap()
  }

  #[cfg(not(target_os = "macos"))]
  #[test]
  fn build_requires_observer_off_macos() {
    let err = AxText::builder().build().unwrap_err();
    assert!(matches!(err, AxError::NotSupported(_)));
  }

  #[test]
  fn substitutions_run_tables_then_decomposition() {
    let words = HashMap::from([("cafe".to_string(), "coffee shop".to_string())]);
    let axtext = AxText::builder()
      .observer(Arc::new(MockObserver::new()))
      .substitutions(SimpleSubstitutions::new(words, HashMap::new()))
      .decompose(true)
      .build()
      .unwrap();
    assert_eq!(axtext.substitute("cafe café"), "coffee shop cafe");
  }

  #[test]
  fn markup_passes_are_opt_in() {
    let axtext = AxText::builder()
      .observer(Arc::new(MockObserver::new()))
      .expand_punctuation(true)
      .expand_abbreviations(true)
      .build()
      .unwrap();
    assert_eq!(
      axtext.substitute("wait 5ms (twice)"),
      "wait 5[[char ltrl]]ms[[char norm]] [[char ltrl]]([[char norm]]twice[[char ltrl]])[[char norm]]"
    );
    let plain = axtext_with(&Arc::new(MockObserver::new()));
    assert_eq!(plain.substitute("wait 5ms (twice)"), "wait 5ms (twice)");
  }

  #[test]
  fn no_substitutions_is_identity() {
    let axtext = axtext_with(&Arc::new(MockObserver::new()));
    assert_eq!(axtext.substitute("café ﬁ"), "café ﬁ");
  }

  #[test]
  fn whitespace_uses_configured_tab_size() {
    let axtext = AxText::builder()
      .observer(Arc::new(MockObserver::new()))
      .tab_size(2)
      .build()
      .unwrap();
    let stats = axtext.classify_whitespace("     x").unwrap();
    assert_eq!(stats.tab_size, 2);
    assert_eq!(stats.leading, Leading::LevelWithModulus(2, 1));
    assert!(axtext.classify_whitespace("x").is_none());
  }

  #[test]
  fn events_without_subscribers_are_dropped() {
    let axtext = axtext_with(&Arc::new(MockObserver::new()));
    axtext.emit(Event::TrackerStopped {
      tracker_id: crate::TrackerId(1),
    });
    let mut rx = axtext.subscribe();
    assert!(rx.try_recv().is_err());
  }
}
