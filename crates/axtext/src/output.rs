/*!
Output produced for the user: speech, sounds and pauses.

Nothing here synthesizes speech. Jobs are handed to an [`OutputSink`]; the
`AxText` instance forwards them as [`Event::Output`](crate::Event::Output).
*/

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single unit of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum Payload {
  /// Text to speak, with an optional language tag.
  Speech(String, Option<String>),
  /// Named sound cue.
  Sound(String),
  /// Silence, in milliseconds.
  Pause(u64),
}

impl Payload {
  /// Speech in the default language.
  pub fn speech(text: impl Into<String>) -> Self {
    Self::Speech(text.into(), None)
  }

  /// Apply `f` to spoken text, leaving other payloads alone.
  #[must_use]
  pub fn map_speech(self, f: impl FnOnce(&str) -> String) -> Self {
    match self {
      Self::Speech(text, language) => Self::Speech(f(&text), language),
      other @ (Self::Sound(_) | Self::Pause(_)) => other,
    }
  }
}

/// Payloads submitted together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Job {
  pub payloads: Vec<Payload>,
  /// Cancel anything still playing before this job starts.
  pub interrupt: bool,
}

impl Job {
  pub const fn new(payloads: Vec<Payload>) -> Self {
    Self {
      payloads,
      interrupt: false,
    }
  }

  #[must_use]
  pub const fn interrupting(mut self) -> Self {
    self.interrupt = true;
    self
  }
}

/// Receiver of output jobs.
pub type OutputSink = Arc<dyn Fn(Job) + Send + Sync>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn speech_serializes_with_language() {
    let json = serde_json::to_value(Payload::Speech("hi".into(), Some("en".into()))).unwrap();
    assert_eq!(json["type"], "speech");
    assert_eq!(json["value"][0], "hi");
    assert_eq!(json["value"][1], "en");
  }

  #[test]
  fn map_speech_skips_sounds() {
    let upper = |s: &str| s.to_uppercase();
    assert_eq!(Payload::speech("ab").map_speech(upper), Payload::speech("AB"));
    assert_eq!(
      Payload::Sound("tick".into()).map_speech(upper),
      Payload::Sound("tick".into())
    );
  }

  #[test]
  fn jobs_default_to_queueing() {
    let job = Job::new(vec![Payload::Pause(20)]);
    assert!(!job.interrupt);
    assert!(job.interrupting().interrupt);
  }
}
