/*!
RPC request/response types and dispatch.
*/

#![allow(missing_docs)]

use axtext::text::WhitespaceStatistics;
use axtext::{AxText, TrackerId, TrackerInfo};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use ts_rs::TS;

/// RPC request.
#[derive(Debug, Deserialize, TS)]
#[serde(tag = "method", content = "args", rename_all = "snake_case")]
#[ts(export)]
pub enum RpcRequest {
  /// Library version.
  Version,
  /// Leading whitespace statistics of a line.
  ClassifyWhitespace { line: String },
  /// Run the configured substitutions over text.
  Substitute { text: String },
  /// List live selection trackers.
  Tracked,
  /// Stop a selection tracker.
  Untrack { tracker_id: TrackerId },
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct VersionInfo {
  pub string: String,
  pub number: f64,
}

impl VersionInfo {
  pub fn current() -> Self {
    Self {
      string: axtext::VERSION_STRING.to_string(),
      number: axtext::VERSION_NUMBER,
    }
  }
}

/// State a client needs before events make sense, sent once per connection
/// as `{"event": "sync:init", "data": ...}`.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SyncInit {
  pub version: VersionInfo,
  pub trackers: Vec<TrackerInfo>,
}

impl SyncInit {
  pub fn of(axtext: &AxText) -> Self {
    Self {
      version: VersionInfo::current(),
      trackers: axtext.tracked(),
    }
  }
}

/// RPC response.
#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum RpcResponse {
  Version(VersionInfo),
  /// `null` when the line has no leading whitespace.
  Whitespace(Option<WhitespaceStatistics>),
  Text(String),
  Trackers(Vec<TrackerInfo>),
  Bool(bool),
}

pub fn dispatch_json(axtext: &AxText, method: &str, args: &JsonValue) -> JsonValue {
  let request_value = json!({ "method": method, "args": args });

  match serde_json::from_value::<RpcRequest>(request_value) {
    Ok(request) => match dispatch(axtext, request) {
      Ok(response) => json!({ "result": response }),
      Err(e) => {
        log::warn!("[rpc] {method} failed: {e}");
        json!({ "error": e })
      }
    },
    Err(e) => {
      log::warn!("[rpc] Invalid request for {method}: {e}");
      json!({ "error": format!("Invalid request: {e}") })
    }
  }
}

pub fn dispatch(axtext: &AxText, request: RpcRequest) -> Result<RpcResponse, String> {
  match request {
    RpcRequest::Version => Ok(RpcResponse::Version(VersionInfo::current())),

    RpcRequest::ClassifyWhitespace { line } => {
      Ok(RpcResponse::Whitespace(axtext.classify_whitespace(&line)))
    }

    RpcRequest::Substitute { text } => Ok(RpcResponse::Text(axtext.substitute(&text))),

    RpcRequest::Tracked => Ok(RpcResponse::Trackers(axtext.tracked())),

    RpcRequest::Untrack { tracker_id } => Ok(RpcResponse::Bool(axtext.untrack(tracker_id))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axtext::mock::{MockElement, MockObserver};
  use std::collections::HashMap;
  use std::sync::Arc;

  fn axtext() -> AxText {
    let words = HashMap::from([("btn".to_string(), "button".to_string())]);
    AxText::builder()
      .observer(Arc::new(MockObserver::new()))
      .substitutions(axtext::text::SimpleSubstitutions::new(words, HashMap::new()))
      .build()
      .unwrap()
  }

  #[test]
  fn version_reports_package() {
    let response = dispatch_json(&axtext(), "version", &JsonValue::Null);
    assert_eq!(response["result"]["string"], axtext::VERSION_STRING);
  }

  #[test]
  fn substitute_uses_configured_tables() {
    let response = dispatch_json(&axtext(), "substitute", &json!({ "text": "ok btn" }));
    assert_eq!(response["result"], "ok button");
  }

  #[test]
  fn classify_whitespace_returns_levels_or_null() {
    let ax = axtext();
    let response = dispatch_json(&ax, "classify_whitespace", &json!({ "line": "        x" }));
    assert_eq!(response["result"]["tab_size"], 4);
    assert_eq!(response["result"]["leading"]["kind"], "level");
    assert_eq!(response["result"]["leading"]["value"], 2);
    let response = dispatch_json(&ax, "classify_whitespace", &json!({ "line": "x" }));
    assert!(response["result"].is_null());
  }

  #[test]
  fn tracked_and_untrack() {
    let ax = axtext();
    let id = ax
      .track_integer_indices(Arc::new(MockElement::new(5, "text")))
      .unwrap();
    let response = dispatch_json(&ax, "tracked", &JsonValue::Null);
    assert_eq!(response["result"][0]["tracker_id"], id.0);
    assert_eq!(response["result"][0]["index"], "integer");

    let response = dispatch_json(&ax, "untrack", &json!({ "tracker_id": id.0 }));
    assert_eq!(response["result"], true);
    let response = dispatch_json(&ax, "untrack", &json!({ "tracker_id": id.0 }));
    assert_eq!(response["result"], false);
  }

  #[test]
  fn sync_init_lists_live_trackers() {
    let ax = axtext();
    assert!(SyncInit::of(&ax).trackers.is_empty());
    let id = ax
      .track_text_markers(Arc::new(MockElement::new(3, "web").with_caret_browsing(false)))
      .unwrap();
    let init = serde_json::to_value(SyncInit::of(&ax)).unwrap();
    assert_eq!(init["version"]["string"], axtext::VERSION_STRING);
    assert_eq!(init["trackers"][0]["tracker_id"], id.0);
    assert_eq!(init["trackers"][0]["index"], "text_marker");
  }

  #[test]
  fn unknown_method_is_an_error() {
    let response = dispatch_json(&axtext(), "snapshot", &JsonValue::Null);
    assert!(response["error"].as_str().unwrap().starts_with("Invalid request"));
  }
}
