/*!
WebSocket server.

Every connection first receives a `sync:init` message with the version and
the live trackers, then tracker events as they happen. Requests are
`{"id", "method", "args"}` objects; the reply carries the same `id`.
*/

use axtext::AxText;
use axum::{
  extract::{
    ws::{Message, WebSocket, WebSocketUpgrade},
    State,
  },
  response::Response,
  routing::get,
  Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::rpc::{dispatch_json, SyncInit};

/// Default WebSocket server port.
pub const DEFAULT_WS_PORT: u16 = 3030;
const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Methods that stop trackers, and with them platform observers.
const BLOCKING_METHODS: &[&str] = &["untrack"];

/// WebSocket state.
#[derive(Clone)]
pub struct WebSocketState {
  axtext: AxText,
  json_sender: Arc<broadcast::Sender<String>>,
  port: u16,
}

impl std::fmt::Debug for WebSocketState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WebSocketState")
      .field("port", &self.port)
      .finish_non_exhaustive()
  }
}

impl WebSocketState {
  /// Create with default port.
  pub fn new(axtext: AxText) -> Self {
    Self::with_port(axtext, DEFAULT_WS_PORT)
  }

  /// Create with custom port.
  pub fn with_port(axtext: AxText, port: u16) -> Self {
    let (json_tx, _) = broadcast::channel::<String>(DEFAULT_CHANNEL_CAPACITY);
    Self {
      axtext,
      json_sender: Arc::new(json_tx),
      port,
    }
  }
}

/// A client request. Missing fields default so the error names the method.
#[derive(Debug, Deserialize)]
struct Envelope {
  #[serde(default)]
  id: Value,
  #[serde(default)]
  method: String,
  #[serde(default)]
  args: Value,
}

/// Start the WebSocket server. Runs until the listener fails.
pub async fn start_server(ws_state: WebSocketState) -> std::io::Result<()> {
  tokio::spawn(forward_events(
    ws_state.axtext.subscribe(),
    Arc::clone(&ws_state.json_sender),
  ));

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  let addr = format!("127.0.0.1:{}", ws_state.port);
  let app = Router::new()
    .route("/ws", get(websocket_handler))
    .layer(cors)
    .with_state(ws_state);

  let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
    log::error!("Failed to bind WebSocket server to {addr}: {e}");
    e
  })?;
  log::info!("WebSocket server: ws://{addr}/ws");
  axum::serve(listener, app).await
}

/// Serialize tracker events once and fan them out to every connection.
async fn forward_events(
  mut events: async_broadcast::Receiver<axtext::Event>,
  sender: Arc<broadcast::Sender<String>>,
) {
  while let Ok(event) = events.recv().await {
    match serde_json::to_string(&event) {
      // No connected clients is not an error
      Ok(json) => drop(sender.send(json)),
      Err(e) => log::error!("Failed to serialize event: {e}"),
    }
  }
}

async fn websocket_handler(
  ws: WebSocketUpgrade,
  State(ws_state): State<WebSocketState>,
) -> Response {
  ws.on_upgrade(|socket| handle_websocket(socket, ws_state))
}

async fn handle_websocket(mut socket: WebSocket, ws_state: WebSocketState) {
  let mut events = ws_state.json_sender.subscribe();
  if socket
    .send(Message::Text(sync_init_message(&ws_state.axtext)))
    .await
    .is_err()
  {
    return;
  }

  loop {
    let open = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(text))) => {
          let reply = handle_request(&text, &ws_state).await;
          // Events caused by the request go out before its reply
          while let Ok(event_json) = events.try_recv() {
            drop(socket.send(Message::Text(event_json)).await);
          }
          socket.send(Message::Text(reply)).await.is_ok()
        }
        Some(Ok(Message::Close(_))) | None => {
          log::debug!("[ws] client disconnected");
          false
        }
        Some(Err(e)) => {
          log::warn!("[ws] socket error: {e}");
          false
        }
        Some(Ok(_)) => true,
      },
      event = events.recv() => match event {
        Ok(event_json) => socket.send(Message::Text(event_json)).await.is_ok(),
        Err(broadcast::error::RecvError::Lagged(n)) => {
          log::warn!("[ws] client lagged, dropped {n} tracker events");
          true
        }
        Err(broadcast::error::RecvError::Closed) => false,
      },
    };
    if !open {
      break;
    }
  }
}

fn sync_init_message(axtext: &AxText) -> String {
  json!({ "event": "sync:init", "data": SyncInit::of(axtext) }).to_string()
}

async fn handle_request(request: &str, ws_state: &WebSocketState) -> String {
  let envelope: Envelope = match serde_json::from_str(request) {
    Ok(envelope) => envelope,
    Err(e) => return json!({ "error": format!("Invalid JSON: {e}") }).to_string(),
  };
  let Envelope { id, method, args } = envelope;

  let mut response = if BLOCKING_METHODS.contains(&method.as_str()) {
    let axtext = ws_state.axtext.clone();
    tokio::task::spawn_blocking(move || dispatch_json(&axtext, &method, &args))
      .await
      .unwrap_or_else(|_| json!({ "error": "RPC task panicked" }))
  } else {
    dispatch_json(&ws_state.axtext, &method, &args)
  };
  if let Some(obj) = response.as_object_mut() {
    obj.insert("id".to_string(), id);
  }
  response.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use axtext::mock::{MockElement, MockObserver};

  fn state() -> WebSocketState {
    let axtext = AxText::builder()
      .observer(Arc::new(MockObserver::new()))
      .build()
      .unwrap();
    WebSocketState::with_port(axtext, 0)
  }

  fn parse(reply: &str) -> Value {
    serde_json::from_str(reply).unwrap()
  }

  #[tokio::test]
  async fn responses_echo_request_id() {
    let reply = handle_request(r#"{"id":7,"method":"substitute","args":{"text":"hi"}}"#, &state()).await;
    let reply = parse(&reply);
    assert_eq!(reply["id"], 7);
    assert_eq!(reply["result"], "hi");
  }

  #[tokio::test]
  async fn untrack_runs_off_the_async_workers() {
    let ws_state = state();
    let id = ws_state
      .axtext
      .track_integer_indices(Arc::new(MockElement::new(4, "text")))
      .unwrap();
    let request = json!({ "id": "u", "method": "untrack", "args": { "tracker_id": id.0 } });
    let reply = parse(&handle_request(&request.to_string(), &ws_state).await);
    assert_eq!(reply["id"], "u");
    assert_eq!(reply["result"], true);
    assert!(ws_state.axtext.tracked().is_empty());
  }

  #[tokio::test]
  async fn missing_method_is_reported_with_id() {
    let reply = parse(&handle_request(r#"{"id":1}"#, &state()).await);
    assert_eq!(reply["id"], 1);
    assert!(reply["error"].as_str().unwrap().starts_with("Invalid request"));
  }

  #[tokio::test]
  async fn invalid_json_is_reported() {
    let reply = handle_request("{", &state()).await;
    assert!(reply.contains("Invalid JSON"));
  }

  #[test]
  fn sync_init_is_tagged_like_events() {
    let ws_state = state();
    ws_state
      .axtext
      .track_integer_indices(Arc::new(MockElement::new(2, "x")))
      .unwrap();
    let message = parse(&sync_init_message(&ws_state.axtext));
    assert_eq!(message["event"], "sync:init");
    assert_eq!(message["data"]["trackers"][0]["process_id"], 2);
  }

  #[tokio::test]
  async fn events_are_forwarded_as_json() {
    let ws_state = state();
    let mut json_rx = ws_state.json_sender.subscribe();
    tokio::spawn(forward_events(
      ws_state.axtext.subscribe(),
      Arc::clone(&ws_state.json_sender),
    ));
    let id = ws_state
      .axtext
      .track_integer_indices(Arc::new(MockElement::new(6, "x")))
      .unwrap();
    let started = parse(&json_rx.recv().await.unwrap());
    assert_eq!(started["event"], "tracker:started");
    assert_eq!(started["data"]["tracker_id"], id.0);
  }
}
