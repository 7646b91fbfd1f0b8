//! Pixelboard WebSocket Relay
//!
//! A minimal relay for exercising the client sync path locally. It holds no
//! board state and no authority: every JSON frame with a recognized shape is
//! fanned out verbatim to the other connected clients, and `ping` frames are
//! answered with `pong`.
//!
//! ## Protocol
//!
//! Frames are JSON objects tagged by `t`:
//! ```json
//! { "t": "place", "x": 10, "y": 20, "c": 7 }
//! { "t": "fillRect", "x0": 0, "y0": 0, "x1": 3, "y1": 3, "c": 7 }
//! { "t": "ping" }
//! ```

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

/// Shared relay state: one broadcast channel for the single board.
struct AppState {
    /// Frames fanned out to every client, tagged with the sender's peer id.
    tx: broadcast::Sender<(String, String)>,
    /// Connected client count, for the health endpoint and logs.
    peers: AtomicUsize,
}

impl AppState {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            peers: AtomicUsize::new(0),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelboard_relay=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3030));
    info!("Pixelboard relay listening on {}", addr);
    info!("WebSocket endpoint: ws://localhost:3030/ws");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn index() -> &'static str {
    "Pixelboard Relay - Connect via WebSocket at /ws"
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4().to_string();
    let peers = state.peers.fetch_add(1, Ordering::Relaxed) + 1;
    info!("New connection: {} ({} connected)", peer_id, peers);

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.tx.subscribe();

    loop {
        tokio::select! {
            // Frames from this client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match frame_tag(&text) {
                            Some(tag) if tag == "ping" => {
                                if sender
                                    .send(Message::Text(r#"{"t":"pong"}"#.into()))
                                    .await
                                    .is_err()
                                {
                                    break;
                                }
                            }
                            Some(tag) => {
                                tracing::debug!("relaying '{}' from {}", tag, peer_id);
                                let _ = state.tx.send((peer_id.clone(), text.to_string()));
                            }
                            None => {
                                warn!("Invalid frame from {}", peer_id);
                                let err = r#"{"t":"error","message":"Invalid frame: expected a JSON object with a string 't' field"}"#;
                                let _ = sender.send(Message::Text(err.into())).await;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if sender.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // binary, pong
                    Some(Err(e)) => {
                        warn!("Receive error from {}: {}", peer_id, e);
                        break;
                    }
                }
            }
            // Frames from other clients
            broadcast = rx.recv() => {
                match broadcast {
                    Ok((from, text)) => {
                        if from == peer_id {
                            continue;
                        }
                        if sender.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Peer {} lagged, skipped {} frames", peer_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let peers = state.peers.fetch_sub(1, Ordering::Relaxed) - 1;
    info!("Connection closed: {} ({} connected)", peer_id, peers);
}

/// The `t` tag of a JSON frame, or `None` if the frame is not an object
/// with a string tag.
fn frame_tag(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    value.get("t")?.as_str().map(|s| s.to_string())
}
