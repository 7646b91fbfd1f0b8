//! Wire protocol and WebSocket transport.
//!
//! The transport client owns one logical connection: open/close lifecycle,
//! ping/pong heartbeat with timeout detection, and backoff-based
//! reconnection. It is poll-driven: the event loop calls
//! [`TransportClient::poll`] with the current time, which drives every
//! timer and yields [`ClientEvent`]s for the engine. The client holds no
//! domain knowledge of pixels.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);
pub const BASE_RECONNECT_DELAY: Duration = Duration::from_millis(1500);
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(15);

/// One remote cell update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelUpdate {
    pub x: i32,
    pub y: i32,
    pub c: u8,
}

/// Messages exchanged with the server, JSON-framed and tagged by `t`.
///
/// Inbound tags the engine does not recognize land on `Unknown` so new
/// server message types no-op instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum WireMessage {
    #[serde(rename = "place")]
    Place { x: i32, y: i32, c: u8 },
    #[serde(rename = "fillRect")]
    FillRect { x0: i32, y0: i32, x1: i32, y1: i32, c: u8 },
    #[serde(rename = "multi", alias = "batch", alias = "pixels")]
    Multi { list: Vec<PixelUpdate> },
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong", alias = "heartbeat", alias = "hb", alias = "ack")]
    Pong,
    #[serde(rename = "error")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    #[serde(rename = "denied", alias = "forbidden")]
    Denied {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events surfaced to the engine by [`TransportClient::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The socket opened; the client is connected.
    Opened,
    /// The socket closed (any cause).
    Closed,
    /// A reconnect was scheduled after a non-manual close.
    Reconnecting { attempt: u32, delay: Duration },
    /// A heartbeat response arrived; `rtt` measures the last ping round trip.
    Heartbeat { rtt: Option<Duration> },
    /// A parsed inbound message for the reconciler.
    Message(WireMessage),
    /// A connection-level error, human readable.
    Error { message: String },
}

/// Raw events produced by a transport backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Opened,
    Message(String),
    Closed,
    Error(String),
}

/// A WebSocket-shaped byte pipe the client drives.
///
/// Contract: `open` and `close` both discard any previous socket along with
/// its undelivered events, so `poll` only ever reports events from the most
/// recent socket.
pub trait SocketTransport {
    /// Begin an asynchronous connect. `Err` means construction failed
    /// outright (no `Closed` event will follow).
    fn open(&mut self, url: &str) -> Result<(), String>;

    /// Drain pending socket events.
    fn poll(&mut self) -> Vec<SocketEvent>;

    /// Send one text frame. Returns `false` when the socket is not open.
    fn send(&mut self, text: &str) -> bool;

    /// Close the socket. Idempotent.
    fn close(&mut self);
}

/// Connection state machine over a [`SocketTransport`].
#[derive(Debug)]
pub struct TransportClient<S> {
    socket: S,
    state: ConnectionState,
    url: Option<String>,
    manual_close: bool,
    reconnect_attempt: u32,
    reconnect_at: Option<Instant>,
    next_ping_at: Option<Instant>,
    pong_deadline: Option<Instant>,
    last_ping_sent_at: Option<Instant>,
    last_heartbeat_at: Option<Instant>,
    error_message: Option<String>,
    events: Vec<ClientEvent>,
}

impl<S: SocketTransport> TransportClient<S> {
    pub fn new(socket: S) -> Self {
        Self {
            socket,
            state: ConnectionState::Disconnected,
            url: None,
            manual_close: false,
            reconnect_attempt: 0,
            reconnect_at: None,
            next_ping_at: None,
            pong_deadline: None,
            last_ping_sent_at: None,
            last_heartbeat_at: None,
            error_message: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn reconnect_attempt(&self) -> u32 {
        self.reconnect_attempt
    }

    pub fn last_heartbeat_at(&self) -> Option<Instant> {
        self.last_heartbeat_at
    }

    /// Tear down any existing connection and dial a new one.
    pub fn connect(&mut self, url: &str, now: Instant) {
        self.socket.close();
        self.clear_timers();
        self.url = Some(url.trim().to_string());
        self.manual_close = false;
        self.reconnect_attempt = 0;
        self.error_message = None;
        self.open(now);
    }

    /// Manually close. Cancels the heartbeat and any pending reconnect
    /// synchronously, so neither can fire afterwards. Terminal until the
    /// next `connect`.
    pub fn disconnect(&mut self) {
        self.manual_close = true;
        self.clear_timers();
        self.socket.close();
        self.state = ConnectionState::Disconnected;
        log::info!("websocket disconnected");
    }

    /// Send one message. Fails (without queuing) unless connected: callers
    /// re-derive state from the grid, not from a send queue.
    pub fn send(&mut self, msg: &WireMessage) -> bool {
        if self.state != ConnectionState::Connected {
            return false;
        }
        match serde_json::to_string(msg) {
            Ok(text) => self.socket.send(&text),
            Err(err) => {
                log::warn!("failed to encode outbound message: {}", err);
                false
            }
        }
    }

    /// Drain socket events and drive every timer. All state transitions
    /// happen here or in `connect`/`disconnect`.
    pub fn poll(&mut self, now: Instant) -> Vec<ClientEvent> {
        let mut out = std::mem::take(&mut self.events);

        for event in self.socket.poll() {
            match event {
                SocketEvent::Opened => {
                    log::info!("websocket connected: {}", self.url.as_deref().unwrap_or(""));
                    self.state = ConnectionState::Connected;
                    self.reconnect_attempt = 0;
                    self.reconnect_at = None;
                    self.error_message = None;
                    self.last_heartbeat_at = Some(now);
                    out.push(ClientEvent::Opened);
                    self.send_ping(now);
                }
                SocketEvent::Message(text) => self.handle_frame(&text, now, &mut out),
                SocketEvent::Closed => self.handle_closed(now, &mut out),
                SocketEvent::Error(message) => {
                    log::warn!("websocket error: {}", message);
                    self.error_message = Some(message.clone());
                    self.state = ConnectionState::Error;
                    out.push(ClientEvent::Error { message });
                }
            }
        }

        // Heartbeat timeout: the sole mechanism for detecting a silently
        // dead connection. Force the socket closed and take the normal
        // close/reconnect path.
        if self.state == ConnectionState::Connected
            && self.pong_deadline.is_some_and(|t| now >= t)
        {
            log::warn!("heartbeat timeout, forcing reconnect");
            let message = "heartbeat timeout".to_string();
            self.error_message = Some(message.clone());
            self.state = ConnectionState::Error;
            out.push(ClientEvent::Error { message });
            self.socket.close();
            self.handle_closed(now, &mut out);
        }

        if self.state == ConnectionState::Connected
            && self.next_ping_at.is_some_and(|t| now >= t)
        {
            self.send_ping(now);
        }

        if !self.manual_close && self.reconnect_at.is_some_and(|t| now >= t) {
            self.reconnect_at = None;
            self.open(now);
        }

        out
    }

    fn open(&mut self, now: Instant) {
        let Some(url) = self.url.clone() else {
            return;
        };
        self.stop_heartbeat();
        self.state = ConnectionState::Connecting;
        if let Err(err) = self.socket.open(&url) {
            // Construction failure feeds the same reconnect path as a close.
            log::error!("failed to open websocket: {}", err);
            self.error_message = Some(err.clone());
            self.state = ConnectionState::Error;
            self.events.push(ClientEvent::Error { message: err });
            let mut out = std::mem::take(&mut self.events);
            self.schedule_reconnect(now, &mut out);
            self.events = out;
        }
    }

    fn handle_closed(&mut self, now: Instant, out: &mut Vec<ClientEvent>) {
        self.stop_heartbeat();
        out.push(ClientEvent::Closed);
        if self.manual_close {
            self.state = ConnectionState::Disconnected;
            return;
        }
        if self.state != ConnectionState::Error {
            self.state = ConnectionState::Disconnected;
        }
        self.schedule_reconnect(now, out);
    }

    fn schedule_reconnect(&mut self, now: Instant, out: &mut Vec<ClientEvent>) {
        if self.manual_close || self.url.is_none() {
            return;
        }
        self.reconnect_attempt += 1;
        let delay = (BASE_RECONNECT_DELAY * self.reconnect_attempt).min(MAX_RECONNECT_DELAY);
        self.reconnect_at = Some(now + delay);
        log::info!(
            "reconnect attempt {} scheduled in {:?}",
            self.reconnect_attempt,
            delay
        );
        out.push(ClientEvent::Reconnecting {
            attempt: self.reconnect_attempt,
            delay,
        });
    }

    fn handle_frame(&mut self, text: &str, now: Instant, out: &mut Vec<ClientEvent>) {
        let msg: WireMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(err) => {
                log::warn!("dropping malformed frame: {}", err);
                return;
            }
        };

        match &msg {
            WireMessage::Pong => self.mark_heartbeat(now, out),
            WireMessage::Ping => {
                // Answer server-driven heartbeats.
                let _ = self.send(&WireMessage::Pong);
                self.mark_heartbeat(now, out);
            }
            WireMessage::Error { message } => {
                let message = message.clone().unwrap_or_else(|| "server error".to_string());
                log::error!("server error: {}", message);
                self.error_message = Some(message);
            }
            WireMessage::Denied { message, reason } => {
                let message = message
                    .clone()
                    .or_else(|| reason.clone())
                    .unwrap_or_else(|| "permission denied".to_string());
                log::warn!("server denied request: {}", message);
                self.error_message = Some(message);
            }
            _ => {}
        }

        out.push(ClientEvent::Message(msg));
    }

    fn send_ping(&mut self, now: Instant) {
        if self.send(&WireMessage::Ping) {
            self.last_ping_sent_at = Some(now);
            self.pong_deadline = Some(now + HEARTBEAT_TIMEOUT);
        }
        self.next_ping_at = Some(now + HEARTBEAT_INTERVAL);
    }

    fn mark_heartbeat(&mut self, now: Instant, out: &mut Vec<ClientEvent>) {
        self.pong_deadline = None;
        self.last_heartbeat_at = Some(now);
        let rtt = self.last_ping_sent_at.map(|t| now.duration_since(t));
        out.push(ClientEvent::Heartbeat { rtt });
    }

    fn stop_heartbeat(&mut self) {
        self.next_ping_at = None;
        self.pong_deadline = None;
        self.last_ping_sent_at = None;
    }

    fn clear_timers(&mut self) {
        self.stop_heartbeat();
        self.reconnect_at = None;
    }
}

// ============================================================================
// Native WebSocket transport
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::{SocketEvent, SocketTransport};
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{Message, connect};
    use url::Url;

    enum Command {
        Send(String),
        Close,
    }

    /// WebSocket transport backed by a worker thread, so reads never block
    /// the event loop.
    #[derive(Default)]
    pub struct WebSocketTransport {
        cmd_tx: Option<Sender<Command>>,
        event_rx: Option<Receiver<SocketEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl WebSocketTransport {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl SocketTransport for WebSocketTransport {
        fn open(&mut self, url: &str) -> Result<(), String> {
            self.close();

            let parsed = Url::parse(url).map_err(|e| format!("Invalid URL: {}", e))?;
            if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                return Err(format!("Invalid WebSocket URL scheme: {}", parsed.scheme()));
            }

            let (cmd_tx, cmd_rx) = channel::<Command>();
            let (event_tx, event_rx) = channel::<SocketEvent>();
            let url = url.to_string();

            let handle = thread::spawn(move || {
                log::debug!("websocket thread: connecting to {}", url);

                let mut socket = match connect(&url) {
                    Ok((socket, response)) => {
                        log::debug!("websocket handshake status: {}", response.status());
                        socket
                    }
                    Err(e) => {
                        let _ = event_tx.send(SocketEvent::Error(format!(
                            "Connection failed: {}",
                            e
                        )));
                        let _ = event_tx.send(SocketEvent::Closed);
                        return;
                    }
                };
                let _ = event_tx.send(SocketEvent::Opened);

                // Short read timeout keeps the command channel responsive.
                if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
                    let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                    let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
                }

                loop {
                    match cmd_rx.try_recv() {
                        Ok(Command::Send(text)) => {
                            if let Err(e) = socket.send(Message::Text(text)) {
                                let _ = event_tx
                                    .send(SocketEvent::Error(format!("Send failed: {}", e)));
                                break;
                            }
                        }
                        Ok(Command::Close) | Err(TryRecvError::Disconnected) => {
                            let _ = socket.close(None);
                            break;
                        }
                        Err(TryRecvError::Empty) => {}
                    }

                    match socket.read() {
                        Ok(Message::Text(text)) => {
                            let _ = event_tx.send(SocketEvent::Message(text));
                        }
                        Ok(Message::Ping(payload)) => {
                            // Protocol-level keepalive, answered in place.
                            let _ = socket.send(Message::Pong(payload));
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {} // binary, pong
                        Err(tungstenite::Error::Io(ref e))
                            if e.kind() == std::io::ErrorKind::WouldBlock
                                || e.kind() == std::io::ErrorKind::TimedOut =>
                        {
                            continue;
                        }
                        Err(e) => {
                            let _ =
                                event_tx.send(SocketEvent::Error(format!("Read failed: {}", e)));
                            break;
                        }
                    }
                }

                let _ = event_tx.send(SocketEvent::Closed);
            });

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);
            Ok(())
        }

        fn poll(&mut self) -> Vec<SocketEvent> {
            let mut events = Vec::new();
            if let Some(ref rx) = self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    events.push(event);
                }
            }
            events
        }

        fn send(&mut self, text: &str) -> bool {
            match self.cmd_tx {
                Some(ref tx) => tx.send(Command::Send(text.to_string())).is_ok(),
                None => false,
            }
        }

        fn close(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(Command::Close);
            }
            // Dropping the receiver discards any undelivered events from the
            // old socket, per the trait contract.
            self.event_rx = None;
            self._thread = None;
        }
    }

    impl Drop for WebSocketTransport {
        fn drop(&mut self) {
            self.close();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::WebSocketTransport;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSocket {
        queued: Vec<SocketEvent>,
        sent: Vec<String>,
        open_calls: u32,
        close_calls: u32,
        fail_open: bool,
    }

    impl SocketTransport for FakeSocket {
        fn open(&mut self, _url: &str) -> Result<(), String> {
            self.open_calls += 1;
            if self.fail_open {
                Err("construction failed".to_string())
            } else {
                Ok(())
            }
        }

        fn poll(&mut self) -> Vec<SocketEvent> {
            std::mem::take(&mut self.queued)
        }

        fn send(&mut self, text: &str) -> bool {
            self.sent.push(text.to_string());
            true
        }

        fn close(&mut self) {
            self.close_calls += 1;
            self.queued.clear();
        }
    }

    fn connected_client() -> (TransportClient<FakeSocket>, Instant) {
        let now = Instant::now();
        let mut client = TransportClient::new(FakeSocket::default());
        client.connect("ws://localhost:9000", now);
        client.socket.queued.push(SocketEvent::Opened);
        let events = client.poll(now);
        assert!(events.contains(&ClientEvent::Opened));
        (client, now)
    }

    #[test]
    fn test_open_sends_initial_ping() {
        let (client, _) = connected_client();
        assert_eq!(client.state(), ConnectionState::Connected);
        assert_eq!(client.socket.sent, vec![r#"{"t":"ping"}"#.to_string()]);
        assert!(client.pong_deadline.is_some());
    }

    #[test]
    fn test_pong_resets_timeout_and_reports_rtt() {
        let (mut client, now) = connected_client();
        let later = now + Duration::from_millis(40);
        client
            .socket
            .queued
            .push(SocketEvent::Message(r#"{"t":"pong"}"#.to_string()));
        let events = client.poll(later);

        assert!(client.pong_deadline.is_none());
        let rtt = events.iter().find_map(|e| match e {
            ClientEvent::Heartbeat { rtt } => *rtt,
            _ => None,
        });
        assert_eq!(rtt, Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_heartbeat_alias_tags_count() {
        for tag in ["heartbeat", "hb", "ack"] {
            let (mut client, now) = connected_client();
            client
                .socket
                .queued
                .push(SocketEvent::Message(format!(r#"{{"t":"{}"}}"#, tag)));
            let events = client.poll(now + Duration::from_millis(1));
            assert!(
                events.iter().any(|e| matches!(e, ClientEvent::Heartbeat { .. })),
                "tag {} should mark the heartbeat",
                tag
            );
        }
    }

    #[test]
    fn test_heartbeat_timeout_forces_reconnect() {
        let (mut client, now) = connected_client();
        let events = client.poll(now + HEARTBEAT_TIMEOUT);

        assert!(events.contains(&ClientEvent::Closed));
        let delay = events.iter().find_map(|e| match e {
            ClientEvent::Reconnecting { delay, .. } => Some(*delay),
            _ => None,
        });
        let delay = delay.expect("reconnect scheduled");
        assert!(delay > Duration::ZERO && delay <= MAX_RECONNECT_DELAY);
        assert_eq!(client.socket.close_calls, 2); // connect teardown + forced close
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let now = Instant::now();
        let mut client = TransportClient::new(FakeSocket::default());
        client.connect("ws://localhost:9000", now);

        let mut delays = Vec::new();
        let mut t = now;
        for _ in 0..12 {
            client.socket.queued.push(SocketEvent::Closed);
            for event in client.poll(t) {
                if let ClientEvent::Reconnecting { delay, .. } = event {
                    delays.push(delay);
                    t += delay;
                }
            }
            // Let the scheduled reconnect fire so the next cycle counts.
            client.poll(t);
        }

        assert_eq!(delays[0], BASE_RECONNECT_DELAY);
        assert_eq!(delays[1], BASE_RECONNECT_DELAY * 2);
        assert_eq!(*delays.last().unwrap(), MAX_RECONNECT_DELAY);
        assert!(delays.iter().all(|d| *d <= MAX_RECONNECT_DELAY));
    }

    #[test]
    fn test_successful_open_resets_attempts() {
        let now = Instant::now();
        let mut client = TransportClient::new(FakeSocket::default());
        client.connect("ws://localhost:9000", now);

        client.socket.queued.push(SocketEvent::Closed);
        client.poll(now);
        assert_eq!(client.reconnect_attempt(), 1);

        let t = now + MAX_RECONNECT_DELAY;
        client.poll(t); // reconnect fires
        client.socket.queued.push(SocketEvent::Opened);
        client.poll(t);
        assert_eq!(client.reconnect_attempt(), 0);
        assert_eq!(client.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_manual_disconnect_cancels_reconnect() {
        let (mut client, now) = connected_client();
        client.socket.queued.push(SocketEvent::Closed);
        client.poll(now); // schedules a reconnect

        client.disconnect();
        let opens_before = client.socket.open_calls;
        client.poll(now + MAX_RECONNECT_DELAY + Duration::from_secs(1));

        assert_eq!(client.socket.open_calls, opens_before);
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_send_fails_when_not_connected() {
        let mut client = TransportClient::new(FakeSocket::default());
        assert!(!client.send(&WireMessage::Ping));
        assert!(client.socket.sent.is_empty());
    }

    #[test]
    fn test_construction_failure_schedules_reconnect() {
        let now = Instant::now();
        let mut socket = FakeSocket::default();
        socket.fail_open = true;
        let mut client = TransportClient::new(socket);
        client.connect("ws://localhost:9000", now);

        let events = client.poll(now);
        assert!(events.iter().any(|e| matches!(e, ClientEvent::Error { .. })));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ClientEvent::Reconnecting { attempt: 1, .. }))
        );
        assert_eq!(client.state(), ConnectionState::Error);
    }

    #[test]
    fn test_malformed_frame_dropped() {
        let (mut client, now) = connected_client();
        client
            .socket
            .queued
            .push(SocketEvent::Message("{not json".to_string()));
        let events = client.poll(now);
        assert!(!events.iter().any(|e| matches!(e, ClientEvent::Message(_))));
        assert_eq!(client.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_unknown_tag_parses_to_unknown() {
        let (mut client, now) = connected_client();
        client.socket.queued.push(SocketEvent::Message(
            r#"{"t":"presence","users":3}"#.to_string(),
        ));
        let events = client.poll(now);
        assert!(events.contains(&ClientEvent::Message(WireMessage::Unknown)));
    }

    #[test]
    fn test_server_ping_answered_with_pong() {
        let (mut client, now) = connected_client();
        client.socket.sent.clear();
        client
            .socket
            .queued
            .push(SocketEvent::Message(r#"{"t":"ping"}"#.to_string()));
        client.poll(now);
        assert_eq!(client.socket.sent, vec![r#"{"t":"pong"}"#.to_string()]);
    }

    #[test]
    fn test_wire_message_shapes() {
        let place = serde_json::to_string(&WireMessage::Place { x: 1, y: 2, c: 3 }).unwrap();
        assert_eq!(place, r#"{"t":"place","x":1,"y":2,"c":3}"#);

        let rect: WireMessage =
            serde_json::from_str(r#"{"t":"fillRect","x0":0,"y0":0,"x1":3,"y1":3,"c":7}"#).unwrap();
        assert_eq!(
            rect,
            WireMessage::FillRect { x0: 0, y0: 0, x1: 3, y1: 3, c: 7 }
        );

        let batch: WireMessage =
            serde_json::from_str(r#"{"t":"pixels","list":[{"x":1,"y":1,"c":2}]}"#).unwrap();
        assert_eq!(
            batch,
            WireMessage::Multi { list: vec![PixelUpdate { x: 1, y: 1, c: 2 }] }
        );

        let denied: WireMessage =
            serde_json::from_str(r#"{"t":"forbidden","reason":"rate limited"}"#).unwrap();
        assert_eq!(
            denied,
            WireMessage::Denied { message: None, reason: Some("rate limited".to_string()) }
        );
    }
}
