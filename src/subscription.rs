//! Live task-list subscription over WebSocket.
//!
//! A subscription is a stream of full snapshots: the server re-delivers the
//! complete, ordered result set of the subscribed query on registration and
//! after every accepted write from any client or session. The consumer's
//! contract is "apply latest, discard stale" — there is no incremental
//! diffing.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant as TokioInstant;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest,
        error::Error as WsError,
        http::header::{HeaderValue, AUTHORIZATION},
        protocol::Message,
    },
};

use crate::{
    error::{Result, TaskLinkError},
    event_handlers::{ConnectionError, DisconnectReason, EventHandlers},
    models::{ClientMessage, ServerMessage, Task, UserId},
    timeouts::TaskLinkTimeouts,
};

type WebSocketStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<TcpStream>>;

const MAX_WS_TEXT_MESSAGE_BYTES: usize = 16 << 20; // 16 MiB

/// Capacity of the channel between the background reader task and the
/// consumer. Snapshots are full replacements, so deep buffering buys
/// nothing; the consumer drains in delivery order and the last applied
/// snapshot wins.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 32;

/// Derive the subscription endpoint from the HTTP base URL.
///
/// http → ws, https → wss; a downgrade below the base URL's security level
/// is impossible by construction since the scheme is mapped, not supplied.
fn resolve_ws_url(base_url: &str) -> Result<String> {
    let base = Url::parse(base_url.trim()).map_err(|e| {
        TaskLinkError::Configuration(format!("Invalid base_url '{}': {}", base_url, e))
    })?;

    if base.host_str().is_none() {
        return Err(TaskLinkError::Configuration(
            "base_url must include a host".to_string(),
        ));
    }

    let ws_scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(TaskLinkError::Configuration(format!(
                "Unsupported base_url scheme '{}'; expected http(s) or ws(s)",
                other
            )));
        }
    };

    let mut ws_url = base;
    ws_url.set_scheme(ws_scheme).map_err(|_| {
        TaskLinkError::Configuration("Failed to set WebSocket URL scheme".to_string())
    })?;
    ws_url.set_path("/v1/ws");
    ws_url.set_query(None);
    ws_url.set_fragment(None);

    Ok(ws_url.to_string())
}

/// Spread keepalive pings across connections to avoid synchronized bursts.
///
/// Jitter is derived from the subscription id, so a reconnecting
/// subscription keeps its phase.
fn jitter_keepalive_interval(base: Duration, subscription_id: &str) -> Duration {
    if base.is_zero() {
        return base;
    }

    let base_ms = base.as_millis() as u64;
    if base_ms <= 1 {
        return base;
    }

    // +/-20% jitter window.
    let jitter_span = (base_ms / 5).max(1);
    let mut hasher = DefaultHasher::new();
    subscription_id.hash(&mut hasher);
    let hashed = hasher.finish();

    let offset = (hashed % (2 * jitter_span + 1)) as i64 - jitter_span as i64;
    let jittered_ms = if offset >= 0 {
        base_ms.saturating_add(offset as u64)
    } else {
        base_ms.saturating_sub((-offset) as u64).max(1)
    };

    Duration::from_millis(jittered_ms)
}

/// Send the authenticate message and wait for the server's verdict.
///
/// The protocol requires an explicit authenticate message after the
/// connection opens, even though the token also travels in the handshake
/// headers. Ping/pong frames arriving during the exchange are tolerated.
async fn send_auth_and_wait(
    ws_stream: &mut WebSocketStream,
    token: &str,
    auth_timeout: Duration,
) -> Result<()> {
    let auth_message = ClientMessage::Authenticate {
        token: token.to_string(),
    };
    let payload = serde_json::to_string(&auth_message).map_err(|e| {
        TaskLinkError::WebSocket(format!("Failed to serialize auth message: {}", e))
    })?;

    ws_stream
        .send(Message::Text(payload.into()))
        .await
        .map_err(|e| TaskLinkError::WebSocket(format!("Failed to send auth message: {}", e)))?;

    let deadline = TokioInstant::now() + auth_timeout;
    loop {
        let remaining = deadline.saturating_duration_since(TokioInstant::now());
        if remaining.is_zero() {
            return Err(TaskLinkError::Timeout(format!(
                "Authentication timeout ({:?})",
                auth_timeout
            )));
        }

        match tokio::time::timeout(remaining, ws_stream.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(ServerMessage::AuthSuccess { user_id: _ }) => return Ok(()),
                    Ok(ServerMessage::AuthError { message }) => {
                        return Err(TaskLinkError::Authentication(message));
                    }
                    // Tolerate other frames during the handshake.
                    Ok(_) => continue,
                    Err(e) => {
                        return Err(TaskLinkError::WebSocket(format!(
                            "Failed to parse auth response: {}",
                            e
                        )));
                    }
                }
            }
            Ok(Some(Ok(Message::Ping(payload)))) => {
                let _ = ws_stream.send(Message::Pong(payload)).await;
            }
            Ok(Some(Ok(Message::Pong(_) | Message::Binary(_) | Message::Frame(_)))) => {
                continue;
            }
            Ok(Some(Ok(Message::Close(_)))) => {
                return Err(TaskLinkError::WebSocket(
                    "Connection closed during authentication".to_string(),
                ));
            }
            Ok(Some(Err(e))) => {
                return Err(TaskLinkError::WebSocket(format!(
                    "WebSocket error during authentication: {}",
                    e
                )));
            }
            Ok(None) => {
                return Err(TaskLinkError::WebSocket(
                    "Connection closed before authentication completed".to_string(),
                ));
            }
            Err(_) => {
                return Err(TaskLinkError::Timeout(format!(
                    "Authentication timeout ({:?})",
                    auth_timeout
                )));
            }
        }
    }
}

async fn send_subscribe_request(
    ws_stream: &mut WebSocketStream,
    subscription_id: &str,
    user_id: &UserId,
) -> Result<()> {
    let message = ClientMessage::Subscribe {
        subscription_id: subscription_id.to_string(),
        user_id: user_id.clone(),
    };

    let payload = serde_json::to_string(&message).map_err(|e| {
        TaskLinkError::WebSocket(format!("Failed to serialize subscription: {}", e))
    })?;

    ws_stream
        .send(Message::Text(payload.into()))
        .await
        .map_err(|e| TaskLinkError::WebSocket(format!("Failed to subscribe: {}", e)))
}

/// Parse a text payload into a snapshot, if it carries one.
///
/// Auth acknowledgments are handshake leftovers and are skipped; a
/// server-side subscription error becomes an `Err` for the consumer.
fn parse_message(text: &str) -> Result<Option<Vec<Task>>> {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::Snapshot { tasks, .. }) => Ok(Some(tasks)),
        Ok(ServerMessage::AuthSuccess { .. } | ServerMessage::AuthError { .. }) => Ok(None),
        Ok(ServerMessage::Error { code, message, .. }) => {
            Err(TaskLinkError::Subscription(format!("{}: {}", code, message)))
        }
        Err(e) => Err(TaskLinkError::Serialization(format!(
            "Failed to parse server message: {}",
            e
        ))),
    }
}

/// Best-effort unsubscribe + close over the WebSocket stream.
async fn send_unsubscribe_and_close(ws_stream: &mut WebSocketStream, subscription_id: &str) {
    let message = ClientMessage::Unsubscribe {
        subscription_id: subscription_id.to_string(),
    };
    if let Ok(payload) = serde_json::to_string(&message) {
        let _ = ws_stream.send(Message::Text(payload.into())).await;
    }
    let _ = ws_stream.close(None).await;
}

/// Background task that owns the WebSocket stream and forwards snapshots
/// through a bounded channel.
///
/// Responsibilities:
/// - Read WS frames, parse JSON into snapshots, forward them in order
/// - Send periodic keepalive pings when idle
/// - Graceful shutdown (unsubscribe + close) on the close signal
/// - Emit lifecycle events via `EventHandlers`
async fn ws_reader_loop(
    mut ws_stream: WebSocketStream,
    event_tx: mpsc::Sender<Result<Vec<Task>>>,
    close_rx: oneshot::Receiver<()>,
    subscription_id: String,
    keepalive_interval: Option<Duration>,
    event_handlers: EventHandlers,
) {
    tokio::pin!(close_rx);

    let keepalive_dur = keepalive_interval.unwrap_or(Duration::MAX);
    let has_keepalive = keepalive_interval.is_some();
    let mut idle_deadline = TokioInstant::now() + keepalive_dur;

    loop {
        let idle_sleep = tokio::time::sleep_until(idle_deadline);
        tokio::pin!(idle_sleep);

        let frame = tokio::select! {
            biased;

            // Highest priority: graceful shutdown requested by close() / Drop.
            _ = &mut close_rx => {
                send_unsubscribe_and_close(&mut ws_stream, &subscription_id).await;
                event_handlers.emit_disconnect(
                    DisconnectReason::with_code("Subscription closed by client".to_string(), 1000),
                );
                return;
            }

            // Second priority: keepalive idle timer.
            _ = &mut idle_sleep, if has_keepalive => {
                if let Err(e) = ws_stream.send(Message::Ping(Bytes::new())).await {
                    let _ = event_tx
                        .send(Err(TaskLinkError::WebSocket(format!(
                            "Failed to send keepalive ping: {}", e
                        ))))
                        .await;
                    event_handlers.emit_disconnect(
                        DisconnectReason::new(format!("Keepalive ping failed: {}", e)),
                    );
                    return;
                }
                idle_deadline = TokioInstant::now() + keepalive_dur;
                continue;
            }

            // Normal path: read the next WebSocket frame.
            msg = ws_stream.next() => {
                idle_deadline = TokioInstant::now() + keepalive_dur;
                msg
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                if text.len() > MAX_WS_TEXT_MESSAGE_BYTES {
                    let _ = event_tx
                        .send(Err(TaskLinkError::WebSocket(format!(
                            "Text message too large ({} bytes > {} bytes)",
                            text.len(),
                            MAX_WS_TEXT_MESSAGE_BYTES
                        ))))
                        .await;
                    return;
                }
                match parse_message(&text) {
                    Ok(Some(tasks)) => {
                        log::debug!(
                            "[SUBSCRIPTION] Snapshot received: sub={} rows={}",
                            subscription_id,
                            tasks.len()
                        );
                        if event_tx.send(Ok(tasks)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        event_handlers.emit_error(ConnectionError::new(e.to_string(), false));
                        if event_tx.send(Err(e)).await.is_err() {
                            return;
                        }
                    }
                }
            }
            Some(Ok(Message::Binary(_))) => {
                // The protocol is text JSON only.
                log::debug!("[SUBSCRIPTION] Ignoring unexpected binary frame");
            }
            Some(Ok(Message::Close(frame))) => {
                let reason = if let Some(f) = frame {
                    DisconnectReason::with_code(f.reason.to_string(), f.code.into())
                } else {
                    DisconnectReason::new("Server closed connection")
                };
                event_handlers.emit_disconnect(reason);
                return;
            }
            Some(Ok(Message::Ping(payload))) => {
                // tokio-tungstenite auto-responds, but be explicit.
                let _ = ws_stream.send(Message::Pong(payload)).await;
            }
            Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
            Some(Err(e)) => {
                let msg = e.to_string();
                event_handlers.emit_error(ConnectionError::new(&msg, false));
                event_handlers
                    .emit_disconnect(DisconnectReason::new(format!("WebSocket error: {}", msg)));
                let _ = event_tx.send(Err(TaskLinkError::WebSocket(msg))).await;
                return;
            }
            None => {
                event_handlers.emit_disconnect(DisconnectReason::new("WebSocket stream ended"));
                return;
            }
        }
    }
}

/// Producer half of a snapshot channel, for store backends that are not the
/// built-in WebSocket transport (in-memory stores, tests).
#[derive(Clone)]
pub struct SnapshotSender {
    tx: mpsc::Sender<Result<Vec<Task>>>,
}

impl SnapshotSender {
    /// Deliver a full snapshot. Returns `false` when the subscription has
    /// been dropped and no longer accepts events.
    pub async fn send(&self, snapshot: Vec<Task>) -> bool {
        self.tx.send(Ok(snapshot)).await.is_ok()
    }

    /// Deliver a stream-level error.
    pub async fn send_error(&self, error: TaskLinkError) -> bool {
        self.tx.send(Err(error)).await.is_ok()
    }

    /// True once the consuming subscription has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Live subscription to one user's task collection.
///
/// Yields full snapshots in delivery order; the consumer replaces its
/// rendered list with each one. Exactly one consumer owns the
/// subscription; releasing it (via [`close`](Self::close) or `Drop`) is
/// mandatory and stops all further delivery.
pub struct TaskSubscription {
    subscription_id: String,
    /// Receives parsed snapshots from the producer (background WS reader
    /// task or an alternate backend).
    event_rx: mpsc::Receiver<Result<Vec<Task>>>,
    /// Signal the background task to initiate graceful shutdown.
    /// `None` for channel-backed subscriptions and after close().
    close_tx: Option<oneshot::Sender<()>>,
    /// Handle to the background reader task, when one exists.
    _reader_handle: Option<JoinHandle<()>>,
    closed: bool,
}

impl TaskSubscription {
    /// Establish a WebSocket subscription for `user_id`'s tasks.
    pub(crate) async fn connect(
        base_url: &str,
        token: &str,
        user_id: &UserId,
        timeouts: &TaskLinkTimeouts,
        event_handlers: &EventHandlers,
    ) -> Result<Self> {
        let subscription_id = generate_subscription_id();
        let request_url = resolve_ws_url(base_url)?;
        log::debug!(
            "[SUBSCRIPTION] Connecting: sub={} url={}",
            subscription_id,
            request_url
        );

        let mut request = request_url.into_client_request().map_err(|e| {
            TaskLinkError::WebSocket(format!("Failed to build WebSocket request: {}", e))
        })?;
        let header_value =
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                TaskLinkError::Configuration(format!(
                    "Invalid session token for Authorization header: {}",
                    e
                ))
            })?;
        request.headers_mut().insert(AUTHORIZATION, header_value);

        let connect_result =
            tokio::time::timeout(timeouts.connection_timeout, connect_async(request)).await;

        let mut ws_stream = match connect_result {
            Ok(Ok((stream, _))) => stream,
            Ok(Err(WsError::Http(response))) => {
                let status = response.status();
                let message = match status.as_u16() {
                    401 => "Unauthorized: subscription requires a valid session".to_string(),
                    403 => "Forbidden: access to subscription denied".to_string(),
                    code => format!("WebSocket HTTP error: {}", code),
                };
                event_handlers.emit_error(ConnectionError::new(&message, false));
                return Err(TaskLinkError::WebSocket(message));
            }
            Ok(Err(e)) => {
                let msg = format!("Connection failed: {}", e);
                event_handlers.emit_error(ConnectionError::new(&msg, true));
                return Err(TaskLinkError::WebSocket(msg));
            }
            Err(_) => {
                let msg = format!("Connection timeout ({:?})", timeouts.connection_timeout);
                event_handlers.emit_error(ConnectionError::new(&msg, true));
                return Err(TaskLinkError::Timeout(msg));
            }
        };

        send_auth_and_wait(&mut ws_stream, token, timeouts.auth_timeout).await?;
        event_handlers.emit_connect();

        send_subscribe_request(&mut ws_stream, &subscription_id, user_id).await?;

        let keepalive_interval = if timeouts.keepalive_interval.is_zero() {
            None
        } else {
            Some(jitter_keepalive_interval(
                timeouts.keepalive_interval,
                &subscription_id,
            ))
        };

        // Spawn the background reader task — all WS I/O happens there from
        // now on.
        let (event_tx, event_rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let (close_tx, close_rx) = oneshot::channel();
        let reader_handle = tokio::spawn(ws_reader_loop(
            ws_stream,
            event_tx,
            close_rx,
            subscription_id.clone(),
            keepalive_interval,
            event_handlers.clone(),
        ));

        Ok(Self {
            subscription_id,
            event_rx,
            close_tx: Some(close_tx),
            _reader_handle: Some(reader_handle),
            closed: false,
        })
    }

    /// Create a channel-backed subscription for store backends other than
    /// the built-in WebSocket transport.
    ///
    /// The returned [`SnapshotSender`] is the producer half; every snapshot
    /// pushed into it is yielded by [`next`](Self::next) in order.
    pub fn channel(subscription_id: impl Into<String>) -> (SnapshotSender, Self) {
        let (tx, event_rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        (
            SnapshotSender { tx },
            Self {
                subscription_id: subscription_id.into(),
                event_rx,
                close_tx: None,
                _reader_handle: None,
                closed: false,
            },
        )
    }

    /// Receive the next snapshot.
    ///
    /// Snapshots arrive in the order the store emitted them and must be
    /// applied in that order; the latest applied snapshot wins. Returns
    /// `None` once the subscription is closed or the stream ends.
    pub async fn next(&mut self) -> Option<Result<Vec<Task>>> {
        if self.closed {
            return None;
        }

        match self.event_rx.recv().await {
            Some(event) => Some(event),
            None => {
                self.closed = true;
                None
            }
        }
    }

    /// The client-generated subscription id.
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Close the subscription gracefully.
    ///
    /// Signals the background reader task to send an unsubscribe message
    /// and close the connection. Safe to call multiple times — subsequent
    /// calls are no-ops.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
        self.event_rx.close();
    }

    /// Returns `true` if `close()` has been called or the stream has ended.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for TaskSubscription {
    fn drop(&mut self) {
        // Send the close signal so the background reader task can attempt a
        // graceful unsubscribe + close. Even without the signal, the reader
        // task notices the dropped receiver and shuts itself down.
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn generate_subscription_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("sub_{}", nanos)
}
