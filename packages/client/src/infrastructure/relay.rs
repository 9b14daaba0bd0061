//! Relay connection: an explicitly constructed WebSocket client with a clear
//! open / close lifecycle.
//!
//! Requests carry an `ack_id`; the reader task resolves the matching pending
//! entry when the server acknowledges it. Callers wait at most the ack
//! timeout, then give up without retrying.
//!
//! Frames are queued on the writer channel at call time, so requests reach
//! the relay in the order they were issued even when their acks are awaited
//! on separate tasks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::domain::TransportError;
use crate::sync::{RemoteUpdate, SyncEvent};
use flowsync_server::infrastructure::dto::websocket::{ClientMessage, ServerMessage};

/// How long a join / leave / emit waits for its ack
pub const ACK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Server pushes delivered to the session
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    UserCount(usize),
    ChartUpdated(RemoteUpdate),
    Disconnected,
}

type AckSender = oneshot::Sender<Result<(), TransportError>>;
type PendingAcks = Arc<Mutex<HashMap<u64, AckSender>>>;

fn lock_pending(pending: &PendingAcks) -> MutexGuard<'_, HashMap<u64, AckSender>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A frame already on the writer queue, waiting for its ack
struct InFlight {
    ack_id: u64,
    ack: oneshot::Receiver<Result<(), TransportError>>,
}

/// State shared between the handle and its spawned requests
struct RelayShared {
    outbound: mpsc::UnboundedSender<Message>,
    pending: PendingAcks,
    next_ack_id: AtomicU64,
    ack_timeout: Duration,
}

impl RelayShared {
    /// Register the ack and queue the frame without yielding.
    fn send(&self, build: impl FnOnce(Option<u64>) -> ClientMessage) -> Result<InFlight, TransportError> {
        let ack_id = self.next_ack_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::to_string(&build(Some(ack_id)))
            .map_err(|e| TransportError::Encode(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        lock_pending(&self.pending).insert(ack_id, tx);

        if self.outbound.send(Message::Text(frame.into())).is_err() {
            lock_pending(&self.pending).remove(&ack_id);
            return Err(TransportError::Closed);
        }
        Ok(InFlight { ack_id, ack: rx })
    }

    async fn wait_ack(&self, in_flight: InFlight) -> Result<(), TransportError> {
        let InFlight { ack_id, ack } = in_flight;
        match tokio::time::timeout(self.ack_timeout, ack).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => {
                lock_pending(&self.pending).remove(&ack_id);
                Err(TransportError::AckTimeout {
                    ack_id,
                    timeout_ms: self.ack_timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn request(&self, build: impl FnOnce(Option<u64>) -> ClientMessage) -> Result<(), TransportError> {
        let in_flight = self.send(build)?;
        self.wait_ack(in_flight).await
    }
}

pub struct RelayConnection {
    shared: Arc<RelayShared>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl RelayConnection {
    /// Open the socket. Server pushes arrive on the returned receiver.
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RelayEvent>), TransportError> {
        Self::connect_with_timeout(url, ACK_TIMEOUT).await
    }

    pub async fn connect_with_timeout(
        url: &str,
        ack_timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RelayEvent>), TransportError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        tracing::info!("Connected to relay at {}", url);

        let (mut sink, mut source) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let pending: PendingAcks = Arc::new(Mutex::new(HashMap::new()));

        let writer = tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if let Err(e) = sink.send(message).await {
                    tracing::error!("Relay write failed: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        let reader_pending = pending.clone();
        let reader = tokio::spawn(async move {
            while let Some(next) = source.next().await {
                let text = match next {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::error!("Relay read failed: {}", e);
                        break;
                    }
                };
                match serde_json::from_str::<ServerMessage>(text.as_str()) {
                    Ok(message) => dispatch_server_message(message, &reader_pending, &event_tx),
                    Err(e) => tracing::warn!("Ignoring unparsable relay frame: {}", e),
                }
            }
            // Dropping the senders fails every outstanding request with Closed.
            lock_pending(&reader_pending).clear();
            let _ = event_tx.send(RelayEvent::Disconnected);
            tracing::info!("Relay connection closed");
        });

        let shared = Arc::new(RelayShared {
            outbound: outbound_tx,
            pending,
            next_ack_id: AtomicU64::new(1),
            ack_timeout,
        });
        Ok((
            Self {
                shared,
                reader,
                writer,
            },
            event_rx,
        ))
    }

    /// Join and wait for the ack.
    pub async fn join_room(&self, room_id: &str) -> Result<(), TransportError> {
        let room_id = room_id.to_string();
        self.shared
            .request(|ack_id| ClientMessage::JoinRoom { room_id, ack_id })
            .await
    }

    /// Leave and wait for the ack.
    pub async fn leave_room(&self, room_id: &str) -> Result<(), TransportError> {
        let room_id = room_id.to_string();
        self.shared
            .request(|ack_id| ClientMessage::LeaveRoom { room_id, ack_id })
            .await
    }

    /// Emit a full-state snapshot and wait for the ack.
    pub async fn emit_chart_updated(&self, event: SyncEvent) -> Result<(), TransportError> {
        self.shared.request(|ack_id| event.into_message(ack_id)).await
    }

    /// Fire-and-forget join. Failures are logged; the handle is for callers
    /// that want to observe the outcome.
    pub fn spawn_join_room(&self, room_id: &str) -> JoinHandle<Result<(), TransportError>> {
        let room_id = room_id.to_string();
        self.spawn_request("join-room", move |ack_id| ClientMessage::JoinRoom { room_id, ack_id })
    }

    pub fn spawn_leave_room(&self, room_id: &str) -> JoinHandle<Result<(), TransportError>> {
        let room_id = room_id.to_string();
        self.spawn_request("leave-room", move |ack_id| ClientMessage::LeaveRoom { room_id, ack_id })
    }

    pub fn spawn_emit_chart_updated(&self, event: SyncEvent) -> JoinHandle<Result<(), TransportError>> {
        self.spawn_request("chart-updated", move |ack_id| event.into_message(ack_id))
    }

    /// The frame is queued before this returns; only the ack wait runs on
    /// the spawned task.
    fn spawn_request(
        &self,
        what: &'static str,
        build: impl FnOnce(Option<u64>) -> ClientMessage,
    ) -> JoinHandle<Result<(), TransportError>> {
        let shared = self.shared.clone();
        let sent = shared.send(build);
        tokio::spawn(async move {
            let result = match sent {
                Ok(in_flight) => shared.wait_ack(in_flight).await,
                Err(e) => Err(e),
            };
            match &result {
                Ok(()) => tracing::debug!("{} acknowledged", what),
                Err(e) => tracing::warn!("{} failed: {}", what, e),
            }
            result
        })
    }

    /// Send a close frame and wait briefly for the writer to flush it.
    pub async fn close(mut self) {
        let _ = self.shared.outbound.send(Message::Close(None));
        let writer = &mut self.writer;
        if tokio::time::timeout(self.shared.ack_timeout, writer).await.is_err() {
            tracing::warn!("Relay writer did not finish within timeout");
        }
    }
}

impl Drop for RelayConnection {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

fn dispatch_server_message(
    message: ServerMessage,
    pending: &PendingAcks,
    events: &mpsc::UnboundedSender<RelayEvent>,
) {
    match message {
        ServerMessage::Ack { ack_id } => match lock_pending(pending).remove(&ack_id) {
            Some(tx) => {
                let _ = tx.send(Ok(()));
            }
            None => tracing::debug!("Late ack {} ignored", ack_id),
        },
        ServerMessage::Error {
            ack_id: Some(ack_id),
            message,
        } => match lock_pending(pending).remove(&ack_id) {
            Some(tx) => {
                let _ = tx.send(Err(TransportError::Rejected(message)));
            }
            None => tracing::warn!("Relay error for request {}: {}", ack_id, message),
        },
        ServerMessage::Error {
            ack_id: None,
            message,
        } => tracing::warn!("Relay error: {}", message),
        ServerMessage::UserCount { count } => {
            let _ = events.send(RelayEvent::UserCount(count));
        }
        ServerMessage::ChartUpdated { nodes, edges } => {
            let _ = events.send(RelayEvent::ChartUpdated(RemoteUpdate::decode(&nodes, &edges)));
        }
    }
}

/// `http://host:port` → `ws://host:port/ws`
pub fn relay_url(server: &str) -> String {
    let trimmed = server.trim_end_matches('/');
    let ws = if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        trimmed.to_string()
    };
    format!("{ws}/ws")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relay_url() {
        // テスト項目: HTTP のベース URL から WebSocket の URL を導出する
        assert_eq!(relay_url("http://127.0.0.1:3001"), "ws://127.0.0.1:3001/ws");
        assert_eq!(relay_url("https://example.com/"), "wss://example.com/ws");
        assert_eq!(relay_url("ws://localhost:1"), "ws://localhost:1/ws");
    }

    #[tokio::test]
    async fn test_ack_resolves_pending_request() {
        // テスト項目: ack を受信すると対応する保留中リクエストが成功する
        // given (前提条件):
        let pending: PendingAcks = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = oneshot::channel();
        lock_pending(&pending).insert(3, tx);
        let (events, _events_rx) = mpsc::unbounded_channel();

        // when (操作):
        dispatch_server_message(ServerMessage::Ack { ack_id: 3 }, &pending, &events);

        // then (期待する結果):
        assert_eq!(rx.await.unwrap(), Ok(()));
        assert!(lock_pending(&pending).is_empty());
    }

    #[tokio::test]
    async fn test_error_frame_rejects_pending_request() {
        // テスト項目: ack_id 付きのエラーは対応するリクエストを失敗させる
        let pending: PendingAcks = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = oneshot::channel();
        lock_pending(&pending).insert(1, tx);
        let (events, _events_rx) = mpsc::unbounded_channel();

        dispatch_server_message(
            ServerMessage::Error {
                ack_id: Some(1),
                message: "bad room".to_string(),
            },
            &pending,
            &events,
        );

        assert_eq!(rx.await.unwrap(), Err(TransportError::Rejected("bad room".to_string())));
    }

    #[tokio::test]
    async fn test_pushes_become_events() {
        // テスト項目: user-count と chart-updated はイベントとして配送される
        // given (前提条件):
        let pending: PendingAcks = Arc::new(Mutex::new(HashMap::new()));
        let (events, mut events_rx) = mpsc::unbounded_channel();

        // when (操作):
        dispatch_server_message(ServerMessage::UserCount { count: 2 }, &pending, &events);
        dispatch_server_message(
            ServerMessage::ChartUpdated {
                nodes: json!("garbage"),
                edges: json!([]),
            },
            &pending,
            &events,
        );

        // then (期待する結果):
        assert_eq!(events_rx.recv().await, Some(RelayEvent::UserCount(2)));
        assert_eq!(
            events_rx.recv().await,
            Some(RelayEvent::ChartUpdated(RemoteUpdate::default()))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_spawned_emits_are_queued_in_call_order() {
        // テスト項目: 連続して spawn した chart-updated は呼び出し順に送信キューへ積まれる
        // given (前提条件):
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel();
        let connection = RelayConnection {
            shared: Arc::new(RelayShared {
                outbound,
                pending: Arc::new(Mutex::new(HashMap::new())),
                next_ack_id: AtomicU64::new(1),
                ack_timeout: Duration::from_millis(50),
            }),
            reader: tokio::spawn(async {}),
            writer: tokio::spawn(async {}),
        };

        // when (操作):
        let handles: Vec<_> = (1..=40)
            .map(|count| {
                let nodes = (0..count)
                    .map(|i| crate::domain::Node::new("input", crate::domain::XYPosition::new(i as f64, 0.0)))
                    .collect();
                connection.spawn_emit_chart_updated(SyncEvent {
                    room_id: "c1".to_string(),
                    nodes,
                    edges: vec![],
                })
            })
            .collect();

        // then (期待する結果): spawn から戻った時点で全フレームが順番通りに積まれている
        let mut counts = Vec::new();
        while let Ok(Message::Text(text)) = outbound_rx.try_recv() {
            match serde_json::from_str::<ClientMessage>(text.as_str()).unwrap() {
                ClientMessage::ChartUpdated { nodes, ack_id, .. } => {
                    assert_eq!(ack_id, Some(counts.len() as u64 + 1));
                    counts.push(nodes.as_array().unwrap().len());
                }
                other => panic!("unexpected frame: {other:?}"),
            }
        }
        assert_eq!(counts, (1..=40).collect::<Vec<_>>());

        // ack が来ないリクエストはタイムアウトで失敗する
        for handle in handles {
            assert!(matches!(
                handle.await.unwrap(),
                Err(TransportError::AckTimeout { .. })
            ));
        }
        assert!(lock_pending(&connection.shared.pending).is_empty());
    }
}
