//! WebSocket connection handlers (the broadcast relay).

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, RoomId},
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
    ui::state::AppState,
    usecase::{
        DisconnectConnectionUseCase, JoinRoomUseCase, LeaveRoomUseCase, OccupancyNotice,
        RelayChartUpdateUseCase,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection_id = ConnectionIdFactory::generate();
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (mut sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive relayed frames
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if let Err(e) = state
        .room_repository
        .register_connection(connection_id.clone(), tx)
        .await
    {
        tracing::error!("Failed to register connection '{}': {}", connection_id, e);
        return;
    }
    tracing::info!("connect {}", connection_id);

    let connection_id_clone = connection_id.clone();
    let state_clone = state.clone();

    // Spawn a task to receive frames from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::trace!("Received text from '{}': {}", connection_id_clone, text);
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => {
                            handle_client_message(&state_clone, &connection_id_clone, message)
                                .await
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Failed to parse frame from '{}': {}",
                                connection_id_clone,
                                e
                            );
                            reply(
                                &state_clone,
                                &connection_id_clone,
                                ServerMessage::Error {
                                    ack_id: None,
                                    message: format!("invalid message: {e}"),
                                },
                            )
                            .await;
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to forward relayed frames to this connection
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let disconnect_usecase = DisconnectConnectionUseCase::new(state.room_repository.clone());
    match disconnect_usecase.execute(connection_id.clone()).await {
        Ok(notices) => {
            tracing::info!("disconnect {}", connection_id);
            for notice in notices {
                push_user_count(&state, &notice).await;
            }
        }
        Err(e) => {
            tracing::warn!("Failed to disconnect '{}': {}", connection_id, e);
        }
    }
}

async fn handle_client_message(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    message: ClientMessage,
) {
    let ack_id = message.ack_id();
    match message {
        ClientMessage::JoinRoom { room_id, .. } => {
            let Some(room_id) = parse_room_id(state, connection_id, room_id, ack_id).await else {
                return;
            };
            let usecase = JoinRoomUseCase::new(state.room_repository.clone());
            match usecase.execute(connection_id.clone(), room_id.clone()).await {
                Ok(notice) => {
                    tracing::info!("Connection '{}' joined room '{}'", connection_id, room_id);
                    acknowledge(state, connection_id, ack_id).await;
                    // Everyone in the room, the joiner included
                    push_user_count(state, &notice).await;
                }
                Err(e) => reject(state, connection_id, ack_id, e.to_string()).await,
            }
        }
        ClientMessage::LeaveRoom { room_id, .. } => {
            let Some(room_id) = parse_room_id(state, connection_id, room_id, ack_id).await else {
                return;
            };
            let usecase = LeaveRoomUseCase::new(state.room_repository.clone());
            match usecase.execute(connection_id.clone(), room_id.clone()).await {
                Ok(notice) => {
                    tracing::info!("Connection '{}' left room '{}'", connection_id, room_id);
                    acknowledge(state, connection_id, ack_id).await;
                    // The leaver only
                    push_user_count(state, &notice).await;
                }
                Err(e) => reject(state, connection_id, ack_id, e.to_string()).await,
            }
        }
        ClientMessage::ChartUpdated {
            room_id,
            nodes,
            edges,
            ..
        } => {
            let Some(room_id) = parse_room_id(state, connection_id, room_id, ack_id).await else {
                return;
            };
            let usecase = RelayChartUpdateUseCase::new(state.room_repository.clone());
            let targets = usecase.execute(connection_id, &room_id).await;
            let relayed = ServerMessage::ChartUpdated { nodes, edges };
            deliver(state, &targets, &relayed).await;
            tracing::info!(
                "chart-updated from '{}' in room '{}' relayed to {} peer(s)",
                connection_id,
                room_id,
                targets.len()
            );
            acknowledge(state, connection_id, ack_id).await;
        }
    }
}

async fn parse_room_id(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    raw: String,
    ack_id: Option<u64>,
) -> Option<RoomId> {
    match RoomId::new(raw) {
        Ok(room_id) => Some(room_id),
        Err(e) => {
            tracing::warn!("Invalid room id from '{}': {}", connection_id, e);
            reject(state, connection_id, ack_id, e.to_string()).await;
            None
        }
    }
}

async fn push_user_count(state: &Arc<AppState>, notice: &OccupancyNotice) {
    let message = ServerMessage::UserCount {
        count: notice.occupancy,
    };
    deliver(state, &notice.notify_targets, &message).await;
}

async fn acknowledge(state: &Arc<AppState>, connection_id: &ConnectionId, ack_id: Option<u64>) {
    if let Some(ack_id) = ack_id {
        reply(state, connection_id, ServerMessage::Ack { ack_id }).await;
    }
}

async fn reject(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    ack_id: Option<u64>,
    message: String,
) {
    reply(state, connection_id, ServerMessage::Error { ack_id, message }).await;
}

async fn reply(state: &Arc<AppState>, connection_id: &ConnectionId, message: ServerMessage) {
    deliver(state, std::slice::from_ref(connection_id), &message).await;
}

/// Best-effort, at-most-once delivery. A closed channel means the peer is
/// going away; it simply misses the frame.
async fn deliver(state: &Arc<AppState>, targets: &[ConnectionId], message: &ServerMessage) {
    if targets.is_empty() {
        return;
    }
    let text = message.to_json();
    for target in targets {
        match state.room_repository.get_sender(target).await {
            Some(sender) => {
                if sender.send(text.clone()).is_err() {
                    tracing::warn!("Failed to send to connection '{}'", target);
                }
            }
            None => tracing::warn!("Connection '{}' is gone; frame dropped", target),
        }
    }
}
