//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ロック順序は常に `connections` → `rooms` です。join / leave / 切断はこの
//! 2 つのロックの内側で完結するため、同じルームへの更新が失われることはありません。

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::UnboundedSender};

use crate::domain::{ConnectionId, RepositoryError, Room, RoomId, RoomRepository, Timestamp};

/// 接続ごとの情報（WebSocket への送信チャンネルを含む）
struct ConnectionInfo {
    sender: UnboundedSender<String>,
    /// 参加中のルーム
    rooms: BTreeSet<RoomId>,
}

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    connections: Mutex<HashMap<ConnectionId, ConnectionInfo>>,
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn register_connection(
        &self,
        connection_id: ConnectionId,
        sender: UnboundedSender<String>,
    ) -> Result<(), RepositoryError> {
        let mut connections = self.connections.lock().await;
        connections.insert(
            connection_id,
            ConnectionInfo {
                sender,
                rooms: BTreeSet::new(),
            },
        );
        Ok(())
    }

    async fn unregister_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Vec<Room>, RepositoryError> {
        let mut connections = self.connections.lock().await;
        let info = connections
            .remove(connection_id)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.to_string()))?;

        let mut rooms = self.rooms.lock().await;
        let mut departed = Vec::with_capacity(info.rooms.len());
        for room_id in info.rooms {
            let Some(room) = rooms.get_mut(&room_id) else {
                continue;
            };
            room.leave(connection_id);
            if room.is_empty() {
                if let Some(room) = rooms.remove(&room_id) {
                    departed.push(room);
                }
            } else {
                departed.push(room.clone());
            }
        }
        Ok(departed)
    }

    async fn join_room(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        timestamp: Timestamp,
    ) -> Result<Room, RepositoryError> {
        let mut connections = self.connections.lock().await;
        let info = connections
            .get_mut(connection_id)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.to_string()))?;

        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone(), timestamp));
        room.join(connection_id.clone());
        info.rooms.insert(room_id.clone());

        Ok(room.clone())
    }

    async fn leave_room(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Option<Room>, RepositoryError> {
        let mut connections = self.connections.lock().await;
        let info = connections
            .get_mut(connection_id)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.to_string()))?;
        info.rooms.remove(room_id);

        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_id) else {
            return Ok(None);
        };
        room.leave(connection_id);
        if room.is_empty() {
            rooms.remove(room_id);
            return Ok(None);
        }
        Ok(Some(room.clone()))
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).cloned()
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut list: Vec<Room> = rooms.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    async fn get_sender(&self, connection_id: &ConnectionId) -> Option<UnboundedSender<String>> {
        let connections = self.connections.lock().await;
        connections.get(connection_id).map(|info| info.sender.clone())
    }

    async fn count_connections(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}
