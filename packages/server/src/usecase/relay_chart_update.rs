//! UseCase: チャート更新の中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayChartUpdateUseCase::execute() が返す配信対象
//!
//! ### なぜこのテストが必要か
//! - 送信者自身に更新が戻ってくると、受信側で適用 → 再送のループになる
//! - 他のルームのメンバーに更新が漏れてはならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：三人のルームで一人が送信
//! - エッジケース：送信者しかいないルーム、存在しないルーム

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomRepository};

/// チャート更新中継のユースケース
pub struct RelayChartUpdateUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl RelayChartUpdateUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 配信対象を決定する
    ///
    /// ルーム内の送信者以外の全員を返します。ルームが存在しなければ空です。
    /// 送信者がメンバーである必要はありません。
    pub async fn execute(&self, sender: &ConnectionId, room_id: &RoomId) -> Vec<ConnectionId> {
        match self.repository.get_room(room_id).await {
            Some(room) => {
                if !room.contains(sender) {
                    tracing::debug!(
                        "Connection '{}' relays into room '{}' without being a member",
                        sender,
                        room_id
                    );
                }
                room.broadcast_targets(sender)
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::repository::InMemoryRoomRepository,
        usecase::JoinRoomUseCase,
    };
    use tokio::sync::mpsc;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    async fn repository_with_rooms(members: &[(&str, &str)]) -> Arc<InMemoryRoomRepository> {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let join = JoinRoomUseCase::new(repository.clone());
        for (connection, room) in members {
            if repository.get_sender(&conn(connection)).await.is_none() {
                let (tx, _rx) = mpsc::unbounded_channel();
                repository
                    .register_connection(conn(connection), tx)
                    .await
                    .unwrap();
            }
            join.execute(conn(connection), room_id(room)).await.unwrap();
        }
        repository
    }

    #[tokio::test]
    async fn test_relay_excludes_sender() {
        // テスト項目: 送信者以外のルームメンバー全員が配信対象になる
        // given (前提条件):
        let repository = repository_with_rooms(&[("a", "c1"), ("b", "c1"), ("c", "c1")]).await;
        let usecase = RelayChartUpdateUseCase::new(repository);

        // when (操作):
        let targets = usecase.execute(&conn("a"), &room_id("c1")).await;

        // then (期待する結果):
        assert_eq!(targets, vec![conn("b"), conn("c")]);
    }

    #[tokio::test]
    async fn test_relay_does_not_cross_rooms() {
        // テスト項目: 別ルームのメンバーには配信されない
        // given (前提条件):
        let repository = repository_with_rooms(&[("a", "c1"), ("b", "c1"), ("x", "c2")]).await;
        let usecase = RelayChartUpdateUseCase::new(repository);

        // when (操作):
        let targets = usecase.execute(&conn("a"), &room_id("c1")).await;

        // then (期待する結果):
        assert!(!targets.contains(&conn("x")));
        assert_eq!(targets, vec![conn("b")]);
    }

    #[tokio::test]
    async fn test_relay_alone_has_no_targets() {
        // テスト項目: 送信者しかいないルームでは配信対象は空
        // given (前提条件):
        let repository = repository_with_rooms(&[("a", "c1")]).await;
        let usecase = RelayChartUpdateUseCase::new(repository);

        // when (操作):
        let targets = usecase.execute(&conn("a"), &room_id("c1")).await;

        // then (期待する結果):
        assert!(targets.is_empty());
    }

    #[tokio::test]
    async fn test_relay_to_missing_room() {
        // テスト項目: 存在しないルームへの送信は配信対象なし
        let repository = Arc::new(InMemoryRoomRepository::new());
        let usecase = RelayChartUpdateUseCase::new(repository);

        let targets = usecase.execute(&conn("a"), &room_id("nowhere")).await;

        assert!(targets.is_empty());
    }
}
