//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加後の人数と通知対象（ルーム内の全員）
//!
//! ### なぜこのテストが必要か
//! - join は冪等であり、二重 join で人数が増えてはならない
//! - 参加時の人数通知はルーム全員に送られる（参加者本人を含む）
//!
//! ### どのような状況を想定しているか
//! - 正常系：最初の参加者、二人目の参加者
//! - 異常系：未登録の接続
//! - エッジケース：同じ接続の二重 join

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomRepository, Timestamp};

use super::{OccupancyNotice, error::JoinRoomError};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(OccupancyNotice)` - 新しい人数と通知対象（ルーム内の全員）
    /// * `Err(JoinRoomError)` - 参加失敗
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
    ) -> Result<OccupancyNotice, JoinRoomError> {
        let room = self
            .repository
            .join_room(&room_id, &connection_id, Timestamp::now())
            .await?;

        tracing::debug!(
            "Connection '{}' joined room '{}' ({} members)",
            connection_id,
            room_id,
            room.occupancy()
        );

        Ok(OccupancyNotice {
            room_id,
            occupancy: room.occupancy(),
            notify_targets: room.members,
        })
    }
}
