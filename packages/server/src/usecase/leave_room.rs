//! UseCase: ルーム退出処理
//!
//! 退出時の人数は退出した本人にだけ通知します。残ったメンバーは次の
//! join / 切断時の通知で新しい人数を知ります。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, RoomRepository};

use super::{OccupancyNotice, error::LeaveRoomError};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl LeaveRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム退出を実行
    ///
    /// # Returns
    ///
    /// * `Ok(OccupancyNotice)` - 退出後の人数（通知対象は退出した本人のみ）
    /// * `Err(LeaveRoomError)` - 退出失敗
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
    ) -> Result<OccupancyNotice, LeaveRoomError> {
        let remaining = self.repository.leave_room(&room_id, &connection_id).await?;
        let occupancy = remaining.map(|room| room.occupancy()).unwrap_or(0);

        tracing::debug!(
            "Connection '{}' left room '{}' ({} members remain)",
            connection_id,
            room_id,
            occupancy
        );

        Ok(OccupancyNotice {
            room_id,
            occupancy,
            notify_targets: vec![connection_id],
        })
    }
}
