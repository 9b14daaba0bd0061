//! UseCase: 切断処理
//!
//! 切断された接続を参加中の全ルームから外し、残ったメンバーへ新しい人数を
//! 通知する対象を返します。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomRepository};

use super::{OccupancyNotice, error::DisconnectError};

/// 切断のユースケース
pub struct DisconnectConnectionUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl DisconnectConnectionUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// 参加していたルームごとの人数通知。空になったルームは通知対象なしで返ります。
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
    ) -> Result<Vec<OccupancyNotice>, DisconnectError> {
        let departed = self.repository.unregister_connection(&connection_id).await?;

        Ok(departed
            .into_iter()
            .map(|room| OccupancyNotice {
                room_id: room.id.clone(),
                occupancy: room.occupancy(),
                notify_targets: room.members,
            })
            .collect())
    }
}
