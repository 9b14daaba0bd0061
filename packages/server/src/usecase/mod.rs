//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod disconnect_connection;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod relay_chart_update;

use crate::domain::{ConnectionId, RoomId};

pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::{DisconnectError, JoinRoomError, LeaveRoomError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use relay_chart_update::RelayChartUpdateUseCase;

/// 人数通知: どのルームの何人を、誰に送るか
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyNotice {
    pub room_id: RoomId,
    pub occupancy: usize,
    pub notify_targets: Vec<ConnectionId>,
}
