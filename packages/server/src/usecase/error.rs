//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RepositoryError;

/// ルーム参加のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinRoomError {
    /// 接続が登録されていない（切断済みなど）
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// ルーム退出のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaveRoomError {
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// 切断処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DisconnectError {
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

macro_rules! impl_from_repository_error {
    ($($target:ident),+) => {
        $(
            impl From<RepositoryError> for $target {
                fn from(e: RepositoryError) -> Self {
                    match e {
                        RepositoryError::ConnectionNotFound(id) => Self::ConnectionNotFound(id),
                        other => Self::Repository(other),
                    }
                }
            }
        )+
    };
}

impl_from_repository_error!(JoinRoomError, LeaveRoomError, DisconnectError);
