//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{ConnectionId, RegistryError};

/// 参加者接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// 同じハンドルが既に登録されている（内部整合性の破綻）
    #[error("Connection {0} is already registered")]
    DuplicateHandle(ConnectionId),
}

impl From<RegistryError> for ConnectError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateHandle(id) => ConnectError::DuplicateHandle(id),
        }
    }
}
