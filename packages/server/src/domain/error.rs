//! ドメイン層のエラー型

use thiserror::Error;

use super::ConnectionId;

/// 値オブジェクト生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// ユーザー名が空（トリム後）
    #[error("Username must not be empty")]
    EmptyUsername,
}

/// レジストリ操作のエラー
///
/// 通常のフローでは発生しない。発生した場合は内部整合性の破綻を意味する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Connection {0} is already registered")]
    DuplicateHandle(ConnectionId),
}

/// 履歴ログ生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("History capacity must be at least 1")]
    ZeroCapacity,
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先の接続が見つからない
    #[error("Connection {0} not found")]
    ClientNotFound(ConnectionId),

    /// 送信に失敗（相手の writer が既に終了しているなど）
    #[error("Failed to push message: {0}")]
    PushFailed(String),

    /// 送信キューが満杯（相手が読んでいない）。接続は切断される
    #[error("Outbound queue of connection {0} is full")]
    QueueFull(ConnectionId),
}
