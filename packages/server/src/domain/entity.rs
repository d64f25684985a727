//! エンティティ

use super::{ConnectionId, Timestamp, Username};

/// 接続中クライアントのレコード
///
/// ハンドシェイク完了時に生成され、切断時に破棄される。生成後は不変（リネーム不可）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRecord {
    pub id: ConnectionId,
    pub username: Username,
    pub connected_at: Timestamp,
}

impl ClientRecord {
    pub fn new(id: ConnectionId, username: Username, connected_at: Timestamp) -> Self {
        Self {
            id,
            username,
            connected_at,
        }
    }
}
