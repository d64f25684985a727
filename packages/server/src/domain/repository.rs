//! Repository trait 定義
//!
//! 共有状態（接続レジストリと履歴ログ）へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 実装はロックを操作の間だけ保持し、ネットワーク I/O の間は決して保持してはなりません。

use async_trait::async_trait;

use super::{ClientRecord, ConnectionId, RegistryError};

/// 接続レジストリ Repository
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// クライアントを登録
    async fn register(&self, record: ClientRecord) -> Result<(), RegistryError>;

    /// 登録解除（冪等）。削除したレコードがあれば返す
    async fn unregister(&self, id: ConnectionId) -> Option<ClientRecord>;

    /// ユーザー名で検索（同名が複数なら最も早く登録された接続）
    async fn lookup_by_username(&self, username: &str) -> Option<ConnectionId>;

    /// 登録順に並んだ全レコードのスナップショット
    async fn snapshot(&self) -> Vec<ClientRecord>;

    /// 登録中のクライアント数
    async fn count(&self) -> usize;
}

/// 履歴ログ Repository
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// エントリを追加（満杯なら最古を破棄）
    async fn append(&self, entry: String);

    /// 到着順に並んだ全エントリのスナップショット
    async fn snapshot(&self) -> Vec<String>;

    /// 容量
    async fn capacity(&self) -> usize;
}
