//! インメモリ Repository 実装
//!
//! プロセス内の共有状態として `tokio::sync::Mutex` で保護したドメインモデルを保持します。
//! 永続化は行いません（プロセス再起動で消えます）。

mod connection;
mod history;

pub use connection::InMemoryConnectionRepository;
pub use history::InMemoryHistoryRepository;
