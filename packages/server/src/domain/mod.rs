//! ドメイン層
//!
//! 接続レジストリ・履歴ログ・メッセージ文法など、リレーの中核となる
//! 純粋なモデルと、インフラ層が実装すべきインターフェース（trait）を定義します。

pub mod entity;
pub mod error;
pub mod history;
pub mod message;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::ClientRecord;
pub use error::{HistoryError, MessagePushError, RegistryError, ValueObjectError};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryLog};
pub use message::{HISTORY_COMMAND, InboundMessage, Notice};
pub use message_pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use registry::Registry;
pub use repository::{ConnectionRepository, HistoryRepository};
pub use value_object::{ConnectionId, ConnectionIdFactory, Timestamp, Username};
