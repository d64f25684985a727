//! メッセージ送信（通知）の実装
//!
//! - `channel`: 接続ごとの writer タスクへ mpsc チャンネル経由で渡す実装

pub mod channel;

pub use channel::ChannelMessagePusher;
