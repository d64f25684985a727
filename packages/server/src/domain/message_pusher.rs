//! MessagePusher trait 定義
//!
//! 接続へ 1 行を書き込む操作を抽象化します。
//! 実際のソケット書き込みは接続ごとの writer タスクが行い、
//! MessagePusher はそのタスクへのチャンネルにメッセージを積むだけです。
//! そのため、遅い接続が他の接続への配送を妨げることはありません。
//!
//! チャンネルは有界です。読まない相手のキューが溢れた場合、
//! その接続には溢れ通知が送られ、セッションは閉じられます。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{
    Notify,
    mpsc::{self, error::TrySendError},
};

use super::{ConnectionId, MessagePushError};

/// 接続の writer タスクへ行を渡す有界チャンネル
#[derive(Debug, Clone)]
pub struct PusherChannel {
    sender: mpsc::Sender<String>,
    overflow: Arc<Notify>,
}

impl PusherChannel {
    /// 深さ `depth` のチャンネルを作る
    ///
    /// 戻り値は (送信側, writer タスク用の受信側, 溢れ通知)。
    pub fn bounded(depth: usize) -> (Self, mpsc::Receiver<String>, Arc<Notify>) {
        let (sender, receiver) = mpsc::channel(depth.max(1));
        let overflow = Arc::new(Notify::new());
        let channel = Self {
            sender,
            overflow: overflow.clone(),
        };
        (channel, receiver, overflow)
    }

    /// 待たずにキューへ積む
    pub fn try_send(&self, content: String) -> Result<(), TrySendError<String>> {
        self.sender.try_send(content)
    }

    /// キューが溢れたことをセッションへ知らせる
    ///
    /// 待機者がいなくても通知は保持され、次の待機で即座に完了する。
    pub fn notify_overflow(&self) {
        self.overflow.notify_one();
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, id: ConnectionId, channel: PusherChannel);

    /// 接続の送信チャンネルを登録解除（存在しなければ何もしない）
    async fn unregister_client(&self, id: ConnectionId);

    /// 1 つの接続へ送信
    async fn push_to(&self, id: ConnectionId, content: &str) -> Result<(), MessagePushError>;

    /// 1 つの接続へ複数行をまとめて送信
    ///
    /// 行は途中に他の配送が割り込まない 1 単位として積まれる。
    async fn push_many(&self, id: ConnectionId, lines: &[String]) -> Result<(), MessagePushError>;

    /// 複数の接続へ送信
    ///
    /// 一部の送信失敗は残りの配送を中断しない。配送できた件数を返す。
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> usize;
}
