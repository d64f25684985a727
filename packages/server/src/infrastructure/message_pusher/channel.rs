//! mpsc チャンネルを使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの有界チャンネル（`PusherChannel`）を管理
//! - クライアントへのメッセージ送信（push_to, push_many, broadcast）
//! - キューが溢れた接続の切り離し
//!
//! ## 設計ノート
//!
//! チャンネルの生成と writer タスクの起動は UI 層（`ui/handler/session.rs`）で行われます。
//! ここでの送信は `try_send` でチャンネルに積むだけなので、ロックを保持したまま
//! ソケット I/O を待つことはありません。キューが満杯の接続はマップから外され、
//! 溢れ通知を受けたセッションが自分で閉じます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

pub struct ChannelMessagePusher {
    /// Key: 接続ハンドル / Value: writer タスクへのチャンネル
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl ChannelMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

impl Default for ChannelMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

/// 1 接続のキューへ積む
///
/// キューが満杯なら、その接続をマップから外してセッションに溢れを通知する。
fn enqueue(
    clients: &mut HashMap<ConnectionId, PusherChannel>,
    id: ConnectionId,
    content: String,
) -> Result<(), MessagePushError> {
    let channel = clients
        .get(&id)
        .ok_or(MessagePushError::ClientNotFound(id))?;

    match channel.try_send(content) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_)) => {
            channel.notify_overflow();
            clients.remove(&id);
            tracing::warn!("Outbound queue of {} is full, disconnecting", id);
            Err(MessagePushError::QueueFull(id))
        }
        Err(TrySendError::Closed(_)) => {
            Err(MessagePushError::PushFailed(format!("writer of {} has stopped", id)))
        }
    }
}

#[async_trait]
impl MessagePusher for ChannelMessagePusher {
    async fn register_client(&self, id: ConnectionId, channel: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(id, channel);
        tracing::debug!("Connection {} registered to MessagePusher", id);
    }

    async fn unregister_client(&self, id: ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(&id);
        tracing::debug!("Connection {} unregistered from MessagePusher", id);
    }

    async fn push_to(&self, id: ConnectionId, content: &str) -> Result<(), MessagePushError> {
        let mut clients = self.clients.lock().await;
        enqueue(&mut clients, id, content.to_string())?;
        tracing::trace!("Pushed message to connection {}", id);
        Ok(())
    }

    async fn push_many(&self, id: ConnectionId, lines: &[String]) -> Result<(), MessagePushError> {
        if lines.is_empty() {
            return Ok(());
        }
        // writer タスクは末尾に改行を付けるので、行の間だけを改行でつなぐ
        let mut clients = self.clients.lock().await;
        enqueue(&mut clients, id, lines.join("\n"))?;
        tracing::trace!("Pushed {} lines to connection {}", lines.len(), id);
        Ok(())
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> usize {
        let mut clients = self.clients.lock().await;
        let mut delivered = 0;

        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match enqueue(&mut clients, target, content.to_string()) {
                Ok(()) => delivered += 1,
                Err(MessagePushError::ClientNotFound(_)) => tracing::debug!(
                    "Connection {} not found during broadcast, skipping",
                    target
                ),
                Err(e) => tracing::warn!("Failed to push message to connection {}: {}", target, e),
            }
        }

        delivered
    }
}
