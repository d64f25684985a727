//! UseCase: メッセージ配送（ルーター）
//!
//! 受信した 1 行を分類し、配送先を決めて MessagePusher に渡します。
//! ブロードキャストとシステム通知は履歴ログに追加し、
//! ダイレクトメッセージと履歴再送は追加しません。
//!
//! ルーターはレジストリを読むだけで、決して変更しません。

use std::sync::Arc;

use crate::domain::{
    ClientRecord, ConnectionId, ConnectionRepository, HistoryRepository, InboundMessage,
    MessagePusher, Notice,
};

/// メッセージが配送されなかった理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// `@` で始まるが宛先または本文が欠けている
    MalformedDirect,
    /// 宛先のユーザーが接続していない
    UnknownRecipient(String),
    /// 宛先は見つかったが送信できなかった（切断中など）
    RecipientUnreachable(ConnectionId),
}

/// 配送結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// 送信者に履歴を再送した（件数）
    HistoryReplayed(usize),
    /// ダイレクトメッセージを配送した
    Direct { recipient: ConnectionId },
    /// ブロードキャストした（配送できた件数）
    Broadcast { delivered: usize },
    /// 配送しなかった
    Dropped(DropReason),
}

/// メッセージ配送のユースケース
pub struct RouteMessageUseCase {
    connection_repository: Arc<dyn ConnectionRepository>,
    history_repository: Arc<dyn HistoryRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    /// 不正・宛先不明のダイレクトメッセージを送信者に通知するか
    notify_rejections: bool,
}

impl RouteMessageUseCase {
    pub fn new(
        connection_repository: Arc<dyn ConnectionRepository>,
        history_repository: Arc<dyn HistoryRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        notify_rejections: bool,
    ) -> Self {
        Self {
            connection_repository,
            history_repository,
            message_pusher,
            notify_rejections,
        }
    }

    /// 送信者からの 1 行を配送する
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者のクライアントレコード
    /// * `raw` - 改行を除いた受信テキスト
    pub async fn execute(&self, sender: &ClientRecord, raw: &str) -> RouteOutcome {
        match InboundMessage::parse(raw) {
            InboundMessage::HistoryRequest => self.replay_history(sender.id).await,
            InboundMessage::Direct { recipient, body } => {
                self.send_direct(sender, recipient, body).await
            }
            InboundMessage::MalformedDirect => {
                tracing::debug!(
                    "Dropping malformed direct message from {} ({})",
                    sender.username,
                    sender.id
                );
                self.reject(sender.id, Notice::MalformedDirect).await;
                RouteOutcome::Dropped(DropReason::MalformedDirect)
            }
            InboundMessage::Broadcast(body) => {
                let formatted = Notice::Broadcast {
                    from: &sender.username,
                    body,
                }
                .to_string();
                let delivered = self.announce(sender.id, formatted).await;
                RouteOutcome::Broadcast { delivered }
            }
        }
    }

    /// ブロードキャスト扱いの通知を、`subject` 以外の全接続に配送し履歴に追加する
    ///
    /// 参加・退出のシステム通知もこの経路を通る。配送できた件数を返す。
    pub async fn announce(&self, subject: ConnectionId, formatted: String) -> usize {
        self.history_repository.append(formatted.clone()).await;

        let targets: Vec<ConnectionId> = self
            .connection_repository
            .snapshot()
            .await
            .into_iter()
            .map(|record| record.id)
            .filter(|id| *id != subject)
            .collect();

        if targets.is_empty() {
            return 0;
        }
        self.message_pusher.broadcast(targets, &formatted).await
    }

    async fn replay_history(&self, requester: ConnectionId) -> RouteOutcome {
        let entries = self.history_repository.snapshot().await;

        // 再送中に他の配送が割り込まないよう、まとめて 1 回で積む
        match self.message_pusher.push_many(requester, &entries).await {
            Ok(()) => {
                tracing::debug!("Replayed {} history entries to {}", entries.len(), requester);
                RouteOutcome::HistoryReplayed(entries.len())
            }
            Err(e) => {
                tracing::debug!("Failed to replay history to {}: {}", requester, e);
                RouteOutcome::HistoryReplayed(0)
            }
        }
    }

    async fn send_direct(
        &self,
        sender: &ClientRecord,
        recipient: &str,
        body: &str,
    ) -> RouteOutcome {
        let Some(target) = self
            .connection_repository
            .lookup_by_username(recipient)
            .await
        else {
            tracing::debug!(
                "Dropping direct message from {} to unknown user '{}'",
                sender.username,
                recipient
            );
            self.reject(sender.id, Notice::UnknownRecipient(recipient))
                .await;
            return RouteOutcome::Dropped(DropReason::UnknownRecipient(recipient.to_string()));
        };

        let formatted = Notice::Direct {
            from: &sender.username,
            body,
        }
        .to_string();

        match self.message_pusher.push_to(target, &formatted).await {
            Ok(()) => RouteOutcome::Direct { recipient: target },
            Err(e) => {
                tracing::warn!(
                    "Failed to deliver direct message from {} to {}: {}",
                    sender.username,
                    target,
                    e
                );
                RouteOutcome::Dropped(DropReason::RecipientUnreachable(target))
            }
        }
    }

    async fn reject(&self, sender: ConnectionId, notice: Notice<'_>) {
        if !self.notify_rejections {
            return;
        }
        if let Err(e) = self
            .message_pusher
            .push_to(sender, &notice.to_string())
            .await
        {
            tracing::debug!("Failed to notify {} of rejected message: {}", sender, e);
        }
    }
}
