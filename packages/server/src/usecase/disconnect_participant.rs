//! UseCase: 参加者切断処理
//!
//! セッション終了時に呼ばれ、レジストリから登録解除し、
//! 退出通知を残りの参加者へブロードキャストして履歴に残します。

use std::sync::Arc;

use crate::domain::{ClientRecord, ConnectionRepository, Notice};

use super::route_message::RouteMessageUseCase;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    repository: Arc<dyn ConnectionRepository>,
    router: Arc<RouteMessageUseCase>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        router: Arc<RouteMessageUseCase>,
    ) -> Self {
        Self { repository, router }
    }

    /// 参加者切断を実行
    ///
    /// 登録解除は冪等。退出通知は `record` のユーザー名（最後に知られた名前）で送られる。
    ///
    /// # Returns
    ///
    /// 退出通知を配送できた件数
    pub async fn execute(&self, record: &ClientRecord) -> usize {
        // 1. レジストリから登録解除
        if self.repository.unregister(record.id).await.is_none() {
            tracing::debug!("Connection {} was already unregistered", record.id);
        }

        // 2. 退出通知をブロードキャスト（履歴に追加される）
        let notice = Notice::Left(&record.username).to_string();
        self.router.announce(record.id, notice).await
    }
}
