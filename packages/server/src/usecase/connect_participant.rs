//! UseCase: 参加者接続処理
//!
//! ハンドシェイク完了時に呼ばれ、クライアントをレジストリに登録し、
//! 参加通知を他の参加者へブロードキャストして履歴に残します。

use std::sync::Arc;

use linechat_shared::time::Clock;

use crate::domain::{ClientRecord, ConnectionId, ConnectionRepository, Notice, Timestamp, Username};

use super::{error::ConnectError, route_message::RouteMessageUseCase};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    repository: Arc<dyn ConnectionRepository>,
    router: Arc<RouteMessageUseCase>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn ConnectionRepository>,
        router: Arc<RouteMessageUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            router,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ClientRecord)` - 登録されたレコード
    /// * `Err(ConnectError)` - 同じハンドルが既に登録されている
    pub async fn execute(
        &self,
        id: ConnectionId,
        username: Username,
    ) -> Result<ClientRecord, ConnectError> {
        let record = ClientRecord::new(id, username, Timestamp::new(self.clock.now_millis()));

        // 1. レジストリに登録
        self.repository.register(record.clone()).await?;

        // 2. 参加通知をブロードキャスト（履歴に追加される）
        let notice = Notice::Joined(&record.username).to_string();
        let notified = self.router.announce(record.id, notice).await;
        tracing::debug!(
            "Announced '{}' ({}) to {} participants",
            record.username,
            record.id,
            notified
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{HistoryLog, HistoryRepository, MessagePusher, PusherChannel, Registry},
        infrastructure::{
            message_pusher::ChannelMessagePusher,
            repository::{InMemoryConnectionRepository, InMemoryHistoryRepository},
        },
    };
    use linechat_shared::time::FixedClock;
    use tokio::sync::Mutex;

    fn create_usecase() -> (
        ConnectParticipantUseCase,
        Arc<InMemoryConnectionRepository>,
        Arc<InMemoryHistoryRepository>,
        Arc<ChannelMessagePusher>,
    ) {
        let connections = Arc::new(InMemoryConnectionRepository::new(Arc::new(Mutex::new(
            Registry::new(),
        ))));
        let history = Arc::new(InMemoryHistoryRepository::new(Arc::new(Mutex::new(
            HistoryLog::new(10).unwrap(),
        ))));
        let pusher = Arc::new(ChannelMessagePusher::default());
        let router = Arc::new(RouteMessageUseCase::new(
            connections.clone(),
            history.clone(),
            pusher.clone(),
            false,
        ));
        let usecase = ConnectParticipantUseCase::new(
            connections.clone(),
            router,
            Arc::new(FixedClock::new(1000)),
        );
        (usecase, connections, history, pusher)
    }

    #[tokio::test]
    async fn test_connect_registers_and_announces() {
        // テスト項目: 接続するとレジストリに登録され、既存参加者に参加通知が届く
        // given (前提条件):
        let (usecase, connections, history, pusher) = create_usecase();
        let (alice_tx, mut alice_rx, _) = PusherChannel::bounded(16);
        pusher.register_client(ConnectionId::new(1), alice_tx).await;
        usecase
            .execute(ConnectionId::new(1), Username::new("alice").unwrap())
            .await
            .unwrap();

        // when (操作):
        let record = usecase
            .execute(ConnectionId::new(2), Username::new("bob").unwrap())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(record.connected_at, Timestamp::new(1000));
        assert_eq!(connections.count().await, 2);
        assert_eq!(
            alice_rx.recv().await,
            Some("bob has joined the chat.".to_string())
        );
        assert_eq!(
            history.snapshot().await,
            vec!["alice has joined the chat.", "bob has joined the chat."]
        );
    }

    #[tokio::test]
    async fn test_connect_duplicate_handle_fails_without_notice() {
        // テスト項目: 同じハンドルでの二重登録はエラーになり、通知も履歴も増えない
        // given (前提条件):
        let (usecase, connections, history, _pusher) = create_usecase();
        usecase
            .execute(ConnectionId::new(1), Username::new("alice").unwrap())
            .await
            .unwrap();

        // when (操作):
        let result = usecase
            .execute(ConnectionId::new(1), Username::new("mallory").unwrap())
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConnectError::DuplicateHandle(ConnectionId::new(1)))
        );
        assert_eq!(connections.count().await, 1);
        assert_eq!(history.snapshot().await.len(), 1);
    }
}
