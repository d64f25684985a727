//! Server state shared by every session.

use std::{collections::HashMap, sync::Arc, time::Duration};

use linechat_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    config::{ConfigError, ServerConfig},
    domain::{ConnectionIdFactory, HistoryLog, MessagePusher, Registry},
    infrastructure::{
        message_pusher::ChannelMessagePusher,
        repository::{InMemoryConnectionRepository, InMemoryHistoryRepository},
    },
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetHistoryUseCase,
        GetParticipantsUseCase, RouteMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// RouteMessageUseCase（メッセージ配送のユースケース）
    pub route_message_usecase: Arc<RouteMessageUseCase>,
    /// GetParticipantsUseCase（参加者一覧取得のユースケース）
    pub get_participants_usecase: Arc<GetParticipantsUseCase>,
    /// GetHistoryUseCase（履歴取得のユースケース）
    pub get_history_usecase: Arc<GetHistoryUseCase>,
    /// MessagePusher（接続ごとの送信チャンネル管理）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// Hands out connection handles in accept order
    pub connection_ids: ConnectionIdFactory,
    /// Close sessions whose read side stays silent this long
    pub idle_timeout: Option<Duration>,
    /// Inbound lines longer than this many bytes are dropped
    pub max_line_length: usize,
    /// Depth of each connection's outbound queue
    pub outbound_queue_depth: usize,
}

impl AppState {
    /// Wire the in-memory repositories, the channel pusher and the use cases.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroHistoryCapacity` if the history capacity is 0.
    pub fn in_memory(config: &ServerConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        // 1. Repositories (in-memory)
        let history_log = HistoryLog::new(config.history_capacity)
            .map_err(|_| ConfigError::ZeroHistoryCapacity)?;
        let connection_repository = Arc::new(InMemoryConnectionRepository::new(Arc::new(
            Mutex::new(Registry::new()),
        )));
        let history_repository =
            Arc::new(InMemoryHistoryRepository::new(Arc::new(Mutex::new(history_log))));

        // 2. MessagePusher
        let message_pusher: Arc<dyn MessagePusher> =
            Arc::new(ChannelMessagePusher::new(Arc::new(Mutex::new(HashMap::new()))));

        // 3. UseCases
        let route_message_usecase = Arc::new(RouteMessageUseCase::new(
            connection_repository.clone(),
            history_repository.clone(),
            message_pusher.clone(),
            config.notify_rejections,
        ));
        let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
            connection_repository.clone(),
            route_message_usecase.clone(),
            clock,
        ));
        let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
            connection_repository.clone(),
            route_message_usecase.clone(),
        ));
        let get_participants_usecase =
            Arc::new(GetParticipantsUseCase::new(connection_repository));
        let get_history_usecase = Arc::new(GetHistoryUseCase::new(history_repository));

        Ok(Self {
            connect_participant_usecase,
            disconnect_participant_usecase,
            route_message_usecase,
            get_participants_usecase,
            get_history_usecase,
            message_pusher,
            connection_ids: ConnectionIdFactory::new(),
            idle_timeout: config.idle_timeout,
            max_line_length: config.max_line_length,
            outbound_queue_depth: config.outbound_queue_depth,
        })
    }
}
