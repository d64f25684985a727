//! UseCase: 参加者一覧取得

use std::sync::Arc;

use crate::domain::{ClientRecord, ConnectionRepository};

pub struct GetParticipantsUseCase {
    repository: Arc<dyn ConnectionRepository>,
}

impl GetParticipantsUseCase {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// 登録順に並んだ参加者一覧を返す
    pub async fn execute(&self) -> Vec<ClientRecord> {
        self.repository.snapshot().await
    }

    pub async fn count(&self) -> usize {
        self.repository.count().await
    }
}
