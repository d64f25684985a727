//! UseCase: 履歴取得

use std::sync::Arc;

use crate::domain::HistoryRepository;

pub struct GetHistoryUseCase {
    repository: Arc<dyn HistoryRepository>,
}

impl GetHistoryUseCase {
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    /// 容量と、到着順に並んだ全エントリを返す
    pub async fn execute(&self) -> (usize, Vec<String>) {
        let capacity = self.repository.capacity().await;
        let entries = self.repository.snapshot().await;
        (capacity, entries)
    }
}
