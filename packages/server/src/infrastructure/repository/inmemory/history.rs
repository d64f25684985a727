//! インメモリ履歴ログ

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{HistoryLog, HistoryRepository};

/// インメモリ履歴ログ
///
/// 追加とスナップショットは同じロックで直列化されるため、
/// スナップショットが破棄途中の状態を観測することはありません。
pub struct InMemoryHistoryRepository {
    log: Arc<Mutex<HistoryLog>>,
}

impl InMemoryHistoryRepository {
    pub fn new(log: Arc<Mutex<HistoryLog>>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn append(&self, entry: String) {
        let mut log = self.log.lock().await;
        if let Some(evicted) = log.append(entry) {
            tracing::trace!("Evicted oldest history entry: {}", evicted);
        }
    }

    async fn snapshot(&self) -> Vec<String> {
        let log = self.log.lock().await;
        log.snapshot()
    }

    async fn capacity(&self) -> usize {
        let log = self.log.lock().await;
        log.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_repository(capacity: usize) -> InMemoryHistoryRepository {
        InMemoryHistoryRepository::new(Arc::new(Mutex::new(HistoryLog::new(capacity).unwrap())))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_never_exceed_capacity() {
        // テスト項目: 並行追加しても容量を超えず、各送信者の順序が保たれる
        // given (前提条件):
        let capacity = 50;
        let repo = Arc::new(create_test_repository(capacity));

        // when (操作): 4 タスクがそれぞれ 100 件ずつ追加
        let mut tasks = Vec::new();
        for writer in 0..4 {
            let repo = repo.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..100 {
                    repo.append(format!("{}:{}", writer, i)).await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // then (期待する結果):
        let entries = repo.snapshot().await;
        assert_eq!(entries.len(), capacity);
        for writer in 0..4 {
            let seq: Vec<u32> = entries
                .iter()
                .filter_map(|e| e.strip_prefix(&format!("{}:", writer)))
                .map(|n| n.parse().unwrap())
                .collect();
            assert!(seq.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[tokio::test]
    async fn test_capacity_is_reported() {
        // テスト項目: 設定した容量が取得できる
        // given (前提条件):
        let repo = create_test_repository(7);

        // when (操作):
        let capacity = repo.capacity().await;

        // then (期待する結果):
        assert_eq!(capacity, 7);
    }
}
