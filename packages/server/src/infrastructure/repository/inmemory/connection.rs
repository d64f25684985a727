//! インメモリ接続レジストリ

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientRecord, ConnectionId, ConnectionRepository, Registry, RegistryError};

/// インメモリ接続レジストリ
///
/// Registry ドメインモデルを保持し、ドメイン層の ConnectionRepository trait を実装します。
/// ロックは各操作の間だけ保持され、スナップショットはコピーとして返されます。
pub struct InMemoryConnectionRepository {
    registry: Arc<Mutex<Registry>>,
}

impl InMemoryConnectionRepository {
    pub fn new(registry: Arc<Mutex<Registry>>) -> Self {
        Self { registry }
    }
}

impl Default for InMemoryConnectionRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(Registry::new())))
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn register(&self, record: ClientRecord) -> Result<(), RegistryError> {
        let mut registry = self.registry.lock().await;
        registry.register(record)
    }

    async fn unregister(&self, id: ConnectionId) -> Option<ClientRecord> {
        let mut registry = self.registry.lock().await;
        registry.unregister(id)
    }

    async fn lookup_by_username(&self, username: &str) -> Option<ConnectionId> {
        let registry = self.registry.lock().await;
        registry.lookup_by_username(username)
    }

    async fn snapshot(&self) -> Vec<ClientRecord> {
        let registry = self.registry.lock().await;
        registry.snapshot()
    }

    async fn count(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.len()
    }
}
