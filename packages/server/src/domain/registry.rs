//! 接続レジストリ（ドメインモデル）
//!
//! ハンドル → クライアントレコードの対応を保持します。
//! 登録順を保持するため、ハンドルから登録順序番号への索引と、
//! 登録順序番号順に並んだレコードの 2 つのマップで管理します。
//!
//! このモデル自体は同期を持ちません。排他制御は Repository 実装が担います。

use std::collections::{BTreeMap, HashMap};

use super::{ClientRecord, ConnectionId, RegistryError, Username};

#[derive(Debug, Default, Clone)]
pub struct Registry {
    /// 登録順序番号 → レコード（反復順 = 登録順）
    records: BTreeMap<u64, ClientRecord>,
    /// ハンドル → 登録順序番号
    index: HashMap<ConnectionId, u64>,
    next_seq: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// レコードを登録する
    ///
    /// # Errors
    ///
    /// 同じハンドルが既に登録されている場合は `RegistryError::DuplicateHandle`
    pub fn register(&mut self, record: ClientRecord) -> Result<(), RegistryError> {
        if self.index.contains_key(&record.id) {
            return Err(RegistryError::DuplicateHandle(record.id));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(record.id, seq);
        self.records.insert(seq, record);
        Ok(())
    }

    /// ハンドルを登録解除する。存在しなければ何もしない（冪等）。
    pub fn unregister(&mut self, id: ConnectionId) -> Option<ClientRecord> {
        let seq = self.index.remove(&id)?;
        self.records.remove(&seq)
    }

    /// ユーザー名で検索する
    ///
    /// 同名のクライアントが複数いる場合は、最も早く登録されたものを返す。
    pub fn lookup_by_username(&self, username: &str) -> Option<ConnectionId> {
        self.records
            .values()
            .find(|record| record.username.as_str() == username)
            .map(|record| record.id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&ClientRecord> {
        self.index.get(&id).and_then(|seq| self.records.get(seq))
    }

    /// 登録順に並んだ全レコードのコピーを返す
    pub fn snapshot(&self) -> Vec<ClientRecord> {
        self.records.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
