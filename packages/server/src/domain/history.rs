//! 履歴ログ（ドメインモデル）
//!
//! ブロードキャストとシステム通知を整形済み文字列として保持する、容量固定のリングバッファ。
//! 容量を超えると最も古いエントリから破棄される（FIFO）。容量超過はエラーではなく通常動作。

use std::collections::VecDeque;

use super::HistoryError;

/// 履歴ログの既定容量
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl HistoryLog {
    /// 指定容量の履歴ログを作成
    ///
    /// # Errors
    ///
    /// 容量が 0 の場合は `HistoryError::ZeroCapacity`
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }
        Ok(Self {
            // 上限まで一度に確保しない
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        })
    }

    /// エントリを追加する。満杯なら最古のエントリを破棄してから追加する。
    ///
    /// 破棄されたエントリがあればそれを返す。
    pub fn append(&mut self, entry: String) -> Option<String> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// 到着順に並んだ全エントリのコピーを返す
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
