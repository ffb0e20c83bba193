//! Transaction log: append-only record of executed fills.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::transaction::Transaction;

/// In-memory log. Ids are handed out by `reserve_id` so the trade engine can
/// persist a record under its final id before the append becomes visible.
pub struct TransactionLog {
    next_id: AtomicI64,
    entries: RwLock<Vec<Transaction>>,
}

pub type SharedTransactionLog = Arc<TransactionLog>;

impl TransactionLog {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Rebuild from persisted rows; the id counter resumes past the max seen.
    pub fn hydrate(entries: Vec<Transaction>) -> Self {
        let max_id = entries.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            next_id: AtomicI64::new(max_id + 1),
            entries: RwLock::new(entries),
        }
    }

    /// Claim the next transaction id. Monotonic and unique; ids reserved for
    /// trades that fail at the storage step are simply skipped.
    pub fn reserve_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub async fn append(&self, record: Transaction) {
        let mut guard = self.entries.write().await;
        guard.push(record);
    }

    /// A user's history, newest first: timestamp descending, ties broken by id
    /// so that insertion order decides.
    pub async fn list_by_user(&self, user_id: Uuid) -> Vec<Transaction> {
        let guard = self.entries.read().await;
        let mut records: Vec<Transaction> = guard
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        records
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}
