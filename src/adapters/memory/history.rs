//! In-memory history store. Append-only: the port exposes no update or
//! removal, and the store honours that by never rewriting an entry.

use super::state::{
    self, PendingWrite, SharedPending, SharedState,
};
use crate::domain::{HistoryEntry, TaskId};
use crate::ports::{HistoryRepository, StorageResult};
use async_trait::async_trait;

/// History store bound to one unit of work.
#[derive(Debug, Clone)]
pub struct InMemoryHistoryStore {
    state: SharedState,
    pending: SharedPending,
}

impl InMemoryHistoryStore {
    pub(super) fn new(state: SharedState, pending: SharedPending) -> Self {
        Self { state, pending }
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryStore {
    async fn list_by_task(&self, task_id: TaskId) -> StorageResult<Vec<HistoryEntry>> {
        let board = state::read_state(&self.state)?;
        let mut rows: Vec<_> = board
            .history
            .values()
            .filter(|row| row.entry.task_id() == task_id)
            .collect();
        rows.sort_by_key(|row| (row.entry.recorded_at(), row.seq));
        Ok(rows.into_iter().map(|row| row.entry.clone()).collect())
    }

    async fn append(&self, entry: &HistoryEntry) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::AppendHistory(entry.clone()));
        Ok(())
    }
}
