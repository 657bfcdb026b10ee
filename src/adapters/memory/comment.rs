//! In-memory comment store.

use super::state::{
    self, PendingWrite, SharedPending, SharedState,
};
use crate::domain::{Comment, CommentId, TaskId};
use crate::ports::{CommentRepository, StorageResult};
use async_trait::async_trait;

/// Comment store bound to one unit of work.
#[derive(Debug, Clone)]
pub struct InMemoryCommentStore {
    state: SharedState,
    pending: SharedPending,
}

impl InMemoryCommentStore {
    pub(super) fn new(state: SharedState, pending: SharedPending) -> Self {
        Self { state, pending }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentStore {
    async fn list_by_task(&self, task_id: TaskId) -> StorageResult<Vec<Comment>> {
        let board = state::read_state(&self.state)?;
        let mut rows: Vec<_> = board
            .comments
            .values()
            .filter(|row| row.comment.task_id() == task_id)
            .collect();
        rows.sort_by_key(|row| row.seq);
        Ok(rows.into_iter().map(|row| row.comment.clone()).collect())
    }

    async fn add(&self, comment: &Comment) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::AddComment(comment.clone()));
        Ok(())
    }

    async fn remove(&self, id: CommentId) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::RemoveComment(id));
        Ok(())
    }
}
