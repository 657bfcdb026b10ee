//! In-memory gateway and unit of work.

use super::comment::InMemoryCommentStore;
use super::history::InMemoryHistoryStore;
use super::project::InMemoryProjectStore;
use super::state::{self, SharedPending, SharedState};
use super::task::InMemoryTaskStore;
use crate::ports::{
    CommentRepository, HistoryRepository, ProjectRepository, StorageGateway, StorageResult,
    TaskRepository, UnitOfWork,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Thread-safe in-memory storage gateway.
///
/// Cloning the gateway shares the committed state; every [`Self::begin`]
/// call yields a unit of work with its own empty staging buffer over that
/// shared state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: SharedState,
}

impl InMemoryGateway {
    /// Creates an empty in-memory gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageGateway for InMemoryGateway {
    type Uow = InMemoryUnitOfWork;

    async fn begin(&self) -> StorageResult<InMemoryUnitOfWork> {
        Ok(InMemoryUnitOfWork::new(Arc::clone(&self.state)))
    }
}

/// One staged transaction over the shared in-memory state.
#[derive(Debug)]
pub struct InMemoryUnitOfWork {
    state: SharedState,
    pending: SharedPending,
    projects: InMemoryProjectStore,
    tasks: InMemoryTaskStore,
    comments: InMemoryCommentStore,
    histories: InMemoryHistoryStore,
}

impl InMemoryUnitOfWork {
    fn new(state: SharedState) -> Self {
        let pending: SharedPending = Arc::new(Mutex::new(Vec::new()));
        Self {
            projects: InMemoryProjectStore::new(Arc::clone(&state), Arc::clone(&pending)),
            tasks: InMemoryTaskStore::new(Arc::clone(&state), Arc::clone(&pending)),
            comments: InMemoryCommentStore::new(Arc::clone(&state), Arc::clone(&pending)),
            histories: InMemoryHistoryStore::new(Arc::clone(&state), Arc::clone(&pending)),
            state,
            pending,
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn projects(&self) -> &dyn ProjectRepository {
        &self.projects
    }

    fn tasks(&self) -> &dyn TaskRepository {
        &self.tasks
    }

    fn comments(&self) -> &dyn CommentRepository {
        &self.comments
    }

    fn histories(&self) -> &dyn HistoryRepository {
        &self.histories
    }

    async fn commit(self) -> StorageResult<usize> {
        let writes = {
            let mut staged = state::lock_pending(&self.pending)?;
            std::mem::take(&mut *staged)
        };

        // Apply against a working copy so a failing write leaves committed
        // state untouched.
        let mut board = state::write_state(&self.state)?;
        let mut working = board.clone();
        let mut affected = 0;
        for write in &writes {
            affected += state::apply(&mut working, write)?;
        }
        *board = working;
        Ok(affected)
    }

    async fn rollback(self) -> StorageResult<()> {
        let mut staged = state::lock_pending(&self.pending)?;
        staged.clear();
        Ok(())
    }
}
