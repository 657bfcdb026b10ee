//! In-memory project store.

use super::state::{
    self, PendingWrite, SharedPending, SharedState,
};
use crate::domain::{Project, ProjectId, ProjectName, UserId};
use crate::ports::{ProjectRepository, StorageResult};
use async_trait::async_trait;

/// Project store bound to one unit of work.
#[derive(Debug, Clone)]
pub struct InMemoryProjectStore {
    state: SharedState,
    pending: SharedPending,
}

impl InMemoryProjectStore {
    pub(super) fn new(state: SharedState, pending: SharedPending) -> Self {
        Self { state, pending }
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectStore {
    async fn find_by_id(&self, id: ProjectId) -> StorageResult<Option<Project>> {
        let board = state::read_state(&self.state)?;
        Ok(board
            .projects
            .get(&id)
            .map(|row| state::hydrate_project(&board, row)))
    }

    async fn list_by_owner(&self, owner: UserId) -> StorageResult<Vec<Project>> {
        let board = state::read_state(&self.state)?;
        let mut rows: Vec<_> = board
            .projects
            .values()
            .filter(|row| row.owner == owner)
            .collect();
        rows.sort_by_key(|row| row.seq);
        Ok(rows.into_iter().map(state::shallow_project).collect())
    }

    async fn name_conflicts(
        &self,
        name: &ProjectName,
        owner: UserId,
        excluding: Option<ProjectId>,
    ) -> StorageResult<bool> {
        let board = state::read_state(&self.state)?;
        Ok(board.projects.values().any(|row| {
            Some(row.id) != excluding && row.owner == owner && row.name == *name
        }))
    }

    async fn add(&self, project: &Project) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::AddProject(project.clone()));
        Ok(())
    }

    async fn update(&self, project: &Project) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::UpdateProject(project.clone()));
        Ok(())
    }

    async fn remove(&self, id: ProjectId) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::RemoveProject(id));
        Ok(())
    }
}
