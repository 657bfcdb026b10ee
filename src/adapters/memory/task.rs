//! In-memory task store, including the completed-task tally backing the
//! performance report.

use super::state::{
    self, PendingWrite, SharedPending, SharedState,
};
use crate::domain::{ProjectId, Task, TaskId, TaskStatus, UserId};
use crate::ports::{CompletedTally, StorageResult, TaskRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Task store bound to one unit of work.
#[derive(Debug, Clone)]
pub struct InMemoryTaskStore {
    state: SharedState,
    pending: SharedPending,
}

impl InMemoryTaskStore {
    pub(super) fn new(state: SharedState, pending: SharedPending) -> Self {
        Self { state, pending }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn find_by_id(&self, id: TaskId) -> StorageResult<Option<Task>> {
        let board = state::read_state(&self.state)?;
        Ok(board
            .tasks
            .get(&id)
            .map(|row| state::hydrate_task(&board, row)))
    }

    async fn list_by_project(&self, project_id: ProjectId) -> StorageResult<Vec<Task>> {
        let board = state::read_state(&self.state)?;
        let mut rows: Vec<_> = board
            .tasks
            .values()
            .filter(|row| row.task.project_id() == project_id)
            .collect();
        rows.sort_by_key(|row| row.seq);
        Ok(rows
            .into_iter()
            .map(|row| state::hydrate_task(&board, row))
            .collect())
    }

    async fn add(&self, task: &Task) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::AddTask(task.clone()));
        Ok(())
    }

    async fn update(&self, task: &Task) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::UpdateTask(task.clone()));
        Ok(())
    }

    async fn remove(&self, id: TaskId) -> StorageResult<()> {
        let mut writes = state::lock_pending(&self.pending)?;
        writes.push(PendingWrite::RemoveTask(id));
        Ok(())
    }

    async fn tally_completed_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<Vec<CompletedTally>> {
        let board = state::read_state(&self.state)?;
        let mut counts: HashMap<UserId, u64> = HashMap::new();
        for row in board.tasks.values() {
            if row.task.status() != TaskStatus::Completed {
                continue;
            }
            let recently = row
                .task
                .completed_at()
                .is_some_and(|stamp| stamp >= cutoff);
            if !recently {
                continue;
            }
            let Some(project) = board.projects.get(&row.task.project_id()) else {
                continue;
            };
            *counts.entry(project.owner).or_insert(0) += 1;
        }
        let mut tallies: Vec<CompletedTally> = counts
            .into_iter()
            .map(|(owner, completed)| CompletedTally { owner, completed })
            .collect();
        tallies.sort_by_key(|tally| tally.owner.into_inner());
        Ok(tallies)
    }
}
