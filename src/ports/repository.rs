//! Repository ports for the four entity collections and the report query.
//!
//! Write operations (`add`, `update`, `remove`, `append`) stage the change
//! in the owning unit of work; nothing becomes visible to readers until
//! [`crate::ports::UnitOfWork::commit`] succeeds. Read operations always
//! observe committed state.

use crate::domain::{
    Comment, CommentId, HistoryEntry, Project, ProjectId, ProjectName, Task, TaskId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Project persistence contract.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Finds a project by identifier, hydrating its tasks (with comments
    /// and history).
    ///
    /// Returns `None` when the project does not exist.
    async fn find_by_id(&self, id: ProjectId) -> StorageResult<Option<Project>>;

    /// Returns all projects of the given owner, without hydrating tasks.
    async fn list_by_owner(&self, owner: UserId) -> StorageResult<Vec<Project>>;

    /// Returns `true` when another project of `owner` already carries
    /// `name`. Comparison is case-sensitive exact match. `excluding` leaves
    /// one project out of the check so a rename does not conflict with
    /// itself.
    async fn name_conflicts(
        &self,
        name: &ProjectName,
        owner: UserId,
        excluding: Option<ProjectId>,
    ) -> StorageResult<bool>;

    /// Stages insertion of a new project.
    async fn add(&self, project: &Project) -> StorageResult<()>;

    /// Stages an update of an existing project.
    async fn update(&self, project: &Project) -> StorageResult<()>;

    /// Stages removal of a project. The storage layer cascade-removes the
    /// project's tasks and their comments and history. Removing an unknown
    /// id commits as a no-op.
    async fn remove(&self, id: ProjectId) -> StorageResult<()>;
}

/// Task persistence contract, including the one aggregate query backing
/// the performance report.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Finds a task by identifier, hydrating comments and history.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> StorageResult<Option<Task>>;

    /// Returns all tasks of the given project.
    async fn list_by_project(&self, project_id: ProjectId) -> StorageResult<Vec<Task>>;

    /// Stages insertion of a new task.
    async fn add(&self, task: &Task) -> StorageResult<()>;

    /// Stages an update of an existing task.
    async fn update(&self, task: &Task) -> StorageResult<()>;

    /// Stages removal of a task. The storage layer cascade-removes the
    /// task's comments and history. Removing an unknown id commits as a
    /// no-op.
    async fn remove(&self, id: TaskId) -> StorageResult<()>;

    /// Counts completed tasks per owning user, restricted to tasks whose
    /// completion timestamp is at or after `cutoff`.
    async fn tally_completed_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<Vec<CompletedTally>>;
}

/// Comment persistence contract.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Returns all comments of the given task, oldest first.
    async fn list_by_task(&self, task_id: TaskId) -> StorageResult<Vec<Comment>>;

    /// Stages insertion of a new comment.
    async fn add(&self, comment: &Comment) -> StorageResult<()>;

    /// Stages removal of a comment. Removing an unknown id commits as a
    /// no-op.
    async fn remove(&self, id: CommentId) -> StorageResult<()>;
}

/// History persistence contract.
///
/// The trail is append-only: this port deliberately exposes no update or
/// remove operation. Entries disappear only through task cascade removal.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Returns all history entries of the given task, timestamp ascending.
    async fn list_by_task(&self, task_id: TaskId) -> StorageResult<Vec<HistoryEntry>>;

    /// Stages appending of a new history entry.
    async fn append(&self, entry: &HistoryEntry) -> StorageResult<()>;
}

/// Per-owner count of recently completed tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedTally {
    /// Owner of the projects the completed tasks belong to.
    pub owner: UserId,
    /// Number of tasks completed within the window.
    pub completed: u64,
}

/// Errors returned by repository and unit-of-work implementations.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The referenced project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Another project of the same owner already carries the name. Raised
    /// by the commit-time backstop; services normally reject duplicates
    /// before staging.
    #[error("duplicate project name '{name}' for owner {owner}")]
    DuplicateProjectName {
        /// Conflicting project name.
        name: String,
        /// Owner the name is scoped to.
        owner: UserId,
    },

    /// The project already holds the maximum number of tasks. Raised by the
    /// commit-time backstop; services normally reject the insert before
    /// staging.
    #[error("task limit reached for project {0}")]
    TaskLimitReached(ProjectId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
