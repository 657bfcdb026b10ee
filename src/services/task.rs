//! Service layer for task lifecycle rules.
//!
//! Enforces the per-project task cap and the immutable-priority rule,
//! normalizes description changes, and writes one history entry for every
//! mutating action in the same unit of work as the primary write.

use super::report::{PerformanceRow, REPORT_WINDOW_DAYS};
use super::ErrorKind;
use crate::domain::{
    Comment, CommentContent, CommentId, DomainError, HistoryEntry, HistoryNote, Project,
    ProjectId, Task, TaskId, TaskPriority, TaskStatus, TaskTitle, UserId,
};
use crate::ports::{StorageError, StorageGateway, UnitOfWork};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Audit note recorded when a task is created.
const TASK_CREATED_NOTE: &str = "Tarefa criada.";

/// Request payload for creating a task under a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project_id: ProjectId,
    owner_id: UserId,
    title: String,
    description: Option<String>,
    due_date: DateTime<Utc>,
    priority: TaskPriority,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        owner_id: UserId,
        title: impl Into<String>,
        due_date: DateTime<Utc>,
        priority: TaskPriority,
    ) -> Self {
        Self {
            project_id,
            owner_id,
            title: title.into(),
            description: None,
            due_date,
            priority,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for a partial task update.
///
/// The payload carries the priority so the engine can reject any attempt
/// to change it; blank title or description values leave the stored field
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    task_id: TaskId,
    author_id: UserId,
    title: Option<String>,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
}

impl UpdateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        author_id: UserId,
        status: TaskStatus,
        priority: TaskPriority,
    ) -> Self {
        Self {
            task_id,
            author_id,
            title: None,
            description: None,
            status,
            priority,
        }
    }

    /// Sets a replacement title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a replacement description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for commenting on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCommentRequest {
    task_id: TaskId,
    author_id: UserId,
    content: String,
}

impl AddCommentRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(task_id: TaskId, author_id: UserId, content: impl Into<String>) -> Self {
        Self {
            task_id,
            author_id,
            content: content.into(),
        }
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The project is missing or belongs to a different user.
    #[error("project {0} is missing or does not belong to the requesting user")]
    ProjectAccessDenied(ProjectId),

    /// The project already holds the maximum number of tasks.
    #[error("project {0} reached the maximum number of tasks")]
    LimitReached(ProjectId),

    /// The update carried a priority different from the stored one.
    #[error("priority of task {0} is fixed at creation and cannot be changed")]
    PriorityImmutable(TaskId),

    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TaskServiceError {
    /// Returns the failure classification for the transport boundary.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ProjectAccessDenied(_) => ErrorKind::Unauthorized,
            Self::LimitReached(_) | Self::PriorityImmutable(_) => ErrorKind::Conflict,
            Self::Domain(_) => ErrorKind::Validation,
            Self::Storage(err) => super::project::storage_error_kind(err),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task rules orchestration service.
#[derive(Clone)]
pub struct TaskService<G, C>
where
    G: StorageGateway,
    C: Clock + Send + Sync,
{
    gateway: Arc<G>,
    clock: Arc<C>,
}

impl<G, C> TaskService<G, C>
where
    G: StorageGateway,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(gateway: Arc<G>, clock: Arc<C>) -> Self {
        Self { gateway, clock }
    }

    /// Returns the full task with comments and history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not exist,
    /// or [`TaskServiceError::Storage`] when the lookup fails.
    pub async fn get_full(&self, id: TaskId) -> TaskServiceResult<Task> {
        let uow = self.gateway.begin().await?;
        uow.tasks()
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Creates a task under a project with status
    /// [`TaskStatus::Pending`], recording a creation history entry in the
    /// same commit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectAccessDenied`] when the project
    /// is missing or owned by another user,
    /// [`TaskServiceError::LimitReached`] when the project already holds
    /// the task cap, [`TaskServiceError::Domain`] on invalid input, or
    /// [`TaskServiceError::Storage`] when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskServiceResult<Task> {
        let title = TaskTitle::new(request.title)?;

        let uow = self.gateway.begin().await?;
        let Some(project) = uow.projects().find_by_id(request.project_id).await? else {
            return Err(TaskServiceError::ProjectAccessDenied(request.project_id));
        };
        if project.owner() != request.owner_id {
            return Err(TaskServiceError::ProjectAccessDenied(request.project_id));
        }

        let owned = uow.tasks().list_by_project(project.id()).await?;
        if owned.len() >= Project::MAX_TASKS {
            return Err(TaskServiceError::LimitReached(project.id()));
        }

        let task = Task::new(
            title,
            request.description,
            request.due_date,
            request.priority,
            project.id(),
        )?;
        let entry = HistoryEntry::new(
            task.id(),
            HistoryNote::clipped(TASK_CREATED_NOTE),
            task.status(),
            task.priority(),
            request.owner_id,
            &*self.clock,
        );

        uow.tasks().add(&task).await?;
        uow.histories().append(&entry).await?;
        uow.commit().await?;
        Ok(task)
    }

    /// Applies a partial update to a task, recording the effective
    /// description, resulting status, and unchanged priority as a history
    /// entry in the same commit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not
    /// exist, [`TaskServiceError::PriorityImmutable`] when the payload
    /// priority differs from the stored one, [`TaskServiceError::Domain`]
    /// on invalid input, or [`TaskServiceError::Storage`] when persistence
    /// fails.
    pub async fn update(&self, request: UpdateTaskRequest) -> TaskServiceResult<Task> {
        let UpdateTaskRequest {
            task_id,
            author_id,
            title,
            description,
            status,
            priority,
        } = request;

        let uow = self.gateway.begin().await?;
        let mut task = uow
            .tasks()
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::NotFound(task_id))?;

        if priority != task.priority() {
            return Err(TaskServiceError::PriorityImmutable(task.id()));
        }

        let effective = task.resolve_description(description.as_deref());
        task.apply_update(title.as_deref(), effective.clone(), status, &*self.clock)?;

        let entry = HistoryEntry::new(
            task.id(),
            HistoryNote::clipped(effective.as_deref().unwrap_or_default()),
            task.status(),
            task.priority(),
            author_id,
            &*self.clock,
        );

        uow.tasks().update(&task).await?;
        uow.histories().append(&entry).await?;
        uow.commit().await?;
        Ok(task)
    }

    /// Adds a comment to a task, recording a history entry that snapshots
    /// the task's current status and priority in the same commit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task does not
    /// exist, [`TaskServiceError::Domain`] when the content is invalid, or
    /// [`TaskServiceError::Storage`] when persistence fails.
    pub async fn add_comment(&self, request: AddCommentRequest) -> TaskServiceResult<Comment> {
        let content = CommentContent::new(request.content)?;

        let uow = self.gateway.begin().await?;
        let task = uow
            .tasks()
            .find_by_id(request.task_id)
            .await?
            .ok_or(TaskServiceError::NotFound(request.task_id))?;

        let comment = Comment::new(task.id(), content, request.author_id, &*self.clock);
        let note = format!("Comentário adicionado: {}", comment.content());
        let entry = HistoryEntry::new(
            task.id(),
            HistoryNote::clipped(&note),
            task.status(),
            task.priority(),
            request.author_id,
            &*self.clock,
        );

        uow.comments().add(&comment).await?;
        uow.histories().append(&entry).await?;
        uow.commit().await?;
        Ok(comment)
    }

    /// Deletes a task unconditionally by id. Comments and history go with
    /// it through the storage cascade; an unknown id commits as a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Storage`] when persistence fails.
    pub async fn delete(&self, id: TaskId) -> TaskServiceResult<()> {
        let uow = self.gateway.begin().await?;
        uow.tasks().remove(id).await?;
        uow.commit().await?;
        Ok(())
    }

    /// Deletes a comment unconditionally by id, with no further side
    /// effects. An unknown id commits as a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Storage`] when persistence fails.
    pub async fn delete_comment(&self, id: CommentId) -> TaskServiceResult<()> {
        let uow = self.gateway.begin().await?;
        uow.comments().remove(id).await?;
        uow.commit().await?;
        Ok(())
    }

    /// Builds the per-user performance report over tasks completed within
    /// the last 30 days.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Storage`] when the aggregate query
    /// fails.
    pub async fn performance_report(&self) -> TaskServiceResult<Vec<PerformanceRow>> {
        let cutoff = self.clock.utc() - Duration::days(REPORT_WINDOW_DAYS);
        let uow = self.gateway.begin().await?;
        let tallies = uow.tasks().tally_completed_since(cutoff).await?;
        Ok(tallies.into_iter().map(PerformanceRow::from_tally).collect())
    }
}
