//! Project aggregate root.

use super::{
    error::DomainError,
    ids::{ProjectId, UserId},
    status::TaskStatus,
    task::Task,
    text::ProjectName,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Container for up to [`Project::MAX_TASKS`] tasks, owned by one user.
///
/// The (name, owner) pair is unique across all projects; the uniqueness
/// check lives in the rules engine with a storage-level backstop. The
/// aggregate itself enforces the task cap and exposes the deletion
/// eligibility predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    owner: UserId,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    tasks: Vec<Task>,
}

/// Parameter object for reconstructing a persisted project aggregate.
///
/// Reconstruction takes the stored id and timestamps as-is and does not
/// re-run creation validation: a persisted project may transiently exceed
/// invariants the constructor enforces (e.g. the task cap under a lost
/// race) and must still be loadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted project name.
    pub name: ProjectName,
    /// Identifier of the owning user.
    pub owner: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last-update timestamp, if the project was ever renamed.
    pub updated_at: Option<DateTime<Utc>>,
    /// Hydrated tasks, in storage order.
    pub tasks: Vec<Task>,
}

impl Project {
    /// Maximum number of tasks a project may hold.
    pub const MAX_TASKS: usize = 20;

    /// Creates a new project for the given owner.
    #[must_use]
    pub fn new(name: ProjectName, owner: UserId, clock: &impl Clock) -> Self {
        Self {
            id: ProjectId::new(),
            name,
            owner,
            created_at: clock.utc(),
            updated_at: None,
            tasks: Vec::new(),
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            owner: data.owner,
            created_at: data.created_at,
            updated_at: data.updated_at,
            tasks: data.tasks,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the identifier of the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-update timestamp, if the project was ever renamed.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns the tasks owned by this project.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Adds a task to the aggregate, enforcing the task cap.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::TaskLimitReached`] when the project already
    /// holds [`Project::MAX_TASKS`] tasks.
    pub fn add_task(&mut self, task: Task) -> Result<(), DomainError> {
        if self.tasks.len() >= Self::MAX_TASKS {
            return Err(DomainError::TaskLimitReached(self.id));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Returns `true` when no owned task is [`TaskStatus::Pending`].
    ///
    /// Projects with pending tasks cannot be deleted; tasks in any other
    /// status do not block deletion.
    #[must_use]
    pub fn eligible_for_deletion(&self) -> bool {
        !self
            .tasks
            .iter()
            .any(|task| task.status() == TaskStatus::Pending)
    }

    /// Renames the project. A blank or whitespace-only name is silently
    /// ignored; a non-blank name is validated and replaces the current one,
    /// touching the last-update timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ProjectNameTooLong`] when the new name exceeds
    /// the limit.
    pub fn rename(&mut self, new_name: &str, clock: &impl Clock) -> Result<(), DomainError> {
        if new_name.trim().is_empty() {
            return Ok(());
        }
        self.name = ProjectName::new(new_name)?;
        self.updated_at = Some(clock.utc());
        Ok(())
    }
}
