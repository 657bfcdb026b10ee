//! Task aggregate root and update semantics.

use super::{
    comment::Comment,
    error::DomainError,
    history::HistoryEntry,
    ids::{ProjectId, TaskId},
    priority::TaskPriority,
    status::TaskStatus,
    text::TaskTitle,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Maximum length for a task description, matching the `VARCHAR(500)` column.
const MAX_DESCRIPTION_CHARS: usize = 500;

/// Unit of work within a project.
///
/// A task owns its comments and history entries; it holds a non-owning
/// back-reference to its project. Priority is fixed at creation; status,
/// title, and description are mutable through [`Task::apply_update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<String>,
    due_date: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    priority: TaskPriority,
    status: TaskStatus,
    project_id: ProjectId,
    comments: Vec<Comment>,
    history: Vec<HistoryEntry>,
}

/// Parameter object for reconstructing a persisted task aggregate.
///
/// Reconstruction bypasses creation-time validation: the id and status are
/// taken as stored and no fresh identifier is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted due date.
    pub due_date: DateTime<Utc>,
    /// Persisted completion timestamp, if the task ever completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted status.
    pub status: TaskStatus,
    /// Identifier of the owning project.
    pub project_id: ProjectId,
    /// Hydrated comments, in storage order.
    pub comments: Vec<Comment>,
    /// Hydrated history entries, timestamp ascending.
    pub history: Vec<HistoryEntry>,
}

impl Task {
    /// Creates a new task under the given project with status
    /// [`TaskStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DescriptionTooLong`] when the description
    /// exceeds 500 characters.
    pub fn new(
        title: TaskTitle,
        description: Option<String>,
        due_date: DateTime<Utc>,
        priority: TaskPriority,
        project_id: ProjectId,
    ) -> Result<Self, DomainError> {
        if let Some(text) = description.as_deref() {
            validate_description(text)?;
        }

        Ok(Self {
            id: TaskId::new(),
            title,
            description,
            due_date,
            completed_at: None,
            priority,
            status: TaskStatus::Pending,
            project_id,
            comments: Vec::new(),
            history: Vec::new(),
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            completed_at: data.completed_at,
            priority: data.priority,
            status: data.status,
            project_id: data.project_id,
            comments: data.comments,
            history: data.history,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    /// Returns the completion timestamp, if the task ever reached
    /// [`TaskStatus::Completed`]. The stamp survives later status changes.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the priority fixed at creation.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the identifier of the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the comments attached to this task.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Returns the history entries of this task, timestamp ascending.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Resolves the description an update should store.
    ///
    /// A blank or whitespace-only proposal keeps the current description, as
    /// does a proposal equal to the current text under case-insensitive
    /// comparison. Any other proposal replaces it.
    #[must_use]
    pub fn resolve_description(&self, proposed: Option<&str>) -> Option<String> {
        let Some(text) = proposed else {
            return self.description.clone();
        };
        if text.trim().is_empty() {
            return self.description.clone();
        }
        let unchanged = self
            .description
            .as_deref()
            .is_some_and(|current| current.to_lowercase() == text.to_lowercase());
        if unchanged {
            return self.description.clone();
        }
        Some(text.to_owned())
    }

    /// Applies a partial update to title, description, and status.
    ///
    /// Blank title or description values leave the stored field unchanged
    /// rather than overwriting it. The status is always written; entering
    /// [`TaskStatus::Completed`] stamps the completion time, and leaving it
    /// later does not clear the stamp.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::TaskTitleTooLong`] or
    /// [`DomainError::DescriptionTooLong`] when a non-blank replacement
    /// exceeds its limit.
    pub fn apply_update(
        &mut self,
        title: Option<&str>,
        description: Option<String>,
        status: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), DomainError> {
        if let Some(text) = title {
            if !text.trim().is_empty() {
                self.title = TaskTitle::new(text)?;
            }
        }

        if let Some(text) = description {
            if !text.trim().is_empty() {
                validate_description(&text)?;
                self.description = Some(text);
            }
        }

        if status == TaskStatus::Completed {
            self.completed_at = Some(clock.utc());
        }
        self.status = status;
        Ok(())
    }
}

/// Checks a description against the 500-character limit.
fn validate_description(text: &str) -> Result<(), DomainError> {
    let chars = text.chars().count();
    if chars > MAX_DESCRIPTION_CHARS {
        return Err(DomainError::DescriptionTooLong(chars));
    }
    Ok(())
}
