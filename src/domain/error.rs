//! Error types for domain validation and parsing.

use super::ids::ProjectId;
use thiserror::Error;

/// Errors returned while constructing or mutating domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The project name exceeds the 150-character limit.
    #[error("project name '{0}' exceeds 150 characters")]
    ProjectNameTooLong(String),

    /// The owner identifier is the nil UUID.
    #[error("owner identifier must not be empty")]
    EmptyOwnerId,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The task title exceeds the 100-character limit.
    #[error("task title '{0}' exceeds 100 characters")]
    TaskTitleTooLong(String),

    /// The task description exceeds the 500-character limit.
    #[error("task description of {0} characters exceeds the 500-character limit")]
    DescriptionTooLong(usize),

    /// The comment content is empty after trimming.
    #[error("comment content must not be empty")]
    EmptyCommentContent,

    /// The comment content exceeds the 1000-character limit.
    #[error("comment content of {0} characters exceeds the 1000-character limit")]
    CommentContentTooLong(usize),

    /// The history note exceeds the 500-character limit.
    #[error("history note of {0} characters exceeds the 500-character limit")]
    HistoryNoteTooLong(usize),

    /// The project already holds the maximum number of tasks.
    #[error("project {0} reached the maximum number of tasks")]
    TaskLimitReached(ProjectId),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
