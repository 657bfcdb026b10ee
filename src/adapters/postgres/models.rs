//! Diesel row models for project and task persistence.

use super::schema::{projects, task_comments, task_history, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Identifier of the owning user.
    pub owner_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last rename timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert and update model for project records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub struct NewProjectRow {
    /// Project identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Identifier of the owning user.
    pub owner_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last rename timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Due date.
    pub due_date: DateTime<Utc>,
    /// Completion timestamp, if the task ever completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Priority, canonical storage string.
    pub priority: String,
    /// Status, canonical storage string.
    pub status: String,
    /// Identifier of the owning project.
    pub project_id: Uuid,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Due date.
    pub due_date: DateTime<Utc>,
    /// Completion timestamp, if the task ever completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Priority, canonical storage string.
    pub priority: String,
    /// Status, canonical storage string.
    pub status: String,
    /// Identifier of the owning project.
    pub project_id: Uuid,
}

/// Query result row for comment records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Comment identifier.
    pub id: Uuid,
    /// Identifier of the owning task.
    pub task_id: Uuid,
    /// Comment content.
    pub content: String,
    /// Identifier of the author.
    pub author_id: Uuid,
    /// Creation timestamp.
    pub posted_at: DateTime<Utc>,
}

/// Insert model for comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_comments)]
pub struct NewCommentRow {
    /// Comment identifier.
    pub id: Uuid,
    /// Identifier of the owning task.
    pub task_id: Uuid,
    /// Comment content.
    pub content: String,
    /// Identifier of the author.
    pub author_id: Uuid,
    /// Creation timestamp.
    pub posted_at: DateTime<Utc>,
}

/// Query result row for history records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// History identifier.
    pub id: Uuid,
    /// Identifier of the owning task.
    pub task_id: Uuid,
    /// Change note.
    pub note: String,
    /// Status snapshot.
    pub status: String,
    /// Priority snapshot.
    pub priority: String,
    /// Identifier of the acting user.
    pub author_id: Uuid,
    /// Write timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for history records. History is append-only, so no
/// changeset model exists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_history)]
pub struct NewHistoryRow {
    /// History identifier.
    pub id: Uuid,
    /// Identifier of the owning task.
    pub task_id: Uuid,
    /// Change note.
    pub note: String,
    /// Status snapshot.
    pub status: String,
    /// Priority snapshot.
    pub priority: String,
    /// Identifier of the acting user.
    pub author_id: Uuid,
    /// Write timestamp.
    pub recorded_at: DateTime<Utc>,
}
