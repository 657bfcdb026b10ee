//! Append-only audit records of task-affecting actions.

use super::{
    ids::{HistoryId, TaskId, UserId},
    priority::TaskPriority,
    status::TaskStatus,
    text::HistoryNote,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Immutable audit record of one task-affecting action.
///
/// Exactly one entry is written for every task creation, every field
/// update, and every comment addition, in the same unit of work as the
/// primary write. Entries capture a status/priority snapshot valid at the
/// moment of the call and are never updated or deleted afterwards; they
/// only disappear when their task is cascade-removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    id: HistoryId,
    task_id: TaskId,
    note: HistoryNote,
    status: TaskStatus,
    priority: TaskPriority,
    author: UserId,
    recorded_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHistoryData {
    /// Persisted history identifier.
    pub id: HistoryId,
    /// Identifier of the task the entry belongs to.
    pub task_id: TaskId,
    /// Persisted change note.
    pub note: HistoryNote,
    /// Status snapshot taken when the entry was written.
    pub status: TaskStatus,
    /// Priority snapshot taken when the entry was written.
    pub priority: TaskPriority,
    /// Identifier of the acting user.
    pub author: UserId,
    /// Server-assigned timestamp of the entry.
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates a new history entry for the given task.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        note: HistoryNote,
        status: TaskStatus,
        priority: TaskPriority,
        author: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: HistoryId::new(),
            task_id,
            note,
            status,
            priority,
            author,
            recorded_at: clock.utc(),
        }
    }

    /// Reconstructs a history entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHistoryData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            note: data.note,
            status: data.status,
            priority: data.priority,
            author: data.author,
            recorded_at: data.recorded_at,
        }
    }

    /// Returns the history identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryId {
        self.id
    }

    /// Returns the identifier of the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the change note.
    #[must_use]
    pub const fn note(&self) -> &HistoryNote {
        &self.note
    }

    /// Returns the status snapshot.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority snapshot.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the identifier of the acting user.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the server-assigned timestamp.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
