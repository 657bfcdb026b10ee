//! Free-text comments attached to tasks.

use super::{
    ids::{CommentId, TaskId, UserId},
    text::CommentContent,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Timestamped note attached to a task.
///
/// Comments are append-only: they are created once with a server-assigned
/// timestamp and are never edited. They hold a non-owning back-reference to
/// their task; the task owns the comment collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    task_id: TaskId,
    content: CommentContent,
    author: UserId,
    posted_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCommentData {
    /// Persisted comment identifier.
    pub id: CommentId,
    /// Identifier of the task the comment belongs to.
    pub task_id: TaskId,
    /// Persisted comment content.
    pub content: CommentContent,
    /// Identifier of the comment author.
    pub author: UserId,
    /// Persisted creation timestamp.
    pub posted_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment under the given task.
    #[must_use]
    pub fn new(task_id: TaskId, content: CommentContent, author: UserId, clock: &impl Clock) -> Self {
        Self {
            id: CommentId::new(),
            task_id,
            content,
            author,
            posted_at: clock.utc(),
        }
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCommentData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            content: data.content,
            author: data.author,
            posted_at: data.posted_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the identifier of the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the comment content.
    #[must_use]
    pub const fn content(&self) -> &CommentContent {
        &self.content
    }

    /// Returns the identifier of the comment author.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the server-assigned creation timestamp.
    #[must_use]
    pub const fn posted_at(&self) -> DateTime<Utc> {
        self.posted_at
    }
}
