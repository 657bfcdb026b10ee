//! Validated text values for projects, tasks, comments, and history notes.

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a project name, matching the `VARCHAR(150)` column.
const MAX_PROJECT_NAME_CHARS: usize = 150;

/// Maximum length for a task title, matching the `VARCHAR(100)` column.
const MAX_TASK_TITLE_CHARS: usize = 100;

/// Maximum length for a comment, matching the `VARCHAR(1000)` column.
const MAX_COMMENT_CHARS: usize = 1000;

/// Maximum length for a history note, matching the `VARCHAR(500)` column.
const MAX_HISTORY_NOTE_CHARS: usize = 500;

/// Validated project name.
///
/// Names are trimmed but case is preserved: the (name, owner) uniqueness
/// rule compares names case-sensitively, so `Alpha` and `alpha` are two
/// distinct projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyProjectName`] when the value is empty
    /// after trimming, or [`DomainError::ProjectNameTooLong`] when it
    /// exceeds 150 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(DomainError::EmptyProjectName);
        }
        if trimmed.chars().count() > MAX_PROJECT_NAME_CHARS {
            return Err(DomainError::ProjectNameTooLong(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the project name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated task title.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyTaskTitle`] when the value is empty after
    /// trimming, or [`DomainError::TaskTitleTooLong`] when it exceeds 100
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(DomainError::EmptyTaskTitle);
        }
        if trimmed.chars().count() > MAX_TASK_TITLE_CHARS {
            return Err(DomainError::TaskTitleTooLong(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated comment content. Stored as given, whitespace included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentContent(String);

impl CommentContent {
    /// Creates validated comment content.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCommentContent`] when the value is empty
    /// after trimming, or [`DomainError::CommentContentTooLong`] when it
    /// exceeds 1000 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();

        if raw.trim().is_empty() {
            return Err(DomainError::EmptyCommentContent);
        }
        let chars = raw.chars().count();
        if chars > MAX_COMMENT_CHARS {
            return Err(DomainError::CommentContentTooLong(chars));
        }

        Ok(Self(raw))
    }

    /// Returns the content as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CommentContent {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CommentContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-text note attached to a history entry. May be empty: a field update
/// on a task without a description records an empty note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryNote(String);

impl HistoryNote {
    /// Creates a validated history note.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::HistoryNoteTooLong`] when the value exceeds
    /// 500 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let chars = raw.chars().count();
        if chars > MAX_HISTORY_NOTE_CHARS {
            return Err(DomainError::HistoryNoteTooLong(chars));
        }
        Ok(Self(raw))
    }

    /// Creates a note from arbitrary text, truncating to the 500-character
    /// limit on a character boundary. Synthetic notes derived from comment
    /// content (up to 1000 characters) go through this constructor.
    #[must_use]
    pub fn clipped(value: &str) -> Self {
        Self(value.chars().take(MAX_HISTORY_NOTE_CHARS).collect())
    }

    /// Returns the note as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for HistoryNote {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for HistoryNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
