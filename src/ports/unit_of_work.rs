//! Transaction coordinator port.
//!
//! Every business operation runs against one unit of work: reads go to
//! committed state, writes are staged, and a single [`UnitOfWork::commit`]
//! at the end of the operation applies all staged writes atomically. When
//! any staged write fails to apply, none of them take effect: a task
//! insert and its history entry either both land or neither does.

use super::repository::{
    CommentRepository, HistoryRepository, ProjectRepository, StorageResult, TaskRepository,
};
use async_trait::async_trait;

/// One transaction scope over the four entity repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Returns the project repository bound to this unit of work.
    fn projects(&self) -> &dyn ProjectRepository;

    /// Returns the task repository bound to this unit of work.
    fn tasks(&self) -> &dyn TaskRepository;

    /// Returns the comment repository bound to this unit of work.
    fn comments(&self) -> &dyn CommentRepository;

    /// Returns the history repository bound to this unit of work.
    fn histories(&self) -> &dyn HistoryRepository;

    /// Applies all staged writes atomically and returns the number of
    /// affected rows (cascaded removals included).
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ports::StorageError`] when a staged write cannot
    /// be applied; committed state is left untouched in that case.
    async fn commit(self) -> StorageResult<usize>;

    /// Discards all staged writes. Best-effort: engines without explicit
    /// rollback outside active transactions treat this as a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ports::StorageError`] when the staging buffer is
    /// unavailable.
    async fn rollback(self) -> StorageResult<()>;
}

/// Factory yielding one fresh unit of work per request.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Concrete unit-of-work type produced by this gateway.
    type Uow: UnitOfWork;

    /// Opens a new unit of work with an empty staging buffer.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ports::StorageError`] when the underlying store
    /// is unavailable.
    async fn begin(&self) -> StorageResult<Self::Uow>;
}
