//! Port contracts for the persistence gateway.

mod repository;
mod unit_of_work;

pub use repository::{
    CommentRepository, CompletedTally, HistoryRepository, ProjectRepository, StorageError,
    StorageResult, TaskRepository,
};
pub use unit_of_work::{StorageGateway, UnitOfWork};
