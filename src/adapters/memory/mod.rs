//! In-memory persistence adapter.
//!
//! Backs the unit and integration test suites and any embedder that does
//! not need durable storage. Writes staged through one unit of work are
//! applied atomically at commit under a single write lock, with the
//! (name, owner) uniqueness and task-cap backstops re-checked there.

mod comment;
mod history;
mod project;
mod state;
mod task;
mod unit_of_work;

pub use comment::InMemoryCommentStore;
pub use history::InMemoryHistoryStore;
pub use project::InMemoryProjectStore;
pub use task::InMemoryTaskStore;
pub use unit_of_work::{InMemoryGateway, InMemoryUnitOfWork};
