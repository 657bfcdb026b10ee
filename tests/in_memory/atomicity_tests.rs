//! All-or-nothing commit tests: when the history write fails, the primary
//! write must not land either.

use super::helpers::{create_project, due_next_week, stack};
use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;
use taskdeck::adapters::memory::{InMemoryGateway, InMemoryUnitOfWork};
use taskdeck::domain::{HistoryEntry, TaskId, TaskPriority, UserId};
use taskdeck::ports::{
    CommentRepository, HistoryRepository, ProjectRepository, StorageError, StorageGateway,
    StorageResult, TaskRepository, UnitOfWork,
};
use taskdeck::services::{CreateTaskRequest, TaskService};

/// Gateway whose units of work reject every history append.
#[derive(Clone)]
struct FailingHistoryGateway {
    inner: InMemoryGateway,
}

#[async_trait]
impl StorageGateway for FailingHistoryGateway {
    type Uow = FailingHistoryUow;

    async fn begin(&self) -> StorageResult<FailingHistoryUow> {
        Ok(FailingHistoryUow {
            inner: self.inner.begin().await?,
            histories: FailingHistoryStore,
        })
    }
}

struct FailingHistoryUow {
    inner: InMemoryUnitOfWork,
    histories: FailingHistoryStore,
}

#[async_trait]
impl UnitOfWork for FailingHistoryUow {
    fn projects(&self) -> &dyn ProjectRepository {
        self.inner.projects()
    }

    fn tasks(&self) -> &dyn TaskRepository {
        self.inner.tasks()
    }

    fn comments(&self) -> &dyn CommentRepository {
        self.inner.comments()
    }

    fn histories(&self) -> &dyn HistoryRepository {
        &self.histories
    }

    async fn commit(self) -> StorageResult<usize> {
        self.inner.commit().await
    }

    async fn rollback(self) -> StorageResult<()> {
        self.inner.rollback().await
    }
}

struct FailingHistoryStore;

#[async_trait]
impl HistoryRepository for FailingHistoryStore {
    async fn list_by_task(&self, _task_id: TaskId) -> StorageResult<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }

    async fn append(&self, _entry: &HistoryEntry) -> StorageResult<()> {
        Err(StorageError::persistence(std::io::Error::other(
            "history append rejected",
        )))
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_history_append_rolls_back_the_task_write() {
    let (gateway, projects, _tasks) = stack();
    let owner = UserId::new();
    let project = create_project(&projects, "Atomic", owner).await;

    let failing = Arc::new(FailingHistoryGateway {
        inner: (*gateway).clone(),
    });
    let failing_tasks = TaskService::new(failing, Arc::new(DefaultClock));

    let result = failing_tasks
        .create(CreateTaskRequest::new(
            project.id(),
            owner,
            "Never lands",
            due_next_week(),
            TaskPriority::Medium,
        ))
        .await;
    assert!(result.is_err());

    // The shared store must not contain the task either.
    let unchanged = projects
        .get_full(project.id())
        .await
        .expect("lookup should succeed");
    assert!(unchanged.tasks().is_empty());
}
