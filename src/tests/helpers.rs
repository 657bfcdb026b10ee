//! Shared fixtures for the unit test suites.

use crate::adapters::memory::InMemoryGateway;
use crate::domain::{Project, ProjectId, Task, TaskPriority, UserId};
use crate::services::{
    CreateProjectRequest, CreateTaskRequest, ProjectService, TaskService,
};
use chrono::{DateTime, Duration, Local, Utc};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// Clock pinned to a fixed instant, for completion-window tests.
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub type TestProjectService = ProjectService<InMemoryGateway, DefaultClock>;
pub type TestTaskService = TaskService<InMemoryGateway, DefaultClock>;

/// Builds both services over one shared in-memory gateway.
pub fn services() -> (Arc<InMemoryGateway>, TestProjectService, TestTaskService) {
    let gateway = Arc::new(InMemoryGateway::new());
    let clock = Arc::new(DefaultClock);
    (
        Arc::clone(&gateway),
        ProjectService::new(Arc::clone(&gateway), Arc::clone(&clock)),
        TaskService::new(gateway, clock),
    )
}

/// Builds a task service with a pinned clock over an existing gateway.
pub fn task_service_at(
    gateway: &Arc<InMemoryGateway>,
    instant: DateTime<Utc>,
) -> TaskService<InMemoryGateway, FixedClock> {
    TaskService::new(Arc::clone(gateway), Arc::new(FixedClock(instant)))
}

/// A due date one week out.
pub fn due_next_week() -> DateTime<Utc> {
    Utc::now() + Duration::days(7)
}

/// Creates a project through the service.
pub async fn create_project(
    projects: &TestProjectService,
    name: &str,
    owner: UserId,
) -> Project {
    projects
        .create(CreateProjectRequest::new(name, owner))
        .await
        .expect("project creation should succeed")
}

/// Creates a task with the given title and priority through the service.
pub async fn create_task(
    tasks: &TestTaskService,
    project_id: ProjectId,
    owner: UserId,
    title: &str,
    priority: TaskPriority,
) -> Task {
    tasks
        .create(CreateTaskRequest::new(
            project_id,
            owner,
            title,
            due_next_week(),
            priority,
        ))
        .await
        .expect("task creation should succeed")
}
