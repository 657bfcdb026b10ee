//! Shared helpers for the in-memory integration suites.

use chrono::{DateTime, Duration, Utc};
use mockable::DefaultClock;
use std::sync::Arc;
use taskdeck::adapters::memory::InMemoryGateway;
use taskdeck::domain::{Project, ProjectId, Task, TaskPriority, UserId};
use taskdeck::services::{
    CreateProjectRequest, CreateTaskRequest, ProjectService, TaskService,
};

pub type Projects = ProjectService<InMemoryGateway, DefaultClock>;
pub type Tasks = TaskService<InMemoryGateway, DefaultClock>;

/// Builds both services over one shared in-memory gateway.
pub fn stack() -> (Arc<InMemoryGateway>, Projects, Tasks) {
    let gateway = Arc::new(InMemoryGateway::new());
    let clock = Arc::new(DefaultClock);
    (
        Arc::clone(&gateway),
        ProjectService::new(Arc::clone(&gateway), Arc::clone(&clock)),
        TaskService::new(gateway, clock),
    )
}

/// A due date one week out.
pub fn due_next_week() -> DateTime<Utc> {
    Utc::now() + Duration::days(7)
}

/// Creates a project through the service.
pub async fn create_project(projects: &Projects, name: &str, owner: UserId) -> Project {
    projects
        .create(CreateProjectRequest::new(name, owner))
        .await
        .expect("project creation should succeed")
}

/// Creates a task through the service.
pub async fn create_task(
    tasks: &Tasks,
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

/// Asserts a project holds exactly `expected` tasks.
///
/// # Errors
///
/// Returns an error when the hydrated task count differs from `expected`.
pub fn assert_task_count(project: &Project, expected: usize) -> Result<(), eyre::Report> {
    eyre::ensure!(
        project.tasks().len() == expected,
        "expected {} tasks, found {}",
        expected,
        project.tasks().len()
    );
    Ok(())
}
