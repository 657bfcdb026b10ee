//! End-to-end project lifecycle flows over the in-memory gateway.

use super::helpers::{assert_task_count, create_project, create_task, stack};
use rstest::rstest;
use taskdeck::domain::{TaskPriority, TaskStatus, UserId};
use taskdeck::ports::{StorageGateway, UnitOfWork};
use taskdeck::services::{
    CreateProjectRequest, ProjectServiceError, RenameProjectRequest, UpdateTaskRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_list_rename_flow() {
    let (_gateway, projects, _tasks) = stack();
    let owner = UserId::new();

    let alpha = create_project(&projects, "Alpha", owner).await;
    create_project(&projects, "Beta", owner).await;

    let summaries = projects
        .list_by_owner(owner)
        .await
        .expect("listing should succeed");
    assert_eq!(summaries.len(), 2);

    let renamed = projects
        .rename(RenameProjectRequest::new(alpha.id(), owner, "Alpha v2"))
        .await
        .expect("rename should succeed");
    assert_eq!(renamed.name().as_str(), "Alpha v2");

    // The old name is free again for the same owner.
    create_project(&projects, "Alpha", owner).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn uniqueness_scenario_across_owners() {
    let (_gateway, projects, _tasks) = stack();
    let first_user = UserId::new();
    let second_user = UserId::new();

    create_project(&projects, "Alpha", first_user).await;

    let duplicate = projects
        .create(CreateProjectRequest::new("Alpha", first_user))
        .await;
    assert!(matches!(
        duplicate,
        Err(ProjectServiceError::DuplicateName { .. })
    ));

    create_project(&projects, "Alpha", second_user).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletion_guard_and_cascade() {
    let (gateway, projects, tasks) = stack();
    let owner = UserId::new();
    let project = create_project(&projects, "Doomed", owner).await;
    let pending = create_task(&tasks, project.id(), owner, "Pending", TaskPriority::Low).await;
    let done = create_task(&tasks, project.id(), owner, "Done", TaskPriority::Low).await;
    tasks
        .update(UpdateTaskRequest::new(
            done.id(),
            owner,
            TaskStatus::Completed,
            TaskPriority::Low,
        ))
        .await
        .expect("completion should succeed");

    let full = projects
        .get_full(project.id())
        .await
        .expect("lookup should succeed");
    assert_task_count(&full, 2).expect("both tasks hydrated");

    assert!(matches!(
        projects.delete(project.id()).await,
        Err(ProjectServiceError::PendingTasks(_))
    ));

    tasks
        .update(UpdateTaskRequest::new(
            pending.id(),
            owner,
            TaskStatus::InProgress,
            TaskPriority::Low,
        ))
        .await
        .expect("status update should succeed");
    projects
        .delete(project.id())
        .await
        .expect("deletion should succeed");

    // Everything under the project is unreachable afterwards.
    assert!(projects.get_full(project.id()).await.is_err());
    assert!(tasks.get_full(pending.id()).await.is_err());
    assert!(tasks.get_full(done.id()).await.is_err());
    let uow = gateway.begin().await.expect("unit of work should open");
    assert!(uow
        .histories()
        .list_by_task(done.id())
        .await
        .expect("history listing should succeed")
        .is_empty());
}
