//! End-to-end task lifecycle flows over the in-memory gateway.

use super::helpers::{create_project, create_task, due_next_week, stack};
use rstest::rstest;
use taskdeck::domain::{Project, TaskPriority, TaskStatus, UserId};
use taskdeck::services::{
    AddCommentRequest, CreateTaskRequest, TaskServiceError, UpdateTaskRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn high_priority_task_keeps_its_priority_for_life() {
    let (_gateway, projects, tasks) = stack();
    let owner = UserId::new();
    let project = create_project(&projects, "Board", owner).await;

    let task = create_task(&tasks, project.id(), owner, "Urgent", TaskPriority::High).await;
    assert_eq!(task.status(), TaskStatus::Pending);

    let fetched = tasks
        .get_full(task.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched.history().len(), 1);

    let demotion = tasks
        .update(UpdateTaskRequest::new(
            task.id(),
            owner,
            TaskStatus::InProgress,
            TaskPriority::Low,
        ))
        .await;
    assert!(matches!(
        demotion,
        Err(TaskServiceError::PriorityImmutable(_))
    ));

    let unchanged = tasks
        .get_full(task.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(unchanged.priority(), TaskPriority::High);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cap_is_enforced_end_to_end() {
    let (_gateway, projects, tasks) = stack();
    let owner = UserId::new();
    let project = create_project(&projects, "Crowded", owner).await;

    for index in 0..Project::MAX_TASKS {
        create_task(
            &tasks,
            project.id(),
            owner,
            &format!("Task {index}"),
            TaskPriority::Medium,
        )
        .await;
    }

    let overflow = tasks
        .create(CreateTaskRequest::new(
            project.id(),
            owner,
            "Overflow",
            due_next_week(),
            TaskPriority::Medium,
        ))
        .await;
    assert!(matches!(overflow, Err(TaskServiceError::LimitReached(_))));

    let full = projects
        .get_full(project.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(full.tasks().len(), Project::MAX_TASKS);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_comment_and_delete_flow() {
    let (_gateway, projects, tasks) = stack();
    let owner = UserId::new();
    let project = create_project(&projects, "Flow", owner).await;
    let task = create_task(&tasks, project.id(), owner, "Workpiece", TaskPriority::Medium).await;

    let updated = tasks
        .update(
            UpdateTaskRequest::new(task.id(), owner, TaskStatus::InProgress, TaskPriority::Medium)
                .with_title("Workpiece, refined")
                .with_description("now with a plan"),
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.title().as_str(), "Workpiece, refined");
    assert_eq!(updated.description(), Some("now with a plan"));

    tasks
        .add_comment(AddCommentRequest::new(task.id(), owner, "Looks right"))
        .await
        .expect("comment should be added");

    let fetched = tasks
        .get_full(task.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched.comments().len(), 1);
    assert_eq!(fetched.history().len(), 3);

    tasks
        .delete(task.id())
        .await
        .expect("deletion should succeed");
    assert!(tasks.get_full(task.id()).await.is_err());

    let emptied = projects
        .get_full(project.id())
        .await
        .expect("lookup should succeed");
    assert!(emptied.tasks().is_empty());
}
