//! Service orchestration tests for task lifecycle rules.

use crate::domain::{Project, TaskId, TaskPriority, TaskStatus, UserId};
use crate::ports::{StorageGateway, UnitOfWork};
use crate::services::{
    AddCommentRequest, CreateTaskRequest, ErrorKind, TaskServiceError, UpdateTaskRequest,
};
use crate::tests::helpers::{create_project, create_task, due_next_week, services};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_starts_pending_with_one_history_entry() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Backlog", owner).await;

    let created = tasks
        .create(
            CreateTaskRequest::new(
                project.id(),
                owner,
                "Ship the report",
                due_next_week(),
                TaskPriority::High,
            )
            .with_description("Aggregate completed tasks per user"),
        )
        .await
        .expect("task creation should succeed");

    assert_eq!(created.status(), TaskStatus::Pending);
    assert_eq!(created.priority(), TaskPriority::High);

    let fetched = tasks
        .get_full(created.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched.title().as_str(), "Ship the report");
    assert_eq!(
        fetched.description(),
        Some("Aggregate completed tasks per user")
    );
    assert_eq!(fetched.history().len(), 1);
    let entry = fetched.history().first().expect("one history entry");
    assert_eq!(entry.note().as_str(), "Tarefa criada.");
    assert_eq!(entry.status(), TaskStatus::Pending);
    assert_eq!(entry.priority(), TaskPriority::High);
    assert_eq!(entry.author(), owner);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_under_foreign_or_missing_project_is_unauthorized() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Private", owner).await;

    let foreign = tasks
        .create(CreateTaskRequest::new(
            project.id(),
            UserId::new(),
            "Not yours",
            due_next_week(),
            TaskPriority::Low,
        ))
        .await;
    assert!(matches!(
        foreign,
        Err(TaskServiceError::ProjectAccessDenied(_))
    ));
    let Err(err) = foreign else {
        return;
    };
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let missing = tasks
        .create(CreateTaskRequest::new(
            crate::domain::ProjectId::new(),
            owner,
            "Nowhere",
            due_next_week(),
            TaskPriority::Low,
        ))
        .await;
    assert!(matches!(
        missing,
        Err(TaskServiceError::ProjectAccessDenied(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn twenty_first_task_is_rejected_and_count_stays_at_the_cap() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Full board", owner).await;

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
            "One too many",
            due_next_week(),
            TaskPriority::Medium,
        ))
        .await;
    assert!(matches!(overflow, Err(TaskServiceError::LimitReached(_))));
    let Err(err) = overflow else {
        return;
    };
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let fetched = projects
        .get_full(project.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched.tasks().len(), Project::MAX_TASKS);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn priority_cannot_be_changed_after_creation() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Priorities", owner).await;
    let task = create_task(&tasks, project.id(), owner, "Fixed", TaskPriority::High).await;

    let result = tasks
        .update(UpdateTaskRequest::new(
            task.id(),
            owner,
            TaskStatus::InProgress,
            TaskPriority::Low,
        ))
        .await;
    assert!(matches!(
        result,
        Err(TaskServiceError::PriorityImmutable(_))
    ));
    let Err(err) = result else {
        return;
    };
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let unchanged = tasks
        .get_full(task.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(unchanged.priority(), TaskPriority::High);
    assert_eq!(unchanged.status(), TaskStatus::Pending);
    // The rejected update must not leave a history entry behind.
    assert_eq!(unchanged.history().len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_description_normalization_short_circuits_no_ops() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Descriptions", owner).await;
    let task = create_task(&tasks, project.id(), owner, "Documented", TaskPriority::Low).await;

    tasks
        .update(
            UpdateTaskRequest::new(task.id(), owner, TaskStatus::Pending, TaskPriority::Low)
                .with_description("desc"),
        )
        .await
        .expect("first description should stick");

    // Blank input keeps the stored text.
    let after_blank = tasks
        .update(
            UpdateTaskRequest::new(task.id(), owner, TaskStatus::Pending, TaskPriority::Low)
                .with_description("   "),
        )
        .await
        .expect("blank update should succeed");
    assert_eq!(after_blank.description(), Some("desc"));

    // Case-insensitive equality keeps the stored text.
    let after_case = tasks
        .update(
            UpdateTaskRequest::new(task.id(), owner, TaskStatus::Pending, TaskPriority::Low)
                .with_description("DESC"),
        )
        .await
        .expect("case-variant update should succeed");
    assert_eq!(after_case.description(), Some("desc"));

    // A genuinely different text replaces it.
    let after_change = tasks
        .update(
            UpdateTaskRequest::new(task.id(), owner, TaskStatus::Pending, TaskPriority::Low)
                .with_description("rewritten"),
        )
        .await
        .expect("real update should succeed");
    assert_eq!(after_change.description(), Some("rewritten"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_title_is_ignored_and_non_blank_replaces() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Titles", owner).await;
    let task = create_task(&tasks, project.id(), owner, "Original", TaskPriority::Low).await;

    let after_blank = tasks
        .update(
            UpdateTaskRequest::new(task.id(), owner, TaskStatus::Pending, TaskPriority::Low)
                .with_title("  "),
        )
        .await
        .expect("blank title update should succeed");
    assert_eq!(after_blank.title().as_str(), "Original");

    let after_change = tasks
        .update(
            UpdateTaskRequest::new(task.id(), owner, TaskStatus::Pending, TaskPriority::Low)
                .with_title("Replacement"),
        )
        .await
        .expect("title update should succeed");
    assert_eq!(after_change.title().as_str(), "Replacement");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_stamp_survives_leaving_completed() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Stamps", owner).await;
    let task = create_task(&tasks, project.id(), owner, "Stamped", TaskPriority::Medium).await;

    let completed = tasks
        .update(UpdateTaskRequest::new(
            task.id(),
            owner,
            TaskStatus::Completed,
            TaskPriority::Medium,
        ))
        .await
        .expect("completion should succeed");
    let stamp = completed.completed_at().expect("completion stamp set");

    let reopened = tasks
        .update(UpdateTaskRequest::new(
            task.id(),
            owner,
            TaskStatus::InProgress,
            TaskPriority::Medium,
        ))
        .await
        .expect("reopening should succeed");
    assert_eq!(reopened.status(), TaskStatus::InProgress);
    assert_eq!(reopened.completed_at(), Some(stamp));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_history_snapshots_the_real_task_state() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Comments", owner).await;
    let task = create_task(&tasks, project.id(), owner, "Discussed", TaskPriority::High).await;
    tasks
        .update(UpdateTaskRequest::new(
            task.id(),
            owner,
            TaskStatus::InProgress,
            TaskPriority::High,
        ))
        .await
        .expect("status update should succeed");

    let comment = tasks
        .add_comment(AddCommentRequest::new(task.id(), owner, "On it."))
        .await
        .expect("comment should be added");
    assert_eq!(comment.content().as_str(), "On it.");

    let fetched = tasks
        .get_full(task.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched.comments().len(), 1);
    let entry = fetched.history().last().expect("comment history entry");
    assert_eq!(entry.note().as_str(), "Comentário adicionado: On it.");
    assert_eq!(entry.status(), TaskStatus::InProgress);
    assert_eq!(entry.priority(), TaskPriority::High);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commenting_on_a_missing_task_is_not_found() {
    let (_gateway, _projects, tasks) = services();

    let result = tasks
        .add_comment(AddCommentRequest::new(TaskId::new(), UserId::new(), "Lost"))
        .await;
    assert!(matches!(result, Err(TaskServiceError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_cascades_comments_and_history() {
    let (gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Removals", owner).await;
    let task = create_task(&tasks, project.id(), owner, "Doomed", TaskPriority::Low).await;
    tasks
        .add_comment(AddCommentRequest::new(task.id(), owner, "Soon gone"))
        .await
        .expect("comment should be added");

    tasks.delete(task.id()).await.expect("deletion should succeed");

    assert!(matches!(
        tasks.get_full(task.id()).await,
        Err(TaskServiceError::NotFound(_))
    ));
    let uow = gateway.begin().await.expect("unit of work should open");
    let comments = uow
        .comments()
        .list_by_task(task.id())
        .await
        .expect("comment listing should succeed");
    assert!(comments.is_empty());
    let history = uow
        .histories()
        .list_by_task(task.id())
        .await
        .expect("history listing should succeed");
    assert!(history.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_comment_leaves_the_rest_untouched() {
    let (_gateway, projects, tasks) = services();
    let owner = UserId::new();
    let project = create_project(&projects, "Tidy", owner).await;
    let task = create_task(&tasks, project.id(), owner, "Noisy", TaskPriority::Low).await;
    let first = tasks
        .add_comment(AddCommentRequest::new(task.id(), owner, "First"))
        .await
        .expect("comment should be added");
    let second = tasks
        .add_comment(AddCommentRequest::new(task.id(), owner, "Second"))
        .await
        .expect("comment should be added");

    tasks
        .delete_comment(first.id())
        .await
        .expect("comment deletion should succeed");

    let fetched = tasks
        .get_full(task.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(fetched.comments().len(), 1);
    let remaining = fetched.comments().first().expect("one comment left");
    assert_eq!(remaining.id(), second.id());
}
