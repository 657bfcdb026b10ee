//! Commit-time backstop tests: two units of work staging writes that each
//! pass the fast-path check, where only the first commit may win.

use super::helpers::{create_project, create_task, due_next_week, stack};
use mockable::DefaultClock;
use rstest::rstest;
use taskdeck::domain::{Project, ProjectName, Task, TaskPriority, TaskTitle, UserId};
use taskdeck::ports::{StorageError, StorageGateway, UnitOfWork};

fn board_task(project: &Project, title: &str) -> Task {
    Task::new(
        TaskTitle::new(title).expect("valid title"),
        None,
        due_next_week(),
        TaskPriority::Medium,
        project.id(),
    )
    .expect("valid task")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_project_creations_hit_the_uniqueness_backstop() {
    let (gateway, _projects, _tasks) = stack();
    let owner = UserId::new();
    let clock = DefaultClock;

    let first_uow = gateway.begin().await.expect("first unit of work");
    let second_uow = gateway.begin().await.expect("second unit of work");

    let first = Project::new(ProjectName::new("Same").expect("valid name"), owner, &clock);
    let second = Project::new(ProjectName::new("Same").expect("valid name"), owner, &clock);

    // Both pass the fast-path check: nothing is committed yet.
    first_uow
        .projects()
        .add(&first)
        .await
        .expect("staging should succeed");
    second_uow
        .projects()
        .add(&second)
        .await
        .expect("staging should succeed");

    first_uow.commit().await.expect("first commit wins");
    let lost = second_uow.commit().await;
    assert!(matches!(
        lost,
        Err(StorageError::DuplicateProjectName { .. })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_task_inserts_hit_the_cap_backstop() {
    let (gateway, projects, tasks) = stack();
    let owner = UserId::new();
    let project = create_project(&projects, "Nearly full", owner).await;

    for index in 0..(Project::MAX_TASKS - 1) {
        create_task(
            &tasks,
            project.id(),
            owner,
            &format!("Task {index}"),
            TaskPriority::Medium,
        )
        .await;
    }

    let first_uow = gateway.begin().await.expect("first unit of work");
    let second_uow = gateway.begin().await.expect("second unit of work");
    first_uow
        .tasks()
        .add(&board_task(&project, "Twentieth"))
        .await
        .expect("staging should succeed");
    second_uow
        .tasks()
        .add(&board_task(&project, "Twenty-first"))
        .await
        .expect("staging should succeed");

    first_uow.commit().await.expect("first commit fills the cap");
    let lost = second_uow.commit().await;
    assert!(matches!(lost, Err(StorageError::TaskLimitReached(_))));

    let full = projects
        .get_full(project.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(full.tasks().len(), Project::MAX_TASKS);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rollback_discards_staged_writes() {
    let (gateway, projects, _tasks) = stack();
    let owner = UserId::new();
    let clock = DefaultClock;

    let uow = gateway.begin().await.expect("unit of work");
    let project = Project::new(
        ProjectName::new("Ephemeral").expect("valid name"),
        owner,
        &clock,
    );
    uow.projects()
        .add(&project)
        .await
        .expect("staging should succeed");
    uow.rollback().await.expect("rollback should succeed");

    let listed = projects
        .list_by_owner(owner)
        .await
        .expect("listing should succeed");
    assert!(listed.is_empty());
}
