//! Row/domain conversion and hydration helpers for the Postgres adapter.

use super::models::{
    CommentRow, HistoryRow, NewCommentRow, NewHistoryRow, NewProjectRow, NewTaskRow, ProjectRow,
    TaskRow,
};
use super::schema::{projects, task_comments, task_history, tasks};
use crate::domain::{
    Comment, CommentContent, CommentId, HistoryEntry, HistoryId, HistoryNote, PersistedCommentData,
    PersistedHistoryData, PersistedProjectData, PersistedTaskData, Project, ProjectId, ProjectName,
    Task, TaskId, TaskPriority, TaskStatus, TaskTitle, UserId,
};
use crate::ports::{StorageError, StorageResult};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

pub(super) fn to_new_project_row(project: &Project) -> NewProjectRow {
    NewProjectRow {
        id: project.id().into_inner(),
        name: project.name().as_str().to_owned(),
        owner_id: project.owner().into_inner(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

pub(super) fn to_new_task_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(ToOwned::to_owned),
        due_date: task.due_date(),
        completed_at: task.completed_at(),
        priority: task.priority().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        project_id: task.project_id().into_inner(),
    }
}

pub(super) fn to_new_comment_row(comment: &Comment) -> NewCommentRow {
    NewCommentRow {
        id: comment.id().into_inner(),
        task_id: comment.task_id().into_inner(),
        content: comment.content().as_str().to_owned(),
        author_id: comment.author().into_inner(),
        posted_at: comment.posted_at(),
    }
}

pub(super) fn to_new_history_row(entry: &HistoryEntry) -> NewHistoryRow {
    NewHistoryRow {
        id: entry.id().into_inner(),
        task_id: entry.task_id().into_inner(),
        note: entry.note().as_str().to_owned(),
        status: entry.status().as_str().to_owned(),
        priority: entry.priority().as_str().to_owned(),
        author_id: entry.author().into_inner(),
        recorded_at: entry.recorded_at(),
    }
}

pub(super) fn row_to_comment(row: CommentRow) -> StorageResult<Comment> {
    let content =
        CommentContent::new(row.content).map_err(StorageError::invalid_persisted_data)?;
    Ok(Comment::from_persisted(PersistedCommentData {
        id: CommentId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        content,
        author: UserId::from_uuid(row.author_id),
        posted_at: row.posted_at,
    }))
}

pub(super) fn row_to_history(row: HistoryRow) -> StorageResult<HistoryEntry> {
    let note = HistoryNote::new(row.note).map_err(StorageError::invalid_persisted_data)?;
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(StorageError::invalid_persisted_data)?;
    let priority = TaskPriority::try_from(row.priority.as_str())
        .map_err(StorageError::invalid_persisted_data)?;
    Ok(HistoryEntry::from_persisted(PersistedHistoryData {
        id: HistoryId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        note,
        status,
        priority,
        author: UserId::from_uuid(row.author_id),
        recorded_at: row.recorded_at,
    }))
}

pub(super) fn row_to_task(
    row: TaskRow,
    comments: Vec<Comment>,
    history: Vec<HistoryEntry>,
) -> StorageResult<Task> {
    let title = TaskTitle::new(row.title).map_err(StorageError::invalid_persisted_data)?;
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(StorageError::invalid_persisted_data)?;
    let priority = TaskPriority::try_from(row.priority.as_str())
        .map_err(StorageError::invalid_persisted_data)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title,
        description: row.description,
        due_date: row.due_date,
        completed_at: row.completed_at,
        priority,
        status,
        project_id: ProjectId::from_uuid(row.project_id),
        comments,
        history,
    }))
}

pub(super) fn row_to_project(row: ProjectRow, project_tasks: Vec<Task>) -> StorageResult<Project> {
    let name = ProjectName::new(row.name).map_err(StorageError::invalid_persisted_data)?;
    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        name,
        owner: UserId::from_uuid(row.owner_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
        tasks: project_tasks,
    }))
}

/// Loads a project by id, hydrating its tasks.
pub(super) fn load_project(
    connection: &mut PgConnection,
    id: Uuid,
) -> StorageResult<Option<Project>> {
    let found = projects::table
        .find(id)
        .select(ProjectRow::as_select())
        .first::<ProjectRow>(connection)
        .optional()
        .map_err(StorageError::persistence)?;
    let Some(row) = found else {
        return Ok(None);
    };
    let project_tasks = load_project_tasks(connection, row.id)?;
    Ok(Some(row_to_project(row, project_tasks)?))
}

/// Loads a task by id, hydrating comments and history.
pub(super) fn load_task(connection: &mut PgConnection, id: Uuid) -> StorageResult<Option<Task>> {
    let found = tasks::table
        .find(id)
        .select(TaskRow::as_select())
        .first::<TaskRow>(connection)
        .optional()
        .map_err(StorageError::persistence)?;
    let Some(row) = found else {
        return Ok(None);
    };
    let mut hydrated = hydrate_task_rows(connection, vec![row])?;
    Ok(hydrated.pop())
}

/// Loads and hydrates all tasks of a project, due date ascending.
pub(super) fn load_project_tasks(
    connection: &mut PgConnection,
    project_id: Uuid,
) -> StorageResult<Vec<Task>> {
    let rows = tasks::table
        .filter(tasks::project_id.eq(project_id))
        .order(tasks::due_date.asc())
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)
        .map_err(StorageError::persistence)?;
    hydrate_task_rows(connection, rows)
}

/// Hydrates a batch of task rows with their comments and history in two
/// queries, avoiding per-task round trips.
pub(super) fn hydrate_task_rows(
    connection: &mut PgConnection,
    rows: Vec<TaskRow>,
) -> StorageResult<Vec<Task>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let comment_rows = task_comments::table
        .filter(task_comments::task_id.eq_any(&ids))
        .order(task_comments::posted_at.asc())
        .select(CommentRow::as_select())
        .load::<CommentRow>(connection)
        .map_err(StorageError::persistence)?;
    let mut comments_by_task: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for comment_row in comment_rows {
        let key = comment_row.task_id;
        comments_by_task
            .entry(key)
            .or_default()
            .push(row_to_comment(comment_row)?);
    }

    let history_rows = task_history::table
        .filter(task_history::task_id.eq_any(&ids))
        .order((task_history::recorded_at.asc(), task_history::id.asc()))
        .select(HistoryRow::as_select())
        .load::<HistoryRow>(connection)
        .map_err(StorageError::persistence)?;
    let mut history_by_task: HashMap<Uuid, Vec<HistoryEntry>> = HashMap::new();
    for history_row in history_rows {
        let key = history_row.task_id;
        history_by_task
            .entry(key)
            .or_default()
            .push(row_to_history(history_row)?);
    }

    rows.into_iter()
        .map(|task_row| {
            let comments = comments_by_task.remove(&task_row.id).unwrap_or_default();
            let history = history_by_task.remove(&task_row.id).unwrap_or_default();
            row_to_task(task_row, comments, history)
        })
        .collect()
}
