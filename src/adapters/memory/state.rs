//! Shared committed state and staged-write application for the in-memory
//! store.
//!
//! Committed rows live in hash maps keyed by id; insertion order is
//! preserved through a per-row sequence number standing in for a serial
//! key. Staged writes are applied to a working copy of the whole state at
//! commit time, so a failing write leaves committed state untouched.

use crate::domain::{
    Comment, CommentId, HistoryEntry, HistoryId, PersistedProjectData, PersistedTaskData, Project,
    ProjectId, ProjectName, Task, TaskId, UserId,
};
use crate::ports::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Committed state shared between all units of work of one gateway.
pub(super) type SharedState = Arc<RwLock<BoardState>>;

/// Staging buffer shared between the stores of one unit of work.
pub(super) type SharedPending = Arc<Mutex<Vec<PendingWrite>>>;

/// Committed project row.
#[derive(Debug, Clone)]
pub(super) struct ProjectRow {
    pub(super) seq: u64,
    pub(super) id: ProjectId,
    pub(super) name: ProjectName,
    pub(super) owner: UserId,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: Option<DateTime<Utc>>,
}

/// Committed task row. Children are stored in their own maps.
#[derive(Debug, Clone)]
pub(super) struct TaskRow {
    pub(super) seq: u64,
    pub(super) task: Task,
}

/// Committed comment row.
#[derive(Debug, Clone)]
pub(super) struct CommentRow {
    pub(super) seq: u64,
    pub(super) comment: Comment,
}

/// Committed history row.
#[derive(Debug, Clone)]
pub(super) struct HistoryRow {
    pub(super) seq: u64,
    pub(super) entry: HistoryEntry,
}

/// All committed rows of one in-memory store.
#[derive(Debug, Clone, Default)]
pub(super) struct BoardState {
    next_seq: u64,
    pub(super) projects: HashMap<ProjectId, ProjectRow>,
    pub(super) tasks: HashMap<TaskId, TaskRow>,
    pub(super) comments: HashMap<CommentId, CommentRow>,
    pub(super) history: HashMap<HistoryId, HistoryRow>,
}

impl BoardState {
    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// One staged write awaiting commit.
#[derive(Debug, Clone)]
pub(super) enum PendingWrite {
    AddProject(Project),
    UpdateProject(Project),
    RemoveProject(ProjectId),
    AddTask(Task),
    UpdateTask(Task),
    RemoveTask(TaskId),
    AddComment(Comment),
    RemoveComment(CommentId),
    AppendHistory(HistoryEntry),
}

/// Acquires the committed state for reading, mapping lock poisoning to a
/// persistence error.
pub(super) fn read_state(state: &SharedState) -> StorageResult<RwLockReadGuard<'_, BoardState>> {
    state
        .read()
        .map_err(|err| StorageError::persistence(std::io::Error::other(err.to_string())))
}

/// Acquires the committed state for writing.
pub(super) fn write_state(state: &SharedState) -> StorageResult<RwLockWriteGuard<'_, BoardState>> {
    state
        .write()
        .map_err(|err| StorageError::persistence(std::io::Error::other(err.to_string())))
}

/// Acquires the staging buffer.
pub(super) fn lock_pending(
    pending: &SharedPending,
) -> StorageResult<MutexGuard<'_, Vec<PendingWrite>>> {
    pending
        .lock()
        .map_err(|err| StorageError::persistence(std::io::Error::other(err.to_string())))
}

/// Applies one staged write to the working state, returning the number of
/// affected rows.
///
/// The uniqueness and task-cap backstops live here: staged inserts are
/// re-validated under the store's single write lock, closing the
/// check-then-act window between the service's fast-path check and the
/// commit.
pub(super) fn apply(state: &mut BoardState, write: &PendingWrite) -> StorageResult<usize> {
    match write {
        PendingWrite::AddProject(project) => {
            ensure_name_available(state, project.name(), project.owner(), Some(project.id()))?;
            let seq = state.bump_seq();
            state.projects.insert(project.id(), project_row(seq, project));
            Ok(1)
        }
        PendingWrite::UpdateProject(project) => {
            let seq = match state.projects.get(&project.id()) {
                Some(row) => row.seq,
                None => return Err(StorageError::ProjectNotFound(project.id())),
            };
            ensure_name_available(state, project.name(), project.owner(), Some(project.id()))?;
            state.projects.insert(project.id(), project_row(seq, project));
            Ok(1)
        }
        PendingWrite::RemoveProject(id) => {
            if state.projects.remove(id).is_none() {
                return Ok(0);
            }
            let task_ids: Vec<TaskId> = state
                .tasks
                .values()
                .filter(|row| row.task.project_id() == *id)
                .map(|row| row.task.id())
                .collect();
            let mut affected = 1;
            for task_id in task_ids {
                affected += remove_task_cascade(state, task_id);
            }
            Ok(affected)
        }
        PendingWrite::AddTask(task) => {
            if !state.projects.contains_key(&task.project_id()) {
                return Err(StorageError::ProjectNotFound(task.project_id()));
            }
            let owned = state
                .tasks
                .values()
                .filter(|row| row.task.project_id() == task.project_id())
                .count();
            if owned >= Project::MAX_TASKS {
                return Err(StorageError::TaskLimitReached(task.project_id()));
            }
            let seq = state.bump_seq();
            state.tasks.insert(task.id(), task_row(seq, task));
            Ok(1)
        }
        PendingWrite::UpdateTask(task) => {
            let seq = match state.tasks.get(&task.id()) {
                Some(row) => row.seq,
                None => return Err(StorageError::TaskNotFound(task.id())),
            };
            state.tasks.insert(task.id(), task_row(seq, task));
            Ok(1)
        }
        PendingWrite::RemoveTask(id) => Ok(remove_task_cascade(state, *id)),
        PendingWrite::AddComment(comment) => {
            if !state.tasks.contains_key(&comment.task_id()) {
                return Err(StorageError::TaskNotFound(comment.task_id()));
            }
            let seq = state.bump_seq();
            state.comments.insert(
                comment.id(),
                CommentRow {
                    seq,
                    comment: comment.clone(),
                },
            );
            Ok(1)
        }
        PendingWrite::RemoveComment(id) => {
            Ok(usize::from(state.comments.remove(id).is_some()))
        }
        PendingWrite::AppendHistory(entry) => {
            if !state.tasks.contains_key(&entry.task_id()) {
                return Err(StorageError::TaskNotFound(entry.task_id()));
            }
            let seq = state.bump_seq();
            state.history.insert(
                entry.id(),
                HistoryRow {
                    seq,
                    entry: entry.clone(),
                },
            );
            Ok(1)
        }
    }
}

fn project_row(seq: u64, project: &Project) -> ProjectRow {
    ProjectRow {
        seq,
        id: project.id(),
        name: project.name().clone(),
        owner: project.owner(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn task_row(seq: u64, task: &Task) -> TaskRow {
    // Children are persisted through their own maps; the stored task is a
    // flat snapshot.
    let flat = Task::from_persisted(PersistedTaskData {
        id: task.id(),
        title: task.title().clone(),
        description: task.description().map(ToOwned::to_owned),
        due_date: task.due_date(),
        completed_at: task.completed_at(),
        priority: task.priority(),
        status: task.status(),
        project_id: task.project_id(),
        comments: Vec::new(),
        history: Vec::new(),
    });
    TaskRow { seq, task: flat }
}

fn ensure_name_available(
    state: &BoardState,
    name: &ProjectName,
    owner: UserId,
    excluding: Option<ProjectId>,
) -> StorageResult<()> {
    let taken = state.projects.values().any(|row| {
        Some(row.id) != excluding && row.owner == owner && row.name == *name
    });
    if taken {
        return Err(StorageError::DuplicateProjectName {
            name: name.to_string(),
            owner,
        });
    }
    Ok(())
}

fn remove_task_cascade(state: &mut BoardState, task_id: TaskId) -> usize {
    if state.tasks.remove(&task_id).is_none() {
        return 0;
    }
    let mut affected = 1;
    let comment_ids: Vec<CommentId> = state
        .comments
        .values()
        .filter(|row| row.comment.task_id() == task_id)
        .map(|row| row.comment.id())
        .collect();
    for comment_id in comment_ids {
        if state.comments.remove(&comment_id).is_some() {
            affected += 1;
        }
    }
    let history_ids: Vec<HistoryId> = state
        .history
        .values()
        .filter(|row| row.entry.task_id() == task_id)
        .map(|row| row.entry.id())
        .collect();
    for history_id in history_ids {
        if state.history.remove(&history_id).is_some() {
            affected += 1;
        }
    }
    affected
}

/// Hydrates a task with its comments (insertion order) and history
/// (timestamp ascending).
pub(super) fn hydrate_task(state: &BoardState, row: &TaskRow) -> Task {
    let mut comment_rows: Vec<&CommentRow> = state
        .comments
        .values()
        .filter(|candidate| candidate.comment.task_id() == row.task.id())
        .collect();
    comment_rows.sort_by_key(|candidate| candidate.seq);

    let mut history_rows: Vec<&HistoryRow> = state
        .history
        .values()
        .filter(|candidate| candidate.entry.task_id() == row.task.id())
        .collect();
    history_rows.sort_by_key(|candidate| (candidate.entry.recorded_at(), candidate.seq));

    Task::from_persisted(PersistedTaskData {
        id: row.task.id(),
        title: row.task.title().clone(),
        description: row.task.description().map(ToOwned::to_owned),
        due_date: row.task.due_date(),
        completed_at: row.task.completed_at(),
        priority: row.task.priority(),
        status: row.task.status(),
        project_id: row.task.project_id(),
        comments: comment_rows
            .into_iter()
            .map(|candidate| candidate.comment.clone())
            .collect(),
        history: history_rows
            .into_iter()
            .map(|candidate| candidate.entry.clone())
            .collect(),
    })
}

/// Hydrates a project with its tasks in insertion order.
pub(super) fn hydrate_project(state: &BoardState, row: &ProjectRow) -> Project {
    let mut task_rows: Vec<&TaskRow> = state
        .tasks
        .values()
        .filter(|candidate| candidate.task.project_id() == row.id)
        .collect();
    task_rows.sort_by_key(|candidate| candidate.seq);

    Project::from_persisted(PersistedProjectData {
        id: row.id,
        name: row.name.clone(),
        owner: row.owner,
        created_at: row.created_at,
        updated_at: row.updated_at,
        tasks: task_rows
            .into_iter()
            .map(|candidate| hydrate_task(state, candidate))
            .collect(),
    })
}

/// Builds a project without hydrating its tasks.
pub(super) fn shallow_project(row: &ProjectRow) -> Project {
    Project::from_persisted(PersistedProjectData {
        id: row.id,
        name: row.name.clone(),
        owner: row.owner,
        created_at: row.created_at,
        updated_at: row.updated_at,
        tasks: Vec::new(),
    })
}
