//! `PostgreSQL` stores and unit of work.
//!
//! Reads execute immediately against the pool; writes are staged as
//! [`PendingOp`]s and applied inside one transaction when the unit of work
//! commits. The commit transaction re-checks the task cap and relies on
//! the `idx_projects_owner_name_unique` index as the authoritative guard
//! for the (owner, name) uniqueness rule.

use super::conversion::{
    load_project, load_project_tasks, load_task, row_to_comment, row_to_history, row_to_project,
    to_new_comment_row, to_new_history_row, to_new_project_row, to_new_task_row,
};
use super::models::{
    CommentRow, HistoryRow, NewCommentRow, NewHistoryRow, NewProjectRow, NewTaskRow, ProjectRow,
};
use super::schema::{projects, task_comments, task_history, tasks};
use crate::domain::{
    Comment, CommentId, HistoryEntry, Project, ProjectId, ProjectName, Task, TaskId, TaskStatus,
    UserId,
};
use crate::ports::{
    CommentRepository, CompletedTally, HistoryRepository, ProjectRepository, StorageError,
    StorageGateway, StorageResult, TaskRepository, UnitOfWork,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by the adapter.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Staging buffer shared between the stores of one unit of work.
type SharedOps = Arc<Mutex<Vec<PendingOp>>>;

/// Name of the unique index enforcing the (owner, name) rule.
const OWNER_NAME_UNIQUE_INDEX: &str = "idx_projects_owner_name_unique";

impl From<DieselError> for StorageError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// One staged write awaiting the commit transaction.
#[derive(Debug, Clone)]
enum PendingOp {
    InsertProject(NewProjectRow),
    UpdateProject(NewProjectRow),
    DeleteProject(Uuid),
    InsertTask(NewTaskRow),
    UpdateTask(NewTaskRow),
    DeleteTask(Uuid),
    InsertComment(NewCommentRow),
    DeleteComment(Uuid),
    InsertHistory(NewHistoryRow),
}

async fn run_blocking<F, T>(pool: PgPool, f: F) -> StorageResult<T>
where
    F: FnOnce(&mut PgConnection) -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(StorageError::persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(StorageError::persistence)?
}

fn lock_ops(ops: &SharedOps) -> StorageResult<MutexGuard<'_, Vec<PendingOp>>> {
    ops.lock()
        .map_err(|err| StorageError::persistence(std::io::Error::other(err.to_string())))
}

/// `PostgreSQL`-backed storage gateway over a connection pool.
///
/// The pool is supplied by the embedder; no connection configuration lives
/// in this crate.
#[derive(Debug, Clone)]
pub struct PostgresGateway {
    pool: PgPool,
}

impl PostgresGateway {
    /// Creates a gateway from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageGateway for PostgresGateway {
    type Uow = PostgresUnitOfWork;

    async fn begin(&self) -> StorageResult<PostgresUnitOfWork> {
        Ok(PostgresUnitOfWork::new(self.pool.clone()))
    }
}

/// One staged transaction against `PostgreSQL`.
#[derive(Debug)]
pub struct PostgresUnitOfWork {
    pool: PgPool,
    ops: SharedOps,
    projects: PostgresProjectStore,
    tasks: PostgresTaskStore,
    comments: PostgresCommentStore,
    histories: PostgresHistoryStore,
}

impl PostgresUnitOfWork {
    fn new(pool: PgPool) -> Self {
        let ops: SharedOps = Arc::new(Mutex::new(Vec::new()));
        Self {
            projects: PostgresProjectStore {
                pool: pool.clone(),
                ops: Arc::clone(&ops),
            },
            tasks: PostgresTaskStore {
                pool: pool.clone(),
                ops: Arc::clone(&ops),
            },
            comments: PostgresCommentStore {
                pool: pool.clone(),
                ops: Arc::clone(&ops),
            },
            histories: PostgresHistoryStore {
                pool: pool.clone(),
                ops: Arc::clone(&ops),
            },
            pool,
            ops,
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn projects(&self) -> &dyn ProjectRepository {
        &self.projects
    }

    fn tasks(&self) -> &dyn TaskRepository {
        &self.tasks
    }

    fn comments(&self) -> &dyn CommentRepository {
        &self.comments
    }

    fn histories(&self) -> &dyn HistoryRepository {
        &self.histories
    }

    async fn commit(self) -> StorageResult<usize> {
        let ops = {
            let mut staged = lock_ops(&self.ops)?;
            std::mem::take(&mut *staged)
        };
        if ops.is_empty() {
            return Ok(0);
        }
        run_blocking(self.pool.clone(), move |connection| {
            connection.transaction::<usize, StorageError, _>(|txn| {
                ops.iter()
                    .try_fold(0, |applied, op| Ok(applied + apply_op(txn, op)?))
            })
        })
        .await
    }

    async fn rollback(self) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.clear();
        Ok(())
    }
}

/// Project store bound to one unit of work.
#[derive(Debug, Clone)]
pub struct PostgresProjectStore {
    pool: PgPool,
    ops: SharedOps,
}

#[async_trait]
impl ProjectRepository for PostgresProjectStore {
    async fn find_by_id(&self, id: ProjectId) -> StorageResult<Option<Project>> {
        run_blocking(self.pool.clone(), move |connection| {
            load_project(connection, id.into_inner())
        })
        .await
    }

    async fn list_by_owner(&self, owner: UserId) -> StorageResult<Vec<Project>> {
        run_blocking(self.pool.clone(), move |connection| {
            let rows = projects::table
                .filter(projects::owner_id.eq(owner.into_inner()))
                .order(projects::created_at.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(StorageError::persistence)?;
            rows.into_iter()
                .map(|row| row_to_project(row, Vec::new()))
                .collect()
        })
        .await
    }

    async fn name_conflicts(
        &self,
        name: &ProjectName,
        owner: UserId,
        excluding: Option<ProjectId>,
    ) -> StorageResult<bool> {
        let candidate = name.as_str().to_owned();
        run_blocking(self.pool.clone(), move |connection| {
            let mut query = projects::table
                .filter(projects::name.eq(candidate))
                .filter(projects::owner_id.eq(owner.into_inner()))
                .into_boxed();
            if let Some(excluded) = excluding {
                query = query.filter(projects::id.ne(excluded.into_inner()));
            }
            let total: i64 = query
                .count()
                .get_result(connection)
                .map_err(StorageError::persistence)?;
            Ok(total > 0)
        })
        .await
    }

    async fn add(&self, project: &Project) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::InsertProject(to_new_project_row(project)));
        Ok(())
    }

    async fn update(&self, project: &Project) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::UpdateProject(to_new_project_row(project)));
        Ok(())
    }

    async fn remove(&self, id: ProjectId) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::DeleteProject(id.into_inner()));
        Ok(())
    }
}

/// Task store bound to one unit of work.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
    ops: SharedOps,
}

#[async_trait]
impl TaskRepository for PostgresTaskStore {
    async fn find_by_id(&self, id: TaskId) -> StorageResult<Option<Task>> {
        run_blocking(self.pool.clone(), move |connection| {
            load_task(connection, id.into_inner())
        })
        .await
    }

    async fn list_by_project(&self, project_id: ProjectId) -> StorageResult<Vec<Task>> {
        run_blocking(self.pool.clone(), move |connection| {
            load_project_tasks(connection, project_id.into_inner())
        })
        .await
    }

    async fn add(&self, task: &Task) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::InsertTask(to_new_task_row(task)));
        Ok(())
    }

    async fn update(&self, task: &Task) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::UpdateTask(to_new_task_row(task)));
        Ok(())
    }

    async fn remove(&self, id: TaskId) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::DeleteTask(id.into_inner()));
        Ok(())
    }

    async fn tally_completed_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<Vec<CompletedTally>> {
        run_blocking(self.pool.clone(), move |connection| {
            let owners: Vec<Uuid> = tasks::table
                .inner_join(projects::table)
                .filter(tasks::status.eq(TaskStatus::Completed.as_str()))
                .filter(tasks::completed_at.ge(cutoff))
                .select(projects::owner_id)
                .load::<Uuid>(connection)
                .map_err(StorageError::persistence)?;
            let mut counts: HashMap<Uuid, u64> = HashMap::new();
            for owner in owners {
                *counts.entry(owner).or_insert(0) += 1;
            }
            let mut tallies: Vec<CompletedTally> = counts
                .into_iter()
                .map(|(owner, completed)| CompletedTally {
                    owner: UserId::from_uuid(owner),
                    completed,
                })
                .collect();
            tallies.sort_by_key(|tally| tally.owner.into_inner());
            Ok(tallies)
        })
        .await
    }
}

/// Comment store bound to one unit of work.
#[derive(Debug, Clone)]
pub struct PostgresCommentStore {
    pool: PgPool,
    ops: SharedOps,
}

#[async_trait]
impl CommentRepository for PostgresCommentStore {
    async fn list_by_task(&self, task_id: TaskId) -> StorageResult<Vec<Comment>> {
        run_blocking(self.pool.clone(), move |connection| {
            let rows = task_comments::table
                .filter(task_comments::task_id.eq(task_id.into_inner()))
                .order(task_comments::posted_at.asc())
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)
                .map_err(StorageError::persistence)?;
            rows.into_iter().map(row_to_comment).collect()
        })
        .await
    }

    async fn add(&self, comment: &Comment) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::InsertComment(to_new_comment_row(comment)));
        Ok(())
    }

    async fn remove(&self, id: CommentId) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::DeleteComment(id.into_inner()));
        Ok(())
    }
}

/// History store bound to one unit of work.
#[derive(Debug, Clone)]
pub struct PostgresHistoryStore {
    pool: PgPool,
    ops: SharedOps,
}

#[async_trait]
impl HistoryRepository for PostgresHistoryStore {
    async fn list_by_task(&self, task_id: TaskId) -> StorageResult<Vec<HistoryEntry>> {
        run_blocking(self.pool.clone(), move |connection| {
            let rows = task_history::table
                .filter(task_history::task_id.eq(task_id.into_inner()))
                .order((task_history::recorded_at.asc(), task_history::id.asc()))
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)
                .map_err(StorageError::persistence)?;
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }

    async fn append(&self, entry: &HistoryEntry) -> StorageResult<()> {
        let mut staged = lock_ops(&self.ops)?;
        staged.push(PendingOp::InsertHistory(to_new_history_row(entry)));
        Ok(())
    }
}

/// Applies one staged op inside the commit transaction.
fn apply_op(connection: &mut PgConnection, op: &PendingOp) -> StorageResult<usize> {
    match op {
        PendingOp::InsertProject(row) => diesel::insert_into(projects::table)
            .values(row)
            .execute(connection)
            .map_err(|err| map_project_write_error(err, row)),
        PendingOp::UpdateProject(row) => {
            let affected = diesel::update(projects::table.find(row.id))
                .set(row)
                .execute(connection)
                .map_err(|err| map_project_write_error(err, row))?;
            if affected == 0 {
                return Err(StorageError::ProjectNotFound(ProjectId::from_uuid(row.id)));
            }
            Ok(affected)
        }
        PendingOp::DeleteProject(id) => {
            let owned_tasks = tasks::table
                .filter(tasks::project_id.eq(*id))
                .select(tasks::id);
            let mut affected = diesel::delete(
                task_history::table.filter(task_history::task_id.eq_any(owned_tasks.clone())),
            )
            .execute(connection)?;
            affected += diesel::delete(
                task_comments::table.filter(task_comments::task_id.eq_any(owned_tasks)),
            )
            .execute(connection)?;
            affected += diesel::delete(tasks::table.filter(tasks::project_id.eq(*id)))
                .execute(connection)?;
            affected += diesel::delete(projects::table.find(*id)).execute(connection)?;
            Ok(affected)
        }
        PendingOp::InsertTask(row) => {
            let owned: i64 = tasks::table
                .filter(tasks::project_id.eq(row.project_id))
                .count()
                .get_result(connection)?;
            if owned >= i64::try_from(Project::MAX_TASKS).unwrap_or(i64::MAX) {
                return Err(StorageError::TaskLimitReached(ProjectId::from_uuid(
                    row.project_id,
                )));
            }
            diesel::insert_into(tasks::table)
                .values(row)
                .execute(connection)
                .map_err(|err| map_task_write_error(err, row.project_id))
        }
        PendingOp::UpdateTask(row) => {
            let affected = diesel::update(tasks::table.find(row.id))
                .set(row)
                .execute(connection)
                .map_err(|err| map_task_write_error(err, row.project_id))?;
            if affected == 0 {
                return Err(StorageError::TaskNotFound(TaskId::from_uuid(row.id)));
            }
            Ok(affected)
        }
        PendingOp::DeleteTask(id) => {
            let mut affected = diesel::delete(
                task_history::table.filter(task_history::task_id.eq(*id)),
            )
            .execute(connection)?;
            affected += diesel::delete(
                task_comments::table.filter(task_comments::task_id.eq(*id)),
            )
            .execute(connection)?;
            affected += diesel::delete(tasks::table.find(*id)).execute(connection)?;
            Ok(affected)
        }
        PendingOp::InsertComment(row) => diesel::insert_into(task_comments::table)
            .values(row)
            .execute(connection)
            .map_err(|err| map_child_write_error(err, row.task_id)),
        PendingOp::DeleteComment(id) => {
            Ok(diesel::delete(task_comments::table.find(*id)).execute(connection)?)
        }
        PendingOp::InsertHistory(row) => diesel::insert_into(task_history::table)
            .values(row)
            .execute(connection)
            .map_err(|err| map_child_write_error(err, row.task_id)),
    }
}

fn map_project_write_error(err: DieselError, row: &NewProjectRow) -> StorageError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_owner_name_unique_violation(info.as_ref()) =>
        {
            StorageError::DuplicateProjectName {
                name: row.name.clone(),
                owner: UserId::from_uuid(row.owner_id),
            }
        }
        _ => StorageError::persistence(err),
    }
}

fn map_task_write_error(err: DieselError, project_id: Uuid) -> StorageError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            StorageError::ProjectNotFound(ProjectId::from_uuid(project_id))
        }
        _ => StorageError::persistence(err),
    }
}

fn map_child_write_error(err: DieselError, task_id: Uuid) -> StorageError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            StorageError::TaskNotFound(TaskId::from_uuid(task_id))
        }
        _ => StorageError::persistence(err),
    }
}

fn is_owner_name_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == OWNER_NAME_UNIQUE_INDEX)
}
