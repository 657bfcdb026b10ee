//! Service layer for project lifecycle rules.
//!
//! Enforces name-uniqueness per owner, the ownership check on rename, and
//! the pending-task deletion guard.

use super::ErrorKind;
use crate::domain::{DomainError, Project, ProjectId, ProjectName, UserId};
use crate::ports::{StorageError, StorageGateway, UnitOfWork};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    name: String,
    owner_id: UserId,
}

impl CreateProjectRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            name: name.into(),
            owner_id,
        }
    }
}

/// Request payload for renaming a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameProjectRequest {
    project_id: ProjectId,
    owner_id: UserId,
    new_name: String,
}

impl RenameProjectRequest {
    /// Creates a request with the required fields. A blank `new_name` turns
    /// the rename into a no-op rather than an error.
    #[must_use]
    pub fn new(project_id: ProjectId, owner_id: UserId, new_name: impl Into<String>) -> Self {
        Self {
            project_id,
            owner_id,
            new_name: new_name.into(),
        }
    }
}

/// Summary projection of a project: identifier and name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: ProjectName,
}

/// Service-level errors for project operations.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// The project does not exist.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// The project belongs to a different user.
    #[error("project {0} does not belong to the requesting user")]
    NotOwner(ProjectId),

    /// Another project of the same owner already carries the name.
    #[error("a project named '{name}' already exists for owner {owner}")]
    DuplicateName {
        /// Conflicting name.
        name: String,
        /// Owner the name is scoped to.
        owner: UserId,
    },

    /// The project holds pending tasks and cannot be deleted.
    #[error("project {0} has pending tasks; complete or remove them before deleting")]
    PendingTasks(ProjectId),

    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ProjectServiceError {
    /// Returns the failure classification for the transport boundary.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotOwner(_) => ErrorKind::Unauthorized,
            Self::DuplicateName { .. } | Self::PendingTasks(_) => ErrorKind::Conflict,
            Self::Domain(_) => ErrorKind::Validation,
            Self::Storage(err) => storage_error_kind(err),
        }
    }
}

/// Classifies storage errors surfaced through a service error.
pub(super) const fn storage_error_kind(err: &StorageError) -> ErrorKind {
    match err {
        StorageError::ProjectNotFound(_) | StorageError::TaskNotFound(_) => ErrorKind::NotFound,
        StorageError::DuplicateProjectName { .. } | StorageError::TaskLimitReached(_) => {
            ErrorKind::Conflict
        }
        StorageError::InvalidPersistedData(_) | StorageError::Persistence(_) => ErrorKind::Internal,
    }
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project rules orchestration service.
#[derive(Clone)]
pub struct ProjectService<G, C>
where
    G: StorageGateway,
    C: Clock + Send + Sync,
{
    gateway: Arc<G>,
    clock: Arc<C>,
}

impl<G, C> ProjectService<G, C>
where
    G: StorageGateway,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(gateway: Arc<G>, clock: Arc<C>) -> Self {
        Self { gateway, clock }
    }

    /// Returns the full project, tasks hydrated.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] when the project does not
    /// exist, or [`ProjectServiceError::Storage`] when the lookup fails.
    pub async fn get_full(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        let uow = self.gateway.begin().await?;
        uow.projects()
            .find_by_id(id)
            .await?
            .ok_or(ProjectServiceError::NotFound(id))
    }

    /// Lists the projects of an owner as id/name summaries.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyOwnerId`] (as a validation failure) when
    /// the owner id is nil, or [`ProjectServiceError::Storage`] when the
    /// lookup fails.
    pub async fn list_by_owner(&self, owner: UserId) -> ProjectServiceResult<Vec<ProjectSummary>> {
        if owner.is_nil() {
            return Err(DomainError::EmptyOwnerId.into());
        }
        let uow = self.gateway.begin().await?;
        let projects = uow.projects().list_by_owner(owner).await?;
        Ok(projects
            .into_iter()
            .map(|project| ProjectSummary {
                id: project.id(),
                name: project.name().clone(),
            })
            .collect())
    }

    /// Returns `true` when the project holds no pending task and may be
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] when the project does not
    /// exist, or [`ProjectServiceError::Storage`] when the lookup fails.
    pub async fn can_delete(&self, id: ProjectId) -> ProjectServiceResult<bool> {
        let project = self.get_full(id).await?;
        Ok(project.eligible_for_deletion())
    }

    /// Deletes a project and, through the storage cascade, its tasks with
    /// their comments and history.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] when the project does not
    /// exist, [`ProjectServiceError::PendingTasks`] when a pending task
    /// blocks deletion, or [`ProjectServiceError::Storage`] when
    /// persistence fails.
    pub async fn delete(&self, id: ProjectId) -> ProjectServiceResult<()> {
        let uow = self.gateway.begin().await?;
        let project = uow
            .projects()
            .find_by_id(id)
            .await?
            .ok_or(ProjectServiceError::NotFound(id))?;
        if !project.eligible_for_deletion() {
            return Err(ProjectServiceError::PendingTasks(id));
        }
        uow.projects().remove(id).await?;
        uow.commit().await?;
        Ok(())
    }

    /// Creates a project, rejecting duplicate (name, owner) pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Domain`] when the name or owner id is
    /// invalid, [`ProjectServiceError::DuplicateName`] on a name collision,
    /// or [`ProjectServiceError::Storage`] when persistence fails.
    pub async fn create(&self, request: CreateProjectRequest) -> ProjectServiceResult<Project> {
        let name = ProjectName::new(request.name)?;
        if request.owner_id.is_nil() {
            return Err(DomainError::EmptyOwnerId.into());
        }

        let uow = self.gateway.begin().await?;
        if uow
            .projects()
            .name_conflicts(&name, request.owner_id, None)
            .await?
        {
            return Err(ProjectServiceError::DuplicateName {
                name: name.to_string(),
                owner: request.owner_id,
            });
        }

        let project = Project::new(name, request.owner_id, &*self.clock);
        uow.projects().add(&project).await?;
        uow.commit().await?;
        Ok(project)
    }

    /// Renames a project after checking ownership and name uniqueness. The
    /// project itself is excluded from the conflict check, so renaming to
    /// the current name succeeds. A blank name leaves the project
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::NotFound`] when the project does not
    /// exist, [`ProjectServiceError::NotOwner`] when it belongs to a
    /// different user, [`ProjectServiceError::DuplicateName`] on a
    /// collision with another project of the same owner,
    /// [`ProjectServiceError::Domain`] when the new name is invalid, or
    /// [`ProjectServiceError::Storage`] when persistence fails.
    pub async fn rename(&self, request: RenameProjectRequest) -> ProjectServiceResult<Project> {
        let RenameProjectRequest {
            project_id,
            owner_id,
            new_name,
        } = request;

        let uow = self.gateway.begin().await?;
        let mut project = uow
            .projects()
            .find_by_id(project_id)
            .await?
            .ok_or(ProjectServiceError::NotFound(project_id))?;
        if project.owner() != owner_id {
            return Err(ProjectServiceError::NotOwner(project_id));
        }

        if !new_name.trim().is_empty() {
            let candidate = ProjectName::new(new_name.as_str())?;
            if uow
                .projects()
                .name_conflicts(&candidate, project.owner(), Some(project.id()))
                .await?
            {
                return Err(ProjectServiceError::DuplicateName {
                    name: candidate.to_string(),
                    owner: project.owner(),
                });
            }
        }

        project.rename(&new_name, &*self.clock)?;
        uow.projects().update(&project).await?;
        uow.commit().await?;
        Ok(project)
    }
}
