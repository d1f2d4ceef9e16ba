//! Projects owned by a single user, gated by the owner's quota.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    db::{
        errors::DbError,
        models::projects::{ProjectCreateDBRequest, ProjectDBResponse},
        store::{Store, constraints},
    },
    types::{ProjectId, UserId},
};

pub mod quota;
pub mod slug;

pub use quota::can_create_project;
pub use slug::slugify;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project quota of {quota} reached")]
    QuotaExceeded { quota: i32 },

    #[error("Owner already has a project with slug '{slug}'")]
    SlugAlreadyExists { slug: String },

    /// Missing, or owned by someone else
    #[error("Project not found")]
    ProjectNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Database(#[from] DbError),
}

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a project for `owner_id` after re-checking their quota against a fresh count.
    ///
    /// The count and the insert are not serialized per owner, so two concurrent creations
    /// at quota - 1 can both be admitted.
    #[instrument(skip(self, description), err)]
    pub async fn create(&self, owner_id: UserId, name: &str, description: Option<&str>) -> Result<ProjectDBResponse, ProjectError> {
        let owner = self
            .store
            .get_user_by_id(owner_id)
            .await?
            .ok_or(ProjectError::UserNotFound)?;

        let count = self.store.count_projects(owner_id).await?;
        if !can_create_project(&owner, count) {
            debug!(count, quota = owner.projects_quota, "Project quota reached");
            return Err(ProjectError::QuotaExceeded {
                quota: owner.projects_quota,
            });
        }

        let slug = slugify(name);
        if self.store.project_slug_exists(owner_id, &slug).await? {
            return Err(ProjectError::SlugAlreadyExists { slug });
        }

        let request = ProjectCreateDBRequest {
            user_id: owner_id,
            name: name.to_string(),
            slug: slug.clone(),
            description: description.map(str::to_string),
        };

        let project = self.store.create_project(&request).await.map_err(|e| match e {
            e if e.is_unique_violation_of(constraints::PROJECTS_USER_SLUG_UNIQUE) => ProjectError::SlugAlreadyExists { slug },
            DbError::ForeignKeyViolation { .. } => ProjectError::UserNotFound,
            e => ProjectError::Database(e),
        })?;

        info!(project_id = project.id, "Project created");
        Ok(project)
    }

    /// Projects owned by `owner_id`, newest first
    #[instrument(skip(self), err)]
    pub async fn list(&self, owner_id: UserId) -> Result<Vec<ProjectDBResponse>, ProjectError> {
        Ok(self.store.list_projects(owner_id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, project_id: ProjectId, owner_id: UserId) -> Result<ProjectDBResponse, ProjectError> {
        self.store
            .get_project(project_id, owner_id)
            .await?
            .ok_or(ProjectError::ProjectNotFound)
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&self, project_id: ProjectId, owner_id: UserId) -> Result<(), ProjectError> {
        if !self.store.delete_project(project_id, owner_id).await? {
            return Err(ProjectError::ProjectNotFound);
        }

        info!("Project deleted");
        Ok(())
    }
}
