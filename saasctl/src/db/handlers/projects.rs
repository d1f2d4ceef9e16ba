//! Database repository for projects.
//!
//! Every lookup is scoped by owner: a project that exists but belongs to someone
//! else is indistinguishable from one that does not exist.

use crate::db::{
    errors::Result,
    models::projects::{ProjectCreateDBRequest, ProjectDBResponse},
};
use crate::types::{ProjectId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectDBResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            user_id: project.user_id,
            name: project.name,
            slug: project.slug,
            description: project.description,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

pub struct Projects<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Projects<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id, slug = %request.slug), err)]
    pub async fn create(&mut self, request: &ProjectCreateDBRequest) -> Result<ProjectDBResponse> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (user_id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.name)
        .bind(&request.slug)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(project.into())
    }

    #[instrument(skip(self), err)]
    pub async fn count_for_user(&mut self, user_id: UserId) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn slug_exists(&mut self, user_id: UserId, slug: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM projects WHERE user_id = $1 AND slug = $2)")
            .bind(user_id)
            .bind(slug)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(exists)
    }

    /// Projects owned by a user, newest first
    #[instrument(skip(self), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<ProjectDBResponse>> {
        let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(projects.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    pub async fn get_for_user(&mut self, id: ProjectId, user_id: UserId) -> Result<Option<ProjectDBResponse>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(project.map(Into::into))
    }

    /// Returns whether a row owned by `user_id` was removed
    #[instrument(skip(self), err)]
    pub async fn delete_for_user(&mut self, id: ProjectId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
