//! Database repository for users.

use crate::types::{Locale, UserId};
use crate::db::{
    errors::Result,
    models::users::{UserCreateDBRequest, UserDBResponse},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub locale: Locale,
    pub plan: String,
    pub projects_quota: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            locale: user.locale,
            plan: user.plan,
            projects_quota: user.projects_quota,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    pub async fn create(&mut self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, locale, plan, projects_quota)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.locale)
        .bind(&request.plan)
        .bind(request.projects_quota)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user.into())
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: UserId) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(Into::into))
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(Into::into))
    }

    /// Switch a user to a plan, copying the plan's quota onto the account
    #[instrument(skip(self), err)]
    pub async fn set_plan(&mut self, id: UserId, plan_code: &str, projects_quota: i32) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET plan = $2, projects_quota = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(plan_code)
        .bind(projects_quota)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user.into())
    }
}
