//! API response model for accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    db::models::users::UserDBResponse,
    types::{Locale, UserId},
};

/// Account as returned by the API; the password hash is never exposed
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub locale: Locale,
    /// Code of the current plan
    pub plan: String,
    pub projects_quota: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
            locale: db.locale,
            plan: db.plan,
            projects_quota: db.projects_quota,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
