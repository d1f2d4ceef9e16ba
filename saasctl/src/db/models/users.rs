//! Database models for users.

use crate::types::{Locale, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub password_hash: String,
    pub locale: Locale,
    pub plan: String,
    pub projects_quota: i32,
}

/// Database response for a user
#[derive(Debug, Clone, PartialEq)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub locale: Locale,
    /// Code of the plan currently governing this account
    pub plan: String,
    /// Denormalized from the active plan; only changed by an upgrade
    pub projects_quota: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
