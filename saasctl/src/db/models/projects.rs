//! Database models for projects.

use crate::types::{ProjectId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new project. The slug is derived by the caller.
#[derive(Debug, Clone)]
pub struct ProjectCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Database response for a project
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDBResponse {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
