//! API request/response models for projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::projects::ProjectDBResponse,
    errors::{Error, ErrorKey},
    types::{ProjectId, UserId},
};

pub const PROJECT_NAME_MAX_LENGTH: usize = 100;
pub const PROJECT_DESCRIPTION_MAX_LENGTH: usize = 500;

/// Request body for creating a project
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProjectCreate {
    /// 1 to 100 characters; the slug is derived from it
    #[schema(example = "My First Project")]
    pub name: Option<String>,
    /// Up to 500 characters
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProjectCreate {
    pub name: String,
    pub description: Option<String>,
}

impl ProjectCreate {
    pub fn validate(self) -> Result<ValidProjectCreate, Error> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or(Error::Validation {
                key: ErrorKey::ProjectNameRequired,
            })?;
        if name.chars().count() > PROJECT_NAME_MAX_LENGTH {
            return Err(Error::Validation {
                key: ErrorKey::ProjectNameTooLong,
            });
        }

        if let Some(description) = &self.description {
            if description.chars().count() > PROJECT_DESCRIPTION_MAX_LENGTH {
                return Err(Error::Validation {
                    key: ErrorKey::ProjectDescriptionTooLong,
                });
            }
        }

        Ok(ValidProjectCreate {
            name,
            description: self.description,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    /// URL-safe identifier, unique per owner
    #[schema(example = "my-first-project")]
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectDBResponse> for ProjectResponse {
    fn from(db: ProjectDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            slug: db.slug,
            description: db.description,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
