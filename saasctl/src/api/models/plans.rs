//! API response model for the plan catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{db::models::plans::PlanDBResponse, types::PlanId};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanResponse {
    pub id: PlanId,
    /// Stable identifier, e.g. `free` or `pro`
    #[schema(example = "pro")]
    pub code: String,
    pub name_en: String,
    pub name_es: String,
    /// Maximum number of projects on this plan
    pub projects_quota: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 29.99)]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<PlanDBResponse> for PlanResponse {
    fn from(db: PlanDBResponse) -> Self {
        Self {
            id: db.id,
            code: db.code,
            name_en: db.name_en,
            name_es: db.name_es,
            projects_quota: db.projects_quota,
            price: db.price,
            created_at: db.created_at,
        }
    }
}
