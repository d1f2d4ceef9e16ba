//! Database repository for the plan catalog.

use crate::db::{errors::Result, models::plans::PlanDBResponse};
use crate::types::PlanId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct Plan {
    pub id: PlanId,
    pub code: String,
    pub name_en: String,
    pub name_es: String,
    pub projects_quota: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Plan> for PlanDBResponse {
    fn from(plan: Plan) -> Self {
        Self {
            id: plan.id,
            code: plan.code,
            name_en: plan.name_en,
            name_es: plan.name_es,
            projects_quota: plan.projects_quota,
            price: plan.price,
            created_at: plan.created_at,
        }
    }
}

pub struct Plans<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Plans<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// All plans, cheapest first
    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<PlanDBResponse>> {
        let plans = sqlx::query_as::<_, Plan>("SELECT * FROM plans ORDER BY price ASC, id ASC")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(plans.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: PlanId) -> Result<Option<PlanDBResponse>> {
        let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(plan.map(Into::into))
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_code(&mut self, code: &str) -> Result<Option<PlanDBResponse>> {
        let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE code = $1")
            .bind(code)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(plan.map(Into::into))
    }
}
