//! Database repository for subscriptions.

use crate::db::{
    errors::Result,
    models::{
        plans::PlanDBResponse,
        subscriptions::{SubscriptionDBResponse, SubscriptionStatus, SubscriptionWithPlanDBResponse},
    },
};
use crate::types::{PlanId, SubscriptionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    pub payment_reference: Option<String>,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionDBResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            plan_id: s.plan_id,
            status: s.status,
            payment_reference: s.payment_reference,
            started_at: s.started_at,
            expires_at: s.expires_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

// Subscription joined with the descriptive columns of its plan
#[derive(Debug, Clone, FromRow)]
struct SubscriptionWithPlan {
    #[sqlx(flatten)]
    pub subscription: Subscription,
    pub plan_code: String,
    pub plan_name_en: String,
    pub plan_name_es: String,
    pub plan_projects_quota: i32,
    pub plan_price: Decimal,
    pub plan_created_at: DateTime<Utc>,
}

impl From<SubscriptionWithPlan> for SubscriptionWithPlanDBResponse {
    fn from(row: SubscriptionWithPlan) -> Self {
        let plan = PlanDBResponse {
            id: row.subscription.plan_id,
            code: row.plan_code,
            name_en: row.plan_name_en,
            name_es: row.plan_name_es,
            projects_quota: row.plan_projects_quota,
            price: row.plan_price,
            created_at: row.plan_created_at,
        };
        Self {
            subscription: row.subscription.into(),
            plan,
        }
    }
}

pub struct Subscriptions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Subscriptions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, payment_reference), err)]
    pub async fn create_active(
        &mut self,
        user_id: UserId,
        plan_id: PlanId,
        payment_reference: Option<&str>,
    ) -> Result<SubscriptionDBResponse> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, plan_id, status, payment_reference, started_at)
            VALUES ($1, $2, 'active', $3, NOW())
            RETURNING id, user_id, plan_id, status, payment_reference, started_at, expires_at, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(payment_reference)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(subscription.into())
    }

    /// Mark every active subscription of a user as cancelled, returning how many changed
    #[instrument(skip(self), err)]
    pub async fn retire_active(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled', updated_at = NOW()
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Newest active subscription of a user, with its plan
    #[instrument(skip(self), err)]
    pub async fn get_active_for_user(&mut self, user_id: UserId) -> Result<Option<SubscriptionWithPlanDBResponse>> {
        let row = sqlx::query_as::<_, SubscriptionWithPlan>(
            r#"
            SELECT
                s.id, s.user_id, s.plan_id, s.status, s.payment_reference,
                s.started_at, s.expires_at, s.created_at, s.updated_at,
                p.code AS plan_code,
                p.name_en AS plan_name_en,
                p.name_es AS plan_name_es,
                p.projects_quota AS plan_projects_quota,
                p.price AS plan_price,
                p.created_at AS plan_created_at
            FROM subscriptions s
            JOIN plans p ON p.id = s.plan_id
            WHERE s.user_id = $1 AND s.status = 'active'
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), err)]
    pub async fn get_for_user(&mut self, id: SubscriptionId, user_id: UserId) -> Result<Option<SubscriptionDBResponse>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, plan_id, status, payment_reference, started_at, expires_at, created_at, updated_at
            FROM subscriptions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(subscription.map(Into::into))
    }

    #[instrument(skip(self), err)]
    pub async fn cancel(&mut self, id: SubscriptionId) -> Result<SubscriptionDBResponse> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, plan_id, status, payment_reference, started_at, expires_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(subscription.into())
    }
}
