//! PostgreSQL implementation of [`Store`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use super::Store;
use crate::db::{
    errors::Result,
    handlers::{Invoices, Plans, Projects, Subscriptions, Users},
    models::{
        invoices::{InvoiceCreateDBRequest, InvoiceDBResponse, InvoiceStatus, format_invoice_number},
        plans::PlanDBResponse,
        projects::{ProjectCreateDBRequest, ProjectDBResponse},
        subscriptions::{SubscriptionDBResponse, SubscriptionWithPlanDBResponse, UpgradeDBRequest, UpgradeDBResponse},
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use crate::types::{PlanId, ProjectId, SubscriptionId, UserId};

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).create(request).await
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).get_by_id(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).get_user_by_email(email).await
    }

    async fn list_plans(&self) -> Result<Vec<PlanDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Plans::new(&mut conn).list().await
    }

    async fn get_plan_by_id(&self, id: PlanId) -> Result<Option<PlanDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Plans::new(&mut conn).get_by_id(id).await
    }

    async fn get_plan_by_code(&self, code: &str) -> Result<Option<PlanDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Plans::new(&mut conn).get_by_code(code).await
    }

    async fn count_projects(&self, user_id: UserId) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        Projects::new(&mut conn).count_for_user(user_id).await
    }

    async fn project_slug_exists(&self, user_id: UserId, slug: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Projects::new(&mut conn).slug_exists(user_id, slug).await
    }

    async fn create_project(&self, request: &ProjectCreateDBRequest) -> Result<ProjectDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Projects::new(&mut conn).create(request).await
    }

    async fn list_projects(&self, user_id: UserId) -> Result<Vec<ProjectDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Projects::new(&mut conn).list_for_user(user_id).await
    }

    async fn get_project(&self, id: ProjectId, user_id: UserId) -> Result<Option<ProjectDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Projects::new(&mut conn).get_for_user(id, user_id).await
    }

    async fn delete_project(&self, id: ProjectId, user_id: UserId) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Projects::new(&mut conn).delete_for_user(id, user_id).await
    }

    async fn get_active_subscription(&self, user_id: UserId) -> Result<Option<SubscriptionWithPlanDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Subscriptions::new(&mut conn).get_active_for_user(user_id).await
    }

    async fn get_subscription(&self, id: SubscriptionId, user_id: UserId) -> Result<Option<SubscriptionDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Subscriptions::new(&mut conn).get_for_user(id, user_id).await
    }

    async fn cancel_subscription(&self, id: SubscriptionId) -> Result<SubscriptionDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Subscriptions::new(&mut conn).cancel(id).await
    }

    async fn list_invoices(&self, subscription_id: SubscriptionId) -> Result<Vec<InvoiceDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Invoices::new(&mut conn).list_for_subscription(subscription_id).await
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id, plan = %request.plan_code), err)]
    async fn apply_upgrade(&self, request: &UpgradeDBRequest) -> Result<UpgradeDBResponse> {
        // Dropping `tx` on any early return rolls every write back
        let mut tx = self.pool.begin().await?;

        let retired = Subscriptions::new(&mut tx).retire_active(request.user_id).await?;

        let subscription = Subscriptions::new(&mut tx)
            .create_active(request.user_id, request.plan_id, request.payment_reference.as_deref())
            .await?;

        let sequence = Invoices::new(&mut tx).next_sequence(request.invoice_day).await?;
        let invoice = Invoices::new(&mut tx)
            .create(&InvoiceCreateDBRequest {
                user_id: request.user_id,
                subscription_id: subscription.id,
                invoice_number: format_invoice_number(request.invoice_day, sequence),
                amount: request.amount,
                status: InvoiceStatus::Paid,
            })
            .await?;

        let user = Users::new(&mut tx)
            .set_plan(request.user_id, &request.plan_code, request.projects_quota)
            .await?;

        tx.commit().await?;

        info!(
            subscription_id = subscription.id,
            invoice_number = %invoice.invoice_number,
            retired,
            "Upgrade committed"
        );

        Ok(UpgradeDBResponse { subscription, invoice, user })
    }
}
