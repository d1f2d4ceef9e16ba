//! Store capability injected into every service.
//!
//! [`Store`] is the only way services reach persistence. Two implementations exist:
//!
//! - [`postgres::PostgresStore`]: production store over an sqlx pool, delegating to the
//!   per-table repositories in [`crate::db::handlers`]
//! - [`in_memory::InMemoryStore`]: single-lock store used for development and tests
//!
//! Both enforce the same constraints (unique email, unique slug per owner, unique
//! invoice number, one active subscription per user) and report violations with the
//! same [`DbError`](crate::db::errors::DbError) variants and constraint names.

use async_trait::async_trait;

use crate::db::errors::Result;
use crate::db::models::{
    invoices::InvoiceDBResponse,
    plans::PlanDBResponse,
    projects::{ProjectCreateDBRequest, ProjectDBResponse},
    subscriptions::{SubscriptionDBResponse, SubscriptionWithPlanDBResponse, UpgradeDBRequest, UpgradeDBResponse},
    users::{UserCreateDBRequest, UserDBResponse},
};
use crate::types::{PlanId, ProjectId, SubscriptionId, UserId};

pub mod in_memory;
pub mod postgres;


pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Constraint names shared by both store implementations
pub mod constraints {
    pub const USERS_EMAIL_UNIQUE: &str = "users_email_unique";
    pub const PROJECTS_USER_SLUG_UNIQUE: &str = "projects_user_slug_unique";
    pub const INVOICES_NUMBER_UNIQUE: &str = "invoices_invoice_number_unique";
    pub const SUBSCRIPTIONS_ONE_ACTIVE: &str = "subscriptions_one_active_per_user";
}

/// Transactional relational store.
///
/// Single-entity operations are independent. [`Store::apply_upgrade`] is the only
/// multi-row mutation and is atomic: either every row it describes is written or
/// none is.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new account.
    ///
    /// # Errors
    /// - `UniqueViolation` on [`constraints::USERS_EMAIL_UNIQUE`] if the email is taken
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse>;

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>>;

    /// The plan catalog ordered by ascending price
    async fn list_plans(&self) -> Result<Vec<PlanDBResponse>>;

    async fn get_plan_by_id(&self, id: PlanId) -> Result<Option<PlanDBResponse>>;

    async fn get_plan_by_code(&self, code: &str) -> Result<Option<PlanDBResponse>>;

    async fn count_projects(&self, user_id: UserId) -> Result<i64>;

    async fn project_slug_exists(&self, user_id: UserId, slug: &str) -> Result<bool>;

    /// Insert a project.
    ///
    /// # Errors
    /// - `UniqueViolation` on [`constraints::PROJECTS_USER_SLUG_UNIQUE`] if the owner already
    ///   has a project with this slug
    /// - `ForeignKeyViolation` if the owner does not exist
    async fn create_project(&self, request: &ProjectCreateDBRequest) -> Result<ProjectDBResponse>;

    /// Projects owned by `user_id`, most recently created first
    async fn list_projects(&self, user_id: UserId) -> Result<Vec<ProjectDBResponse>>;

    /// A project, only if it is owned by `user_id`
    async fn get_project(&self, id: ProjectId, user_id: UserId) -> Result<Option<ProjectDBResponse>>;

    /// Delete a project owned by `user_id`. Returns false when nothing matched.
    async fn delete_project(&self, id: ProjectId, user_id: UserId) -> Result<bool>;

    /// The newest active subscription of a user joined with its plan
    async fn get_active_subscription(&self, user_id: UserId) -> Result<Option<SubscriptionWithPlanDBResponse>>;

    /// A subscription, only if it is owned by `user_id`
    async fn get_subscription(&self, id: SubscriptionId, user_id: UserId) -> Result<Option<SubscriptionDBResponse>>;

    /// Flip a subscription to cancelled. The owner's plan and quota are left untouched.
    ///
    /// # Errors
    /// - `NotFound` if the subscription does not exist
    async fn cancel_subscription(&self, id: SubscriptionId) -> Result<SubscriptionDBResponse>;

    /// Invoices of a subscription, newest first
    async fn list_invoices(&self, subscription_id: SubscriptionId) -> Result<Vec<InvoiceDBResponse>>;

    /// Atomically retire the user's active subscription, insert the new active
    /// subscription, allocate an invoice number, insert the paid invoice and switch
    /// the user to the target plan and quota.
    ///
    /// # Errors
    /// Any failure leaves the store exactly as it was before the call.
    async fn apply_upgrade(&self, request: &UpgradeDBRequest) -> Result<UpgradeDBResponse>;
}
