//! Database models for subscriptions and the upgrade write.

use crate::db::models::{invoices::InvoiceDBResponse, plans::PlanDBResponse, users::UserDBResponse};
use crate::types::{PlanId, SubscriptionId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Pending,
}

/// Database response for a subscription
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDBResponse {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    /// Transaction reference returned by the payment provider
    pub payment_reference: Option<String>,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A subscription together with the plan it points at
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionWithPlanDBResponse {
    pub subscription: SubscriptionDBResponse,
    pub plan: PlanDBResponse,
}

/// Everything the upgrade writes in one transaction.
///
/// Any previously active subscription of the user is retired, a new active
/// subscription and its paid invoice are inserted, and the user's plan and
/// quota are switched to the target plan.
#[derive(Debug, Clone)]
pub struct UpgradeDBRequest {
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub plan_code: String,
    pub projects_quota: i32,
    pub amount: Decimal,
    pub payment_reference: Option<String>,
    /// UTC calendar day the invoice number is allocated for
    pub invoice_day: NaiveDate,
}

/// Rows produced by a committed upgrade
#[derive(Debug, Clone)]
pub struct UpgradeDBResponse {
    pub subscription: SubscriptionDBResponse,
    pub invoice: InvoiceDBResponse,
    pub user: UserDBResponse,
}
