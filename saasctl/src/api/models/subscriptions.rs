//! API request/response models for subscriptions and invoices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::models::{plans::PlanResponse, users::UserResponse},
    db::models::{
        invoices::{InvoiceDBResponse, InvoiceStatus},
        subscriptions::{SubscriptionDBResponse, SubscriptionStatus, SubscriptionWithPlanDBResponse, UpgradeDBResponse},
    },
    errors::{Error, ErrorKey},
    types::{InvoiceId, PlanId, SubscriptionId, UserId},
};

/// Request body for upgrading to a plan
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreate {
    /// Id of the target plan; must be a positive integer
    #[schema(value_type = i64, example = 2)]
    pub plan_id: Option<serde_json::Value>,
}

impl SubscriptionCreate {
    pub fn validate(self) -> Result<PlanId, Error> {
        self.plan_id
            .as_ref()
            .and_then(serde_json::Value::as_i64)
            .filter(|id| *id > 0)
            .ok_or(Error::Validation {
                key: ErrorKey::InvalidPlanId,
            })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    /// Payment provider's reference for this subscription
    pub payment_reference: Option<String>,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionDBResponse> for SubscriptionResponse {
    fn from(db: SubscriptionDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            plan_id: db.plan_id,
            status: db.status,
            payment_reference: db.payment_reference,
            started_at: db.started_at,
            expires_at: db.expires_at,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// The active subscription together with its plan
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentSubscriptionResponse {
    #[serde(flatten)]
    pub subscription: SubscriptionResponse,
    pub plan: PlanResponse,
}

impl From<SubscriptionWithPlanDBResponse> for CurrentSubscriptionResponse {
    fn from(db: SubscriptionWithPlanDBResponse) -> Self {
        Self {
            subscription: db.subscription.into(),
            plan: db.plan.into(),
        }
    }
}

/// Result of a successful upgrade
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpgradeResponse {
    pub subscription: SubscriptionResponse,
    /// The account with its new plan and quota
    pub user: UserResponse,
}

impl From<UpgradeDBResponse> for UpgradeResponse {
    fn from(db: UpgradeDBResponse) -> Self {
        Self {
            subscription: db.subscription.into(),
            user: db.user.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: InvoiceId,
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    #[schema(example = "INV-20240115-0001")]
    pub invoice_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 29.99)]
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

impl From<InvoiceDBResponse> for InvoiceResponse {
    fn from(db: InvoiceDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            subscription_id: db.subscription_id,
            invoice_number: db.invoice_number,
            amount: db.amount,
            status: db.status,
            created_at: db.created_at,
        }
    }
}
