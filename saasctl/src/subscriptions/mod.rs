//! Plan upgrades, cancellation and billing history.
//!
//! An upgrade runs in three phases:
//!
//! 1. Load the user and the target plan concurrently and apply the plan policy
//!    (no pro to free downgrade, no re-subscribing to the current plan)
//! 2. Charge through the [`PaymentProvider`]; a decline or transport error aborts
//!    before anything is written
//! 3. Hand the write to [`Store::apply_upgrade`], which retires the previous active
//!    subscription and writes the new subscription, its paid invoice and the user's
//!    new plan and quota atomically
//!
//! The charge happens outside the store transaction. If the write fails after a
//! successful charge the user stays on their old plan; reconciling that charge is
//! left to the billing backend.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{
    db::{
        errors::DbError,
        models::{
            invoices::InvoiceDBResponse,
            plans::{FREE_PLAN_CODE, PRO_PLAN_CODE},
            subscriptions::{SubscriptionDBResponse, SubscriptionWithPlanDBResponse, UpgradeDBRequest, UpgradeDBResponse},
        },
        store::Store,
    },
    payment_providers::PaymentProvider,
    types::{PlanId, SubscriptionId, UserId},
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("User not found")]
    UserNotFound,

    #[error("Plan not found")]
    PlanNotFound,

    #[error("Cannot downgrade from Pro to Free")]
    CannotDowngrade,

    #[error("Already subscribed to this plan")]
    AlreadyOnPlan,

    #[error("Payment failed")]
    PaymentFailed { reason: Option<String> },

    /// Missing, or owned by someone else
    #[error("Subscription not found")]
    SubscriptionNotFound,

    #[error(transparent)]
    Database(#[from] DbError),
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn Store>,
    payment: Arc<dyn PaymentProvider>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn Store>, payment: Arc<dyn PaymentProvider>) -> Self {
        Self { store, payment }
    }

    #[instrument(skip(self), err)]
    pub async fn upgrade(&self, user_id: UserId, plan_id: PlanId) -> Result<UpgradeDBResponse, SubscriptionError> {
        let (user, plan) = tokio::join!(self.store.get_user_by_id(user_id), self.store.get_plan_by_id(plan_id));
        let user = user?.ok_or(SubscriptionError::UserNotFound)?;
        let plan = plan?.ok_or(SubscriptionError::PlanNotFound)?;

        if user.plan == PRO_PLAN_CODE && plan.code == FREE_PLAN_CODE {
            return Err(SubscriptionError::CannotDowngrade);
        }
        if user.plan == plan.code {
            return Err(SubscriptionError::AlreadyOnPlan);
        }

        let payment = match self.payment.create_subscription(user.id, plan.id, plan.price).await {
            Ok(result) if result.success => result,
            Ok(result) => {
                info!(reason = ?result.error, "Payment declined, upgrade aborted");
                return Err(SubscriptionError::PaymentFailed { reason: result.error });
            }
            Err(e) => {
                warn!("Payment provider error, upgrade aborted: {e}");
                return Err(SubscriptionError::PaymentFailed {
                    reason: Some(e.to_string()),
                });
            }
        };

        let request = UpgradeDBRequest {
            user_id: user.id,
            plan_id: plan.id,
            plan_code: plan.code.clone(),
            projects_quota: plan.projects_quota,
            amount: plan.price,
            payment_reference: payment.transaction_id,
            invoice_day: Utc::now().date_naive(),
        };

        let upgraded = self.store.apply_upgrade(&request).await.map_err(|e| {
            // The charge went through but nothing was written
            warn!(payment_reference = ?request.payment_reference, "Upgrade write failed after successful payment");
            SubscriptionError::Database(e)
        })?;

        info!(
            subscription_id = upgraded.subscription.id,
            invoice_number = %upgraded.invoice.invoice_number,
            plan = %plan.code,
            "User upgraded"
        );
        Ok(upgraded)
    }

    /// The user's active subscription with its plan, if any
    #[instrument(skip(self), err)]
    pub async fn current(&self, user_id: UserId) -> Result<Option<SubscriptionWithPlanDBResponse>, SubscriptionError> {
        Ok(self.store.get_active_subscription(user_id).await?)
    }

    /// Mark an owned subscription cancelled and stop billing for it.
    ///
    /// The owner keeps their current plan and quota.
    #[instrument(skip(self), err)]
    pub async fn cancel(&self, subscription_id: SubscriptionId, owner_id: UserId) -> Result<SubscriptionDBResponse, SubscriptionError> {
        self.store
            .get_subscription(subscription_id, owner_id)
            .await?
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        let cancelled = self.store.cancel_subscription(subscription_id).await.map_err(|e| match e {
            DbError::NotFound => SubscriptionError::SubscriptionNotFound,
            e => SubscriptionError::Database(e),
        })?;

        if let Some(reference) = cancelled.payment_reference.as_deref() {
            if let Err(e) = self.payment.cancel_subscription(reference).await {
                warn!(payment_reference = reference, "Failed to cancel subscription with payment provider: {e}");
            }
        }

        info!("Subscription cancelled");
        Ok(cancelled)
    }

    /// Invoices of an owned subscription, newest first
    #[instrument(skip(self), err)]
    pub async fn invoices(&self, subscription_id: SubscriptionId, owner_id: UserId) -> Result<Vec<InvoiceDBResponse>, SubscriptionError> {
        self.store
            .get_subscription(subscription_id, owner_id)
            .await?
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        Ok(self.store.list_invoices(subscription_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{
            models::{invoices::InvoiceStatus, subscriptions::SubscriptionStatus, users::UserCreateDBRequest},
            store::InMemoryStore,
        },
        test_utils::MockPaymentProvider,
        types::Locale,
    };
    use rust_decimal::Decimal;

    struct Fixture {
        service: SubscriptionService,
        store: Arc<InMemoryStore>,
        payment: Arc<MockPaymentProvider>,
        user_id: UserId,
        free_id: PlanId,
        pro_id: PlanId,
    }

    async fn fixture(payment: MockPaymentProvider) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let payment = Arc::new(payment);
        let user = store
            .create_user(&UserCreateDBRequest {
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
                locale: Locale::En,
                plan: "free".to_string(),
                projects_quota: 3,
            })
            .await
            .unwrap();
        let free_id = store.get_plan_by_code("free").await.unwrap().unwrap().id;
        let pro_id = store.get_plan_by_code("pro").await.unwrap().unwrap().id;

        Fixture {
            service: SubscriptionService::new(store.clone(), payment.clone()),
            store,
            payment,
            user_id: user.id,
            free_id,
            pro_id,
        }
    }

    #[tokio::test]
    async fn test_upgrade_free_to_pro() {
        let f = fixture(MockPaymentProvider::new()).await;

        let upgraded = f.service.upgrade(f.user_id, f.pro_id).await.unwrap();

        assert_eq!(upgraded.user.plan, "pro");
        assert_eq!(upgraded.user.projects_quota, 10);
        assert_eq!(upgraded.subscription.status, SubscriptionStatus::Active);
        assert_eq!(upgraded.subscription.plan_id, f.pro_id);
        assert_eq!(upgraded.invoice.subscription_id, upgraded.subscription.id);
        assert_eq!(upgraded.invoice.status, InvoiceStatus::Paid);
        assert_eq!(upgraded.invoice.amount, Decimal::new(2999, 2));
        assert_eq!(upgraded.subscription.payment_reference, Some("mock_txn_1".to_string()));

        let charges = f.payment.charges();
        assert_eq!(charges, vec![(f.user_id, f.pro_id, Decimal::new(2999, 2))]);

        let invoices = f.service.invoices(upgraded.subscription.id, f.user_id).await.unwrap();
        assert_eq!(invoices.len(), 1);

        let current = f.service.current(f.user_id).await.unwrap().unwrap();
        assert_eq!(current.subscription.id, upgraded.subscription.id);
        assert_eq!(current.plan.code, "pro");
    }

    #[tokio::test]
    async fn test_upgrade_to_current_plan_writes_nothing() {
        let f = fixture(MockPaymentProvider::new()).await;

        let err = f.service.upgrade(f.user_id, f.free_id).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::AlreadyOnPlan));
        assert!(f.payment.charges().is_empty());
        assert!(f.service.current(f.user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pro_cannot_downgrade() {
        let f = fixture(MockPaymentProvider::new()).await;
        f.service.upgrade(f.user_id, f.pro_id).await.unwrap();

        let err = f.service.upgrade(f.user_id, f.free_id).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::CannotDowngrade));

        let err = f.service.upgrade(f.user_id, f.pro_id).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::AlreadyOnPlan));
    }

    #[tokio::test]
    async fn test_unknown_user_checked_before_unknown_plan() {
        let f = fixture(MockPaymentProvider::new()).await;

        assert!(matches!(
            f.service.upgrade(9999, 9999).await.unwrap_err(),
            SubscriptionError::UserNotFound
        ));
        assert!(matches!(
            f.service.upgrade(f.user_id, 9999).await.unwrap_err(),
            SubscriptionError::PlanNotFound
        ));
    }

    #[tokio::test]
    async fn test_declined_payment_writes_nothing() {
        let f = fixture(MockPaymentProvider::declining()).await;

        let err = f.service.upgrade(f.user_id, f.pro_id).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::PaymentFailed { .. }));

        let user = f.store.get_user_by_id(f.user_id).await.unwrap().unwrap();
        assert_eq!(user.plan, "free");
        assert_eq!(user.projects_quota, 3);
        assert!(f.service.current(f.user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_provider_error_is_payment_failure() {
        let f = fixture(MockPaymentProvider::unreachable()).await;

        let err = f.service.upgrade(f.user_id, f.pro_id).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::PaymentFailed { reason: Some(_) }));
        assert!(f.service.current(f.user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_keeps_plan_and_notifies_provider() {
        let f = fixture(MockPaymentProvider::new()).await;
        let upgraded = f.service.upgrade(f.user_id, f.pro_id).await.unwrap();

        let cancelled = f.service.cancel(upgraded.subscription.id, f.user_id).await.unwrap();
        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert_eq!(f.payment.cancellations(), vec!["mock_txn_1".to_string()]);

        let user = f.store.get_user_by_id(f.user_id).await.unwrap().unwrap();
        assert_eq!(user.plan, "pro");
        assert_eq!(user.projects_quota, 10);
        assert!(f.service.current(f.user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_users_subscription_is_not_found() {
        let f = fixture(MockPaymentProvider::new()).await;
        let upgraded = f.service.upgrade(f.user_id, f.pro_id).await.unwrap();
        let other = f
            .store
            .create_user(&UserCreateDBRequest {
                email: "b@x.com".to_string(),
                password_hash: "hash".to_string(),
                locale: Locale::En,
                plan: "free".to_string(),
                projects_quota: 3,
            })
            .await
            .unwrap();

        assert!(matches!(
            f.service.cancel(upgraded.subscription.id, other.id).await.unwrap_err(),
            SubscriptionError::SubscriptionNotFound
        ));
        assert!(matches!(
            f.service.invoices(upgraded.subscription.id, other.id).await.unwrap_err(),
            SubscriptionError::SubscriptionNotFound
        ));
        assert!(f.payment.cancellations().is_empty());
    }
}
