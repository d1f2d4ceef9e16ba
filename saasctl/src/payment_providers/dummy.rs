//! Dummy payment provider implementation
//!
//! Simulates a provider round-trip by waiting for the configured delay, then approves
//! (or declines, when configured to fail) every charge. Useful for development.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use crate::{
    config::DummyConfig,
    payment_providers::{PaymentError, PaymentProvider, PaymentResult, Result},
    types::{PlanId, UserId},
};

const REFERENCE_PREFIX: &str = "dummy_txn_";

pub struct DummyProvider {
    delay: Duration,
    fail: bool,
    sequence: AtomicU64,
}

impl DummyProvider {
    pub fn new(delay: Duration, fail: bool) -> Self {
        Self {
            delay,
            fail,
            sequence: AtomicU64::new(0),
        }
    }
}

impl From<DummyConfig> for DummyProvider {
    fn from(config: DummyConfig) -> Self {
        Self::new(config.delay, config.fail)
    }
}

#[async_trait]
impl PaymentProvider for DummyProvider {
    async fn create_subscription(&self, user_id: UserId, plan_id: PlanId, amount: Decimal) -> Result<PaymentResult> {
        tokio::time::sleep(self.delay).await;

        if self.fail {
            tracing::info!(user_id, plan_id, %amount, "Dummy provider declined charge");
            return Ok(PaymentResult::failed("Declined by dummy provider"));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let transaction_id = format!("{REFERENCE_PREFIX}{}_{}_{}", user_id, Utc::now().timestamp_millis(), sequence);

        tracing::info!(user_id, plan_id, %amount, %transaction_id, "Dummy provider approved charge");
        Ok(PaymentResult::succeeded(transaction_id))
    }

    async fn cancel_subscription(&self, transaction_ref: &str) -> Result<()> {
        // References are persisted, so anything with our prefix may predate this process
        if !transaction_ref.starts_with(REFERENCE_PREFIX) {
            return Err(PaymentError::UnknownReference(transaction_ref.to_string()));
        }

        tracing::info!(transaction_ref, "Dummy provider cancelled subscription");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_approves_after_delay() {
        let provider = DummyProvider::new(Duration::from_millis(10), false);
        let started = std::time::Instant::now();

        let result = provider.create_subscription(1, 2, Decimal::new(2999, 2)).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(10));
        assert!(result.success);
        assert!(result.transaction_id.unwrap().starts_with("dummy_txn_1_"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_transaction_ids_are_distinct() {
        let provider = DummyProvider::new(Duration::ZERO, false);
        let first = provider.create_subscription(1, 2, Decimal::ZERO).await.unwrap();
        let second = provider.create_subscription(1, 2, Decimal::ZERO).await.unwrap();

        assert_ne!(first.transaction_id, second.transaction_id);
    }

    #[tokio::test]
    async fn test_configured_failure_declines() {
        let provider = DummyProvider::from(DummyConfig {
            delay: Duration::ZERO,
            fail: true,
        });

        let result = provider.create_subscription(1, 2, Decimal::ONE).await.unwrap();
        assert!(!result.success);
        assert!(result.transaction_id.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_cancel_is_accepted() {
        let provider = DummyProvider::new(Duration::ZERO, false);
        assert!(provider.cancel_subscription("dummy_txn_1_0_1").await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_rejects_foreign_reference() {
        let provider = DummyProvider::new(Duration::ZERO, false);

        let err = provider.cancel_subscription("sub_from_elsewhere").await.unwrap_err();
        assert!(matches!(err, PaymentError::UnknownReference(reference) if reference == "sub_from_elsewhere"));
    }
}
