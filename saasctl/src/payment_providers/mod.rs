//! Payment provider abstraction layer
//!
//! This module defines the `PaymentProvider` trait which abstracts the billing backend that
//! charges for plan upgrades. The subscription service calls it before any durable write,
//! so a failing provider aborts the upgrade cleanly.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    config::PaymentConfig,
    types::{PlanId, UserId},
};

pub mod dummy;

/// Create a payment provider from configuration
///
/// This is the single point where we convert config into provider instances.
/// Adding a new provider requires adding a match arm here.
pub fn create_provider(config: PaymentConfig) -> Box<dyn PaymentProvider> {
    match config {
        PaymentConfig::Dummy(dummy_config) => Box::new(dummy::DummyProvider::from(dummy_config)),
    }
}

/// Result type for payment provider operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Transport-level failures talking to a payment provider
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider API error: {0}")]
    ProviderApi(String),

    #[error("Unknown payment reference: {0}")]
    UnknownReference(String),
}

/// Outcome of a charge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResult {
    pub success: bool,
    /// Provider-side reference, stored on the subscription
    pub transaction_id: Option<String>,
    /// Provider's reason when `success` is false
    pub error: Option<String>,
}

impl PaymentResult {
    pub fn succeeded(transaction_id: impl Into<String>) -> Self {
        Self {
            success: true,
            transaction_id: Some(transaction_id.into()),
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_id: None,
            error: Some(reason.into()),
        }
    }
}

/// Abstract payment provider interface
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Charge `amount` for a subscription of `user_id` to `plan_id`.
    ///
    /// A declined charge is `Ok` with `success == false`; `Err` is reserved for
    /// failures to reach the provider. Callers treat both as a failed payment.
    async fn create_subscription(&self, user_id: UserId, plan_id: PlanId, amount: Decimal) -> Result<PaymentResult>;

    /// Stop billing for a previously created subscription
    async fn cancel_subscription(&self, transaction_ref: &str) -> Result<()>;
}
