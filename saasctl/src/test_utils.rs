//! Test utilities shared by unit and integration tests.

use async_trait::async_trait;
use axum_test::TestServer;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};

use crate::{
    AppState,
    config::{AuthConfig, Config, DummyConfig, PasswordConfig, PaymentConfig},
    db::store::InMemoryStore,
    payment_providers::{PaymentError, PaymentProvider, PaymentResult, Result},
    types::{PlanId, UserId},
};

/// Password used by [`signup_token`]
pub const TEST_PASSWORD: &str = "Passw0rd";

/// Config for an in-memory app with cheap hashing and an instant dummy provider.
pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        auth: AuthConfig {
            password: PasswordConfig {
                argon2_memory_kib: 128,
                argon2_iterations: 1,
                argon2_parallelism: 1,
            },
            ..Default::default()
        },
        payment: PaymentConfig::Dummy(DummyConfig {
            delay: Duration::ZERO,
            fail: false,
        }),
        ..Default::default()
    }
}

pub fn create_test_state() -> AppState {
    create_test_state_with_payment(MockPaymentProvider::new())
}

pub fn create_test_state_with_payment(payment: MockPaymentProvider) -> AppState {
    AppState::new(create_test_config(), Arc::new(InMemoryStore::new()), Arc::new(payment)).expect("Failed to create test state")
}

pub fn create_test_app() -> TestServer {
    create_test_app_with_payment(MockPaymentProvider::new())
}

pub fn create_test_app_with_payment(payment: MockPaymentProvider) -> TestServer {
    let router = crate::build_router(create_test_state_with_payment(payment)).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Sign up `email` with [`TEST_PASSWORD`] and return the bearer token.
pub async fn signup_token(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/auth/signup")
        .json(&json!({"email": email, "password": TEST_PASSWORD}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()["data"]["token"]
        .as_str()
        .expect("signup response has a token")
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockMode {
    Approve,
    Decline,
    Unreachable,
}

#[derive(Debug, Default)]
struct MockLedger {
    charges: Vec<(UserId, PlanId, Decimal)>,
    cancellations: Vec<String>,
}

/// Payment provider that records every call.
///
/// Approved charges get sequential references `mock_txn_1`, `mock_txn_2`, ...
#[derive(Debug)]
pub struct MockPaymentProvider {
    mode: MockMode,
    ledger: Mutex<MockLedger>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::with_mode(MockMode::Approve)
    }

    /// Reaches the provider, which refuses the charge
    pub fn declining() -> Self {
        Self::with_mode(MockMode::Decline)
    }

    /// Provider cannot be reached at all
    pub fn unreachable() -> Self {
        Self::with_mode(MockMode::Unreachable)
    }

    fn with_mode(mode: MockMode) -> Self {
        Self {
            mode,
            ledger: Mutex::new(MockLedger::default()),
        }
    }

    /// Every charge attempted, approved or not
    pub fn charges(&self) -> Vec<(UserId, PlanId, Decimal)> {
        self.ledger.lock().charges.clone()
    }

    pub fn cancellations(&self) -> Vec<String> {
        self.ledger.lock().cancellations.clone()
    }
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_subscription(&self, user_id: UserId, plan_id: PlanId, amount: Decimal) -> Result<PaymentResult> {
        let mut ledger = self.ledger.lock();
        ledger.charges.push((user_id, plan_id, amount));

        match self.mode {
            MockMode::Approve => Ok(PaymentResult::succeeded(format!("mock_txn_{}", ledger.charges.len()))),
            MockMode::Decline => Ok(PaymentResult::failed("card declined")),
            MockMode::Unreachable => Err(PaymentError::ProviderApi("connection refused".to_string())),
        }
    }

    async fn cancel_subscription(&self, transaction_id: &str) -> Result<()> {
        self.ledger.lock().cancellations.push(transaction_id.to_string());
        Ok(())
    }
}
