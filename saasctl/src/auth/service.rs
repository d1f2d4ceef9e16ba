//! Signup and signin orchestration.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    auth::{
        password::CredentialHasher,
        token::{TokenError, TokenService},
    },
    db::{
        errors::DbError,
        models::{plans::FREE_PLAN_CODE, users::UserCreateDBRequest},
        store::{Store, constraints},
    },
    types::{Locale, UserId},
};

/// Project quota granted to every new account
pub const DEFAULT_PROJECTS_QUOTA: i32 = 3;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("An account with this email address already exists")]
    EmailAlreadyExists,

    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result of a successful signup or signin
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub token: String,
    pub user_id: UserId,
    pub email: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: CredentialHasher,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, hasher: CredentialHasher, tokens: TokenService) -> Self {
        Self { store, hasher, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account on the free plan and issue its first token.
    ///
    /// Input is expected to be validated already (address shape, password complexity).
    #[instrument(skip(self, password), err)]
    pub async fn signup(&self, email: &str, password: &str, locale: Locale) -> Result<AuthOutcome, AuthError> {
        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("spawn password hashing task: {e}"))??;

        let request = UserCreateDBRequest {
            email: email.to_string(),
            password_hash,
            locale,
            plan: FREE_PLAN_CODE.to_string(),
            projects_quota: DEFAULT_PROJECTS_QUOTA,
        };

        // Concurrent signups with the same email race past the lookup; the unique constraint decides.
        let user = self.store.create_user(&request).await.map_err(|e| {
            if e.is_unique_violation_of(constraints::USERS_EMAIL_UNIQUE) {
                AuthError::EmailAlreadyExists
            } else {
                AuthError::Database(e)
            }
        })?;

        info!(user_id = user.id, "User signed up");

        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(AuthOutcome {
            token,
            user_id: user.id,
            email: user.email,
        })
    }

    #[instrument(skip(self, password), err)]
    pub async fn signin(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hasher = self.hasher;
        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| anyhow::anyhow!("spawn password verification task: {e}"))?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(AuthOutcome {
            token,
            user_id: user.id,
            email: user.email,
        })
    }
}
