//! Signed, expiring bearer tokens.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::{config::Config, types::UserId};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, tampered, wrongly signed or expired
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Failed to {operation}")]
    Internal { operation: String },
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,   // Subject (user ID)
    pub email: String, // User email
    pub iat: i64,      // Issued at
    pub exp: i64,      // Expiration time
}

/// Identity recovered from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: UserId,
    pub email: String,
}

/// Issues and verifies HS256 tokens with a fixed lifetime.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("expiry", &self.expiry).finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, expiry: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, TokenError> {
        let secret_key = config.secret_key.as_ref().ok_or_else(|| TokenError::Internal {
            operation: "configure tokens: secret_key is required".to_string(),
        })?;

        Ok(Self::new(secret_key, config.auth.security.jwt_expiry))
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn issue(&self, user_id: UserId, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let lifetime = chrono::Duration::from_std(self.expiry).map_err(|e| TokenError::Internal {
            operation: format!("compute token expiry: {e}"),
        })?;

        let claims = TokenClaims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| TokenError::Internal {
            operation: format!("create JWT: {e}"),
        })
    }

    pub fn verify(&self, token: &str) -> Result<TokenIdentity, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            // Client errors (401) - malformed tokens, invalid claims, expired tokens
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::ExpiredSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::InvalidAlgorithm => TokenError::InvalidToken,

            // Server errors (500) - key issues, internal failures
            ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::RsaFailedSigning
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat
            | ErrorKind::MissingAlgorithm
            | ErrorKind::Crypto(_) => TokenError::Internal {
                operation: format!("JWT verification: {e}"),
            },

            _ => TokenError::Internal {
                operation: format!("JWT verification (unknown error): {e}"),
            },
        })?;

        Ok(TokenIdentity {
            user_id: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }
}
