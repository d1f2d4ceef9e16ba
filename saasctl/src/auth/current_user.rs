use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::trace;

use crate::{
    AppState,
    errors::{Error, ErrorKey},
    types::UserId,
};

/// Authenticated caller, recovered from an `Authorization: Bearer <token>` header.
///
/// The identity comes from the token alone; handlers that need the stored account
/// load it through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
}

/// Pull the token out of an authorization header value
fn bearer_token(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or(Error::Unauthenticated {
                key: ErrorKey::MissingToken,
            })?;

        let identity = state.auth.tokens().verify(token)?;
        trace!(user_id = identity.user_id, "Bearer token verified");

        Ok(CurrentUser {
            id: identity.user_id,
            email: identity.email,
        })
    }
}
