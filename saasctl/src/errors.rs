use crate::auth::{AuthError, token::TokenError};
use crate::db::errors::DbError;
use crate::projects::ProjectError;
use crate::subscriptions::SubscriptionError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;
use utoipa::ToSchema;

/// Stable machine-readable error identifiers, looked up client-side for localized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKey {
    // Request validation
    ValidationError,
    InvalidEmail,
    PasswordTooShort,
    PasswordUppercase,
    PasswordLowercase,
    PasswordDigit,
    PasswordRequired,
    InvalidLocale,
    ProjectNameRequired,
    ProjectNameTooLong,
    ProjectDescriptionTooLong,
    InvalidPlanId,
    InvalidId,
    // Authentication
    MissingToken,
    InvalidToken,
    EmailAlreadyExists,
    InvalidCredentials,
    // Business rules
    QuotaExceeded,
    SlugAlreadyExists,
    ProjectNotFound,
    UserNotFound,
    PlanNotFound,
    CannotDowngrade,
    AlreadyOnPlan,
    PaymentFailed,
    SubscriptionNotFound,
    NotFound,
    InternalError,
}

impl ErrorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKey::ValidationError => "errors.validation_error",
            ErrorKey::InvalidEmail => "errors.invalid_email",
            ErrorKey::PasswordTooShort => "errors.password_too_short",
            ErrorKey::PasswordUppercase => "errors.password_uppercase",
            ErrorKey::PasswordLowercase => "errors.password_lowercase",
            ErrorKey::PasswordDigit => "errors.password_digit",
            ErrorKey::PasswordRequired => "errors.password_required",
            ErrorKey::InvalidLocale => "errors.invalid_locale",
            ErrorKey::ProjectNameRequired => "errors.project_name_required",
            ErrorKey::ProjectNameTooLong => "errors.project_name_too_long",
            ErrorKey::ProjectDescriptionTooLong => "errors.project_description_too_long",
            ErrorKey::InvalidPlanId => "errors.invalid_plan_id",
            ErrorKey::InvalidId => "errors.invalid_id",
            ErrorKey::MissingToken => "errors.missing_token",
            ErrorKey::InvalidToken => "errors.invalid_token",
            ErrorKey::EmailAlreadyExists => "errors.email_already_exists",
            ErrorKey::InvalidCredentials => "errors.invalid_credentials",
            ErrorKey::QuotaExceeded => "errors.quota_exceeded",
            ErrorKey::SlugAlreadyExists => "errors.slug_already_exists",
            ErrorKey::ProjectNotFound => "errors.project_not_found",
            ErrorKey::UserNotFound => "errors.user_not_found",
            ErrorKey::PlanNotFound => "errors.plan_not_found",
            ErrorKey::CannotDowngrade => "errors.cannot_downgrade",
            ErrorKey::AlreadyOnPlan => "errors.already_on_plan",
            ErrorKey::PaymentFailed => "errors.payment_failed",
            ErrorKey::SubscriptionNotFound => "errors.subscription_not_found",
            ErrorKey::NotFound => "errors.not_found",
            ErrorKey::InternalError => "errors.internal_error",
        }
    }

    /// Default English message sent alongside the key
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKey::ValidationError => "Invalid request body",
            ErrorKey::InvalidEmail => "Invalid email address",
            ErrorKey::PasswordTooShort => "Password must be at least 8 characters",
            ErrorKey::PasswordUppercase => "Password must contain an uppercase letter",
            ErrorKey::PasswordLowercase => "Password must contain a lowercase letter",
            ErrorKey::PasswordDigit => "Password must contain a digit",
            ErrorKey::PasswordRequired => "Password is required",
            ErrorKey::InvalidLocale => "Locale must be one of: en, es",
            ErrorKey::ProjectNameRequired => "Project name is required",
            ErrorKey::ProjectNameTooLong => "Project name must be at most 100 characters",
            ErrorKey::ProjectDescriptionTooLong => "Project description must be at most 500 characters",
            ErrorKey::InvalidPlanId => "Plan id must be a positive integer",
            ErrorKey::InvalidId => "Invalid id",
            ErrorKey::MissingToken => "Missing authorization token",
            ErrorKey::InvalidToken => "Invalid or expired token",
            ErrorKey::EmailAlreadyExists => "An account with this email address already exists",
            ErrorKey::InvalidCredentials => "Invalid email or password",
            ErrorKey::QuotaExceeded => "Project quota exceeded",
            ErrorKey::SlugAlreadyExists => "A project with this name already exists",
            ErrorKey::ProjectNotFound => "Project not found",
            ErrorKey::UserNotFound => "User not found",
            ErrorKey::PlanNotFound => "Plan not found",
            ErrorKey::CannotDowngrade => "Cannot downgrade from Pro to Free",
            ErrorKey::AlreadyOnPlan => "Already subscribed to this plan",
            ErrorKey::PaymentFailed => "Payment processing failed",
            ErrorKey::SubscriptionNotFound => "Subscription not found",
            ErrorKey::NotFound => "Resource not found",
            ErrorKey::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request failed boundary validation; carries the first failing field's key
    #[error("Validation failed: {key}")]
    Validation { key: ErrorKey },

    /// Bearer token missing or unusable
    #[error("Not authenticated: {key}")]
    Unauthenticated { key: ErrorKey },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// No route matched the request
    #[error("Route not found")]
    NotFound,

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<TokenError> for Error {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => Error::Unauthenticated {
                key: ErrorKey::InvalidToken,
            },
            TokenError::Internal { operation } => Error::Internal { operation },
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Auth(err) => match err {
                AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Token(TokenError::InvalidToken) => StatusCode::UNAUTHORIZED,
                AuthError::Token(TokenError::Internal { .. }) | AuthError::Database(_) | AuthError::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Error::Project(err) => match err {
                ProjectError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
                ProjectError::SlugAlreadyExists { .. } => StatusCode::CONFLICT,
                ProjectError::ProjectNotFound | ProjectError::UserNotFound => StatusCode::NOT_FOUND,
                ProjectError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Subscription(err) => match err {
                SubscriptionError::UserNotFound | SubscriptionError::SubscriptionNotFound => StatusCode::NOT_FOUND,
                SubscriptionError::PlanNotFound | SubscriptionError::CannotDowngrade => StatusCode::BAD_REQUEST,
                SubscriptionError::AlreadyOnPlan => StatusCode::CONFLICT,
                SubscriptionError::PaymentFailed { .. } => StatusCode::PAYMENT_REQUIRED,
                SubscriptionError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Database(_) | Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn key(&self) -> ErrorKey {
        match self {
            Error::Validation { key } | Error::Unauthenticated { key } => *key,
            Error::NotFound => ErrorKey::NotFound,
            Error::Auth(err) => match err {
                AuthError::EmailAlreadyExists => ErrorKey::EmailAlreadyExists,
                AuthError::InvalidCredentials => ErrorKey::InvalidCredentials,
                AuthError::Token(TokenError::InvalidToken) => ErrorKey::InvalidToken,
                AuthError::Token(TokenError::Internal { .. }) | AuthError::Database(_) | AuthError::Other(_) => ErrorKey::InternalError,
            },
            Error::Project(err) => match err {
                ProjectError::QuotaExceeded { .. } => ErrorKey::QuotaExceeded,
                ProjectError::SlugAlreadyExists { .. } => ErrorKey::SlugAlreadyExists,
                ProjectError::ProjectNotFound => ErrorKey::ProjectNotFound,
                ProjectError::UserNotFound => ErrorKey::UserNotFound,
                ProjectError::Database(_) => ErrorKey::InternalError,
            },
            Error::Subscription(err) => match err {
                SubscriptionError::UserNotFound => ErrorKey::UserNotFound,
                SubscriptionError::PlanNotFound => ErrorKey::PlanNotFound,
                SubscriptionError::CannotDowngrade => ErrorKey::CannotDowngrade,
                SubscriptionError::AlreadyOnPlan => ErrorKey::AlreadyOnPlan,
                SubscriptionError::PaymentFailed { .. } => ErrorKey::PaymentFailed,
                SubscriptionError::SubscriptionNotFound => ErrorKey::SubscriptionNotFound,
                SubscriptionError::Database(_) => ErrorKey::InternalError,
            },
            Error::Database(_) | Error::Internal { .. } | Error::Other(_) => ErrorKey::InternalError,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Project(ProjectError::QuotaExceeded { quota }) => {
                format!("You have reached your project quota of {quota}")
            }
            _ => self.key().default_message().to_string(),
        }
    }
}

/// Error envelope: `{"error": {"key": ..., "message": ...}}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable identifier such as `errors.quota_exceeded`
    pub key: String,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log full error details for debugging - different log levels based on severity
        if status.is_server_error() {
            tracing::error!("Internal service error: {:#}", self);
        } else {
            match &self {
                Error::Unauthenticated { .. } | Error::Auth(_) => tracing::info!("Authentication error: {}", self),
                _ => tracing::debug!("Client error: {}", self),
            }
        }

        let body = ErrorBody {
            error: ErrorDetail {
                key: self.key().as_str().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
