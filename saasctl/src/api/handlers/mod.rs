//! HTTP request handlers for all API endpoints.
//!
//! Handlers validate the request, call the owning service on [`crate::AppState`] and wrap
//! the result in the `{"data": ...}` envelope. Protected handlers take
//! [`crate::auth::current_user::CurrentUser`], which rejects with 401 before the handler runs.
//!
//! - [`auth`]: signup and signin
//! - [`health`]: liveness check
//! - [`plans`]: plan catalog
//! - [`projects`]: project create, list, get and delete
//! - [`subscriptions`]: upgrade, current subscription, cancel and invoices

pub mod auth;
pub mod health;
pub mod plans;
pub mod projects;
pub mod subscriptions;
