//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures and boundary validation
//! - **[`extract`]**: JSON body and path extractors that reject with stable error keys
//!
//! # API Structure
//!
//! - **Authentication** (`/api/auth/*`): signup and signin, both public
//! - **Plans** (`/api/plans`): public plan catalog
//! - **Projects** (`/api/projects/*`): owner-scoped project CRUD, bearer token required
//! - **Subscriptions** (`/api/subscriptions/*`): upgrades, cancellation and invoices
//!
//! Successful responses are wrapped as `{"data": ...}`; failures as
//! `{"error": {"key": ..., "message": ...}}`. The OpenAPI document is served at
//! `/api/openapi.json` and rendered at `/docs`.

pub mod extract;
pub mod handlers;
pub mod models;
