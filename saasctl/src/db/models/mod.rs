//! Database record models matching table schemas.
//!
//! Repositories accept `*CreateDBRequest` values and return `*DBResponse` values;
//! the row structs that sqlx decodes into stay private to each repository.
//!
//! - [`users`]: accounts with their current plan and project quota
//! - [`plans`]: read-only plan catalog
//! - [`projects`]: per-user projects with a slug unique to their owner
//! - [`subscriptions`]: plan subscriptions and the atomic upgrade write
//! - [`invoices`]: append-only billing records

pub mod invoices;
pub mod plans;
pub mod projects;
pub mod subscriptions;
pub mod users;
