//! Database layer for data persistence and access.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Services   │  (auth, projects, subscriptions - hold an Arc<dyn Store>)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │    Store    │  (db::store - PostgresStore or InMemoryStore)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - one per table, over &mut PgConnection)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`store`]: the [`store::Store`] capability and its implementations
//! - [`handlers`]: per-table repositories used by the PostgreSQL store
//! - [`models`]: database record structures
//! - [`errors`]: database-specific error types
//!
//! # Migrations
//!
//! Schema and the seeded plan catalog live in `migrations/` and are applied at
//! startup through [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
pub mod store;
