//! Database repositories, one per table.
//!
//! Each repository borrows a `&mut PgConnection`, so the same code runs on a
//! pooled connection for reads or inside a transaction for multi-table writes:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let subscription = Subscriptions::new(&mut tx).create_active(user_id, plan_id, None).await?;
//! Users::new(&mut tx).set_plan(user_id, "pro", 10).await?;
//! tx.commit().await?;
//! ```

pub mod invoices;
pub mod plans;
pub mod projects;
pub mod subscriptions;
pub mod users;

pub use invoices::Invoices;
pub use plans::Plans;
pub use projects::Projects;
pub use subscriptions::Subscriptions;
pub use users::Users;
