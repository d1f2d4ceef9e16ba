//! Authentication.
//!
//! - [`password`]: Argon2id credential hashing
//! - [`token`]: signed, expiring bearer tokens
//! - [`service`]: signup and signin, composing the two above with the store
//! - [`current_user`]: extractor that authenticates a request from its bearer token
//!
//! Protected handlers take [`current_user::CurrentUser`] as an argument:
//!
//! ```ignore
//! async fn list_projects(State(state): State<AppState>, current_user: CurrentUser) -> Result<...> {
//!     state.projects.list(current_user.id).await
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod service;
pub mod token;

pub use service::{AuthError, AuthOutcome, AuthService};
