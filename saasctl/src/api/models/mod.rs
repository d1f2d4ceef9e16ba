//! API request and response data models.
//!
//! Request fields are optional so that a missing field reaches the `validate` method,
//! which reports the stable key of the first failing field. `planId` is kept as raw
//! JSON so a mistyped id is reported as `errors.invalid_plan_id`; any other field of
//! the wrong JSON type is rejected during deserialization with `errors.validation_error`.
//!
//! Response models are distinct from database models: they omit internal columns
//! such as the password hash.

use serde::Serialize;

pub mod auth;
pub mod plans;
pub mod projects;
pub mod subscriptions;
pub mod users;

/// Success envelope: every successful response body is `{"data": ...}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
