//! Database models for the plan catalog.

use crate::types::PlanId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Code of the plan every new account starts on
pub const FREE_PLAN_CODE: &str = "free";
/// Code of the paid plan
pub const PRO_PLAN_CODE: &str = "pro";

/// Database response for a plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDBResponse {
    pub id: PlanId,
    pub code: String,
    pub name_en: String,
    pub name_es: String,
    pub projects_quota: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}
