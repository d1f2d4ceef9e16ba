//! Database models for invoices.

use crate::types::{InvoiceId, SubscriptionId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Failed,
}

/// Database request for creating a new invoice
#[derive(Debug, Clone)]
pub struct InvoiceCreateDBRequest {
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub invoice_number: String,
    pub amount: Decimal,
    pub status: InvoiceStatus,
}

/// Database response for an invoice
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDBResponse {
    pub id: InvoiceId,
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub invoice_number: String,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

/// Human readable invoice number: `INV-YYYYMMDD-NNNN`.
///
/// `sequence` is the per-day counter value; it is zero-padded to four digits and
/// widens past 9999 rather than wrapping.
pub fn format_invoice_number(day: NaiveDate, sequence: u32) -> String {
    format!("INV-{}-{:04}", day.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_invoice_number() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_invoice_number(day, 1), "INV-20240307-0001");
        assert_eq!(format_invoice_number(day, 42), "INV-20240307-0042");
        assert_eq!(format_invoice_number(day, 9999), "INV-20240307-9999");
        assert_eq!(format_invoice_number(day, 10000), "INV-20240307-10000");
    }

    #[test]
    fn test_invoice_number_shape() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let number = format_invoice_number(day, 7);
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }
}
