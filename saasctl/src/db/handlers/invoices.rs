//! Database repository for invoices.

use crate::db::{
    errors::Result,
    models::invoices::{InvoiceCreateDBRequest, InvoiceDBResponse, InvoiceStatus},
};
use crate::types::{InvoiceId, SubscriptionId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct Invoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub invoice_number: String,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceDBResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            user_id: invoice.user_id,
            subscription_id: invoice.subscription_id,
            invoice_number: invoice.invoice_number,
            amount: invoice.amount,
            status: invoice.status,
            created_at: invoice.created_at,
        }
    }
}

pub struct Invoices<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Invoices<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Allocate the next invoice sequence value for a calendar day (starts at 1).
    ///
    /// The upsert takes a row lock on the day, so concurrent upgrades serialize here
    /// until their transactions finish.
    #[instrument(skip(self), err)]
    pub async fn next_sequence(&mut self, day: NaiveDate) -> Result<u32> {
        let value = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO invoice_sequences (day, last_value)
            VALUES ($1, 1)
            ON CONFLICT (day) DO UPDATE SET last_value = invoice_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(day)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(u32::try_from(value).map_err(anyhow::Error::from)?)
    }

    #[instrument(skip(self, request), fields(invoice_number = %request.invoice_number), err)]
    pub async fn create(&mut self, request: &InvoiceCreateDBRequest) -> Result<InvoiceDBResponse> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (user_id, subscription_id, invoice_number, amount, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.subscription_id)
        .bind(&request.invoice_number)
        .bind(request.amount)
        .bind(request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(invoice.into())
    }

    /// Invoices billed for a subscription, newest first
    #[instrument(skip(self), err)]
    pub async fn list_for_subscription(&mut self, subscription_id: SubscriptionId) -> Result<Vec<InvoiceDBResponse>> {
        let invoices = sqlx::query_as::<_, Invoice>(
            "SELECT * FROM invoices WHERE subscription_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(subscription_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(invoices.into_iter().map(Into::into).collect())
    }
}
