//! Read-only plan catalog.

use std::sync::Arc;
use tracing::instrument;

use crate::{
    db::{errors::Result, models::plans::PlanDBResponse, store::Store},
    types::PlanId,
};

/// Lookup of subscription plans. Absence is reported as `None`; callers decide whether it is an error.
#[derive(Clone)]
pub struct PlanCatalog {
    store: Arc<dyn Store>,
}

impl PlanCatalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Every plan, cheapest first
    #[instrument(skip(self), err)]
    pub async fn all(&self) -> Result<Vec<PlanDBResponse>> {
        self.store.list_plans().await
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_id(&self, id: PlanId) -> Result<Option<PlanDBResponse>> {
        self.store.get_plan_by_id(id).await
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_code(&self, code: &str) -> Result<Option<PlanDBResponse>> {
        self.store.get_plan_by_code(code).await
    }
}
