//! In-memory implementation of [`Store`].
//!
//! All tables live behind one lock, so every operation (including the upgrade
//! write) is atomic with respect to every other. Data is lost on restart. The plan
//! catalog is seeded with the same rows as the database migrations.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use super::{Store, constraints};
use crate::db::{
    errors::{DbError, Result},
    models::{
        invoices::{InvoiceDBResponse, InvoiceStatus, format_invoice_number},
        plans::{FREE_PLAN_CODE, PRO_PLAN_CODE, PlanDBResponse},
        projects::{ProjectCreateDBRequest, ProjectDBResponse},
        subscriptions::{
            SubscriptionDBResponse, SubscriptionStatus, SubscriptionWithPlanDBResponse, UpgradeDBRequest, UpgradeDBResponse,
        },
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use crate::types::{PlanId, ProjectId, SubscriptionId, UserId};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, UserDBResponse>,
    plans: BTreeMap<PlanId, PlanDBResponse>,
    projects: BTreeMap<ProjectId, ProjectDBResponse>,
    subscriptions: BTreeMap<SubscriptionId, SubscriptionDBResponse>,
    invoices: BTreeMap<i64, InvoiceDBResponse>,
    invoice_sequences: HashMap<NaiveDate, u32>,
    last_id: i64,
}

impl Tables {
    // One sequence shared by all tables keeps ids unique and increasing
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn seed_plans(&mut self) {
        let now = Utc::now();
        for (code, name_en, name_es, projects_quota, price) in [
            (FREE_PLAN_CODE, "Free", "Gratis", 3, Decimal::ZERO),
            (PRO_PLAN_CODE, "Pro", "Profesional", 10, Decimal::new(2999, 2)),
        ] {
            let id = self.next_id();
            self.plans.insert(
                id,
                PlanDBResponse {
                    id,
                    code: code.to_string(),
                    name_en: name_en.to_string(),
                    name_es: name_es.to_string(),
                    projects_quota,
                    price,
                    created_at: now,
                },
            );
        }
    }
}

fn unique_violation(table: &str, constraint: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: format!("duplicate key value violates unique constraint \"{constraint}\""),
    }
}

fn foreign_key_violation(table: &str, constraint: &str) -> DbError {
    DbError::ForeignKeyViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: format!("insert or update on table \"{table}\" violates foreign key constraint \"{constraint}\""),
    }
}

/// In-memory store seeded with the default plan catalog
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let mut tables = Tables::default();
        tables.seed_plans();
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.email == request.email) {
            return Err(unique_violation("users", constraints::USERS_EMAIL_UNIQUE));
        }

        let now = Utc::now();
        let id = tables.next_id();
        let user = UserDBResponse {
            id,
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            locale: request.locale,
            plan: request.plan.clone(),
            projects_quota: request.projects_quota,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        Ok(self.tables.read().users.values().find(|u| u.email == email).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<PlanDBResponse>> {
        let mut plans: Vec<_> = self.tables.read().plans.values().cloned().collect();
        plans.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
        Ok(plans)
    }

    async fn get_plan_by_id(&self, id: PlanId) -> Result<Option<PlanDBResponse>> {
        Ok(self.tables.read().plans.get(&id).cloned())
    }

    async fn get_plan_by_code(&self, code: &str) -> Result<Option<PlanDBResponse>> {
        Ok(self.tables.read().plans.values().find(|p| p.code == code).cloned())
    }

    async fn count_projects(&self, user_id: UserId) -> Result<i64> {
        let count = self.tables.read().projects.values().filter(|p| p.user_id == user_id).count();
        Ok(count as i64)
    }

    async fn project_slug_exists(&self, user_id: UserId, slug: &str) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .projects
            .values()
            .any(|p| p.user_id == user_id && p.slug == slug))
    }

    async fn create_project(&self, request: &ProjectCreateDBRequest) -> Result<ProjectDBResponse> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&request.user_id) {
            return Err(foreign_key_violation("projects", "projects_user_id_fkey"));
        }
        if tables
            .projects
            .values()
            .any(|p| p.user_id == request.user_id && p.slug == request.slug)
        {
            return Err(unique_violation("projects", constraints::PROJECTS_USER_SLUG_UNIQUE));
        }

        let now = Utc::now();
        let id = tables.next_id();
        let project = ProjectDBResponse {
            id,
            user_id: request.user_id,
            name: request.name.clone(),
            slug: request.slug.clone(),
            description: request.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn list_projects(&self, user_id: UserId) -> Result<Vec<ProjectDBResponse>> {
        let mut projects: Vec<_> = self
            .tables
            .read()
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn get_project(&self, id: ProjectId, user_id: UserId) -> Result<Option<ProjectDBResponse>> {
        Ok(self.tables.read().projects.get(&id).filter(|p| p.user_id == user_id).cloned())
    }

    async fn delete_project(&self, id: ProjectId, user_id: UserId) -> Result<bool> {
        let mut tables = self.tables.write();
        match tables.projects.get(&id) {
            Some(p) if p.user_id == user_id => {
                tables.projects.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_active_subscription(&self, user_id: UserId) -> Result<Option<SubscriptionWithPlanDBResponse>> {
        let tables = self.tables.read();
        let newest = tables
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let Some(subscription) = newest else {
            return Ok(None);
        };
        let plan = tables.plans.get(&subscription.plan_id).cloned().ok_or_else(|| {
            DbError::Other(anyhow::anyhow!(
                "subscription {} references missing plan {}",
                subscription.id,
                subscription.plan_id
            ))
        })?;

        Ok(Some(SubscriptionWithPlanDBResponse {
            subscription: subscription.clone(),
            plan,
        }))
    }

    async fn get_subscription(&self, id: SubscriptionId, user_id: UserId) -> Result<Option<SubscriptionDBResponse>> {
        Ok(self
            .tables
            .read()
            .subscriptions
            .get(&id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn cancel_subscription(&self, id: SubscriptionId) -> Result<SubscriptionDBResponse> {
        let mut tables = self.tables.write();
        let subscription = tables.subscriptions.get_mut(&id).ok_or(DbError::NotFound)?;
        subscription.status = SubscriptionStatus::Cancelled;
        subscription.updated_at = Utc::now();
        Ok(subscription.clone())
    }

    async fn list_invoices(&self, subscription_id: SubscriptionId) -> Result<Vec<InvoiceDBResponse>> {
        let mut invoices: Vec<_> = self
            .tables
            .read()
            .invoices
            .values()
            .filter(|i| i.subscription_id == subscription_id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(invoices)
    }

    async fn apply_upgrade(&self, request: &UpgradeDBRequest) -> Result<UpgradeDBResponse> {
        let mut tables = self.tables.write();

        // Validate everything up front: nothing below may fail once writing starts
        if !tables.users.contains_key(&request.user_id) {
            return Err(foreign_key_violation("subscriptions", "subscriptions_user_id_fkey"));
        }
        if !tables.plans.contains_key(&request.plan_id) {
            return Err(foreign_key_violation("subscriptions", "subscriptions_plan_id_fkey"));
        }
        let sequence = tables.invoice_sequences.get(&request.invoice_day).copied().unwrap_or(0) + 1;
        let invoice_number = format_invoice_number(request.invoice_day, sequence);
        if tables.invoices.values().any(|i| i.invoice_number == invoice_number) {
            return Err(unique_violation("invoices", constraints::INVOICES_NUMBER_UNIQUE));
        }

        let now = Utc::now();
        for s in tables.subscriptions.values_mut() {
            if s.user_id == request.user_id && s.status == SubscriptionStatus::Active {
                s.status = SubscriptionStatus::Cancelled;
                s.updated_at = now;
            }
        }

        let subscription_id = tables.next_id();
        let subscription = SubscriptionDBResponse {
            id: subscription_id,
            user_id: request.user_id,
            plan_id: request.plan_id,
            status: SubscriptionStatus::Active,
            payment_reference: request.payment_reference.clone(),
            started_at: now,
            expires_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.subscriptions.insert(subscription_id, subscription.clone());

        tables.invoice_sequences.insert(request.invoice_day, sequence);
        let invoice_id = tables.next_id();
        let invoice = InvoiceDBResponse {
            id: invoice_id,
            user_id: request.user_id,
            subscription_id,
            invoice_number,
            amount: request.amount,
            status: InvoiceStatus::Paid,
            created_at: now,
        };
        tables.invoices.insert(invoice_id, invoice.clone());

        let user = tables.users.get_mut(&request.user_id).ok_or(DbError::NotFound)?;
        user.plan = request.plan_code.clone();
        user.projects_quota = request.projects_quota;
        user.updated_at = now;
        let user = user.clone();

        Ok(UpgradeDBResponse { subscription, invoice, user })
    }
}
