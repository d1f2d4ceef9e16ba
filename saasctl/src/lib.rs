//! # saasctl: multi-tenant SaaS backend
//!
//! `saasctl` serves the account, project and billing API of a small multi-tenant SaaS product.
//! Users sign up with an email and password, receive a bearer token, and create projects up to
//! the quota of their plan. Paying for a more expensive plan raises the quota; every upgrade
//! produces a subscription record and a paid invoice.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer.
//! Persistence goes through the [`db::store::Store`] capability, which is backed either by
//! PostgreSQL (production) or by an in-process store (development and tests).
//!
//! ### Request Flow
//!
//! Every request passes through the CORS and tracing layers before reaching a handler in
//! [`api::handlers`]. Protected handlers take a [`auth::current_user::CurrentUser`], which
//! verifies the `Authorization: Bearer` token and rejects with 401 before the handler body runs.
//! Handlers validate their input, call one of the services held by [`AppState`], and wrap the
//! result in a `{"data": ...}` envelope. Failures are rendered by [`errors::Error`] as
//! `{"error": {"key": ..., "message": ...}}` with the matching status code.
//!
//! ### Core Components
//!
//! - **Authentication** ([`auth`]): argon2 credential hashing, JWT issue and verify, signup and signin
//! - **Plans** ([`plans`]): read-only plan catalog
//! - **Projects** ([`projects`]): quota-gated project CRUD scoped to the owner
//! - **Subscriptions** ([`subscriptions`]): the charge-then-commit upgrade flow, cancel and invoices
//! - **Payments** ([`payment_providers`]): the billing collaborator charged before any write
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use saasctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = saasctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     saasctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! With `database.type: postgres` the application runs migrations on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! saasctl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod payment_providers;
pub mod plans;
pub mod projects;
pub mod subscriptions;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use axum::{
    Json, Router,
    http::{self, HeaderName, HeaderValue},
    routing::{get, post},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    auth::{AuthService, password::CredentialHasher, token::TokenService},
    config::{CorsOrigin, DatabaseConfig, PoolSettings},
    db::store::{InMemoryStore, PostgresStore, Store},
    openapi::ApiDoc,
    payment_providers::{PaymentProvider, create_provider},
    plans::PlanCatalog,
    projects::ProjectService,
    subscriptions::SubscriptionService,
};

pub use config::Config;
pub use types::{InvoiceId, PlanId, ProjectId, SubscriptionId, UserId};

/// Application state shared across all request handlers.
///
/// Every service holds the same [`Store`]; the subscription service additionally holds the
/// payment provider. Cloning is cheap.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(config, Arc::new(InMemoryStore::new()), payment)?;
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub catalog: PlanCatalog,
    pub projects: ProjectService,
    pub subscriptions: SubscriptionService,
}

impl AppState {
    /// Wire every service over one store and one payment provider.
    ///
    /// Fails if the config has no `secret_key` to sign tokens with.
    pub fn new(config: Config, store: Arc<dyn Store>, payment: Arc<dyn PaymentProvider>) -> anyhow::Result<Self> {
        let hasher = CredentialHasher::new((&config.auth.password).into());
        let tokens = TokenService::from_config(&config)?;

        Ok(Self::builder()
            .auth(AuthService::new(store.clone(), hasher, tokens))
            .catalog(PlanCatalog::new(store.clone()))
            .projects(ProjectService::new(store.clone()))
            .subscriptions(SubscriptionService::new(store, payment))
            .config(config)
            .build())
    }
}

/// Get the saasctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    let optional = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(optional(settings.idle_timeout_secs))
        .max_lifetime(optional(settings.max_lifetime_secs))
}

/// Open the configured store, connecting and migrating when PostgreSQL is selected.
async fn setup_store(config: &Config) -> anyhow::Result<(Arc<dyn Store>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Postgres { url, pool } => {
            info!("Using external database");
            let pool = pool_options(pool).connect(url).await?;
            migrator().run(&pool).await?;
            Ok((Arc::new(PostgresStore::new(pool.clone())), Some(pool)))
        }
        DatabaseConfig::Memory => {
            info!("Using in-memory store: data will be lost on shutdown");
            Ok((Arc::new(InMemoryStore::new()), None))
        }
    }
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Url serializes with a trailing slash; browsers send the bare origin
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut exposed = Vec::new();
    for header in &cors_config.exposed_headers {
        exposed.push(header.parse::<HeaderName>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(exposed);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

async fn route_not_found() -> errors::Error {
    errors::Error::NotFound
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router with every endpoint and middleware.
///
/// `/api/subscriptions/create` and `/api/subscriptions/current` are aliases kept for older
/// clients; they route to the same handlers as `POST` and `GET /api/subscriptions`.
///
/// # Errors
///
/// Returns an error if the CORS configuration contains an unparseable origin or header.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers::{auth, health, plans, projects, subscriptions};

    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/health", get(health::health))
        // Authentication
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        // Plan catalog
        .route("/api/plans", get(plans::list_plans))
        // Projects
        .route("/api/projects", get(projects::list_projects).post(projects::create_project))
        .route("/api/projects/{id}", get(projects::get_project).delete(projects::delete_project))
        // Subscriptions
        .route(
            "/api/subscriptions",
            get(subscriptions::get_current_subscription).post(subscriptions::create_subscription),
        )
        .route("/api/subscriptions/create", post(subscriptions::create_subscription))
        .route("/api/subscriptions/current", get(subscriptions::get_current_subscription))
        .route("/api/subscriptions/{id}/cancel", post(subscriptions::cancel_subscription))
        .route("/api/subscriptions/{id}/invoices", get(subscriptions::list_invoices))
        .route("/api/openapi.json", get(openapi_json))
        .fallback(route_not_found)
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns the router and its resources.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens the store (running migrations for PostgreSQL),
///    creates the payment provider and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests drain and the pool closes
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting saasctl with configuration: {:#?}", config);

        let (store, pool) = setup_store(&config).await?;
        let payment: Arc<dyn PaymentProvider> = Arc::from(create_provider(config.payment.clone()));

        let state = AppState::new(config.clone(), store, payment)?;
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("saasctl listening on http://{}, available at http://localhost:{}", bind_addr, self.config.port);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;
    use axum::http::StatusCode;
    use serde_json::Value;

    #[tokio::test]
    async fn test_application_serves_health_with_memory_store() {
        let server = Application::new(create_test_config()).await.unwrap().into_test_server();

        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }

    #[tokio::test]
    async fn test_application_requires_secret_key() {
        let mut config = create_test_config();
        config.secret_key = None;

        assert!(Application::new(config).await.is_err());
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let server = Application::new(create_test_config()).await.unwrap().into_test_server();

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();
        let doc: Value = response.json();
        assert!(doc["paths"]["/api/projects"].is_object());
        assert!(doc["components"]["securitySchemes"]["BearerAuth"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let server = Application::new(create_test_config()).await.unwrap().into_test_server();

        let response = server.get("/api/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"]["key"], "errors.not_found");
    }

    #[test]
    fn test_wildcard_cors_builds() {
        let mut config = create_test_config();
        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        config.auth.security.cors.allow_credentials = false;

        assert!(create_cors_layer(&config).is_ok());
    }
}
