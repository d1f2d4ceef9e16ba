//! OpenAPI documentation for the HTTP API.
//!
//! The document is served as JSON at `/api/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{api, errors, types};

/// Security scheme for protected endpoints (Bearer token from signup/signin).
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token returned by `/api/auth/signup` or `/api/auth/signin`, sent as:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```\n\n\
                            Tokens expire after `auth.security.jwt_expiry`, 24 hours by default.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "saasctl",
        description = "Multi-tenant projects and subscriptions API. Successful responses are wrapped as \
                       `{\"data\": ...}`, failures as `{\"error\": {\"key\": ..., \"message\": ...}}`."
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::health::health,
        api::handlers::auth::signup,
        api::handlers::auth::signin,
        api::handlers::plans::list_plans,
        api::handlers::projects::create_project,
        api::handlers::projects::list_projects,
        api::handlers::projects::get_project,
        api::handlers::projects::delete_project,
        api::handlers::subscriptions::create_subscription,
        api::handlers::subscriptions::get_current_subscription,
        api::handlers::subscriptions::cancel_subscription,
        api::handlers::subscriptions::list_invoices,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::models::auth::SignupRequest,
            api::models::auth::SigninRequest,
            api::models::auth::AuthResponse,
            api::models::plans::PlanResponse,
            api::models::projects::ProjectCreate,
            api::models::projects::ProjectResponse,
            api::models::subscriptions::SubscriptionCreate,
            api::models::subscriptions::SubscriptionResponse,
            api::models::subscriptions::CurrentSubscriptionResponse,
            api::models::subscriptions::UpgradeResponse,
            api::models::subscriptions::InvoiceResponse,
            api::models::users::UserResponse,
            errors::ErrorBody,
            errors::ErrorDetail,
            types::Locale,
        )
    ),
    tags(
        (name = "auth", description = "Account signup and signin."),
        (name = "plans", description = "The public plan catalog."),
        (name = "projects", description = "Projects owned by the caller, limited by their plan's quota."),
        (name = "subscriptions", description = "Plan upgrades, cancellation and invoices."),
        (name = "health", description = "Liveness."),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();

        for path in [
            "/health",
            "/api/auth/signup",
            "/api/auth/signin",
            "/api/plans",
            "/api/projects",
            "/api/projects/{id}",
            "/api/subscriptions",
            "/api/subscriptions/{id}/cancel",
            "/api/subscriptions/{id}/invoices",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("BearerAuth"));

        let scheme = serde_json::to_value(&components.security_schemes["BearerAuth"]).unwrap();
        assert!(scheme["description"].as_str().unwrap().contains("jwt_expiry"));
    }
}
