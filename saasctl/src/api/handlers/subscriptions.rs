use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::{
        extract::{ApiJson, ApiPath},
        models::{
            DataResponse,
            subscriptions::{CurrentSubscriptionResponse, InvoiceResponse, SubscriptionCreate, SubscriptionResponse, UpgradeResponse},
        },
    },
    auth::current_user::CurrentUser,
    errors::Result,
    types::SubscriptionId,
};

#[utoipa::path(
    post,
    path = "/api/subscriptions",
    tag = "subscriptions",
    summary = "Upgrade to a plan",
    description = "Charges the plan price, then atomically records the subscription, a paid invoice and \
                   the caller's new plan and quota. Also served at `/api/subscriptions/create`.",
    request_body = SubscriptionCreate,
    responses(
        (status = 201, description = "Upgraded", body = UpgradeResponse),
        (status = 400, description = "Invalid plan id, unknown plan or downgrade attempt"),
        (status = 401, description = "Missing or invalid token"),
        (status = 402, description = "Payment failed"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Already on this plan"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_subscription(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(request): ApiJson<SubscriptionCreate>,
) -> Result<(StatusCode, Json<DataResponse<UpgradeResponse>>)> {
    let plan_id = request.validate()?;

    let upgraded = state.subscriptions.upgrade(current_user.id, plan_id).await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(upgraded.into()))))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions",
    tag = "subscriptions",
    summary = "Current subscription",
    description = "The caller's active subscription with its plan, or `null`. Also served at `/api/subscriptions/current`.",
    responses(
        (status = 200, description = "Active subscription or null", body = Option<CurrentSubscriptionResponse>),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn get_current_subscription(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<DataResponse<Option<CurrentSubscriptionResponse>>>> {
    let current = state.subscriptions.current(current_user.id).await?;

    Ok(Json(DataResponse::new(current.map(Into::into))))
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/{id}/cancel",
    tag = "subscriptions",
    summary = "Cancel a subscription",
    description = "Marks the subscription cancelled. The caller keeps their current plan and quota.",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Cancelled subscription", body = SubscriptionResponse),
        (status = 400, description = "Invalid subscription id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such subscription owned by the caller"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, subscription_id = id))]
pub async fn cancel_subscription(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiPath(id): ApiPath<SubscriptionId>,
) -> Result<Json<DataResponse<SubscriptionResponse>>> {
    let cancelled = state.subscriptions.cancel(id, current_user.id).await?;

    Ok(Json(DataResponse::new(cancelled.into())))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/{id}/invoices",
    tag = "subscriptions",
    summary = "List invoices",
    description = "Invoices of one of the caller's subscriptions, newest first.",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Invoices", body = Vec<InvoiceResponse>),
        (status = 400, description = "Invalid subscription id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such subscription owned by the caller"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, subscription_id = id))]
pub async fn list_invoices(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiPath(id): ApiPath<SubscriptionId>,
) -> Result<Json<DataResponse<Vec<InvoiceResponse>>>> {
    let invoices = state.subscriptions.invoices(id, current_user.id).await?;

    Ok(Json(DataResponse::new(invoices.into_iter().map(InvoiceResponse::from).collect())))
}
