use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{DataResponse, plans::PlanResponse},
    errors::Result,
};

#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "plans",
    summary = "List plans",
    description = "The plan catalog, cheapest first, wrapped in `{data}`.",
    responses(
        (status = 200, description = "Plan catalog", body = Vec<PlanResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<DataResponse<Vec<PlanResponse>>>> {
    let plans = state.catalog.all().await?;

    Ok(Json(DataResponse::new(plans.into_iter().map(PlanResponse::from).collect())))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use serde_json::Value;

    #[tokio::test]
    async fn test_list_plans_is_public() {
        let server = create_test_app();

        let response = server.get("/api/plans").await;

        response.assert_status_ok();
        let body: Value = response.json();
        let plans = body["data"].as_array().unwrap();
        assert_eq!(plans.len(), 2);

        assert_eq!(plans[0]["code"], "free");
        assert_eq!(plans[0]["projects_quota"], 3);
        assert_eq!(plans[0]["price"].as_f64(), Some(0.0));

        assert_eq!(plans[1]["code"], "pro");
        assert_eq!(plans[1]["projects_quota"], 10);
        assert_eq!(plans[1]["price"].as_f64(), Some(29.99));
        assert_eq!(plans[1]["name_es"], "Profesional");
    }
}
