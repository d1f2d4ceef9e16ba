use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::{
        extract::ApiJson,
        models::{
            DataResponse,
            auth::{AuthResponse, SigninRequest, SignupRequest},
        },
    },
    errors::Result,
};

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    summary = "Create an account",
    description = "Creates an account on the free plan and returns a bearer token, wrapped in `{data}`.",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email, password or locale"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    let request = request.validate()?;

    let outcome = state.auth.signup(&request.email, &request.password, request.locale).await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(outcome.into()))))
}

#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "auth",
    summary = "Sign in",
    description = "Exchanges credentials for a bearer token, wrapped in `{data}`.",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid email or missing password"),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SigninRequest>,
) -> Result<Json<DataResponse<AuthResponse>>> {
    let request = request.validate()?;

    let outcome = state.auth.signin(&request.email, &request.password).await?;

    Ok(Json(DataResponse::new(outcome.into())))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_signup_returns_token() {
        let server = create_test_app();

        let response = server
            .post("/api/auth/signup")
            .json(&json!({"email": "a@x.com", "password": "Passw0rd"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["email"], "a@x.com");
        assert!(body["data"]["userId"].as_i64().is_some());
        assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let server = create_test_app();
        let body = json!({"email": "a@x.com", "password": "Passw0rd"});

        server.post("/api/auth/signup").json(&body).await.assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/auth/signup")
            .json(&json!({"email": "a@x.com", "password": "Other1234"}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["error"]["key"], "errors.email_already_exists");
    }

    #[tokio::test]
    async fn test_signup_validation_keys() {
        let server = create_test_app();

        let cases = [
            (json!({"email": "nope", "password": "Passw0rd"}), "errors.invalid_email"),
            (json!({"email": "a@x.com", "password": "Pa0"}), "errors.password_too_short"),
            (json!({"email": "a@x.com", "password": "passw0rd"}), "errors.password_uppercase"),
            (json!({"email": "a@x.com", "password": "Passw0rd", "locale": "de"}), "errors.invalid_locale"),
            (json!({"email": 42}), "errors.validation_error"),
        ];

        for (body, key) in cases {
            let response = server.post("/api/auth/signup").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let error: Value = response.json();
            assert_eq!(error["error"]["key"], key, "body {body}");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let server = create_test_app();

        let response = server
            .post("/api/auth/signup")
            .text("{not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["key"], "errors.validation_error");
    }

    #[tokio::test]
    async fn test_signin_errors_are_identical() {
        let server = create_test_app();
        server
            .post("/api/auth/signup")
            .json(&json!({"email": "a@x.com", "password": "Passw0rd"}))
            .await
            .assert_status(StatusCode::CREATED);

        let unknown = server
            .post("/api/auth/signin")
            .json(&json!({"email": "b@x.com", "password": "Passw0rd"}))
            .await;
        let wrong = server
            .post("/api/auth/signin")
            .json(&json!({"email": "a@x.com", "password": "Wrong1234"}))
            .await;

        unknown.assert_status(StatusCode::UNAUTHORIZED);
        wrong.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.json::<Value>(), wrong.json::<Value>());
        assert_eq!(wrong.json::<Value>()["error"]["key"], "errors.invalid_credentials");
    }

    #[tokio::test]
    async fn test_signin_success() {
        let server = create_test_app();
        let signup: Value = server
            .post("/api/auth/signup")
            .json(&json!({"email": "a@x.com", "password": "Passw0rd"}))
            .await
            .json();

        let response = server
            .post("/api/auth/signin")
            .json(&json!({"email": "a@x.com", "password": "Passw0rd"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["userId"], signup["data"]["userId"]);
    }
}
