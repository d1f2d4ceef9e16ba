//! End-to-end journeys through the full router.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::test_utils::{MockPaymentProvider, create_test_app, create_test_app_with_payment, signup_token};

async fn plan_id(server: &axum_test::TestServer, code: &str) -> i64 {
    let plans: Value = server.get("/api/plans").await.json();
    plans["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|plan| plan["code"] == code)
        .and_then(|plan| plan["id"].as_i64())
        .unwrap()
}

/// Signup, browse plans, fill the free quota, and hit the gate on the fourth project
#[test_log::test(tokio::test)]
async fn test_free_user_hits_project_quota() {
    let server = create_test_app();

    let signup = server
        .post("/api/auth/signup")
        .json(&json!({"email": "a@x.com", "password": "Passw0rd"}))
        .await;
    signup.assert_status(StatusCode::CREATED);
    let body: Value = signup.json();
    assert_eq!(body["data"]["email"], "a@x.com");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let plans: Value = server.get("/api/plans").await.json();
    let codes: Vec<&str> = plans["data"].as_array().unwrap().iter().map(|p| p["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["free", "pro"]);

    for name in ["Alpha", "Beta", "Gamma"] {
        server
            .post("/api/projects")
            .authorization_bearer(&token)
            .json(&json!({"name": name}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let fourth = server
        .post("/api/projects")
        .authorization_bearer(&token)
        .json(&json!({"name": "Delta"}))
        .await;
    fourth.assert_status(StatusCode::FORBIDDEN);
    let error: Value = fourth.json();
    assert_eq!(error["error"]["key"], "errors.quota_exceeded");
    assert_eq!(error["error"]["message"], "You have reached your project quota of 3");

    let listed: Value = server.get("/api/projects").authorization_bearer(&token).await.json();
    assert_eq!(listed["data"].as_array().unwrap().len(), 3);
}

/// Upgrading to pro raises the quota, records a paid invoice and unblocks project creation
#[test_log::test(tokio::test)]
async fn test_upgrade_unblocks_project_creation() {
    let server = create_test_app();
    let token = signup_token(&server, "a@x.com").await;
    let pro = plan_id(&server, "pro").await;

    for name in ["One", "Two", "Three"] {
        server
            .post("/api/projects")
            .authorization_bearer(&token)
            .json(&json!({"name": name}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let upgrade = server
        .post("/api/subscriptions")
        .authorization_bearer(&token)
        .json(&json!({"planId": pro}))
        .await;
    upgrade.assert_status(StatusCode::CREATED);
    let upgraded: Value = upgrade.json();
    assert_eq!(upgraded["data"]["user"]["plan"], "pro");
    assert_eq!(upgraded["data"]["user"]["projects_quota"], 10);
    assert_eq!(upgraded["data"]["subscription"]["status"], "active");
    let subscription_id = upgraded["data"]["subscription"]["id"].as_i64().unwrap();

    server
        .post("/api/projects")
        .authorization_bearer(&token)
        .json(&json!({"name": "Four"}))
        .await
        .assert_status(StatusCode::CREATED);

    let current: Value = server.get("/api/subscriptions/current").authorization_bearer(&token).await.json();
    assert_eq!(current["data"]["id"], subscription_id);
    assert_eq!(current["data"]["plan"]["code"], "pro");

    let invoices: Value = server
        .get(&format!("/api/subscriptions/{subscription_id}/invoices"))
        .authorization_bearer(&token)
        .await
        .json();
    let invoices = invoices["data"].as_array().unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0]["status"], "paid");
    assert_eq!(invoices[0]["amount"], 29.99);
    assert!(invoices[0]["invoice_number"].as_str().unwrap().starts_with("INV-"));
}

/// A declined charge leaves the user on the free plan and the quota unchanged
#[test_log::test(tokio::test)]
async fn test_declined_upgrade_keeps_free_quota() {
    let server = create_test_app_with_payment(MockPaymentProvider::declining());
    let token = signup_token(&server, "a@x.com").await;
    let pro = plan_id(&server, "pro").await;

    server
        .post("/api/subscriptions/create")
        .authorization_bearer(&token)
        .json(&json!({"planId": pro}))
        .await
        .assert_status(StatusCode::PAYMENT_REQUIRED);

    for name in ["One", "Two", "Three"] {
        server
            .post("/api/projects")
            .authorization_bearer(&token)
            .json(&json!({"name": name}))
            .await
            .assert_status(StatusCode::CREATED);
    }
    server
        .post("/api/projects")
        .authorization_bearer(&token)
        .json(&json!({"name": "Four"}))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

/// Tenants never see each other's projects
#[test_log::test(tokio::test)]
async fn test_projects_are_isolated_between_users() {
    let server = create_test_app();
    let alice = signup_token(&server, "alice@x.com").await;
    let bob = signup_token(&server, "bob@x.com").await;

    let created: Value = server
        .post("/api/projects")
        .authorization_bearer(&alice)
        .json(&json!({"name": "Secret"}))
        .await
        .json();
    let id = created["data"]["id"].as_i64().unwrap();

    server
        .get(&format!("/api/projects/{id}"))
        .authorization_bearer(&bob)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/api/projects/{id}"))
        .authorization_bearer(&bob)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let listed: Value = server.get("/api/projects").authorization_bearer(&bob).await.json();
    assert!(listed["data"].as_array().unwrap().is_empty());

    server
        .get(&format!("/api/projects/{id}"))
        .authorization_bearer(&alice)
        .await
        .assert_status_ok();
}

/// A token from signin works the same as the one from signup
#[test_log::test(tokio::test)]
async fn test_signin_token_reaches_protected_routes() {
    let server = create_test_app();
    signup_token(&server, "a@x.com").await;

    let signin: Value = server
        .post("/api/auth/signin")
        .json(&json!({"email": "a@x.com", "password": "Passw0rd"}))
        .await
        .json();
    let token = signin["data"]["token"].as_str().unwrap();

    server.get("/api/projects").authorization_bearer(token).await.assert_status_ok();
    server.get("/api/projects").await.assert_status(StatusCode::UNAUTHORIZED);
}
