//! End-to-end tests over the axum router: wire shapes, status codes, and the
//! redirect contract of the link-verification endpoint.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use gatehouse_server::state::AppState;

use common::{setup_db, test_config, MockMailer};

async fn test_app() -> (Router, Arc<MockMailer>) {
    let db = setup_db().await;
    let mailer = MockMailer::new();
    let state = AppState::with_parts(db, test_config(), mailer.clone());
    (gatehouse_server::app(state), mailer)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_with_bearer(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn register_verify_login_profile_round_trip() {
    let (app, mailer) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/auth/register",
        json!({
            "email": "alice@example.com",
            "password": "Passw0rd!",
            "fullName": "Alice A",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let token = mailer.last().token();
    let (status, body) = post_json(
        &app,
        "/api/auth/verify",
        json!({ "email": "alice@example.com", "code": token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "alice@example.com", "password": "Passw0rd!" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], json!("Bearer"));
    let access = body["accessToken"].as_str().unwrap().to_string();
    let refresh = body["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = get_with_bearer(&app, "/api/profile", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["email"], json!("alice@example.com"));
    assert_eq!(body["profile"]["fullName"], json!("Alice A"));
    assert!(body["profile"]["verifiedAt"].is_string());

    let (status, body) = post_json(&app, "/api/auth/refresh", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["accessToken"].is_string());
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() {
    let (app, mailer) = test_app().await;

    post_json(
        &app,
        "/api/auth/register",
        json!({
            "email": "alice@example.com",
            "password": "Passw0rd!",
            "fullName": "Alice A",
        }),
    )
    .await;
    let token = mailer.last().token();
    post_json(
        &app,
        "/api/auth/verify",
        json!({ "email": "alice@example.com", "code": token }),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "alice@example.com", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    let (status, _) = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "nobody@example.com", "password": "Passw0rd!" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verification_link_redirects_with_outcome_flag() {
    let (app, mailer) = test_app().await;

    post_json(
        &app,
        "/api/auth/register",
        json!({
            "email": "alice@example.com",
            "password": "Passw0rd!",
            "fullName": "Alice A",
        }),
    )
    .await;
    let token = mailer.last().token();

    let request = Request::get(format!("/api/auth/verify?token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_redirection());
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(
        location,
        "https://app.example.com/sign-in?verified=true"
    );

    // Replaying the consumed link lands on the error flag.
    let request = Request::get(format!("/api/auth/verify?token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_redirection());
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(
        location,
        "https://app.example.com/sign-in?error=not_found"
    );
}

#[tokio::test]
async fn workflow_rejections_answer_success_false() {
    let (app, _mailer) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/auth/verify",
        json!({ "email": "nobody@example.com", "code": "abc123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("No pending verification found"));

    let (status, body) = post_json(
        &app,
        "/api/auth/register",
        json!({ "email": "bad", "password": "Passw0rd!", "fullName": "Alice A" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn profile_update_applies_typed_fields_and_rejects_unknown_ones() {
    let (app, mailer) = test_app().await;

    post_json(
        &app,
        "/api/auth/register",
        json!({
            "email": "alice@example.com",
            "password": "Passw0rd!",
            "fullName": "Alice A",
        }),
    )
    .await;
    let token = mailer.last().token();
    post_json(
        &app,
        "/api/auth/verify",
        json!({ "email": "alice@example.com", "code": token }),
    )
    .await;
    let (_, body) = post_json(
        &app,
        "/api/auth/login",
        json!({ "email": "alice@example.com", "password": "Passw0rd!" }),
    )
    .await;
    let access = body["accessToken"].as_str().unwrap().to_string();

    let request = Request::put("/api/profile")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::from(
            json!({
                "fullName": "Alice Anderson",
                "dob": "1995-04-02",
                "gender": "female",
                "bio": "Hello there",
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["profile"]["fullName"], json!("Alice Anderson"));
    assert_eq!(body["profile"]["gender"], json!("female"));
    assert_eq!(body["profile"]["bio"], json!("Hello there"));

    // Loose payloads with stray fields are rejected, not silently accepted.
    let request = Request::put("/api/profile")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::from(
            json!({ "fullName": "Alice", "role": "admin" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Invalid enum values fail validation.
    let request = Request::put("/api/profile")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::from(json!({ "gender": "robot" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_requires_a_valid_bearer_token() {
    let (app, _mailer) = test_app().await;

    let request = Request::get("/api/profile").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = get_with_bearer(&app, "/api/profile", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoints_answer() {
    let (app, _mailer) = test_app().await;

    let request = Request::get("/health").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["service"], json!("gatehouse"));

    let request = Request::get("/health/db").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
