//! HTTP-level integration tests for login, logout and role enforcement.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, build_test_app_with, get, login, participant_row,
    post_json, seeded_backend, ADMIN_EMAIL, ADMIN_PASSWORD, PARTICIPANTS_SHEET,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// The admin credential is checked without touching the spreadsheet.
#[tokio::test]
async fn admin_login_never_reads_participants() {
    let app = build_test_app();

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["role"], "admin");
    assert!(json["access_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(app.backend.read_count(PARTICIPANTS_SHEET), 0);
    assert!(app.backend.operations().is_empty());
}

/// A participant row without a password hash cannot log in, whatever the
/// password.
#[tokio::test]
async fn participant_without_hash_cannot_log_in() {
    let app = build_test_app_with(seeded_backend(
        &[participant_row("Ada", "ada@x.com", None, None)],
        &[],
    ));

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "ada@x.com", "password": "" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "ada@x.com", "password": "anything" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(json["error"].as_str().unwrap().contains("No password"));
}

#[tokio::test]
async fn participant_with_hash_logs_in() {
    let app = build_test_app_with(seeded_backend(
        &[participant_row("Ada", "ada@x.com", Some("Team1"), Some("secret1"))],
        &["Team1"],
    ));

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": " ada@x.com ", "password": "secret1" }),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["role"], "participant");
    assert_eq!(json["user"]["email"], "ada@x.com");
    assert_eq!(json["user"]["name"], "Ada");
    assert_eq!(json["user"]["team"], "Team1");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_rejected() {
    let app = build_test_app_with(seeded_backend(
        &[participant_row("Ada", "ada@x.com", None, Some("secret1"))],
        &[],
    ));

    for (email, password) in [("ada@x.com", "wrong-one"), ("nobody@x.com", "secret1")] {
        let response = post_json(
            &app,
            "/api/v1/auth/login",
            json!({ "email": email, "password": password }),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{email}");
        assert_eq!(body_json(response).await["error"], "Invalid email or password");
    }
}

/// The admin email with a wrong password falls through to the participant
/// path and fails there.
#[tokio::test]
async fn admin_email_with_wrong_password_is_rejected() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": "guess" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Sessions and RBAC
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logout_ends_the_session() {
    let app = build_test_app();
    let token = admin_token(&app).await;

    let response = get(&app, "/api/v1/updates", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(&app, "/api/v1/auth/logout", json!({}), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, "/api/v1/updates", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_or_malformed_token_is_unauthorized() {
    let app = build_test_app();

    let response = get(&app, "/api/v1/admin/teams", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/api/v1/admin/teams", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_are_enforced() {
    let app = build_test_app_with(seeded_backend(
        &[participant_row("Ada", "ada@x.com", Some("Team1"), Some("secret1"))],
        &["Team1"],
    ));
    let admin = admin_token(&app).await;
    let ada = login(&app, "ada@x.com", "secret1").await;

    let response = get(&app, "/api/v1/admin/participants", Some(&ada)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app, "/api/v1/me/dashboard", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app, "/api/v1/admin/participants", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["email"], "ada@x.com");
    assert_eq!(json["data"][0]["has_password"], true);
    assert!(json["data"][0].get("password_hash").is_none());
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_backend() {
    let app = build_test_app();
    let response = get(&app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sheets_backend"], "memory");
    assert_eq!(json["sheets_healthy"], true);
}
