#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use cohort_api::auth::jwt::JwtConfig;
use cohort_api::auth::password::hash_password;
use cohort_api::config::{ServerConfig, SheetsBackendKind};
use cohort_api::router::build_app_router;
use cohort_api::secrets::AdminCredentials;
use cohort_api::state::AppState;
use cohort_core::schema::PARTICIPANT_HEADERS;
use cohort_events::{Notifier, RecordingMailer};
use cohort_sheets::{MemoryBackend, SheetClient};

pub const ADMIN_EMAIL: &str = "admin@cohort.test";
pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const PARTICIPANTS_SHEET: &str = "Participants_list";

/// The full app over an in-memory spreadsheet and a recording mailer.
pub struct TestApp {
    pub router: Router,
    pub backend: Arc<MemoryBackend>,
    pub mailer: Arc<RecordingMailer>,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        secrets_path: "secrets.toml".into(),
        sheets_backend: SheetsBackendKind::Memory,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// App over a spreadsheet holding only an empty participant sheet.
pub fn build_test_app() -> TestApp {
    build_test_app_with(MemoryBackend::new().with_sheet(PARTICIPANTS_SHEET, vec![PARTICIPANT_HEADERS.to_vec()]))
}

pub fn build_test_app_with(backend: MemoryBackend) -> TestApp {
    let backend = Arc::new(backend);
    let mailer = Arc::new(RecordingMailer::new());
    let state = AppState::new(
        test_config(),
        AdminCredentials {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
        SheetClient::memory(backend.clone()),
        Notifier::new(mailer.clone()),
    );
    let router = build_app_router(state).expect("test config is valid");
    TestApp {
        router,
        backend,
        mailer,
    }
}

/// Participant row with the given name, email and optional team/password.
pub fn participant_row(
    name: &str,
    email: &str,
    team: Option<&str>,
    password: Option<&str>,
) -> Vec<String> {
    PARTICIPANT_HEADERS
        .iter()
        .map(|h| match *h {
            "Name" => name.to_string(),
            "Email" => email.to_string(),
            "Status" => "Pending".to_string(),
            "Team" => team.unwrap_or_default().to_string(),
            "PasswordHash" => password
                .map(|p| hash_password(p).expect("hashing should succeed"))
                .unwrap_or_default(),
            _ => String::new(),
        })
        .collect()
}

/// Spreadsheet seeded with `participants` and the `Teams` sheet.
pub fn seeded_backend(participants: &[Vec<String>], teams: &[&str]) -> MemoryBackend {
    let mut participant_rows: Vec<Vec<&str>> = vec![PARTICIPANT_HEADERS.to_vec()];
    participant_rows.extend(
        participants
            .iter()
            .map(|row| row.iter().map(String::as_str).collect()),
    );
    let mut team_rows = vec![vec!["TeamName", "Description"]];
    team_rows.extend(teams.iter().map(|t| vec![*t, ""]));

    MemoryBackend::new()
        .with_sheet(PARTICIPANTS_SHEET, participant_rows)
        .with_sheet("Teams", team_rows)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn get(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, "GET", uri, None, token).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: Value, token: Option<&str>) -> Response<Body> {
    send(app, "POST", uri, Some(body), token).await
}

pub async fn put_json(app: &TestApp, uri: &str, body: Value, token: Option<&str>) -> Response<Body> {
    send(app, "PUT", uri, Some(body), token).await
}

pub async fn delete(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, "DELETE", uri, None, token).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Log in and return the access token; panics unless the login succeeds.
pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login of {email} failed");
    body_json(response).await["access_token"]
        .as_str()
        .expect("access_token is a string")
        .to_string()
}

pub async fn admin_token(app: &TestApp) -> String {
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Current value of `column` in the participant row for `email`.
pub fn participant_cell(app: &TestApp, email: &str, column: &str) -> Option<String> {
    let rows = app.backend.rows(PARTICIPANTS_SHEET)?;
    let headers = rows.first()?.clone();
    let email_col = headers.iter().position(|h| h == "Email")?;
    let col = headers.iter().position(|h| h == column)?;
    rows.iter()
        .skip(1)
        .find(|r| r.get(email_col).map(String::as_str) == Some(email))
        .map(|r| r.get(col).cloned().unwrap_or_default())
}
