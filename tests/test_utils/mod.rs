//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::{Router, body::Body};

use mailbridge::api::AppState;
use mailbridge::api::app;
use mailbridge::core::AppConfig;
use mailbridge::google::oauth::Credential;
use mailbridge::google::{GmailClient, Session};

/// Creates a test application router with every Google endpoint
/// pointed at `base_url`, usually a `mockito` server. The session is
/// returned as well so tests can sign in or inspect it.
pub fn test_app(base_url: &str) -> (Router, Session) {
    test_app_with(AppConfig::with_google_base_url(base_url), Session::in_memory())
}

pub fn test_app_with(config: AppConfig, session: Session) -> (Router, Session) {
    let gmail = GmailClient::new(config).expect("Failed to build Gmail client");
    let app_state = AppState::new(gmail, session.clone());
    (app(Arc::new(app_state)), session)
}

/// Store a long lived credential in the session
pub async fn sign_in(session: &Session) {
    session
        .store(Credential {
            access_token: String::from("test_token"),
            refresh_token: Some(String::from("1//refresh")),
            expires_at: None,
        })
        .await
        .expect("Failed to store credential");
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}

/// A full Gmail message whose root part carries `payload_body` as data
pub fn message_json(id: &str, subject: &str, payload_body: Option<&str>) -> String {
    let mut payload = serde_json::json!({
        "partId": "",
        "mimeType": "text/plain",
        "filename": "",
        "headers": [
            {"name": "From", "value": "Sender <sender@example.com>"},
            {"name": "Subject", "value": subject},
            {"name": "Date", "value": "Tue, 12 Nov 2024 08:55:23 +0000"}
        ],
        "body": {"size": 0}
    });
    if let Some(data) = payload_body {
        payload["body"]["data"] = serde_json::Value::String(data.to_string());
    }
    serde_json::json!({
        "id": id,
        "threadId": format!("thr_{}", id),
        "labelIds": ["INBOX"],
        "snippet": "",
        "internalDate": "1731401723000",
        "payload": payload
    })
    .to_string()
}
