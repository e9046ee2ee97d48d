//! Router for the Gmail API

use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::{Html, Json},
};
use axum_extra::extract::{Query, QueryRejection};
use http::StatusCode;
use serde_json::{Value, json};

use super::public;
use crate::api::public::{ApiError, status_for};
use crate::api::state::AppState;
use crate::google::MailError;
use crate::google::body::extract_body;
use crate::google::compose::{compose_plain_text, encode_raw};
use crate::google::gmail::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT, Message};

type SharedState = Arc<AppState>;

async fn auth_handler(
    State(state): State<SharedState>,
) -> Result<Json<public::AuthUrlResponse>, ApiError> {
    let auth_url = state.gmail.authorization_url()?;
    Ok(Json(public::AuthUrlResponse { auth_url }))
}

/// Page loaded in the consent popup. It hands the result to the window
/// that opened it and closes itself.
fn popup_page(payload: Value) -> Html<String> {
    // No markup can start inside the script element, so token or error
    // text can't close it or switch the tokenizer into an escaped state
    let payload = payload.to_string().replace('<', "\\u003c");
    Html(format!(
        "<html><script>window.opener.postMessage({},'*');window.close();</script></html>",
        payload
    ))
}

async fn callback_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::CallbackQuery>,
) -> (StatusCode, Html<String>) {
    let result = match (params.code, params.error) {
        (_, Some(error)) => Err(MailError::AuthExchange(format!(
            "authorization denied: {}",
            error
        ))),
        (Some(code), None) => state.gmail.exchange_code(&state.session, &code).await,
        (None, None) => Err(MailError::Validation(String::from(
            "missing authorization code",
        ))),
    };

    match result {
        Ok(credential) => {
            tracing::info!("Gmail account signed in");
            (
                StatusCode::OK,
                popup_page(json!({ "access_token": credential.access_token })),
            )
        }
        Err(e) => {
            tracing::error!("OAuth callback failed: {}", e);
            (status_for(&e), popup_page(json!({ "error": e.to_string() })))
        }
    }
}

fn summarize(message: &Message) -> public::EmailSummary {
    let body = message
        .payload
        .as_ref()
        .and_then(extract_body)
        .unwrap_or_else(|| public::NO_BODY_CONTENT.to_string());

    public::EmailSummary {
        id: message.id.clone(),
        subject: message.header("Subject").map(String::from),
        from: message.header("From").map(String::from),
        date: message.header("Date").map(String::from),
        body,
    }
}

async fn list_handler(
    State(state): State<SharedState>,
    query: Result<Query<public::ListQuery>, QueryRejection>,
) -> Result<Json<Vec<public::EmailSummary>>, ApiError> {
    let Query(params) = query.map_err(|e| MailError::Validation(e.body_text()))?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let messages = state
        .gmail
        .list_recent_messages(&state.session, limit)
        .await?;

    let emails: Vec<public::EmailSummary> = messages.iter().map(summarize).collect();
    for email in &emails {
        tracing::debug!(
            id = %email.id,
            subject = ?email.subject,
            from = ?email.from,
            "Listed email"
        );
    }

    Ok(Json(emails))
}

async fn send_handler(
    State(state): State<SharedState>,
    payload: Result<Json<public::SendRequest>, JsonRejection>,
) -> Result<Json<public::StatusResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| MailError::Validation(e.body_text()))?;

    let message = compose_plain_text(
        req.to.as_deref(),
        req.subject.as_deref(),
        req.body.as_deref(),
    )?;
    let sent = state
        .gmail
        .send_message(&state.session, &encode_raw(&message))
        .await?;
    tracing::info!("Sent message {}", sent.id);

    Ok(Json(public::StatusResponse {
        status: String::from("sent"),
    }))
}

async fn logout_handler(
    State(state): State<SharedState>,
) -> Result<Json<public::StatusResponse>, ApiError> {
    state.gmail.clear_credentials(&state.session).await?;
    tracing::info!("Gmail account signed out");

    Ok(Json(public::StatusResponse {
        status: String::from("logged out"),
    }))
}

/// Create the Gmail router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth", axum::routing::get(auth_handler))
        .route("/callback", axum::routing::get(callback_handler))
        .route("/list", axum::routing::get(list_handler))
        .route("/send", axum::routing::post(send_handler))
        .route("/logout", axum::routing::post(logout_handler))
}
