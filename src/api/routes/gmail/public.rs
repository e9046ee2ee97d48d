//! Public types for the Gmail API
use serde::{Deserialize, Serialize};

/// Placeholder used when no text body could be found
pub const NO_BODY_CONTENT: &str = "No body content";

#[derive(Serialize, Deserialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// Query Google appends when redirecting back after consent
#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// Summary of a message. Headers missing from the message are left out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub body: String,
}

/// Fields are optional here so missing ones are reported as a
/// validation error instead of a generic rejection.
#[derive(Debug, Deserialize, Serialize)]
pub struct SendRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}
