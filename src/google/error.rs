//! Errors returned by the Google OAuth and Gmail client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    /// OAuth client settings are missing or invalid
    #[error("OAuth is not configured: {0}")]
    AuthConfig(String),
    /// Authorization code or refresh token was rejected
    #[error("Token exchange failed: {0}")]
    AuthExchange(String),
    /// No credential in the session
    #[error("Not authenticated, visit /api/gmail/auth first")]
    Unauthenticated,
    /// Gmail rejected the request or could not be reached
    #[error("Gmail request failed: {0}")]
    Provider(String),
    #[error("Could not clear stored credentials: {0}")]
    CredentialStore(String),
    #[error("Invalid request: {0}")]
    Validation(String),
    /// Malformed base64 body data
    #[error("Failed to decode message body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return MailError::Provider(format!("request timed out: {}", err));
        }
        MailError::Provider(err.to_string())
    }
}
