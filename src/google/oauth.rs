//! Google OAuth 2.0 authorization code flow

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::MailError;
use crate::core::AppConfig;

pub const GMAIL_SCOPES: &str =
    "https://www.googleapis.com/auth/gmail.readonly https://www.googleapis.com/auth/gmail.send";

// Refresh tokens this close to expiry so in-flight requests don't race it
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Token response from Google's token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

/// Credential held by the session and optionally written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp in seconds
    pub expires_at: Option<i64>,
}

impl Credential {
    fn from_token_response(token: TokenResponse, previous_refresh_token: Option<String>) -> Self {
        Self {
            access_token: token.access_token,
            // Google only returns a refresh token on the first consent
            refresh_token: token.refresh_token.or(previous_refresh_token),
            expires_at: token.expires_in.map(|secs| Utc::now().timestamp() + secs),
        }
    }

    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now().timestamp() + EXPIRY_LEEWAY_SECS,
            None => false,
        }
    }
}

fn require(value: &str, name: &str) -> Result<(), MailError> {
    if value.trim().is_empty() {
        return Err(MailError::AuthConfig(format!("{} is not set", name)));
    }
    Ok(())
}

/// Build the consent URL the user is sent to.
pub fn authorization_url(config: &AppConfig) -> Result<String, MailError> {
    require(&config.gmail_api_client_id, "Gmail client id")?;
    require(&config.gmail_api_client_secret, "Gmail client secret")?;
    require(&config.gmail_redirect_uri, "Gmail redirect URI")?;
    if !config.google_auth_url.starts_with("http://")
        && !config.google_auth_url.starts_with("https://")
    {
        return Err(MailError::AuthConfig(format!(
            "invalid authorization endpoint: {}",
            config.google_auth_url
        )));
    }

    Ok(format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        config.google_auth_url,
        urlencoding::encode(config.gmail_api_client_id.as_str()),
        urlencoding::encode(config.gmail_redirect_uri.as_str()),
        urlencoding::encode(GMAIL_SCOPES)
    ))
}

async fn request_token(
    client: &Client,
    token_url: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, MailError> {
    let res = client
        .post(token_url)
        .form(form)
        .send()
        .await
        .map_err(|e| MailError::AuthExchange(e.to_string()))?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(MailError::AuthExchange(format!("{} ({})", status, text)));
    }
    serde_json::from_str(&text).map_err(|e| MailError::AuthExchange(e.to_string()))
}

/// Exchange an authorization code for a credential
pub async fn exchange_code_for_token(
    client: &Client,
    config: &AppConfig,
    code: &str,
) -> Result<Credential, MailError> {
    if code.trim().is_empty() {
        return Err(MailError::Validation(String::from("missing authorization code")));
    }
    let token = request_token(
        client,
        &config.google_token_url,
        &[
            ("code", code),
            ("client_id", config.gmail_api_client_id.as_str()),
            ("client_secret", config.gmail_api_client_secret.as_str()),
            ("redirect_uri", config.gmail_redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ],
    )
    .await?;

    Ok(Credential::from_token_response(token, None))
}

/// Get a fresh access token using the credential's refresh token
pub async fn refresh_access_token(
    client: &Client,
    config: &AppConfig,
    credential: &Credential,
) -> Result<Credential, MailError> {
    let refresh_token = credential.refresh_token.as_deref().ok_or_else(|| {
        MailError::AuthExchange(String::from(
            "access token expired and no refresh token is available",
        ))
    })?;
    let token = request_token(
        client,
        &config.google_token_url,
        &[
            ("refresh_token", refresh_token),
            ("client_id", config.gmail_api_client_id.as_str()),
            ("client_secret", config.gmail_api_client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ],
    )
    .await?;

    Ok(Credential::from_token_response(
        token,
        credential.refresh_token.clone(),
    ))
}
