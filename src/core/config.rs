use std::env;

pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_GMAIL_API_URL: &str = "https://gmail.googleapis.com";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gmail_api_client_id: String,
    pub gmail_api_client_secret: String,
    pub gmail_redirect_uri: String,
    // Token file mirroring the session credential. In-memory only when unset.
    pub token_path: Option<String>,
    pub http_timeout_secs: u64,
    pub google_auth_url: String,
    pub google_token_url: String,
    pub gmail_api_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "localhost";
        let port = "8080";
        // Missing OAuth client settings are reported by the /auth
        // endpoint rather than failing at startup.
        let gmail_api_client_id = env::var("MAILBRIDGE_GMAIL_CLIENT_ID").unwrap_or_default();
        let gmail_api_client_secret =
            env::var("MAILBRIDGE_GMAIL_CLIENT_SECRET").unwrap_or_default();
        let gmail_redirect_uri = env::var("MAILBRIDGE_GMAIL_REDIRECT_URI")
            .unwrap_or_else(|_| format!("http://{}:{}/api/gmail/callback", host, port));
        let token_path = env::var("MAILBRIDGE_TOKEN_PATH")
            .ok()
            .filter(|p| !p.is_empty());
        let http_timeout_secs = env::var("MAILBRIDGE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(30);
        let google_auth_url = env::var("MAILBRIDGE_GOOGLE_AUTH_URL")
            .unwrap_or_else(|_| DEFAULT_GOOGLE_AUTH_URL.to_string());
        let google_token_url = env::var("MAILBRIDGE_GOOGLE_TOKEN_URL")
            .unwrap_or_else(|_| DEFAULT_GOOGLE_TOKEN_URL.to_string());
        let gmail_api_url = env::var("MAILBRIDGE_GMAIL_API_URL")
            .unwrap_or_else(|_| DEFAULT_GMAIL_API_URL.to_string());

        Self {
            gmail_api_client_id,
            gmail_api_client_secret,
            gmail_redirect_uri,
            token_path,
            http_timeout_secs,
            google_auth_url,
            google_token_url,
            gmail_api_url,
        }
    }
}

impl AppConfig {
    /// Configuration pointing every Google endpoint at `base_url`. Used
    /// to run against a local mock of the OAuth and Gmail APIs.
    pub fn with_google_base_url(base_url: &str) -> Self {
        Self {
            gmail_api_client_id: String::from("test_client_id"),
            gmail_api_client_secret: String::from("test_client_secret"),
            gmail_redirect_uri: String::from("http://localhost:8080/api/gmail/callback"),
            token_path: None,
            http_timeout_secs: 5,
            google_auth_url: format!("{}/o/oauth2/v2/auth", base_url),
            google_token_url: format!("{}/token", base_url),
            gmail_api_url: base_url.to_string(),
        }
    }
}
