//! Gmail API client for signing in, listing recent mail and sending
//! messages on behalf of the session's account.

use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::MailError;
use super::oauth::{self, Credential};
use super::session::Session;
use crate::core::AppConfig;

/// Gmail's alias for the authenticated account
pub const ME: &str = "me";

pub const DEFAULT_LIST_LIMIT: u32 = 10;
// Upper bound Gmail accepts for maxResults
pub const MAX_LIST_LIMIT: u32 = 500;
// Message fetches in flight at once while listing
const FETCH_CONCURRENCY: usize = 8;

/// Message and part structures from Gmail API documentation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageRef {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Option<Vec<MessageRef>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
    #[serde(rename = "labelIds")]
    pub label_ids: Option<Vec<String>>,
    #[serde(rename = "internalDate")]
    pub internal_date: Option<String>,
}

impl Message {
    /// First header named `name`, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .as_ref()?
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePartBody {
    #[serde(rename = "attachmentId")]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: u64,
    // Base64url encoded
    pub data: Option<String>,
}

/// One node of a message's payload tree. The root payload and every
/// nested part share this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "partId")]
    pub part_id: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mimetype: String,
    pub filename: Option<String>,
    pub headers: Option<Vec<MessageHeader>>,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    raw: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    #[serde(rename = "labelIds")]
    pub label_ids: Option<Vec<String>>,
}

/// Client for Google's OAuth and Gmail endpoints. Credentials are not
/// held here; every call takes the session it acts for.
#[derive(Clone, Debug)]
pub struct GmailClient {
    client: Client,
    config: AppConfig,
}

impl GmailClient {
    pub fn new(config: AppConfig) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn authorization_url(&self) -> Result<String, MailError> {
        oauth::authorization_url(&self.config)
    }

    /// Exchange an authorization code and sign the session in
    pub async fn exchange_code(
        &self,
        session: &Session,
        code: &str,
    ) -> Result<Credential, MailError> {
        let credential = oauth::exchange_code_for_token(&self.client, &self.config, code).await?;
        if let Err(e) = session.store(credential.clone()).await {
            tracing::warn!("Signed in but could not persist credential: {}", e);
        }
        Ok(credential)
    }

    /// Current access token for the session, refreshed first when it is
    /// about to expire.
    async fn access_token(&self, session: &Session) -> Result<String, MailError> {
        let credential = session.credential().ok_or(MailError::Unauthenticated)?;
        if !credential.needs_refresh() {
            return Ok(credential.access_token);
        }

        tracing::debug!("Access token expired, refreshing");
        let refreshed = oauth::refresh_access_token(&self.client, &self.config, &credential).await?;
        match session.store_if_current(&credential, refreshed.clone()).await {
            Ok(true) => {}
            Ok(false) => {
                // Signed out or replaced while the refresh was in flight
                tracing::debug!("Discarding refreshed credential for a stale session");
                if !session.is_authenticated() {
                    return Err(MailError::Unauthenticated);
                }
            }
            Err(e) => tracing::warn!("Could not persist refreshed credential: {}", e),
        }
        Ok(refreshed.access_token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, MailError> {
        let res = self.client.get(url).bearer_auth(access_token).send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(MailError::Provider(format!("{} ({})", status, text)));
        }
        serde_json::from_str(&text).map_err(|e| MailError::Provider(e.to_string()))
    }

    /// List the most recent messages in the mailbox, newest first as
    /// Gmail returns them, with full payloads.
    pub async fn list_recent_messages(
        &self,
        session: &Session,
        max: u32,
    ) -> Result<Vec<Message>, MailError> {
        let access_token = self.access_token(session).await?;
        let url = format!(
            "{}/gmail/v1/users/{}/messages?maxResults={}",
            self.config.gmail_api_url, ME, max
        );
        let listing: ListMessagesResponse = self.get_json(&url, &access_token).await?;
        let refs = listing.messages.unwrap_or_default();

        // buffered keeps the listing order while bounding requests in flight
        let access_token = access_token.as_str();
        stream::iter(refs)
            .map(|m| async move { self.fetch_message(access_token, &m.id).await })
            .buffered(FETCH_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Fetch a full message by id
    pub async fn fetch_message(&self, access_token: &str, id: &str) -> Result<Message, MailError> {
        let url = format!(
            "{}/gmail/v1/users/{}/messages/{}?format=full",
            self.config.gmail_api_url,
            ME,
            urlencoding::encode(id)
        );
        self.get_json(&url, access_token).await
    }

    /// Submit a base64url encoded RFC 5322 message
    pub async fn send_message(
        &self,
        session: &Session,
        raw: &str,
    ) -> Result<SentMessage, MailError> {
        let access_token = self.access_token(session).await?;
        let url = format!(
            "{}/gmail/v1/users/{}/messages/send",
            self.config.gmail_api_url, ME
        );
        let res = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&SendMessageRequest { raw })
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(MailError::Provider(format!("Send failed: {} ({})", status, text)));
        }
        serde_json::from_str(&text).map_err(|e| MailError::Provider(e.to_string()))
    }

    pub async fn clear_credentials(&self, session: &Session) -> Result<(), MailError> {
        session.clear().await
    }
}
