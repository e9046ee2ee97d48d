//! Build outbound messages in the raw form Gmail's send endpoint takes

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use lettre::Message;
use lettre::message::header::{ContentType, HeaderName, HeaderValue};
use lettre::message::{Mailbox, SinglePart};

use super::error::MailError;
use super::gmail::ME;

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, MailError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(MailError::Validation(format!("missing field `{}`", field))),
    }
}

/// Compose a single part plain text message from the signed-in account
/// to `to`. The body may be empty, the recipient and subject may not.
pub fn compose_plain_text(
    to: Option<&str>,
    subject: Option<&str>,
    body: Option<&str>,
) -> Result<Message, MailError> {
    let to: Mailbox = required(to, "to")?
        .trim()
        .parse()
        .map_err(|e| MailError::Validation(format!("invalid recipient: {}", e)))?;
    let subject = required(subject, "subject")?;
    let body = body.ok_or_else(|| MailError::Validation(String::from("missing field `body`")))?;

    // lettre only accepts full addresses as the originator, so the
    // recipient stands in until the header is replaced below
    let mut message = Message::builder()
        .from(to.clone())
        .to(to)
        .subject(subject)
        .singlepart(
            SinglePart::builder()
                .content_type(ContentType::TEXT_PLAIN)
                .body(body.to_string()),
        )
        .map_err(|e| MailError::Validation(e.to_string()))?;

    // Gmail resolves `me` to the authenticated account
    message.headers_mut().insert_raw(HeaderValue::new(
        HeaderName::new_from_ascii_str("From"),
        ME.to_string(),
    ));

    Ok(message)
}

/// Serialize and base64url encode a message for `messages.send`
pub fn encode_raw(message: &Message) -> String {
    URL_SAFE.encode(message.formatted())
}
