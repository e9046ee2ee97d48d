//! Find the text body of a Gmail message payload.

use base64::{
    Engine as _,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

use super::error::MailError;
use super::gmail::MessagePart;

/// Gmail sends URL-safe base64 and isn't consistent about padding
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn decode_base64_url(data: &str) -> Result<String, MailError> {
    let bytes = URL_SAFE_LENIENT
        .decode(data.trim())
        .map_err(|e| MailError::Decode(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Depth-first search for the first part carrying inline data.
///
/// Data on a part wins over its children. Parts are visited in order so
/// for `multipart/alternative` the first alternative (usually
/// `text/plain`) is returned.
pub fn try_extract_body(part: &MessagePart) -> Result<Option<String>, MailError> {
    if let Some(body) = &part.body
        && let Some(data) = &body.data
    {
        return decode_base64_url(data).map(Some);
    }

    if let Some(parts) = &part.parts {
        for child in parts {
            if let Some(text) = try_extract_body(child)? {
                return Ok(Some(text));
            }
        }
    }

    Ok(None)
}

/// Same as [`try_extract_body`] but malformed data counts as no body.
pub fn extract_body(part: &MessagePart) -> Option<String> {
    match try_extract_body(part) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Could not extract body for part {:?}: {}", part.part_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

    use super::*;
    use crate::google::gmail::MessagePartBody;

    fn leaf(mimetype: &str, data: Option<&str>) -> MessagePart {
        MessagePart {
            mimetype: mimetype.to_string(),
            body: Some(MessagePartBody {
                data: data.map(String::from),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn container(parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mimetype: String::from("multipart/mixed"),
            parts: Some(parts),
            ..Default::default()
        }
    }

    #[test]
    fn test_root_data_wins_over_children() {
        let mut root = leaf("text/plain", Some(&URL_SAFE.encode("root body")));
        root.parts = Some(vec![leaf("text/plain", Some(&URL_SAFE.encode("child")))]);
        assert_eq!(extract_body(&root).as_deref(), Some("root body"));
    }

    #[test]
    fn test_empty_part() {
        assert_eq!(extract_body(&MessagePart::default()), None);
        // Body without data, e.g. the container part of a multipart message
        assert_eq!(extract_body(&leaf("multipart/alternative", None)), None);
        assert_eq!(extract_body(&container(vec![])), None);
    }

    #[test]
    fn test_first_descendant_depth_first() {
        let payload = container(vec![
            container(vec![
                leaf("text/plain", None),
                leaf("text/plain", Some(&URL_SAFE.encode("nested first"))),
            ]),
            leaf("text/html", Some(&URL_SAFE.encode("<p>second</p>"))),
        ]);
        assert_eq!(extract_body(&payload).as_deref(), Some("nested first"));

        let payload = container(vec![
            leaf("text/plain", None),
            container(vec![]),
            leaf("text/html", Some(&URL_SAFE.encode("<p>only</p>"))),
        ]);
        assert_eq!(extract_body(&payload).as_deref(), Some("<p>only</p>"));

        let payload = container(vec![leaf("text/plain", None), container(vec![])]);
        assert_eq!(extract_body(&payload), None);
    }

    #[test]
    fn test_decode_with_and_without_padding() {
        for text in ["a", "ab", "abc", "Don’t stop ✉️", "line one\r\nline two?>>"] {
            let padded = leaf("text/plain", Some(&URL_SAFE.encode(text)));
            let unpadded = leaf("text/plain", Some(&URL_SAFE_NO_PAD.encode(text)));
            assert_eq!(extract_body(&padded).as_deref(), Some(text));
            assert_eq!(extract_body(&unpadded).as_deref(), Some(text));
        }
    }

    #[test]
    fn test_empty_data_is_empty_body() {
        assert_eq!(extract_body(&leaf("text/plain", Some(""))).as_deref(), Some(""));
    }

    #[test]
    fn test_malformed_data() {
        let payload = container(vec![
            leaf("text/plain", Some("not*valid*base64")),
            leaf("text/html", Some(&URL_SAFE.encode("fallback"))),
        ]);
        assert!(matches!(
            try_extract_body(&payload),
            Err(MailError::Decode(_))
        ));
        assert_eq!(extract_body(&payload), None);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let data = URL_SAFE.encode([0x48, 0x69, 0xff]);
        assert_eq!(
            extract_body(&leaf("text/plain", Some(&data))).as_deref(),
            Some("Hi\u{fffd}")
        );
    }
}
