/// Response classification for the download endpoint.
///
/// The server reports some failures with a success status and a JSON
/// envelope (`{"message": "..."}`) in place of the audio bytes. Everything
/// that is not declared as JSON is treated as the binary payload.
use tracing::debug;

use crate::errors::GENERIC_FAILURE_MESSAGE;
use crate::models::ResponsePayload;

/// Result of inspecting a completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedResponse {
    /// The audio payload, ready to be persisted.
    Binary(ResponsePayload),
    /// In-band error reported by the server.
    ServerError(String),
}

impl ClassifiedResponse {
    pub fn is_server_error(&self) -> bool {
        matches!(self, ClassifiedResponse::ServerError(_))
    }
}

/// Lower-cased media type with parameters stripped (`Text/HTML; charset=x` -> `text/html`).
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Whether a declared content type is a JSON document.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = mime_essence(content_type);
    essence == "application/json" || essence.ends_with("+json")
}

/// Extract a non-empty string `message` field from a JSON body.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(|v| v.as_str())
        .filter(|m| !m.is_empty())
        .map(String::from)
}

/// Split a payload into the saved-file path or the server-error path.
pub fn classify(payload: ResponsePayload) -> ClassifiedResponse {
    match payload.meta.content_type.as_deref() {
        Some(content_type) if is_json_content_type(content_type) => {
            let message = error_message(&payload.bytes).unwrap_or_else(|| {
                debug!(
                    "JSON error body without usable message ({} bytes)",
                    payload.bytes.len()
                );
                GENERIC_FAILURE_MESSAGE.to_string()
            });
            ClassifiedResponse::ServerError(message)
        }
        _ => ClassifiedResponse::Binary(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResponseMeta;

    fn payload(content_type: Option<&str>, body: &[u8]) -> ResponsePayload {
        ResponsePayload {
            bytes: body.to_vec(),
            meta: ResponseMeta {
                content_type: content_type.map(String::from),
                content_disposition: None,
            },
        }
    }

    #[test]
    fn test_json_error_envelope() {
        let classified = classify(payload(
            Some("application/json"),
            br#"{"message":"File not found"}"#,
        ));
        assert_eq!(
            classified,
            ClassifiedResponse::ServerError("File not found".to_string())
        );
    }

    #[test]
    fn test_json_with_charset_and_case() {
        let classified = classify(payload(
            Some("Application/JSON; charset=utf-8"),
            br#"{"message":"Quota exceeded"}"#,
        ));
        assert_eq!(
            classified,
            ClassifiedResponse::ServerError("Quota exceeded".to_string())
        );
    }

    #[test]
    fn test_json_without_message_uses_default() {
        let classified = classify(payload(Some("application/problem+json"), br#"{"code":7}"#));
        assert_eq!(
            classified,
            ClassifiedResponse::ServerError(GENERIC_FAILURE_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_unparsable_json_is_still_an_error() {
        let classified = classify(payload(Some("application/json"), b"not json"));
        assert!(classified.is_server_error());
    }

    #[test]
    fn test_audio_is_binary() {
        let classified = classify(payload(Some("audio/mpeg"), &[0xff, 0xfb, 0x90]));
        match classified {
            ClassifiedResponse::Binary(p) => assert_eq!(p.bytes, vec![0xff, 0xfb, 0x90]),
            other => panic!("Expected binary payload, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_content_type_is_binary() {
        assert!(!classify(payload(None, b"RIFF")).is_server_error());
    }

    #[test]
    fn test_mime_essence() {
        assert_eq!(mime_essence(" Audio/MPEG ; rate=44100"), "audio/mpeg");
        assert!(!is_json_content_type("text/plain"));
    }
}
