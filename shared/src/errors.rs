/// Unified error types for the Clipgrab download client.
use thiserror::Error;

use crate::protocol;

/// Message shown when neither the transport nor the server supplied one.
pub const GENERIC_FAILURE_MESSAGE: &str = "Download failed";

/// Terminal failure of a single download invocation.
///
/// Every variant is caught at the controller boundary and turned into exactly
/// one user notification.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Server reported error: {message}")]
    ServerReported { message: String },

    #[error("Failed to save file: {0}")]
    Persist(#[from] std::io::Error),
}

impl DownloadError {
    pub fn server_reported(message: impl Into<String>) -> Self {
        DownloadError::ServerReported {
            message: message.into(),
        }
    }

    /// Human-readable text for the notifier.
    pub fn user_message(&self) -> String {
        match self {
            DownloadError::Transport(e) => e.user_message(),
            DownloadError::ServerReported { message } => message.clone(),
            DownloadError::Persist(e) => format!("Could not save file: {}", e),
        }
    }

    /// Short machine-friendly kind, used as a tracing field.
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::Transport(_) => "transport",
            DownloadError::ServerReported { .. } => "server_reported",
            DownloadError::Persist(_) => "persist",
        }
    }
}

/// Errors raised by the HTTP transport before a payload is available.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("[{status}] {message}")]
    Status { status: u16, message: String },

    #[error("Response body interrupted: {0}")]
    Body(String),

    #[error("Invalid download URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Build a status error, preferring the `message` field of a JSON body.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = protocol::error_message(body)
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        TransportError::Status { status, message }
    }

    pub fn user_message(&self) -> String {
        match self {
            TransportError::Status { message, .. } => message.clone(),
            TransportError::Request(msg) | TransportError::Body(msg) if !msg.is_empty() => {
                msg.clone()
            }
            TransportError::InvalidUrl(url) => format!("Invalid download URL: {}", url),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Soft failures while reading `content-disposition`. Never shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("no filename parameter")]
    MissingFilename,

    #[error("filename parameter is not quoted")]
    Unquoted,

    #[error("quoted filename is not terminated")]
    Unterminated,

    #[error("filename is not valid UTF-8 after percent-decoding")]
    InvalidEncoding,

    #[error("filename is empty")]
    Empty,
}

/// Configuration errors raised while building the downloader settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for a download invocation.
pub type ClipgrabResult<T> = Result<T, DownloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_prefers_json_message() {
        let err = TransportError::from_status(404, br#"{"message":"No such file"}"#);
        assert_eq!(err.user_message(), "No such file");
    }

    #[test]
    fn test_status_error_fallback_message() {
        let err = TransportError::from_status(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.user_message(), "Request failed with status code 502");
    }

    #[test]
    fn test_empty_request_message_uses_generic() {
        let err = DownloadError::from(TransportError::Request(String::new()));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_server_reported_message() {
        let err = DownloadError::server_reported("File not found");
        assert_eq!(err.user_message(), "File not found");
        assert_eq!(err.kind(), "server_reported");
    }
}
