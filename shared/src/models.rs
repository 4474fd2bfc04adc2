/// Data types shared across the Clipgrab crates.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content type assumed when the server does not declare one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// One download invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub id: Uuid,
    pub file_id: String,
    pub suggested_filename: Option<String>,
}

impl DownloadRequest {
    pub fn new(file_id: impl Into<String>, suggested_filename: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_id: file_id.into(),
            suggested_filename: suggested_filename.map(String::from),
        }
    }

    /// First 8 characters of the request id, for log lines and messages.
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }
}

/// Cumulative byte progress reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub loaded: u64,
    /// `None` when the server sent no usable content length.
    pub total: Option<u64>,
}

impl ProgressEvent {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }
}

/// Response headers the client cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

impl ResponseMeta {
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }
}

/// Fully buffered response body plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePayload {
    pub bytes: Vec<u8>,
    pub meta: ResponseMeta,
}

/// Summary of a successfully saved file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResult {
    pub request_id: Uuid,
    pub file_id: String,
    pub file_path: String,
    pub file_size: u64,
    pub filename: String,
    pub content_type: String,
    pub finished_at: DateTime<Utc>,
}
