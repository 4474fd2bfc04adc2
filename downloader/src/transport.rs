/// HTTP transport for the download endpoint.
///
/// Issues `GET {base_url}/download/{file_id}` and buffers the body chunk by
/// chunk, reporting cumulative progress after every chunk.
use std::future::Future;

use futures_util::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderName, ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE};
use reqwest::Url;
use tracing::{debug, warn};

use clipgrab_shared::errors::TransportError;
use clipgrab_shared::models::{ProgressEvent, ResponseMeta, ResponsePayload};

use crate::config::{Credentials, DownloaderConfig};

/// Characters left unescaped in a path segment (RFC 3986 unreserved).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Upper bound for pre-allocating the body buffer from `content-length`.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Fetches one resource and streams byte progress to a callback.
pub trait Transport {
    /// Progress is reported as cumulative `(loaded, total)` in receive order.
    fn fetch<F>(
        &self,
        file_id: &str,
        on_progress: F,
    ) -> impl Future<Output = Result<ResponsePayload, TransportError>> + Send
    where
        F: FnMut(ProgressEvent) + Send;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    accept: String,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn new(config: &DownloaderConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            accept: config.accept.clone(),
            credentials: config.credentials.clone(),
        })
    }

    /// Endpoint for a file id, with the id escaped as a single path segment.
    pub fn download_url(&self, file_id: &str) -> String {
        format!(
            "{}/download/{}",
            self.base_url,
            utf8_percent_encode(file_id, PATH_SEGMENT)
        )
    }
}

impl Transport for HttpTransport {
    async fn fetch<F>(
        &self,
        file_id: &str,
        mut on_progress: F,
    ) -> Result<ResponsePayload, TransportError>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        let raw_url = self.download_url(file_id);
        let url = Url::parse(&raw_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{} ({})", raw_url, e)))?;
        debug!("GET {}", url);

        let mut request = self.client.get(url).header(ACCEPT, &self.accept);
        if let Some(cookie) = &self.credentials.cookie {
            request = request.header(COOKIE, cookie);
        }
        if let Some(token) = &self.credentials.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_else(|e| {
                debug!("Discarding unreadable error body: {}", e);
                Default::default()
            });
            warn!("Download endpoint returned {} for file {}", status, file_id);
            return Err(TransportError::from_status(status.as_u16(), &body));
        }

        let meta = ResponseMeta {
            content_type: header_string(response.headers(), CONTENT_TYPE),
            content_disposition: header_string(response.headers(), CONTENT_DISPOSITION),
        };
        let total = response.content_length();
        debug!(
            "Response headers: content_type={:?} content_length={:?}",
            meta.content_type, total
        );

        let capacity = total.unwrap_or(0).min(MAX_PREALLOC) as usize;
        let mut bytes = Vec::with_capacity(capacity);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TransportError::Body(e.to_string()))?;
            bytes.extend_from_slice(&chunk);
            on_progress(ProgressEvent::new(bytes.len() as u64, total));
        }

        Ok(ResponsePayload { bytes, meta })
    }
}

/// Header value as text; non-ASCII values are treated as absent.
fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(&name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
