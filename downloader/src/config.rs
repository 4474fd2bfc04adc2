/// Downloader settings.
///
/// Read from the process environment (after `.env` has been loaded) and
/// optionally overridden from the command line.
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clipgrab_shared::errors::ConfigError;
use tracing::info;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_OUTPUT_DIR: &str = "./downloads";
pub const DEFAULT_ACCEPT: &str = "audio/*";

/// Ambient credentials attached to every request.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Raw `Cookie` header value, e.g. `session=abc123`.
    pub cookie: Option<String>,
    pub bearer_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// API root; requests go to `{base_url}/download/{file_id}`.
    pub base_url: String,
    pub output_dir: PathBuf,
    pub accept: String,
    pub credentials: Credentials,
    /// `None` keeps the HTTP client's default (no overall timeout).
    pub timeout: Option<Duration>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            accept: DEFAULT_ACCEPT.to_string(),
            credentials: Credentials::default(),
            timeout: None,
        }
    }
}

impl DownloaderConfig {
    /// Build from `CLIPGRAB_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("CLIPGRAB_BASE_URL") {
            config = config.with_base_url(url)?;
        }
        if let Some(dir) = get("CLIPGRAB_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(accept) = get("CLIPGRAB_ACCEPT") {
            config.accept = accept;
        }
        config.credentials = Credentials {
            cookie: get("CLIPGRAB_COOKIE"),
            bearer_token: get("CLIPGRAB_BEARER_TOKEN"),
        };
        if let Some(secs) = get("CLIPGRAB_TIMEOUT_SECS") {
            config.timeout = parse_timeout(&secs)?;
        }

        Ok(config)
    }

    /// Replace the API root. Only `http` and `https` URLs are accepted.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "CLIPGRAB_BASE_URL".into(),
                reason: format!("expected an http(s) URL, got {:?}", base_url),
            });
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_output_dir(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ConfigError::OutputDir {
            path: self.output_dir.display().to_string(),
            source,
        })?;
        info!("Output directory: {}", self.output_dir.display());
        Ok(())
    }
}

/// `0` disables the timeout.
fn parse_timeout(value: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = value.trim().parse().map_err(|e| ConfigError::InvalidValue {
        key: "CLIPGRAB_TIMEOUT_SECS".into(),
        reason: format!("{}", e),
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
