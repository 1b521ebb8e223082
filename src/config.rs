//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub connect_secs: u64,
    /// `None` leaves requests unbounded.
    pub request_secs: Option<u64>,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self { connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS, request_secs: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API gateway base URL without a trailing slash.
    pub base_url: String,
    /// File used by `FileStorage`; `None` keeps session state in memory.
    pub storage_path: Option<PathBuf>,
    pub timeouts: ClientTimeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_owned(), storage_path: None, timeouts: ClientTimeouts::default() }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with all other settings defaulted.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self { base_url: normalize_base_url(base_url), ..Self::default() }
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `TASKIO_BASE_URL`: default `http://localhost:8000`
    /// - `TASKIO_STORAGE_PATH`: session storage file
    /// - `TASKIO_CONNECT_TIMEOUT_SECS`: default 10
    /// - `TASKIO_REQUEST_TIMEOUT_SECS`: unset means no request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if a timeout is not a valid integer or
    /// the base URL is not http(s).
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("TASKIO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let base_url = validate_base_url(&base_url)?;

        let storage_path = std::env::var_os("TASKIO_STORAGE_PATH")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let timeouts = ClientTimeouts {
            connect_secs: env_parse_u64("TASKIO_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_secs: env_parse_u64("TASKIO_REQUEST_TIMEOUT_SECS")?,
        };

        Ok(Self { base_url, storage_path, timeouts })
    }

    /// Replace the base URL, applying the same checks as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the URL is not http(s).
    pub fn set_base_url(&mut self, raw: &str) -> Result<(), ClientError> {
        self.base_url = validate_base_url(raw)?;
        Ok(())
    }
}

fn validate_base_url(raw: &str) -> Result<String, ClientError> {
    let base_url = normalize_base_url(raw);
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ClientError::Config(format!("base URL must be http(s): {raw}")));
    }
    Ok(base_url)
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_parse_u64(key: &str) -> Result<Option<u64>, ClientError> {
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{key} must be an integer, got '{raw}'"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
