//! Error types for the task.io client.
//!
//! Only transport failures and the two terminal re-authentication outcomes
//! surface as errors from `fetch`. HTTP error statuses on the caller's real
//! request are returned as ordinary responses.

/// Errors produced by persistent storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file did not contain a JSON object of strings.
    #[error("storage contents invalid: {0}")]
    Serde(#[from] serde_json::Error),

    /// The in-memory store lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Errors produced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request failed at the transport level.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A header name or value could not be constructed.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The configured base URL or request path is unusable.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The refresh endpoint rejected the ambient refresh credential.
    #[error("refresh token expired")]
    RefreshExpired,

    /// A freshly refreshed access token was still rejected by the identity probe.
    #[error("failed to re-authenticate")]
    ReauthFailed,

    /// A gateway call with a typed result returned a non-success status.
    #[error("server returned status {status}")]
    Status { status: u16, body: String },

    /// A response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// Persistent storage could not be opened.
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

impl ClientError {
    /// True for outcomes after which the user must log in again.
    #[must_use]
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::RefreshExpired | Self::ReauthFailed)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for ClientError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(e.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for ClientError {
    fn from(e: reqwest::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
