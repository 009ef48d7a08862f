//! Error types for upstream operations.

use std::time::Duration;

/// Result type alias for upstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Upstream error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection or protocol failure while talking to the upstream.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream answered with a non-2xx status.
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    /// Token acquisition failed.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Upstream payload was malformed or had an unexpected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Error {
    /// Creates an auth error.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true for network-level failures (connection errors, timeouts,
    /// error statuses).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Status(_))
    }

    /// Returns true if token acquisition failed.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
