//! Upstream endpoint configuration.

use std::time::Duration;

use url::Url;

use crate::error::Result;

/// Default token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://rolexcoderz.in/api/get-token";

/// Default content endpoint.
pub const DEFAULT_CONTENT_URL: &str = "https://rolexcoderz.in/api/get-live-classes";

/// Default `Referer` sent with every upstream request.
pub const DEFAULT_REFERER: &str = "https://rolexcoderz.in/live-classes";

/// Default `User-Agent` sent with every upstream request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/141.0.0.0 Mobile Safari/537.36";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upstream API configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Token endpoint (GET).
    pub token_url: Url,
    /// Content endpoint (POST).
    pub content_url: Url,
    /// `Referer` header value.
    pub referer: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Creates a configuration for the given endpoints with default headers
    /// and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if either URL is invalid.
    pub fn new(token_url: impl AsRef<str>, content_url: impl AsRef<str>) -> Result<Self> {
        Self::builder()
            .token_url(token_url.as_ref())
            .content_url(content_url.as_ref())
            .build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> UpstreamConfigBuilder {
        UpstreamConfigBuilder::new()
    }
}

/// Builder for [`UpstreamConfig`].
#[derive(Debug, Clone)]
pub struct UpstreamConfigBuilder {
    token_url: String,
    content_url: String,
    referer: String,
    user_agent: String,
    timeout: Duration,
}

impl UpstreamConfigBuilder {
    /// Creates a builder preloaded with the default endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            content_url: DEFAULT_CONTENT_URL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the token endpoint.
    #[must_use]
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Sets the content endpoint.
    #[must_use]
    pub fn content_url(mut self, url: impl Into<String>) -> Self {
        self.content_url = url.into();
        self
    }

    /// Sets the `Referer` header value.
    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    /// Sets the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is not a valid URL.
    pub fn build(self) -> Result<UpstreamConfig> {
        Ok(UpstreamConfig {
            token_url: Url::parse(&self.token_url)?,
            content_url: Url::parse(&self.content_url)?,
            referer: self.referer,
            user_agent: self.user_agent,
            timeout: self.timeout,
        })
    }
}

impl Default for UpstreamConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
