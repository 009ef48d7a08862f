//! `reqwest`-backed transport.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::{HttpRequest, HttpResponse, Transport};
use crate::error::{Error, Result};

/// HTTPS transport with a bounded per-request timeout.
///
/// Bodies sent with `Content-Encoding: gzip`, `deflate` or `br` are
/// decompressed before being decoded as text; anything else is decoded as-is.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport whose requests fail after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.timeout)
        } else {
            Error::Transport(err)
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "upstream request");

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        // Accumulate the whole (already decompressed) body before anyone parses it.
        let body = response.text().await.map_err(|e| self.classify(e))?;

        debug!(status, bytes = body.len(), "upstream response");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_keeps_timeout() {
        let transport = HttpTransport::new(Duration::from_secs(10)).unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(10));
    }
}
