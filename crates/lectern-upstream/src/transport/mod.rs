//! Outbound HTTP transport.
//!
//! The pipeline talks to the upstream through the [`Transport`] trait so it
//! can be driven by [`HttpTransport`] in production and by an in-memory fake
//! in tests.

mod headers;
mod http;
#[cfg(any(test, feature = "test-util"))]
mod mock;

pub use headers::browser_headers;
pub use http::HttpTransport;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockResponse, MockTransport};

use std::future::Future;
use std::sync::Arc;

use reqwest::Method;
use reqwest::header::HeaderMap;
use url::Url;

use crate::error::Result;

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Optional UTF-8 body.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a GET request.
    #[must_use]
    pub const fn get(url: Url, headers: HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url,
            headers,
            body: None,
        }
    }

    /// Creates a POST request carrying `body`.
    #[must_use]
    pub fn post(url: Url, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url,
            headers,
            body: Some(body.into()),
        }
    }
}

/// A fully accumulated, decompressed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx status codes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Performs a single request and returns the complete response body.
pub trait Transport: Send + Sync {
    /// Sends `request`, waiting for the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) on connection
    /// failure and [`Error::Timeout`](crate::Error::Timeout) when the request
    /// exceeds its time budget.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send {
        (**self).send(request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        assert!(ok.is_success());

        let forbidden = HttpResponse {
            status: 403,
            body: "<!DOCTYPE html>".to_string(),
        };
        assert!(!forbidden.is_success());
    }

    #[test]
    fn test_request_constructors() {
        let url = Url::parse("https://example.com/api").unwrap();
        let get = HttpRequest::get(url.clone(), HeaderMap::new());
        assert_eq!(get.method, Method::GET);
        assert!(get.body.is_none());

        let post = HttpRequest::post(url, HeaderMap::new(), r#"{"type":"live"}"#);
        assert_eq!(post.method, Method::POST);
        assert_eq!(post.body.as_deref(), Some(r#"{"type":"live"}"#));
    }
}
