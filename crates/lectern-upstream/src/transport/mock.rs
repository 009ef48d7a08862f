//! In-memory transport for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;

use super::{HttpRequest, HttpResponse, Transport};
use crate::error::{Error, Result};

/// Canned upstream behaviour.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Reply with the given status and body.
    Reply {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Fail as if the request timed out.
    Timeout,
}

impl MockResponse {
    /// A 200 response with `body`.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Reply {
            status: 200,
            body: body.into(),
        }
    }

    /// A response with an arbitrary status.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Reply {
            status,
            body: body.into(),
        }
    }

    /// A valid token response.
    #[must_use]
    pub fn token(timestamp: i64, signature: &str) -> Self {
        Self::ok(serde_json::json!({ "timestamp": timestamp, "signature": signature }).to_string())
    }

    /// A content response whose `data` field is `payload`, base64-encoded.
    #[must_use]
    pub fn payload(payload: &serde_json::Value) -> Self {
        let encoded = STANDARD.encode(payload.to_string());
        Self::ok(serde_json::json!({ "data": encoded }).to_string())
    }
}

#[derive(Debug, Default)]
struct Routes {
    token: Option<MockResponse>,
    categories: HashMap<String, MockResponse>,
    latency: Duration,
    requests: Vec<HttpRequest>,
}

/// Scripted [`Transport`].
///
/// GET requests are answered with the token response; POST requests are
/// routed on the `type` field of their JSON body. Unrouted requests time out.
/// Clones share the same script, so responses can be swapped between
/// refresh cycles.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Routes>>,
}

impl MockTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn routes(&self) -> MutexGuard<'_, Routes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the token endpoint response.
    #[must_use]
    pub fn with_token(self, response: MockResponse) -> Self {
        self.set_token(response);
        self
    }

    /// Sets the response for the category with the given wire name.
    #[must_use]
    pub fn with_category(self, wire_name: &str, response: MockResponse) -> Self {
        self.set_category(wire_name, response);
        self
    }

    /// Delays every response by `latency`.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.routes().latency = latency;
        self
    }

    /// Replaces the token endpoint response.
    pub fn set_token(&self, response: MockResponse) {
        self.routes().token = Some(response);
    }

    /// Replaces the response for one category.
    pub fn set_category(&self, wire_name: &str, response: MockResponse) {
        self.routes()
            .categories
            .insert(wire_name.to_string(), response);
    }

    /// Returns every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.routes().requests.clone()
    }

    fn resolve(&self, request: HttpRequest) -> (Option<MockResponse>, Duration) {
        let mut routes = self.routes();
        let response = if request.method == Method::GET {
            routes.token.clone()
        } else {
            request
                .body
                .as_deref()
                .and_then(|body| serde_json::from_str::<serde_json::Value>(body).ok())
                .and_then(|body| body.get("type").and_then(|t| t.as_str()).map(str::to_owned))
                .and_then(|kind| routes.categories.get(&kind).cloned())
        };
        let latency = routes.latency;
        routes.requests.push(request);
        (response, latency)
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let (response, latency) = self.resolve(request);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match response {
            Some(MockResponse::Reply { status, body }) => Ok(HttpResponse { status, body }),
            Some(MockResponse::Timeout) | None => Err(Error::Timeout(latency)),
        }
    }
}
