//! Short-lived request credentials.

use std::fmt;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, Transport, browser_headers};

/// Credential timestamp; the upstream sends either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Numeric timestamp.
    Int(i64),
    /// Textual timestamp.
    Text(String),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Timestamp and signature pair required on every content request.
///
/// Valid for a single refresh cycle; expiry is enforced by the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Issue timestamp, sent back as `x-timestamp`.
    pub timestamp: Timestamp,
    /// Request signature, sent back as `x-signature`.
    pub signature: String,
}

impl Credential {
    /// Creates a credential.
    #[must_use]
    pub fn new(timestamp: Timestamp, signature: impl Into<String>) -> Self {
        Self {
            timestamp,
            signature: signature.into(),
        }
    }

    /// Parses a token endpoint response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the body is an HTML page, is not JSON, or
    /// lacks a usable `timestamp` or `signature`.
    pub fn from_body(body: &str) -> Result<Self> {
        if looks_like_markup(body) {
            return Err(Error::auth(
                "token endpoint returned an HTML document instead of JSON",
            ));
        }

        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::auth(format!("token response is not valid JSON: {e}")))?;

        let timestamp = match value.get("timestamp") {
            Some(Value::Number(n)) => n.as_i64().map(Timestamp::Int),
            Some(Value::String(s)) if !s.is_empty() => Some(Timestamp::Text(s.clone())),
            _ => None,
        }
        .ok_or_else(|| Error::auth("token response has no timestamp"))?;

        let signature = value
            .get("signature")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::auth("token response has no signature"))?;

        Ok(Self::new(timestamp, signature))
    }
}

/// Bot-challenge and error pages start with markup rather than JSON.
fn looks_like_markup(body: &str) -> bool {
    let head = body.trim_start_matches('\u{feff}').trim_start();
    head.starts_with('<')
}

/// Fetches credentials from the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenProvider<T> {
    transport: T,
    endpoint: Url,
    headers: HeaderMap,
}

impl<T: Transport> TokenProvider<T> {
    /// Creates a token provider for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured headers are invalid.
    pub fn new(transport: T, config: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            transport,
            endpoint: config.token_url.clone(),
            headers: browser_headers(config)?,
        })
    }

    /// Requests a fresh credential.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails, or [`Error::Auth`]
    /// if the response does not carry a credential.
    pub async fn get_token(&self) -> Result<Credential> {
        let request = HttpRequest::get(self.endpoint.clone(), self.headers.clone());
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "token endpoint returned non-success status");
        }

        let credential = Credential::from_body(&response.body).map_err(|err| match err {
            Error::Auth(message) if !response.is_success() => {
                Error::Auth(format!("{message} (status {})", response.status))
            }
            other => other,
        })?;

        debug!(timestamp = %credential.timestamp, "acquired upstream credential");
        Ok(credential)
    }
}
