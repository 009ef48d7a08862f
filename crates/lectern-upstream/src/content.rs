//! Signed content requests and payload decoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::category::Category;
use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::rewrite::Rewriter;
use crate::token::Credential;
use crate::transport::{HttpRequest, Transport, browser_headers};

/// Header carrying the credential timestamp.
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Header carrying the credential signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Fetches and decodes one category at a time.
#[derive(Debug, Clone)]
pub struct ContentFetcher<T> {
    transport: T,
    endpoint: Url,
    headers: HeaderMap,
    rewriter: Rewriter,
}

impl<T: Transport> ContentFetcher<T> {
    /// Creates a fetcher for the configured content endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured headers are invalid.
    pub fn new(transport: T, config: &UpstreamConfig, rewriter: Rewriter) -> Result<Self> {
        let mut headers = browser_headers(config)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            transport,
            endpoint: config.content_url.clone(),
            headers,
            rewriter,
        })
    }

    /// Returns the rewriter applied to fetched records.
    #[must_use]
    pub const fn rewriter(&self) -> &Rewriter {
        &self.rewriter
    }

    fn signed_headers(&self, credential: &Credential) -> Result<HeaderMap> {
        let mut headers = self.headers.clone();
        let timestamp = HeaderValue::from_str(&credential.timestamp.to_string())
            .map_err(|e| Error::auth(format!("unusable credential timestamp: {e}")))?;
        let signature = HeaderValue::from_str(&credential.signature)
            .map_err(|e| Error::auth(format!("unusable credential signature: {e}")))?;
        headers.insert(TIMESTAMP_HEADER, timestamp);
        headers.insert(SIGNATURE_HEADER, signature);
        Ok(headers)
    }

    /// Fetches one category and returns its rewritten records.
    ///
    /// An upstream response without `data` is a valid empty category.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails, [`Error::Status`] for
    /// a non-2xx reply, or [`Error::Parse`] if the payload cannot be decoded.
    pub async fn fetch_category(
        &self,
        category: Category,
        credential: &Credential,
    ) -> Result<Vec<Record>> {
        let body = serde_json::json!({ "type": category.wire_name() }).to_string();
        let request = HttpRequest::post(
            self.endpoint.clone(),
            self.signed_headers(credential)?,
            body,
        );

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            warn!(%category, status = response.status, "content endpoint returned non-success status");
            return Err(Error::Status(response.status));
        }

        let payload = decode_payload(&response.body)?;
        let records = self.rewriter.transform_value(payload);
        debug!(%category, count = records.len(), "decoded category");
        Ok(records)
    }
}

/// Unwraps a content response body into the decoded JSON payload.
///
/// Returns an empty array when `data` is absent, null or an empty string.
/// When the decoded payload is an object carrying an array `data`, that
/// inner array is returned instead (exactly one level).
///
/// # Errors
///
/// Returns [`Error::Parse`] if the body is not JSON, `data` is not a string,
/// or the decoded bytes are not base64-encoded UTF-8 JSON.
pub fn decode_payload(body: &str) -> Result<Value> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|e| Error::parse(format!("content response is not valid JSON: {e}")))?;

    let encoded = match envelope.get("data") {
        None | Some(Value::Null) => return Ok(Value::Array(Vec::new())),
        Some(Value::String(s)) if s.is_empty() => return Ok(Value::Array(Vec::new())),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(Error::parse(format!(
                "content data is not a string but {}",
                json_kind(other)
            )));
        }
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::parse(format!("content data is not base64: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::parse(format!("content data is not UTF-8: {e}")))?;
    let decoded: Value = serde_json::from_str(&text)
        .map_err(|e| Error::parse(format!("decoded content is not valid JSON: {e}")))?;

    Ok(unwrap_inner(decoded))
}

fn unwrap_inner(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_array) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
