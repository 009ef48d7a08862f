//! Browser-like request headers.
//!
//! The upstream sits behind bot mitigation that rejects requests which do not
//! look like they came from its own web page.

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// Builds the header set shared by token and content requests.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if the configured user agent or referer
/// contains characters that are not allowed in a header value.
pub fn browser_headers(config: &UpstreamConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(USER_AGENT, &config.user_agent)?);
    headers.insert(REFERER, header_value(REFERER, &config.referer)?);
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
    );

    if let Some(origin) = origin_of(&config.referer) {
        headers.insert(ORIGIN, header_value(ORIGIN, &origin)?);
    }

    Ok(headers)
}

fn header_value(name: HeaderName, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidConfig(format!("invalid {name} header value: {e}")))
}

fn origin_of(referer: &str) -> Option<String> {
    let url = Url::parse(referer).ok()?;
    let origin = url.origin();
    origin
        .is_tuple()
        .then(|| origin.ascii_serialization())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers_present() {
        let config = UpstreamConfig::builder().build().unwrap();
        let headers = browser_headers(&config).unwrap();

        assert_eq!(headers[REFERER], "https://rolexcoderz.in/live-classes");
        assert_eq!(headers[ORIGIN], "https://rolexcoderz.in");
        assert!(
            headers[USER_AGENT]
                .to_str()
                .unwrap()
                .starts_with("Mozilla/5.0")
        );
        assert_eq!(headers[ACCEPT], ACCEPT_VALUE);
    }

    #[test]
    fn test_opaque_referer_has_no_origin() {
        let config = UpstreamConfig::builder()
            .referer("not-a-url")
            .build()
            .unwrap();
        let headers = browser_headers(&config).unwrap();

        assert_eq!(headers[REFERER], "not-a-url");
        assert!(headers.get(ORIGIN).is_none());
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let config = UpstreamConfig::builder()
            .user_agent("bad\nagent")
            .build()
            .unwrap();
        let err = browser_headers(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
