//! End-to-end tests of credential acquisition and category decoding.
//!
//! These tests drive the public API through `MockTransport`, so no network
//! access is required.

#![allow(clippy::unwrap_used)]

use lectern_upstream::{
    Category, ContentFetcher, MockResponse, MockTransport, Rewriter, TokenProvider,
    UpstreamConfig,
};
use serde_json::json;

fn setup(transport: &MockTransport) -> (TokenProvider<MockTransport>, ContentFetcher<MockTransport>) {
    let config = UpstreamConfig::builder().build().unwrap();
    let tokens = TokenProvider::new(transport.clone(), &config).unwrap();
    let fetcher = ContentFetcher::new(transport.clone(), &config, Rewriter::default()).unwrap();
    (tokens, fetcher)
}

#[tokio::test]
async fn test_brand_is_rewritten_end_to_end() {
    let transport = MockTransport::new()
        .with_token(MockResponse::token(1_718_000_000, "sig"))
        .with_category(
            "live",
            MockResponse::payload(&json!([{ "title": "rolexcoderz Math" }])),
        );
    let (tokens, fetcher) = setup(&transport);

    let credential = tokens.get_token().await.unwrap();
    let records = fetcher
        .fetch_category(Category::Live, &credential)
        .await
        .unwrap();

    let serialized = serde_json::to_string(&records).unwrap();
    assert!(serialized.contains("Smartrz Math"));
    assert!(!serialized.to_lowercase().contains("rolexcoderz"));
}

#[tokio::test]
async fn test_double_wrapped_payload() {
    let transport = MockTransport::new()
        .with_token(MockResponse::token(1, "sig"))
        .with_category(
            "completed",
            MockResponse::payload(&json!({
                "data": [
                    { "lectureName": "Recorded 1", "link": "https://www.rolexcoderz.xyz/Player/?url=https://v/1" },
                    { "lectureName": "Recorded 2" }
                ]
            })),
        );
    let (tokens, fetcher) = setup(&transport);

    let credential = tokens.get_token().await.unwrap();
    let records = fetcher
        .fetch_category(Category::Completed, &credential)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].link(), Some("https://v/1"));
    assert_eq!(records[1].title(), Some("Recorded 2"));
}

#[tokio::test]
async fn test_empty_category_is_not_an_error() {
    let transport = MockTransport::new()
        .with_token(MockResponse::token(1, "sig"))
        .with_category("notifications", MockResponse::ok(r#"{"success":true}"#));
    let (tokens, fetcher) = setup(&transport);

    let credential = tokens.get_token().await.unwrap();
    let records = fetcher
        .fetch_category(Category::Notifications, &credential)
        .await;
    tokio_test::assert_ok!(&records);
    assert!(records.unwrap().is_empty());
}

#[tokio::test]
async fn test_html_token_page_is_auth_error() {
    let transport = MockTransport::new().with_token(MockResponse::ok(
        "<!DOCTYPE html>\n<html><head><title>Just a moment...</title></head></html>",
    ));
    let (tokens, _) = setup(&transport);

    let result = tokens.get_token().await;
    tokio_test::assert_err!(&result);
    assert!(result.unwrap_err().is_auth());
}

#[tokio::test]
async fn test_malformed_category_is_parse_error() {
    let transport = MockTransport::new()
        .with_token(MockResponse::token(1, "sig"))
        .with_category("live", MockResponse::ok("Service Unavailable"));
    let (tokens, fetcher) = setup(&transport);

    let credential = tokens.get_token().await.unwrap();
    let err = fetcher
        .fetch_category(Category::Live, &credential)
        .await
        .unwrap_err();
    assert!(matches!(err, lectern_upstream::Error::Parse(_)));
}
