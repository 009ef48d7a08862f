//! HTTP surface: lecture API, health check and the rendered page.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header, uri::Authority},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{MethodRouter, get},
};
use chrono::{DateTime, Utc};
use lectern_core::{Environment, ServerConfig, SnapshotStore};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::debug;

use crate::render::render_page;

/// Content security policy applied to every response.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' https://fonts.googleapis.com 'unsafe-inline'; \
style-src 'self' https://fonts.googleapis.com 'unsafe-inline'; \
font-src 'self' https://fonts.gstatic.com; \
frame-ancestors 'none'; \
connect-src 'self'; \
img-src 'self' data: https://placehold.co";

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
    pub environment: Environment,
    pub brand: Arc<str>,
}

/// Health check response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Rejects API calls whose `Referer` does not mention this host.
///
/// Only enforced in production.
async fn referer_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.environment.is_production() {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(Authority::as_str));
    let referer = request
        .headers()
        .get(header::REFERER)
        .and_then(|h| h.to_str().ok());

    let allowed = match (referer, host) {
        (Some(referer), Some(host)) => !host.is_empty() && referer.contains(host),
        _ => false,
    };
    if !allowed {
        debug!(?referer, ?host, "rejected API request with foreign referer");
        return (StatusCode::FORBIDDEN, "Forbidden: Invalid Referer").into_response();
    }

    next.run(request).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(list))
        .allow_methods([Method::GET])
}

/// Creates the router.
///
/// Requests that match no route are served from `config.static_dir` when
/// set, falling back to the rendered page.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/api/lectures", get(lectures_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), referer_guard));

    let page: MethodRouter = get(page_handler).with_state(state.clone());
    let router = Router::new()
        .merge(api)
        .route("/health", get(health_handler))
        .route("/", get(page_handler));

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).fallback(page)),
        None => router.fallback_service(page),
    };

    router
        .layer(cors_layer(&config.allowed_origins))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

/// Current snapshot, straight from memory.
async fn lectures_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.read())
}

/// Health check; always 200 while the process is up.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        last_updated: state.store.last_updated(),
    })
}

async fn page_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.store.read(), &state.brand, Utc::now()))
}

// Binary crate without lib.rs: router tests live here.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use lectern_core::Refresher;
    use lectern_upstream::{MockResponse, MockTransport, Rewriter, UpstreamConfig};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_state(environment: Environment) -> AppState {
        AppState {
            store: SnapshotStore::new(),
            environment,
            brand: Arc::from("Smartrz"),
        }
    }

    fn app(state: AppState) -> Router {
        create_router(state, &ServerConfig::default())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn populated_store() -> SnapshotStore {
        let transport = MockTransport::new()
            .with_token(MockResponse::token(1, "sig"))
            .with_category(
                "live",
                MockResponse::payload(&json!([{ "title": "rolexcoderz Math" }])),
            )
            .with_category("up", MockResponse::ok("{}"))
            .with_category("completed", MockResponse::ok("{}"))
            .with_category("notifications", MockResponse::ok("{}"));
        let config = UpstreamConfig::builder().build().unwrap();
        let refresher =
            Refresher::from_config(transport, &config, Rewriter::default(), SnapshotStore::new())
                .unwrap();
        refresher.refresh().await;
        refresher.store().clone()
    }

    #[tokio::test]
    async fn test_health_before_first_refresh() {
        let (status, body) = get_json(app(test_state(Environment::Development)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "lastUpdated": null }));
    }

    #[tokio::test]
    async fn test_lectures_serves_snapshot() {
        let mut state = test_state(Environment::Development);
        state.store = populated_store().await;

        let (status, body) = get_json(app(state), "/api/lectures").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["live"], json!([{ "title": "Smartrz Math" }]));
        assert_eq!(body["up"], json!([]));
        assert_eq!(body["notifications"], json!([]));
        assert!(body["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn test_empty_snapshot_shape() {
        let (_, body) = get_json(app(test_state(Environment::Development)), "/api/lectures").await;
        assert_eq!(
            body,
            json!({
                "live": [],
                "up": [],
                "completed": [],
                "notifications": [],
                "lastUpdated": null
            })
        );
    }

    #[tokio::test]
    async fn test_referer_required_in_production() {
        let app = app(test_state(Environment::Production));

        let rejected = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/lectures")
                    .header(header::HOST, "lectern.example")
                    .header(header::REFERER, "https://elsewhere.example/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(rejected.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Forbidden: Invalid Referer");

        let accepted = app
            .oneshot(
                Request::builder()
                    .uri("/api/lectures")
                    .header(header::HOST, "lectern.example")
                    .header(header::REFERER, "https://lectern.example/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(accepted.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ignores_referer_check() {
        let (status, _) = get_json(app(test_state(Environment::Production)), "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_security_headers_and_page_fallback() {
        let response = app(test_state(Environment::Development))
            .oneshot(
                Request::builder()
                    .uri("/some/client/route")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(
            response.headers()[header::CONTENT_SECURITY_POLICY],
            CONTENT_SECURITY_POLICY
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<h2>Recorded</h2>"));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_only() {
        let config = ServerConfig {
            allowed_origins: vec!["https://friend.example".to_string()],
            ..ServerConfig::default()
        };
        let app = create_router(test_state(Environment::Development), &config);

        let allowed = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://friend.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://friend.example"
        );

        let foreign = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://stranger.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(
            !foreign
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }
}
