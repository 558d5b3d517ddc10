//! CORS and metrics middleware.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use storefront_core::config::CorsConfig;
use tracing::warn;

use crate::metrics::{HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};
use crate::state::AppState;

/// Path label for requests that matched no route.
pub const FALLBACK_PATH_LABEL: &str = "fallback";

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
///
/// The path label is the matched route template (e.g. `/api/products/{id}`);
/// requests that only reach the static fallback share [`FALLBACK_PATH_LABEL`].
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| FALLBACK_PATH_LABEL.to_string());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// CORS middleware that adds the configured headers to every response.
///
/// The allowed origin is the request's `Origin`, or `*` when absent.
/// `OPTIONS` requests are answered here with 204 and never reach a handler.
pub async fn cors_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .filter(|origin| !origin.is_empty())
        .cloned();

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    apply_cors_headers(response.headers_mut(), origin, &state.config().cors);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: Option<HeaderValue>, cors: &CorsConfig) {
    let echoes_origin = origin.is_some();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        origin.unwrap_or_else(|| HeaderValue::from_static("*")),
    );
    if echoes_origin {
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }

    for (name, value) in [
        (header::ACCESS_CONTROL_ALLOW_METHODS, &cors.allow_methods),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, &cors.allow_headers),
    ] {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(e) => warn!("Invalid CORS header value for {}: {}", name, e),
        }
    }

    if cors.allow_credentials {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use storefront_core::testing::MockCatalogSource;
    use storefront_core::load_config_from_str;
    use tower::ServiceExt;

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    fn create_test_state(extra: &str) -> Arc<AppState> {
        let toml = format!("[storefront]\nvariant = \"waterlily\"\n{}", extra);
        let config = load_config_from_str(&toml).unwrap();
        Arc::new(AppState::new(config, Arc::new(MockCatalogSource::new())))
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/test", get(dummy_handler))
            .route("/items/{id}", get(dummy_handler))
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn_with_state(state.clone(), cors_middleware))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_cors_echoes_origin() {
        let request = Request::builder()
            .uri("/test")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = app(create_test_state("")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::VARY], "Origin");
    }

    #[tokio::test]
    async fn test_cors_wildcard_without_origin() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app(create_test_state("")).oneshot(request).await.unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response.headers().get(header::VARY).is_none());
    }

    #[tokio::test]
    async fn test_options_short_circuits() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/not-a-route")
            .body(Body::empty())
            .unwrap();

        let response = app(create_test_state("")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        use http_body_util::BodyExt;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_credentials_header_can_be_disabled() {
        let state = create_test_state("[cors]\nallow_credentials = false\n");
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_on_error_responses() {
        let request = Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();

        let response = app(create_test_state("")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_metrics_label_route_template_not_raw_path() {
        let state = create_test_state("");
        for uri in ["/shop/item-x0", "/shop/item-x1", "/shop/item-x2", "/items/7"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            app(state.clone()).oneshot(request).await.unwrap();
        }

        let output = crate::metrics::encode_metrics().unwrap();
        assert!(!output.contains("/shop/item-x"));
        assert!(!output.contains("/items/7"));
        assert!(output.contains(r#"path="/items/{id}""#));
        assert!(output.contains(&format!(r#"path="{}""#, FALLBACK_PATH_LABEL)));
    }
}
