//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that builds the full router with a
//! mock catalog source injected, so the API can be exercised without the
//! upstream catalog service.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use storefront_core::config::{
    CatalogConfig, Config, CorsConfig, RealtimeConfig, ServerConfig, StorefrontConfig,
};
use storefront_core::testing::MockCatalogSource;
use storefront_core::StorefrontVariant;
use storefront_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use storefront_core::testing::fixtures;

/// Contents of the fake frontend's index page.
pub const INDEX_HTML: &str = "<!doctype html><title>storefront</title>";

/// Test fixture with a mock catalog.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_products() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.get("/api/products?category=jewelery").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure products and failures
    pub catalog: Arc<MockCatalogSource>,
    /// Frontend directory with an `index.html`
    pub frontend_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body, or `Null` if empty or not JSON
    pub body: Value,
    /// Raw body text
    pub text: String,
}

impl TestFixture {
    /// Create a Vervida fixture serving the sample catalog.
    pub async fn new() -> Self {
        Self::with_variant(StorefrontVariant::Vervida).await
    }

    /// Create a fixture for the given storefront variant.
    pub async fn with_variant(variant: StorefrontVariant) -> Self {
        let frontend_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(frontend_dir.path().join("index.html"), INDEX_HTML)
            .expect("Failed to write index.html");

        let catalog = Arc::new(MockCatalogSource::with_items(fixtures::sample_catalog()));

        let config = Config {
            storefront: StorefrontConfig {
                variant,
                page_size: None,
                display_name: None,
            },
            server: ServerConfig {
                frontend_dir: frontend_dir.path().to_path_buf(),
                ..Default::default()
            },
            catalog: CatalogConfig::default(),
            cors: CorsConfig::default(),
            realtime: RealtimeConfig::default(),
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&catalog) as Arc<dyn storefront_core::CatalogSource>,
        ));
        let router = create_router(state);

        Self {
            router,
            catalog,
            frontend_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, &[]).await
    }

    /// Send a request with extra headers.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}

/// Helper to assert response status with a helpful error message.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}

/// Ids of the products in a JSON array body.
pub fn ids(body: &Value) -> Vec<u64> {
    body.as_array()
        .expect("Expected a JSON array")
        .iter()
        .map(|item| item["id"].as_u64().expect("Expected numeric id"))
        .collect()
}
