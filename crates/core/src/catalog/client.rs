//! HTTP catalog client with ordered endpoint fallback.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use super::types::{CatalogItem, CatalogSnapshot};
use super::{CatalogError, CatalogSource};
use crate::config::CatalogConfig;
use crate::metrics::{CATALOG_FETCH_ATTEMPTS, CATALOG_FETCH_DURATION};

const PRODUCTS_PATH: &str = "/products";
const CATEGORIES_PATH: &str = "/products/categories";

/// Catalog client that walks an ordered list of base URLs.
///
/// Each request has its own timeout. A timeout, connection error, non-2xx
/// status or undecodable body counts as an endpoint failure; the client logs it
/// and moves on without retrying the same endpoint.
pub struct HttpCatalogClient {
    client: Client,
    endpoints: Vec<String>,
}

impl HttpCatalogClient {
    /// Create a client from configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::build(
            config.endpoints.clone(),
            config.timeout(),
            &config.user_agent,
        )
    }

    /// Create a client with explicit endpoints and timeout.
    pub fn with_timeout(endpoints: Vec<String>, timeout: Duration) -> Result<Self, CatalogError> {
        Self::build(endpoints, timeout, "storefront-core")
    }

    fn build(
        endpoints: Vec<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, CatalogError> {
        if endpoints.is_empty() {
            return Err(CatalogError::NoEndpoints);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        let endpoints = endpoints
            .into_iter()
            .map(|e| e.trim_end_matches('/').to_string())
            .collect();

        Ok(Self { client, endpoints })
    }

    /// Configured base URLs, in the order they are tried.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// GET `path` from each endpoint in turn until one yields a `T`.
    ///
    /// Returns the decoded body and the endpoint that served it.
    async fn first_success<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(T, String), CatalogError> {
        let mut failures = Vec::with_capacity(self.endpoints.len());

        for endpoint in &self.endpoints {
            let started = Instant::now();
            let result = self.get_json::<T>(endpoint, path).await;
            CATALOG_FETCH_DURATION
                .with_label_values(&[path])
                .observe(started.elapsed().as_secs_f64());

            match result {
                Ok(value) => {
                    CATALOG_FETCH_ATTEMPTS.with_label_values(&["success"]).inc();
                    return Ok((value, endpoint.clone()));
                }
                Err(e) => {
                    let label = match e {
                        CatalogError::Deserialization { .. } => "malformed",
                        _ => "unreachable",
                    };
                    CATALOG_FETCH_ATTEMPTS.with_label_values(&[label]).inc();
                    warn!("Failed to fetch {}{}: {}", endpoint, path, e);
                    failures.push(e);
                }
            }
        }

        Err(CatalogError::AllEndpointsUnreachable { failures })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        path: &str,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", endpoint, path);
        debug!("Catalog request: GET {}", url);

        let unreachable = |reason: String| CatalogError::EndpointUnreachable {
            endpoint: endpoint.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| unreachable(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unreachable(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| unreachable(describe_transport_error(&e)))?;

        serde_json::from_slice(&body).map_err(|e| CatalogError::Deserialization {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Upstream product list kept as received, once it is known to decode.
struct RawProducts(serde_json::Value);

impl<'de> Deserialize<'de> for RawProducts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Vec::<CatalogItem>::deserialize(&value).map_err(de::Error::custom)?;
        Ok(RawProducts(value))
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch_catalog(&self) -> Result<CatalogSnapshot, CatalogError> {
        let (items, source) = self.first_success::<Vec<CatalogItem>>(PRODUCTS_PATH).await?;
        info!("Loaded {} products from {}", items.len(), source);
        Ok(CatalogSnapshot::new(items, source))
    }

    async fn fetch_catalog_raw(&self) -> Result<serde_json::Value, CatalogError> {
        let (RawProducts(raw), source) = self.first_success::<RawProducts>(PRODUCTS_PATH).await?;
        debug!("Loaded raw product list from {}", source);
        Ok(raw)
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
        let (categories, source) = self.first_success::<Vec<String>>(CATEGORIES_PATH).await?;
        debug!("Loaded {} categories from {}", categories.len(), source);
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_endpoints() {
        let result = HttpCatalogClient::with_timeout(vec![], Duration::from_secs(1));
        assert!(matches!(result, Err(CatalogError::NoEndpoints)));
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let client = HttpCatalogClient::with_timeout(
            vec![
                "http://localhost:5217/api/".to_string(),
                "https://fakestoreapi.com".to_string(),
            ],
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.endpoints(),
            &["http://localhost:5217/api", "https://fakestoreapi.com"]
        );
    }

    #[test]
    fn test_new_from_config_uses_defaults() {
        let client = HttpCatalogClient::new(&CatalogConfig::default()).unwrap();
        assert_eq!(client.endpoints(), &["https://fakestoreapi.com"]);
    }

    #[tokio::test]
    async fn test_all_endpoints_unreachable() {
        // Port 9 (discard) on localhost is closed on any sane test machine.
        let client = HttpCatalogClient::with_timeout(
            vec![
                "http://127.0.0.1:9".to_string(),
                "http://127.0.0.1:9/api".to_string(),
            ],
            Duration::from_millis(500),
        )
        .unwrap();

        let err = client.fetch_catalog().await.unwrap_err();
        match err {
            CatalogError::AllEndpointsUnreachable { failures } => {
                assert_eq!(failures.len(), 2);
                assert!(failures
                    .iter()
                    .all(|f| matches!(f, CatalogError::EndpointUnreachable { .. })));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
