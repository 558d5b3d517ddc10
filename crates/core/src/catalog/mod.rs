//! Product catalog retrieval.
//!
//! The catalog is fetched wholesale from one of an ordered list of upstream
//! endpoints. Each endpoint is a base URL exposing `/products` and
//! `/products/categories`; the first endpoint that answers with well-formed
//! JSON wins.

mod client;
mod types;

pub use client::HttpCatalogClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when retrieving the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A single endpoint failed at the transport or HTTP level (including timeouts).
    #[error("Endpoint {endpoint} unreachable: {reason}")]
    EndpointUnreachable { endpoint: String, reason: String },

    /// A single endpoint answered, but not with a decodable catalog.
    #[error("Endpoint {endpoint} returned malformed data: {reason}")]
    Deserialization { endpoint: String, reason: String },

    /// Every candidate endpoint failed.
    #[error(
        "Failed to load products from {} catalog endpoint(s). Check that the backend server is running and reachable, then try again. Last error: {}",
        .failures.len(),
        last_failure(.failures)
    )]
    AllEndpointsUnreachable { failures: Vec<CatalogError> },

    /// No endpoints to try.
    #[error("No catalog endpoints configured")]
    NoEndpoints,

    /// Requested product is not in the catalog.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

fn last_failure(failures: &[CatalogError]) -> String {
    failures.last().map(|f| f.to_string()).unwrap_or_default()
}

/// Source of catalog data.
///
/// Implemented by [`HttpCatalogClient`] and by the mock in
/// [`crate::testing`].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the complete product list.
    async fn fetch_catalog(&self) -> Result<CatalogSnapshot, CatalogError>;

    /// Fetch the product list as the upstream served it.
    ///
    /// The body must still decode as a product list, but fields the catalog
    /// model does not know are kept. The default re-encodes
    /// [`fetch_catalog`](Self::fetch_catalog).
    async fn fetch_catalog_raw(&self) -> Result<serde_json::Value, CatalogError> {
        let snapshot = self.fetch_catalog().await?;
        serde_json::to_value(&snapshot.items).map_err(|e| CatalogError::Deserialization {
            endpoint: snapshot.source,
            reason: e.to_string(),
        })
    }

    /// Fetch the category list.
    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError>;

    /// Fetch a single product by id.
    async fn fetch_product(&self, id: ProductId) -> Result<CatalogItem, CatalogError> {
        let snapshot = self.fetch_catalog().await?;
        snapshot
            .items
            .into_iter()
            .find(|item| item.id == id)
            .ok_or(CatalogError::ProductNotFound(id))
    }
}
