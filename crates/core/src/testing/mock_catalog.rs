//! Mock catalog source for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{
    unique_categories, CatalogError, CatalogItem, CatalogSnapshot, CatalogSource,
};

/// Endpoint name reported by the mock in snapshots and errors.
pub const MOCK_ENDPOINT: &str = "mock://catalog";

/// Mock implementation of the CatalogSource trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable product list (and optionally categories)
/// - Count fetches for assertions
/// - Fail once (`set_next_error`) or until told otherwise (`set_unreachable`)
///
/// # Example
///
/// ```rust,ignore
/// use storefront_core::testing::{MockCatalogSource, fixtures};
///
/// let catalog = MockCatalogSource::new();
/// catalog.set_items(fixtures::sample_catalog()).await;
///
/// let snapshot = catalog.fetch_catalog().await?;
/// assert_eq!(catalog.fetch_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockCatalogSource {
    items: Arc<RwLock<Vec<CatalogItem>>>,
    /// Explicit category list; derived from items when unset.
    categories: Arc<RwLock<Option<Vec<String>>>>,
    next_error: Arc<RwLock<Option<CatalogError>>>,
    unreachable: AtomicBool,
    fetches: AtomicUsize,
}

impl MockCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock serving `items`.
    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            ..Self::default()
        }
    }

    pub async fn set_items(&self, items: Vec<CatalogItem>) {
        *self.items.write().await = items;
    }

    /// Override the category list instead of deriving it from the items.
    pub async fn set_categories(&self, categories: Vec<String>) {
        *self.categories.write().await = Some(categories);
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every fetch fail as if no endpoint answered.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of fetches made (successful or not).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn check_failure(&self) -> Result<(), CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CatalogError::AllEndpointsUnreachable {
                failures: vec![CatalogError::EndpointUnreachable {
                    endpoint: MOCK_ENDPOINT.to_string(),
                    reason: "connection refused".to_string(),
                }],
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn fetch_catalog(&self) -> Result<CatalogSnapshot, CatalogError> {
        self.check_failure().await?;
        let items = self.items.read().await.clone();
        Ok(CatalogSnapshot::new(items, MOCK_ENDPOINT))
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.check_failure().await?;
        if let Some(categories) = self.categories.read().await.clone() {
            return Ok(categories);
        }
        Ok(unique_categories(&self.items.read().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_serves_items() {
        let catalog = MockCatalogSource::with_items(fixtures::sample_catalog());
        let snapshot = catalog.fetch_catalog().await.unwrap();
        assert_eq!(snapshot.len(), fixtures::sample_catalog().len());
        assert_eq!(snapshot.source, MOCK_ENDPOINT);
        assert_eq!(catalog.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_categories_derived_or_overridden() {
        let catalog = MockCatalogSource::with_items(fixtures::sample_catalog());
        let derived = catalog.fetch_categories().await.unwrap();
        assert_eq!(derived[0], "men's clothing");

        catalog.set_categories(vec!["only".to_string()]).await;
        assert_eq!(catalog.fetch_categories().await.unwrap(), vec!["only"]);
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let catalog = MockCatalogSource::new();
        catalog.set_next_error(CatalogError::NoEndpoints).await;

        assert!(catalog.fetch_catalog().await.is_err());
        assert!(catalog.fetch_catalog().await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_until_cleared() {
        let catalog = MockCatalogSource::new();
        catalog.set_unreachable(true);
        assert!(matches!(
            catalog.fetch_catalog().await,
            Err(CatalogError::AllEndpointsUnreachable { .. })
        ));
        assert!(catalog.fetch_categories().await.is_err());

        catalog.set_unreachable(false);
        assert!(catalog.fetch_catalog().await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_product_uses_catalog() {
        let catalog = MockCatalogSource::with_items(fixtures::sample_catalog());
        let item = catalog.fetch_product(2).await.unwrap();
        assert_eq!(item.id, 2);

        assert!(matches!(
            catalog.fetch_product(999).await,
            Err(CatalogError::ProductNotFound(999))
        ));
    }
}
