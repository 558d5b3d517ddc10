use std::num::NonZeroUsize;
use std::sync::Arc;

use storefront_core::{CatalogSource, Config, SearchScope, StorefrontVariant};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<dyn CatalogSource>,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<dyn CatalogSource>) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &dyn CatalogSource {
        self.catalog.as_ref()
    }

    pub fn variant(&self) -> StorefrontVariant {
        self.config.storefront.variant
    }

    /// Fields searched by server-side filtering.
    pub fn search_scope(&self) -> SearchScope {
        self.variant().search_scope()
    }

    /// Default page size for the browse endpoint.
    pub fn page_size(&self) -> NonZeroUsize {
        self.config.storefront.page_size()
    }
}
