use std::fmt::Display;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::browse::{
    page_window, paginate, total_pages, FilterState, SearchScope, DEFAULT_PAGE_WINDOW,
};
use crate::cart::Cart;
use crate::catalog::{CatalogItem, CatalogSnapshot, ProductId};
use crate::config::{StorefrontConfig, StorefrontVariant};

/// State behind one storefront page.
///
/// Every filter change recomputes the filtered list and returns to page 1.
#[derive(Debug, Clone)]
pub struct Storefront {
    variant: StorefrontVariant,
    page_size: NonZeroUsize,
    scope: SearchScope,
    snapshot: Option<CatalogSnapshot>,
    filter: FilterState,
    filtered: Vec<CatalogItem>,
    page: usize,
    error: Option<String>,
    cart: Cart,
}

impl Storefront {
    pub fn new(variant: StorefrontVariant, page_size: NonZeroUsize) -> Self {
        Self {
            variant,
            page_size,
            scope: variant.search_scope(),
            snapshot: None,
            filter: FilterState::default(),
            filtered: Vec::new(),
            page: 1,
            error: None,
            cart: Cart::new(),
        }
    }

    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(config.variant, config.page_size())
    }

    pub fn variant(&self) -> StorefrontVariant {
        self.variant
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Replace the catalog. Filters are kept and re-applied.
    pub fn load(&mut self, snapshot: CatalogSnapshot) {
        debug!(
            items = snapshot.len(),
            source = %snapshot.source,
            "Loaded catalog snapshot"
        );
        self.snapshot = Some(snapshot);
        self.error = None;
        self.refilter();
    }

    /// Remember a failed load so it can be shown instead of the grid.
    pub fn record_error(&mut self, error: impl Display) {
        self.error = Some(error.to_string());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> Option<&CatalogSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
        self.refilter();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.filter.category = category.into();
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
        self.refilter();
    }

    fn refilter(&mut self) {
        let catalog = self.catalog();
        self.filtered = if self.filter.is_identity() {
            catalog.to_vec()
        } else {
            self.filter.apply(catalog, self.scope)
        };
        self.page = 1;
    }

    fn catalog(&self) -> &[CatalogItem] {
        self.snapshot
            .as_ref()
            .map(|s| s.items.as_slice())
            .unwrap_or_default()
    }

    /// Jump to `page`, clamped into the valid range. No-op with no results.
    pub fn go_to_page(&mut self, page: usize) {
        let total = self.total_pages();
        if total == 0 {
            return;
        }
        self.page = page.clamp(1, total);
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn filtered_items(&self) -> &[CatalogItem] {
        &self.filtered
    }

    /// Items on the current page.
    pub fn current_items(&self) -> &[CatalogItem] {
        paginate(&self.filtered, self.page_size, self.page)
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page_size)
    }

    /// Numbered page buttons around the current page.
    pub fn page_window(&self) -> Vec<usize> {
        page_window(self.page, self.total_pages(), DEFAULT_PAGE_WINDOW)
    }

    /// Distinct categories of the loaded catalog, in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        self.snapshot
            .as_ref()
            .map(CatalogSnapshot::categories)
            .unwrap_or_default()
    }

    /// Result line shown above the grid.
    pub fn summary(&self) -> String {
        let count = self.filtered.len();
        let mut summary = if count == self.catalog().len() {
            format!("Showing all {} products", count)
        } else {
            format!("Found {} products", count)
        };

        if let Some(term) = self.filter.search() {
            summary.push_str(&format!(" matching \"{}\"", term));
        }
        if !self.filter.is_all_categories() {
            summary.push_str(&format!(" in {}", self.filter.category.trim()));
        }
        summary
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Add one unit of a catalog product to the cart. Returns `false` if the
    /// product is not in the loaded catalog.
    pub fn add_to_cart(&mut self, id: ProductId) -> bool {
        let Some(item) = self.snapshot.as_ref().and_then(|s| s.find(id)).cloned() else {
            return false;
        };
        self.cart.add_item(&item, 1);
        true
    }
}
