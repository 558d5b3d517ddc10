//! Product API handlers.
//!
//! Proxies the upstream catalog. Listing without filters returns the
//! upstream product JSON as served, unknown fields included; with a category
//! or search term the list is filtered here using the storefront's search
//! scope.

use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use storefront_core::browse::{FilterState, Page};
use storefront_core::{CatalogError, CatalogItem, ProductId};
use tracing::{debug, error};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProductQueryParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ProductQueryParams {
    fn filter(&self) -> FilterState {
        let mut filter = FilterState::default();
        if let Some(category) = &self.category {
            filter.category = category.clone();
        }
        if let Some(search) = &self.search {
            filter.search_term = search.clone();
        }
        filter
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BrowseQueryParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    /// 1-based page number (default 1)
    #[serde(default)]
    pub page: Option<usize>,
    /// Overrides the storefront's page size
    #[serde(default)]
    pub page_size: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn catalog_error(e: CatalogError) -> (StatusCode, Json<ErrorResponse>) {
    match e {
        CatalogError::ProductNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Product {} not found", id))),
        ),
        e => {
            error!("Catalog request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        }
    }
}

/// GET /api/products?category=&search=
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductQueryParams>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let filter = params.filter();
    if filter.is_identity() {
        let raw = state
            .catalog()
            .fetch_catalog_raw()
            .await
            .map_err(catalog_error)?;
        return Ok(Json(raw).into_response());
    }

    let snapshot = state.catalog().fetch_catalog().await.map_err(catalog_error)?;
    let items = filter.apply(&snapshot.items, state.search_scope());
    debug!(
        category = %filter.category,
        search = %filter.search_term,
        matched = items.len(),
        total = snapshot.items.len(),
        "Filtered products"
    );
    Ok(Json(items).into_response())
}

/// GET /api/products/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<String>> {
    state
        .catalog()
        .fetch_categories()
        .await
        .map(Json)
        .map_err(catalog_error)
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProductId>,
) -> ApiResult<CatalogItem> {
    state
        .catalog()
        .fetch_product(id)
        .await
        .map(Json)
        .map_err(catalog_error)
}

/// GET /api/products/browse?category=&search=&page=&page_size=
///
/// Filter and paginate server-side.
pub async fn browse_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BrowseQueryParams>,
) -> ApiResult<Page<CatalogItem>> {
    let snapshot = state.catalog().fetch_catalog().await.map_err(catalog_error)?;

    let filter = ProductQueryParams {
        category: params.category,
        search: params.search,
    }
    .filter();
    let filtered = filter.apply(&snapshot.items, state.search_scope());

    let page_size = params
        .page_size
        .and_then(NonZeroUsize::new)
        .unwrap_or_else(|| state.page_size());
    let page = params.page.unwrap_or(1);

    Ok(Json(Page::of(&filtered, page_size, page)))
}
