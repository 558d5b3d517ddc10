use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::middleware::{cors_middleware, metrics_middleware};
use super::{handlers, products, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let frontend_dir = state.config().server.frontend_dir.clone();

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Products (upstream catalog proxy)
        .route("/products", get(products::list_products))
        .route("/products/categories", get(products::list_categories))
        .route("/products/browse", get(products::browse_products))
        .route("/products/{id}", get(products::get_product));

    // Serve frontend with SPA fallback
    let index_path = frontend_dir.join("index.html");
    let serve_dir = ServeDir::new(&frontend_dir).fallback(ServeFile::new(index_path));

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(handlers::metrics))
        .route("/manifest.json", get(handlers::manifest))
        .route("/ws", get(ws::ws_handler))
        .route("/ws/", get(ws::ws_handler))
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            cors_middleware,
        ))
        .with_state(state)
}
