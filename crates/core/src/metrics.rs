//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog retrieval (attempts per endpoint, latency)
//! - Realtime client (connections, scheduled reconnects, give-ups)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog fetch attempts by result.
pub static CATALOG_FETCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "storefront_catalog_fetch_attempts_total",
            "Catalog endpoint fetch attempts",
        ),
        &["result"], // "success", "unreachable", "malformed"
    )
    .unwrap()
});

/// Catalog request duration in seconds, per resource path.
pub static CATALOG_FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "storefront_catalog_fetch_duration_seconds",
            "Duration of a single catalog endpoint request",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["path"],
    )
    .unwrap()
});

// =============================================================================
// Realtime Client Metrics
// =============================================================================

/// Successful realtime connections.
pub static REALTIME_CONNECTIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "storefront_realtime_connections_total",
        "Realtime client connections established",
    )
    .unwrap()
});

/// Reconnects scheduled after an unexpected close.
pub static REALTIME_RECONNECTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "storefront_realtime_reconnects_total",
        "Realtime reconnect attempts scheduled",
    )
    .unwrap()
});

/// Times the client stopped reconnecting after exhausting its attempts.
pub static REALTIME_GIVE_UPS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "storefront_realtime_give_ups_total",
        "Realtime clients that exhausted their reconnect attempts",
    )
    .unwrap()
});

/// All core metrics, for registration in the server's registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Catalog
        Box::new(CATALOG_FETCH_ATTEMPTS.clone()),
        Box::new(CATALOG_FETCH_DURATION.clone()),
        // Realtime
        Box::new(REALTIME_CONNECTIONS.clone()),
        Box::new(REALTIME_RECONNECTS.clone()),
        Box::new(REALTIME_GIVE_UPS.clone()),
    ]
}
