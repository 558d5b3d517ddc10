pub mod browse;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod metrics;
pub mod realtime;
pub mod storefront;
pub mod testing;

pub use browse::{apply_filters, page_window, paginate, total_pages, FilterState, SearchScope};
pub use cart::{Cart, CartLine};
pub use catalog::{
    CatalogError, CatalogItem, CatalogSnapshot, CatalogSource, HttpCatalogClient, Price,
    ProductId, Rating,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, StorefrontVariant,
};
pub use realtime::{
    ConnectionState, DisconnectReason, InboundMessage, RealtimeClient, RealtimeError,
    RealtimeEvent, ReconnectPolicy, TungsteniteTransport,
};
pub use storefront::Storefront;
