//! Testing utilities and mock implementations.
//!
//! Mocks for the catalog and realtime seams, so the server and the client
//! state machines can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_core::testing::{fixtures, MockCatalogSource, MockTransport};
//!
//! let catalog = MockCatalogSource::with_items(fixtures::sample_catalog());
//! let transport = MockTransport::new();
//! let peer = transport.push_connection().await;
//!
//! // Use in AppState or RealtimeClient...
//! ```

mod mock_catalog;
mod mock_transport;

pub use mock_catalog::{MockCatalogSource, MOCK_ENDPOINT};
pub use mock_transport::{MockPeer, MockTransport};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{CatalogItem, Price, ProductId, Rating};

    /// Create a catalog item with reasonable defaults.
    pub fn catalog_item(id: ProductId, title: &str, price_cents: u64, category: &str) -> CatalogItem {
        CatalogItem {
            id,
            title: title.to_string(),
            price: Price::from_cents(price_cents),
            category: category.to_string(),
            description: format!("{} description", title),
            image: format!("https://fakestoreapi.com/img/{}.jpg", id),
            rating: Rating {
                rate: 4.0,
                count: 100 + id as u32,
            },
        }
    }

    /// A small catalog in the upstream shape, spanning four categories.
    pub fn sample_catalog() -> Vec<CatalogItem> {
        let mut items = vec![
            catalog_item(1, "Fjallraven Backpack", 10995, "men's clothing"),
            catalog_item(2, "Mens Casual Premium Slim Fit T-Shirts", 2230, "men's clothing"),
            catalog_item(3, "Mens Cotton Jacket", 5599, "men's clothing"),
            catalog_item(4, "John Hardy Chain Bracelet", 69500, "jewelery"),
            catalog_item(5, "Solid Gold Petite Micropave", 16800, "jewelery"),
            catalog_item(6, "WD 2TB Elements Portable Hard Drive", 6400, "electronics"),
            catalog_item(7, "SanDisk SSD PLUS 1TB", 10900, "electronics"),
            catalog_item(8, "Womens Rain Jacket", 3999, "women's clothing"),
            catalog_item(9, "Womens Short Sleeve Shirt", 999, "women's clothing"),
            catalog_item(10, "Womens Cotton Tee", 1299, "women's clothing"),
        ];
        items[3].description = "Inspired by the mythical water dragon".to_string();
        items[8].description = "Lightweight, perfect for a shirt and jacket combo".to_string();
        items
    }

    /// `count` items cycling through three categories.
    pub fn numbered_catalog(count: u64) -> Vec<CatalogItem> {
        const CATEGORIES: [&str; 3] = ["a", "b", "c"];
        (1..=count)
            .map(|id| {
                catalog_item(
                    id,
                    &format!("Product {}", id),
                    id * 100,
                    CATEGORIES[(id as usize - 1) % CATEGORIES.len()],
                )
            })
            .collect()
    }
}
