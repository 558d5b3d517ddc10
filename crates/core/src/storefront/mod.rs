//! Storefront page state: catalog, filters, pagination and cart.

mod view;

pub use view::Storefront;
