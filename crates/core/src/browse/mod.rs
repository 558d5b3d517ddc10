//! In-memory catalog browsing: category/search filtering and pagination.
//!
//! Everything here is pure. Filtering is a selection that keeps catalog
//! order; pagination slices the filtered list into fixed-size, 1-indexed pages.

mod filter;
mod paginate;

pub use filter::*;
pub use paginate::*;
