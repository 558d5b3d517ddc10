//! Client-side shopping cart.

mod ledger;

pub use ledger::{Cart, CartLine};
