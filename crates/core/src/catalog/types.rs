//! Product catalog types as served by the upstream catalog API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Identifier of a catalog item, unique within one snapshot.
pub type ProductId = u64;

/// A non-negative amount of money, held as whole cents so sums stay exact.
///
/// On the wire it is a plain JSON number (`109.95`); fractional cents are
/// rounded to the nearest cent when decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Price of `quantity` units.
    pub fn times(&self, quantity: u32) -> Price {
        Price(self.0.saturating_mul(u64::from(quantity)))
    }
}

impl TryFrom<f64> for Price {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(format!("price must be a finite number, got {}", value));
        }
        if value < 0.0 {
            return Err(format!("price cannot be negative, got {}", value));
        }
        Ok(Price((value * 100.0).round() as u64))
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.as_f64()
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Average score, 0 to 5.
    #[serde(default)]
    pub rate: f32,
    /// Number of ratings.
    #[serde(default)]
    pub count: u32,
}

/// One sellable product record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Compared case-insensitively.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Image URI.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
}

/// A complete catalog as returned by one successful fetch.
///
/// Snapshots are never patched; a new fetch replaces the whole thing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub items: Vec<CatalogItem>,
    /// Endpoint that served this snapshot.
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn new(items: Vec<CatalogItem>, source: impl Into<String>) -> Self {
        Self {
            items,
            source: source.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: ProductId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        unique_categories(&self.items)
    }
}

/// Distinct categories of `items`, in the order they first appear.
pub fn unique_categories(items: &[CatalogItem]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for item in items {
        if !categories.iter().any(|c| c == &item.category) {
            categories.push(item.category.clone());
        }
    }
    categories
}
