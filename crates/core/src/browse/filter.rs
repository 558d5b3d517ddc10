use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;

/// Category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "all";

/// Which item fields the free-text search is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Title only.
    #[default]
    TitleOnly,
    /// Title, description and category.
    Extended,
}

/// Selected category plus free-text search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// `"all"`, empty, or a specific category.
    pub category: String,
    /// Possibly empty search term.
    pub search_term: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            search_term: String::new(),
        }
    }
}

impl FilterState {
    pub fn new(category: impl Into<String>, search_term: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            search_term: search_term.into(),
        }
    }

    /// Whether the category filter is bypassed.
    pub fn is_all_categories(&self) -> bool {
        let category = self.category.trim();
        category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES)
    }

    /// Search term with surrounding whitespace removed, or `None` if blank.
    pub fn search(&self) -> Option<&str> {
        let term = self.search_term.trim();
        (!term.is_empty()).then_some(term)
    }

    /// Whether applying this filter returns the catalog unchanged.
    pub fn is_identity(&self) -> bool {
        self.is_all_categories() && self.search().is_none()
    }

    /// Whether `item` passes both the category and the search filter.
    pub fn matches(&self, item: &CatalogItem, scope: SearchScope) -> bool {
        if !self.is_all_categories() && !eq_ignore_case(&item.category, self.category.trim()) {
            return false;
        }

        match self.search() {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                contains_lowercase(&item.title, &needle)
                    || (scope == SearchScope::Extended
                        && (contains_lowercase(&item.description, &needle)
                            || contains_lowercase(&item.category, &needle)))
            }
        }
    }

    /// Items of `catalog` that pass the filter, in catalog order.
    pub fn apply(&self, catalog: &[CatalogItem], scope: SearchScope) -> Vec<CatalogItem> {
        catalog
            .iter()
            .filter(|item| self.matches(item, scope))
            .cloned()
            .collect()
    }
}

/// Filter `catalog` by category and search term.
///
/// The category compares case-insensitively and is skipped for `"all"` or an
/// empty string. The search term is a case-insensitive substring test; an
/// item matches if any field in `scope` contains it.
pub fn apply_filters(
    catalog: &[CatalogItem],
    category: &str,
    search_term: &str,
    scope: SearchScope,
) -> Vec<CatalogItem> {
    FilterState::new(category, search_term).apply(catalog, scope)
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn contains_lowercase(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}
