use std::num::NonZeroUsize;

use serde::Serialize;

/// Number of numbered page buttons shown by default.
pub const DEFAULT_PAGE_WINDOW: usize = 5;

/// Number of pages needed for `len` items.
pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Slice out 1-indexed page `page` of `items`.
///
/// Page 0 and pages past the end yield an empty slice.
pub fn paginate<T>(items: &[T], page_size: NonZeroUsize, page: usize) -> &[T] {
    if page == 0 || page > total_pages(items.len(), page_size) {
        return &[];
    }
    let start = (page - 1) * page_size.get();
    let end = (start + page_size.get()).min(items.len());
    &items[start..end]
}

/// Page numbers to show as buttons around `current`.
///
/// Shows every page when there are at most `max_shown`; otherwise a run of
/// `max_shown` pages roughly centred on `current`, kept inside `1..=total`.
/// An out-of-range `current` is treated as the nearest valid page.
pub fn page_window(current: usize, total: usize, max_shown: usize) -> Vec<usize> {
    if max_shown == 0 || total == 0 {
        return Vec::new();
    }
    if total <= max_shown {
        return (1..=total).collect();
    }

    let current = current.clamp(1, total);
    let last_start = total - (max_shown - 1);
    let start = current.saturating_sub(max_shown / 2).clamp(1, last_start);
    (start..=start + (max_shown - 1)).collect()
}

/// One page of a filtered listing, with enough context to render controls.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// Numbered page buttons to display.
    pub window: Vec<usize>,
}

impl<T: Clone> Page<T> {
    /// Build page `page` of `items`.
    pub fn of(items: &[T], page_size: NonZeroUsize, page: usize) -> Self {
        let total_pages = total_pages(items.len(), page_size);
        Self {
            items: paginate(items, page_size, page).to_vec(),
            page,
            page_size: page_size.get(),
            total_items: items.len(),
            total_pages,
            window: page_window(page, total_pages, DEFAULT_PAGE_WINDOW),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.page <= self.total_pages
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
