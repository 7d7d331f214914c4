//! Pages over a ranked listing.

use serde::{Deserialize, Serialize};

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
    /// Total number of items.
    pub total: usize,
    /// Total number of pages.
    pub total_pages: usize,
    /// Whether there's a next page.
    pub has_next: bool,
    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl Pagination {
    /// Create pagination info. Page and page size are clamped to at least 1.
    pub fn new(page: usize, per_page: usize, total: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total_pages = if total == 0 {
            1
        } else {
            total.div_ceil(per_page)
        };

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Get start item number (1-indexed).
    pub fn start_item(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.offset().saturating_add(1)
        }
    }

    /// Get end item number.
    pub fn end_item(&self) -> usize {
        self.page.saturating_mul(self.per_page).min(self.total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 24, 0)
    }
}

/// One page of ranked items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Slice a ranked list into a page. Pages past the end are empty.
pub fn paginate<T: Clone>(ranked: &[T], page: usize, per_page: usize) -> Page<T> {
    let pagination = Pagination::new(page, per_page, ranked.len());
    let start = pagination.offset().min(ranked.len());
    let end = start.saturating_add(pagination.per_page).min(ranked.len());

    Page {
        items: ranked[start..end].to_vec(),
        pagination,
    }
}
