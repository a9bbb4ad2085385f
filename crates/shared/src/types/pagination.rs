//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Hard cap on page size to keep list responses bounded.
const MAX_PER_PAGE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Returns the effective page size, clamped to the maximum.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.per_page.clamp(1, MAX_PER_PAGE) as usize
    }

    /// Returns the number of items to skip for this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.limit()
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: usize,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    /// Paginates a fully-materialized result set.
    #[must_use]
    pub fn paginate(items: Vec<T>, request: &PageRequest) -> Self {
        let total = items.len();
        let limit = request.limit();
        let total_pages = total.div_ceil(limit).max(1) as u32;
        let data: Vec<T> = items
            .into_iter()
            .skip(request.offset())
            .take(limit)
            .collect();

        Self {
            data,
            meta: PageMeta {
                page: request.page,
                per_page: limit as u32,
                total,
                total_pages,
            },
        }
    }
}
