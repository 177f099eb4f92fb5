use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Bounds applied when turning raw request parameters into a [`Pagination`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// A 1-based page request. Both fields are expected to be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Apply the boundary rules: page >= 1, page size within `[1, max]`,
    /// defaults for anything missing or zero.
    pub fn clamped(page: Option<u32>, page_size: Option<u32>, limits: &PageLimits) -> Self {
        let max = limits.max_page_size.max(1);
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s >= 1)
            .unwrap_or(limits.default_page_size)
            .clamp(1, max);
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// One page of results plus the counts needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total: i64,
    pub page_count: i64,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: i64) -> Self {
        let size = i64::from(pagination.page_size);
        let page_count = if size > 0 { (total + size - 1) / size } else { 0 };
        let empty = items.is_empty();
        Self {
            items,
            page_number: pagination.page,
            page_size: pagination.page_size,
            total,
            page_count,
            empty,
        }
    }
}

/// Conjunctive search filters. A `None` (or blank) field is left out of the
/// query entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Substring matched against title, description and position.
    pub query: Option<String>,
    pub title: Option<String>,
    pub position: Option<String>,
    /// Exact owner match.
    pub posted_by: Option<String>,
    #[serde(default)]
    pub pagination: Pagination,
}
