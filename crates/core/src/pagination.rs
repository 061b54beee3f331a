//! Page/page-size pagination used by every list endpoint.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Maximum number of items per page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Query parameters `?page=&pageSize=` (page is 1-based).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PageParams {
    /// Resolve to a concrete `(page, page_size)` pair, clamping both.
    pub fn resolve(self) -> (usize, usize) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, page_size)
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Slice an already filtered and ordered list into the requested page.
    pub fn from_vec(all: Vec<T>, params: PageParams) -> Self {
        let (page, page_size) = params.resolve();
        let total = all.len();
        let start = (page - 1).saturating_mul(page_size);
        let items = all.into_iter().skip(start).take(page_size).collect();
        Self {
            items,
            page,
            page_size,
            total,
        }
    }
}
