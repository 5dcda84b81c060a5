use serde::Serialize;

use crate::config::DEFAULT_PAGE_SIZE;

/// A pagination request: 0-based page index and page size.
///
/// A size of zero is clamped to one so a request can never produce an
/// unpageable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size: size.max(1) }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of an ordered result set, with the total count before slicing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Slices an already-ordered result set down to the requested page.
    /// Pages past the end come back empty but keep the true total.
    ///
    /// ```
    /// use murmur::core::page::{Page, PageRequest};
    ///
    /// let page = Page::paginate((0..25).collect::<Vec<u32>>(), PageRequest::new(1, 10));
    /// assert_eq!(page.items, (10..20).collect::<Vec<u32>>());
    /// assert_eq!(page.total, 25);
    /// ```
    pub fn paginate(ordered: Vec<T>, req: PageRequest) -> Self {
        let total = ordered.len();
        let items = ordered
            .into_iter()
            .skip(req.offset())
            .take(req.size)
            .collect();
        Self { items, page: req.page, size: req.size, total }
    }
}
