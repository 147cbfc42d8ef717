//! Pagination cursor for one collection view.
//!
//! The cursor mirrors the latest server envelope verbatim; it never
//! advances on its own. Callers ask for the offset of the neighbouring
//! page, fetch it, and hand the answer back to [`PageCursor::apply`].
//! A failed fetch simply never reaches `apply`, so the cursor keeps its
//! previous position.

use serde::Serialize;

use crate::types::{PageRequest, PageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    page: u64,
    page_size: u64,
    total: u64,
    total_pages: u64,
}

impl PageCursor {
    pub fn new(page_size: u64) -> Self {
        Self {
            page: 1,
            page_size,
            total: 0,
            total_pages: 0,
        }
    }

    /// Replace all four fields from a fetched page
    pub fn apply<T>(&mut self, result: &PageResult<T>) {
        self.page = result.page;
        self.page_size = result.page_size;
        self.total = result.total;
        self.total_pages = result.total_pages;
    }

    pub fn from_result<T>(result: &PageResult<T>) -> Self {
        let mut cursor = Self::new(result.page_size);
        cursor.apply(result);
        cursor
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Last page the cursor will ever move to. The server's `total_pages`
    /// is authoritative, but when `total` is known it may not point past
    /// the final row.
    fn last_page(&self) -> u64 {
        if self.total > 0 && self.page_size > 0 {
            self.total_pages.min(self.total.div_ceil(self.page_size))
        } else {
            self.total_pages
        }
    }

    /// Zero-based row offset of the next page, `None` on the last page
    pub fn next_offset(&self) -> Option<u64> {
        if self.page_size == 0 || self.page >= self.last_page() {
            return None;
        }
        self.page.checked_mul(self.page_size)
    }

    /// Zero-based row offset of the previous page, `None` on the first page
    pub fn prev_offset(&self) -> Option<u64> {
        if self.page_size == 0 || self.page <= 1 {
            return None;
        }
        let target = self.page.min(self.last_page().saturating_add(1));
        (target.max(2) - 2).checked_mul(self.page_size)
    }

    /// Offset of an arbitrary 1-based page within `[1, total_pages]`
    pub fn offset_for_page(&self, page: u64) -> Option<u64> {
        if self.page_size == 0 || page == 0 || page > self.last_page() {
            return None;
        }
        (page - 1).checked_mul(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.next_offset().is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev_offset().is_some()
    }

    /// Request for a page at `offset` using the server's page size
    pub fn request_at(&self, offset: u64) -> PageRequest {
        PageRequest {
            limit: self.page_size,
            offset,
        }
    }
}
