//! Fixed-size pagination over the filtered list.

use serde::Serialize;

/// Items per page.
pub const PAGE_SIZE: usize = 48;

/// Number of pages needed for `len` items (0 for an empty list).
pub fn total_pages(len: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    len.div_ceil(size)
}

/// Clamp a 1-indexed page into `[1, max(total, 1)]`.
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Move `delta` pages from `current`, staying in range.
pub fn navigate(current: usize, delta: i64, total: usize) -> usize {
    let target = current as i64 + delta;
    clamp_page(target.max(1) as usize, total)
}

/// The items on 1-indexed `page`: `[(page-1)*size, page*size)`, clipped
/// to the list. Page 0 is read as page 1; pages past the end are empty.
pub fn page_slice<T>(items: &[T], page: usize, size: usize) -> &[T] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Pagination metadata for one rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    /// Whether previous/next controls should be shown at all.
    pub has_controls: bool,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageInfo {
    pub fn new(page: usize, total_items: usize, page_size: usize) -> Self {
        let total_pages = total_pages(total_items, page_size);
        let page = clamp_page(page, total_pages);
        Self {
            page,
            total_pages,
            total_items,
            page_size,
            has_controls: total_pages > 1,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }
}
