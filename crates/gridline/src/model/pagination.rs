//! Pagination stage.
//!
//! Slices the sorted rows into the active page and computes the range
//! metadata shown as "Showing 1–25 of 100". Pages are 0-based internally;
//! range bounds are 1-based for display.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default page size choices offered to the user.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// What happens to the current page when the page size changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSizePolicy {
    /// Jump back to the first page.
    #[default]
    ResetToFirst,
    /// Stay on the page that contains the previously first visible row.
    PreserveFirstVisibleRow,
}

impl PageSizePolicy {
    /// Computes the page to show after a page size change.
    ///
    /// `old_range_start` is the 1-based index of the first visible row before
    /// the change (0 when nothing was visible).
    pub fn page_after_resize(self, old_range_start: usize, new_page_size: usize) -> usize {
        match self {
            PageSizePolicy::ResetToFirst => 0,
            PageSizePolicy::PreserveFirstVisibleRow => {
                old_range_start.saturating_sub(1) / new_page_size.max(1)
            }
        }
    }
}

/// Current page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// 0-based page index.
    pub page: usize,
    /// Rows per page, always positive.
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Page metadata for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInfo {
    /// 0-based page index, already clamped.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Rows after filtering.
    pub total_count: usize,
    /// Number of pages, at least 1.
    pub total_pages: usize,
    /// 1-based index of the first visible row, 0 when empty.
    pub range_start: usize,
    /// 1-based index of the last visible row, 0 when empty.
    pub range_end: usize,
}

impl PageInfo {
    /// Computes page metadata, clamping `page` into range.
    pub fn compute(total_count: usize, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(total_count, page_size);
        let page = clamp_page(page, total_count, page_size);
        let (range_start, range_end) = if total_count == 0 {
            (0, 0)
        } else {
            let start = page * page_size;
            (start + 1, (start + page_size).min(total_count))
        };
        Self {
            page,
            page_size,
            total_count,
            total_pages,
            range_start,
            range_end,
        }
    }

    /// Returns `true` if there is a page before this one.
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Returns `true` if there is a page after this one.
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// Returns `true` if the filtered set is empty.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Number of rows on this page.
    pub fn len(&self) -> usize {
        if self.total_count == 0 {
            0
        } else {
            self.range_end + 1 - self.range_start
        }
    }

    /// Index range of this page within the sorted rows.
    pub fn bounds(&self) -> std::ops::Range<usize> {
        if self.total_count == 0 {
            0..0
        } else {
            self.range_start - 1..self.range_end
        }
    }
}

/// `max(1, ceil(total_count / page_size))`.
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    total_count.div_ceil(page_size.max(1)).max(1)
}

/// Clamps a page into `[0, total_pages - 1]`.
pub fn clamp_page(page: usize, total_count: usize, page_size: usize) -> usize {
    page.min(total_pages(total_count, page_size) - 1)
}

/// A page of rows plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a, T> {
    /// Rows on the page.
    pub rows: &'a [T],
    /// Page metadata.
    pub info: PageInfo,
}

/// Slices `rows` into the requested page. Out-of-range pages are clamped.
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> PageSlice<'_, T> {
    let info = PageInfo::compute(rows.len(), page, page_size);
    PageSlice {
        rows: &rows[info.bounds()],
        info,
    }
}
