//! The tabular data engine.
//!
//! Rows flow through three pure stages, each usable on its own:
//!
//! ```text
//! rows ──► filter ──► sort ──► paginate ──► page
//!                                   ▲
//!                    selection ─────┘ (tri-state summary of the page)
//! ```
//!
//! # Core Types
//!
//! - `CellValue`: The scalar every accessor produces
//! - `RowKey`: Stable row identity across recomputation
//! - `Column`: Field or computed accessor plus filter/sort/render options
//! - `FilterState`, `SortState`, `PageState`: The mutable view state
//! - `SelectionModel`: Key-based selection with a tri-state summary
//! - `GridView`: Owns all of the above and derives the visible page
//!
//! # Stage Functions
//!
//! - [`filter_indices`] / [`filter_rows`]
//! - [`sort_indices`] / [`sort_rows`] / [`compare_values`]
//! - [`paginate`] / [`clamp_page`]

mod column;
mod filter;
mod pagination;
mod selection;
mod sort;
mod value;
mod view;

pub use column::{
    Accessor, Column, ColumnId, CompareFn, ExtractFn, FilterPredicate, Record, RenderFn, RowKeyFn,
    RowKeyStrategy, find_column,
};
pub use filter::{FilterState, filter_indices, filter_rows};
pub use pagination::{
    DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS, PageInfo, PageSizePolicy, PageSlice, PageState,
    clamp_page, paginate, total_pages,
};
pub use selection::{CheckState, SelectionMode, SelectionModel, SelectionSummary};
pub use sort::{SortDirection, SortState, compare_values, cycle_sort, sort_indices, sort_rows};
pub use value::{CellValue, RowKey};
pub use view::{GridView, PageResult, ViewStatus};
