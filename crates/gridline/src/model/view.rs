//! View orchestrator.
//!
//! [`GridView`] owns the filter, sort, pagination and selection state of one
//! table and derives the visible page from them. Every transition recomputes
//! synchronously. The filtered and sorted row order is cached in a row
//! mapping and only rebuilt when the rows, the columns, the filter or the sort
//! change. Paging reuses it.
//!
//! # Example
//!
//! ```
//! use gridline::{Column, GridView, SelectionSummary, ViewOptions};
//! use serde_json::json;
//!
//! let rows: Vec<serde_json::Value> = (1..=5)
//!     .map(|i| json!({"id": i, "name": format!("Item {}", (b'A' + i as u8 - 1) as char)}))
//!     .collect();
//! let columns = vec![Column::field("name", "name")];
//!
//! let mut view = GridView::new(rows, columns, ViewOptions::default()).unwrap();
//! view.set_filter("name", "item a");
//!
//! let page = view.page();
//! assert_eq!(page.info.total_count, 1);
//! assert_eq!((page.info.range_start, page.info.range_end), (1, 1));
//! assert_eq!(page.summary, SelectionSummary::None);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use gridline_core::logging::{span_names, targets};
use gridline_core::{PerfSpan, Signal};

use super::column::{Column, Record, RowKeyStrategy, find_column};
use super::filter::{FilterState, filter_indices};
use super::pagination::{PageInfo, PageState, clamp_page};
use super::selection::{SelectionModel, SelectionSummary};
use super::sort::{SortDirection, SortState, cycle_sort, sort_indices};
use super::value::RowKey;
use crate::config::ViewOptions;
use crate::error::{Error, Result};

/// Lifecycle status of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewStatus {
    /// No dataset has been supplied yet, or the view was reset.
    #[default]
    Idle,
    /// The caller is fetching a new dataset. The previous view stays queryable.
    Loading,
    /// The filtered set has rows.
    Ready,
    /// The filtered set is empty.
    Empty,
}

impl ViewStatus {
    /// Returns `true` for `Ready` and its `Empty` sub-state.
    pub fn is_ready(self) -> bool {
        matches!(self, ViewStatus::Ready | ViewStatus::Empty)
    }
}

/// Cached mapping between view positions and dataset rows.
#[derive(Debug, Default)]
struct RowMapping {
    /// View position → dataset row index.
    view_to_source: Vec<usize>,
    /// Dataset row index → view position (None if filtered out).
    source_to_view: Vec<Option<usize>>,
}

impl RowMapping {
    fn from_order(order: Vec<usize>, source_len: usize) -> Self {
        let mut source_to_view = vec![None; source_len];
        for (position, &source) in order.iter().enumerate() {
            source_to_view[source] = Some(position);
        }
        Self {
            view_to_source: order,
            source_to_view,
        }
    }

    fn len(&self) -> usize {
        self.view_to_source.len()
    }

    fn map_from_source(&self, source_row: usize) -> Option<usize> {
        self.source_to_view.get(source_row).copied().flatten()
    }
}

/// The derived projection handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<'a, T> {
    /// Rows on the current page, in view order.
    pub rows: Vec<&'a T>,
    /// Keys of the rows on the current page.
    pub keys: Vec<RowKey>,
    /// Page metadata.
    pub info: PageInfo,
    /// Header checkbox state for this page.
    pub summary: SelectionSummary,
}

/// An interactive, caller-owned view over an in-memory collection.
///
/// All state is mutated through the transition methods. Invalid inputs
/// coming from stale UI state (unknown columns, out-of-range pages, unknown
/// row keys) are ignored or clamped, never reported as errors.
///
/// # Signals
///
/// - `status_changed`: Emitted when the lifecycle status changes
/// - `filter_changed`: Emitted with the new filter state
/// - `sort_changed`: Emitted with the new sort state
/// - `page_changed`: Emitted when page, page size or row count change
/// - `row_activated`: Emitted when a row is clicked
/// - [`selection_changed`](Self::selection_changed): Emitted with (selected, deselected) keys
pub struct GridView<T> {
    rows: Arc<[T]>,
    keys: Vec<RowKey>,
    key_index: HashMap<RowKey, usize>,
    columns: Vec<Column<T>>,
    key_strategy: RowKeyStrategy<T>,
    options: ViewOptions,

    filter: FilterState,
    sort: Option<SortState>,
    page: PageState,
    selection: SelectionModel,

    mapping: RowMapping,
    status: ViewStatus,

    /// Emitted when the lifecycle status changes.
    pub status_changed: Signal<ViewStatus>,
    /// Emitted when the filter state changes.
    pub filter_changed: Signal<FilterState>,
    /// Emitted when the sort state changes.
    pub sort_changed: Signal<Option<SortState>>,
    /// Emitted when the page metadata changes.
    pub page_changed: Signal<PageInfo>,
    /// Emitted when a row is activated (clicked).
    pub row_activated: Signal<RowKey>,
}

impl<T> fmt::Debug for GridView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridView")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("key_strategy", &self.key_strategy)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("selection", &self.selection)
            .field("status", &self.status)
            .finish()
    }
}

impl<T: Record> GridView<T> {
    // =========================================================================
    // Setup
    // =========================================================================

    /// Creates a view over `rows`, keyed by the `row_key_field` option.
    ///
    /// Fails if the options or columns are malformed, if a row has no usable
    /// key, if two rows share a key, or if a computed column fails on every
    /// row.
    pub fn new(
        rows: impl Into<Arc<[T]>>,
        columns: Vec<Column<T>>,
        options: ViewOptions,
    ) -> Result<Self> {
        let strategy = RowKeyStrategy::Field(options.row_key_field.clone());
        Self::with_key_strategy(rows, columns, options, strategy)
    }

    /// Creates a view whose row keys are computed by `key_fn`.
    pub fn with_row_key_fn<F>(
        rows: impl Into<Arc<[T]>>,
        columns: Vec<Column<T>>,
        options: ViewOptions,
        key_fn: F,
    ) -> Result<Self>
    where
        F: Fn(&T) -> Option<RowKey> + Send + Sync + 'static,
    {
        Self::with_key_strategy(rows, columns, options, RowKeyStrategy::Func(Arc::new(key_fn)))
    }

    /// Creates a view with an explicit row key strategy.
    ///
    /// A computed column that fails on every row of a non-empty `rows` is
    /// rejected here, since it points at a broken column definition.
    pub fn with_key_strategy(
        rows: impl Into<Arc<[T]>>,
        columns: Vec<Column<T>>,
        options: ViewOptions,
        strategy: RowKeyStrategy<T>,
    ) -> Result<Self> {
        let rows: Arc<[T]> = rows.into();
        let mut view = Self::empty_with_key_strategy(columns, options, strategy)?;
        check_accessors(&rows, &view.columns)?;
        view.replace_data(rows)?;
        Ok(view)
    }

    /// Creates an `Idle` view with no dataset yet.
    pub fn empty(columns: Vec<Column<T>>, options: ViewOptions) -> Result<Self> {
        let strategy = RowKeyStrategy::Field(options.row_key_field.clone());
        Self::empty_with_key_strategy(columns, options, strategy)
    }

    /// Creates an `Idle` view with an explicit row key strategy.
    pub fn empty_with_key_strategy(
        columns: Vec<Column<T>>,
        options: ViewOptions,
        strategy: RowKeyStrategy<T>,
    ) -> Result<Self> {
        options.validate()?;
        validate_columns(&columns)?;

        Ok(Self {
            rows: Arc::from(Vec::new()),
            keys: Vec::new(),
            key_index: HashMap::new(),
            columns,
            key_strategy: strategy,
            page: PageState {
                page: 0,
                page_size: options.page_size,
            },
            selection: SelectionModel::with_mode(options.selection_mode),
            options,
            filter: FilterState::new(),
            sort: None,
            mapping: RowMapping::default(),
            status: ViewStatus::Idle,
            status_changed: Signal::new(),
            filter_changed: Signal::new(),
            sort_changed: Signal::new(),
            page_changed: Signal::new(),
            row_activated: Signal::new(),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the current page.
    pub fn page(&self) -> PageResult<'_, T> {
        let _span = PerfSpan::new(span_names::PAGINATE);
        let info = self.page_info();
        let sources = &self.mapping.view_to_source[info.bounds()];
        let keys: Vec<RowKey> = sources.iter().map(|&i| self.keys[i].clone()).collect();
        let summary = self.selection.summary_for(&keys);
        PageResult {
            rows: sources.iter().map(|&i| &self.rows[i]).collect(),
            keys,
            info,
            summary,
        }
    }

    /// Returns the current page metadata.
    pub fn page_info(&self) -> PageInfo {
        PageInfo::compute(self.mapping.len(), self.page.page, self.page.page_size)
    }

    /// Returns the current page and page size.
    pub fn page_state(&self) -> PageState {
        self.page
    }

    /// Returns the active sort, if any.
    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Returns the active filters.
    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Returns the selection model.
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Signal emitted with (selected, deselected) keys.
    pub fn selection_changed(&self) -> &Signal<(Vec<RowKey>, Vec<RowKey>)> {
        &self.selection.selection_changed
    }

    /// Returns the sort direction shown on a column header.
    pub fn sort_direction_for(&self, column_id: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|s| s.column_id == column_id)
            .map(|s| s.direction)
    }

    /// Returns the header checkbox state for the current page.
    pub fn selection_summary(&self) -> SelectionSummary {
        self.selection.summary_for(&self.visible_keys())
    }

    /// Returns the lifecycle status.
    pub fn status(&self) -> ViewStatus {
        self.status
    }

    /// Returns the dataset.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Returns the columns.
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Returns the view options.
    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Returns the number of rows that pass the filters.
    pub fn filtered_count(&self) -> usize {
        self.mapping.len()
    }

    /// Returns the keys of the rows on the current page.
    pub fn visible_keys(&self) -> Vec<RowKey> {
        let info = self.page_info();
        self.mapping.view_to_source[info.bounds()]
            .iter()
            .map(|&i| self.keys[i].clone())
            .collect()
    }

    /// Returns the selected rows of the current dataset, in dataset order.
    pub fn selected_rows(&self) -> Vec<&T> {
        self.keys
            .iter()
            .zip(self.rows.iter())
            .filter(|(key, _)| self.selection.is_selected(key))
            .map(|(_, row)| row)
            .collect()
    }

    /// Looks up a row by key.
    pub fn row_by_key(&self, key: &RowKey) -> Option<&T> {
        self.key_index.get(key).map(|&i| &self.rows[i])
    }

    /// Returns the 0-based position of a row in the filtered and sorted
    /// order, or `None` if it is filtered out or unknown.
    pub fn position_of(&self, key: &RowKey) -> Option<usize> {
        self.key_index
            .get(key)
            .and_then(|&i| self.mapping.map_from_source(i))
    }

    // =========================================================================
    // Filter
    // =========================================================================

    /// Sets the query for a column. An empty query clears it.
    ///
    /// Unknown and non-filterable columns are ignored.
    pub fn set_filter(&mut self, column_id: &str, text: impl Into<String>) {
        match find_column(&self.columns, column_id) {
            Some(column) if column.is_filterable() => {}
            _ => {
                tracing::debug!(
                    target: targets::VIEW,
                    column = column_id,
                    "ignoring filter on unknown or non-filterable column"
                );
                return;
            }
        }
        let before = self.page_info();
        if self.filter.set(column_id, text) {
            tracing::debug!(
                target: targets::VIEW,
                column = column_id,
                query = ?self.filter.get(column_id),
                "filter changed"
            );
            self.filter_updated(before);
        }
    }

    /// Clears the query for one column.
    pub fn clear_filter(&mut self, column_id: &str) {
        let before = self.page_info();
        if self.filter.remove(column_id) {
            tracing::debug!(target: targets::VIEW, column = column_id, "filter cleared");
            self.filter_updated(before);
        }
    }

    /// Clears every query.
    pub fn clear_filters(&mut self) {
        let before = self.page_info();
        if self.filter.clear() {
            tracing::debug!(target: targets::VIEW, "all filters cleared");
            self.filter_updated(before);
        }
    }

    fn filter_updated(&mut self, before: PageInfo) {
        self.rebuild_mapping();
        self.filter_changed.emit(self.filter.clone());
        self.settle(before);
    }

    // =========================================================================
    // Sort
    // =========================================================================

    /// Header click: cycles none → ascending → descending → none on the same
    /// column, or starts a different column at ascending.
    ///
    /// Unknown and non-sortable columns are ignored.
    pub fn set_sort(&mut self, column_id: &str) {
        if !self.is_sortable(column_id) {
            tracing::debug!(
                target: targets::VIEW,
                column = column_id,
                "ignoring sort on unknown or non-sortable column"
            );
            return;
        }
        let next = cycle_sort(self.sort.as_ref(), column_id);
        self.apply_sort(next);
    }

    /// Sets the sort state explicitly.
    ///
    /// A sort on an unknown or non-sortable column is ignored.
    pub fn set_sort_state(&mut self, sort: Option<SortState>) {
        if let Some(state) = &sort
            && !self.is_sortable(&state.column_id)
        {
            tracing::debug!(
                target: targets::VIEW,
                column = %state.column_id,
                "ignoring sort on unknown or non-sortable column"
            );
            return;
        }
        self.apply_sort(sort);
    }

    /// Removes the active sort, restoring the filtered input order.
    pub fn clear_sort(&mut self) {
        self.apply_sort(None);
    }

    fn is_sortable(&self, column_id: &str) -> bool {
        find_column(&self.columns, column_id).is_some_and(Column::is_sortable)
    }

    fn apply_sort(&mut self, sort: Option<SortState>) {
        if self.sort == sort {
            return;
        }
        let before = self.page_info();
        tracing::debug!(target: targets::VIEW, ?sort, "sort changed");
        self.sort = sort;
        self.rebuild_mapping();
        self.sort_changed.emit(self.sort.clone());
        self.settle(before);
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Moves to a page. Out-of-range pages are clamped.
    pub fn set_page(&mut self, page: usize) {
        let before = self.page_info();
        let clamped = clamp_page(page, self.mapping.len(), self.page.page_size);
        if clamped != page {
            tracing::debug!(
                target: targets::PAGINATION,
                requested = page,
                clamped,
                "clamping page"
            );
        }
        self.page.page = clamped;
        self.settle(before);
    }

    /// Moves to the next page, if any.
    pub fn next_page(&mut self) {
        if self.page_info().has_next() {
            self.set_page(self.page.page + 1);
        }
    }

    /// Moves to the previous page, if any.
    pub fn previous_page(&mut self) {
        self.set_page(self.page.page.saturating_sub(1));
    }

    /// Moves to the first page.
    pub fn first_page(&mut self) {
        self.set_page(0);
    }

    /// Moves to the last page.
    pub fn last_page(&mut self) {
        self.set_page(self.page_info().total_pages - 1);
    }

    /// Changes the page size. Zero is ignored.
    ///
    /// The landing page follows the configured
    /// [`PageSizePolicy`](super::pagination::PageSizePolicy).
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            tracing::debug!(target: targets::PAGINATION, "ignoring zero page size");
            return;
        }
        if page_size == self.page.page_size {
            return;
        }
        let before = self.page_info();
        let landing = self
            .options
            .page_size_policy
            .page_after_resize(before.range_start, page_size);
        tracing::debug!(target: targets::PAGINATION, page_size, landing, "page size changed");
        self.page = PageState {
            page: clamp_page(landing, self.mapping.len(), page_size),
            page_size,
        };
        self.settle(before);
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Flips the selection of one row. Unknown keys are ignored.
    pub fn toggle_row(&mut self, key: impl Into<RowKey>) {
        let key = key.into();
        if !self.key_index.contains_key(&key) {
            tracing::debug!(target: targets::SELECTION, %key, "ignoring toggle of unknown row");
            return;
        }
        self.selection.toggle_row(key);
    }

    /// Header checkbox: selects the rest of the current page, or deselects
    /// the page when it is fully selected.
    pub fn toggle_all_visible(&mut self) {
        let visible = self.visible_keys();
        self.selection.toggle_all_visible(&visible);
    }

    /// Adds rows to the selection. Unknown keys are ignored.
    pub fn select_rows(&mut self, keys: impl IntoIterator<Item = RowKey>) {
        let known: Vec<RowKey> = keys
            .into_iter()
            .filter(|key| self.key_index.contains_key(key))
            .collect();
        self.selection.select(known);
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    /// Row click. Emits `row_activated` and returns `true` for known keys.
    pub fn activate_row(&self, key: impl Into<RowKey>) -> bool {
        let key = key.into();
        if !self.key_index.contains_key(&key) {
            tracing::debug!(target: targets::VIEW, %key, "ignoring activation of unknown row");
            return false;
        }
        tracing::debug!(target: targets::VIEW, %key, "row activated");
        self.row_activated.emit(key);
        true
    }

    // =========================================================================
    // Data and columns
    // =========================================================================

    /// Marks a fetch as in progress. The current view stays queryable.
    pub fn begin_loading(&mut self) {
        self.set_status(ViewStatus::Loading);
    }

    /// Replaces the dataset.
    ///
    /// Filter and sort state are kept, the page is clamped and the selection
    /// is cleared. Cells a computed column cannot extract from the new rows
    /// read as empty, even when it fails on all of them. Missing or duplicate
    /// row keys are an error, and the previous dataset then stays in place.
    pub fn replace_data(&mut self, rows: impl Into<Arc<[T]>>) -> Result<()> {
        let rows: Arc<[T]> = rows.into();
        let (keys, key_index) = resolve_keys(&rows, &self.key_strategy)?;

        let before = self.page_info();
        tracing::debug!(target: targets::VIEW, rows = rows.len(), "dataset replaced");
        self.rows = rows;
        self.keys = keys;
        self.key_index = key_index;
        self.selection.clear_selection();
        self.rebuild_mapping();
        self.page.page = clamp_page(self.page.page, self.mapping.len(), self.page.page_size);
        self.set_status(self.derived_status());
        self.emit_page_if_changed(before);
        Ok(())
    }

    /// Replaces the columns.
    ///
    /// Filters and sorts on columns that vanished or no longer allow them are
    /// dropped. On error the previous columns stay in place.
    pub fn replace_columns(&mut self, columns: Vec<Column<T>>) -> Result<()> {
        validate_columns(&columns)?;
        check_accessors(&self.rows, &columns)?;

        let before = self.page_info();
        self.columns = columns;

        let columns = &self.columns;
        let filter_before = self.filter.len();
        self.filter
            .retain(|id| find_column(columns, id).is_some_and(Column::is_filterable));
        let filter_dropped = self.filter.len() != filter_before;

        let sort_dropped = self
            .sort
            .as_ref()
            .is_some_and(|s| !self.is_sortable(&s.column_id));
        if sort_dropped {
            self.sort = None;
        }

        tracing::debug!(
            target: targets::VIEW,
            columns = self.columns.len(),
            filter_dropped,
            sort_dropped,
            "columns replaced"
        );
        self.rebuild_mapping();
        if filter_dropped {
            self.filter_changed.emit(self.filter.clone());
        }
        if sort_dropped {
            self.sort_changed.emit(None);
        }
        self.settle(before);
        Ok(())
    }

    /// Recomputes the pipeline from the current inputs.
    pub fn refresh(&mut self) {
        let before = self.page_info();
        self.rebuild_mapping();
        self.settle(before);
    }

    /// Tears the view down to its initial `Idle` state.
    ///
    /// Columns, options and connections are kept.
    pub fn reset(&mut self) {
        tracing::debug!(target: targets::VIEW, "view reset");
        let before = self.page_info();
        self.rows = Arc::from(Vec::new());
        self.keys.clear();
        self.key_index.clear();
        self.selection.clear_selection();
        if self.filter.clear() {
            self.filter_changed.emit(self.filter.clone());
        }
        if self.sort.take().is_some() {
            self.sort_changed.emit(None);
        }
        self.page = PageState {
            page: 0,
            page_size: self.options.page_size,
        };
        self.mapping = RowMapping::default();
        self.set_status(ViewStatus::Idle);
        self.emit_page_if_changed(before);
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn rebuild_mapping(&mut self) {
        let _span = PerfSpan::new(span_names::PIPELINE);
        let filtered = filter_indices(&self.rows, &self.columns, &self.filter);
        let order = sort_indices(&self.rows, &self.columns, filtered, self.sort.as_ref());
        tracing::trace!(
            target: targets::VIEW,
            rows = self.rows.len(),
            visible = order.len(),
            "pipeline recomputed"
        );
        self.mapping = RowMapping::from_order(order, self.rows.len());
    }

    fn derived_status(&self) -> ViewStatus {
        if self.mapping.len() == 0 {
            ViewStatus::Empty
        } else {
            ViewStatus::Ready
        }
    }

    /// Clamps the page, refreshes `Ready`/`Empty` and emits `page_changed`.
    fn settle(&mut self, before: PageInfo) {
        self.page.page = clamp_page(self.page.page, self.mapping.len(), self.page.page_size);
        if self.status.is_ready() {
            self.set_status(self.derived_status());
        }
        self.emit_page_if_changed(before);
    }

    fn emit_page_if_changed(&self, before: PageInfo) {
        let after = self.page_info();
        if after != before {
            tracing::trace!(
                target: targets::PAGINATION,
                page = after.page,
                total = after.total_count,
                "page changed"
            );
            self.page_changed.emit(after);
        }
    }

    fn set_status(&mut self, status: ViewStatus) {
        if self.status != status {
            tracing::debug!(
                target: targets::VIEW,
                from = ?self.status,
                to = ?status,
                "status changed"
            );
            self.status = status;
            self.status_changed.emit(status);
        }
    }
}

/// Rejects empty column sets, empty ids and duplicate ids.
fn validate_columns<T>(columns: &[Column<T>]) -> Result<()> {
    if columns.is_empty() {
        tracing::warn!(target: targets::VIEW, "rejecting empty column set");
        return Err(Error::NoColumns);
    }
    let mut seen = HashSet::new();
    for (index, column) in columns.iter().enumerate() {
        if column.id().is_empty() {
            tracing::warn!(target: targets::VIEW, index, "rejecting column with empty id");
            return Err(Error::EmptyColumnId { index });
        }
        if !seen.insert(column.id()) {
            tracing::warn!(
                target: targets::VIEW,
                column = column.id(),
                "rejecting duplicate column id"
            );
            return Err(Error::duplicate_column(column.id()));
        }
    }
    Ok(())
}

/// Rejects computed columns that fail on every row of a non-empty dataset.
fn check_accessors<T: Record>(rows: &[T], columns: &[Column<T>]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    for column in columns.iter().filter(|c| c.accessor().is_computed()) {
        let mut first_error = None;
        let any_ok = rows.iter().any(|row| match column.try_extract(row) {
            Ok(_) => true,
            Err(err) => {
                first_error.get_or_insert(err);
                false
            }
        });
        if !any_ok {
            let message = first_error.map(|e| e.to_string()).unwrap_or_default();
            tracing::warn!(
                target: targets::VIEW,
                column = column.id(),
                %message,
                "accessor failed on every row"
            );
            return Err(Error::accessor_failed(column.id(), message));
        }
    }
    Ok(())
}

/// Resolves every row's key, rejecting missing and duplicate keys.
fn resolve_keys<T: Record>(
    rows: &[T],
    strategy: &RowKeyStrategy<T>,
) -> Result<(Vec<RowKey>, HashMap<RowKey, usize>)> {
    let mut keys = Vec::with_capacity(rows.len());
    let mut index = HashMap::with_capacity(rows.len());
    for (row, item) in rows.iter().enumerate() {
        let Some(key) = strategy.resolve(item) else {
            tracing::warn!(target: targets::VIEW, row, %strategy, "row has no usable key");
            return Err(Error::UnresolvedRowKey {
                row,
                strategy: strategy.to_string(),
            });
        };
        if index.insert(key.clone(), row).is_some() {
            tracing::warn!(target: targets::VIEW, %key, "duplicate row key");
            return Err(Error::DuplicateRowKey { key });
        }
        keys.push(key);
    }
    Ok((keys, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::model::value::CellValue;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn materials(n: i64) -> Vec<Value> {
        (1..=n)
            .map(|i| json!({"id": i, "name": format!("Material {i}"), "qty": (i * 7) % 11}))
            .collect()
    }

    fn columns() -> Vec<Column<Value>> {
        vec![
            Column::field("name", "name"),
            Column::field("qty", "qty"),
            Column::computed("double", |r: &Value| {
                CellValue::from(r["qty"].as_i64().unwrap_or_default() * 2)
            }),
        ]
    }

    fn view(n: i64) -> GridView<Value> {
        GridView::new(materials(n), columns(), ViewOptions::default()).unwrap()
    }

    #[test]
    fn test_new_view_is_ready() {
        let view = view(23);
        assert_eq!(view.status(), ViewStatus::Ready);
        assert_eq!(view.filtered_count(), 23);
        let info = view.page_info();
        assert_eq!(info.total_pages, 3);
        assert_eq!((info.range_start, info.range_end), (1, 10));
    }

    #[test]
    fn test_empty_view_is_idle() {
        let view = GridView::<Value>::empty(columns(), ViewOptions::default()).unwrap();
        assert_eq!(view.status(), ViewStatus::Idle);
        assert!(view.page().rows.is_empty());
    }

    #[test]
    fn test_setup_rejects_bad_columns() {
        let none = Vec::<Column<Value>>::new();
        let err = GridView::new(materials(2), none, ViewOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NoColumns));

        let dup = vec![Column::field("name", "name"), Column::field("name", "qty")];
        let err = GridView::new(materials(2), dup, ViewOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn { ref id } if id == "name"));

        let blank = vec![Column::<Value>::field("", "name")];
        let err = GridView::new(materials(2), blank, ViewOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyColumnId { index: 0 }));
    }

    #[test]
    fn test_setup_rejects_bad_keys() {
        let rows = vec![json!({"id": 1}), json!({"name": "no id"})];
        let err = GridView::new(rows, columns(), ViewOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedRowKey { row: 1, .. }));

        let rows = vec![json!({"id": 1}), json!({"id": 1})];
        let err = GridView::new(rows, columns(), ViewOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateRowKey { key: RowKey::Int(1) }));
    }

    #[test]
    fn test_setup_rejects_accessor_failing_everywhere() {
        let cols = vec![Column::<Value>::try_computed("broken", |_| {
            Err(ExtractError::failed("boom"))
        })];
        let err = GridView::new(materials(3), cols, ViewOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::AccessorFailed { ref column, ref message }
                if column == "broken" && message == "boom"
        ));
    }

    #[test]
    fn test_replace_data_degrades_accessor_failing_everywhere() {
        let rate = Column::<Value>::try_computed("rate", |r| match r["hours"].as_i64() {
            Some(hours) => Ok(CellValue::from(hours * 40)),
            None => Err(ExtractError::failed("no hours")),
        });
        let cols = vec![Column::field("name", "name"), rate];
        let rows = vec![json!({"id": 1, "name": "a", "hours": 3})];
        let mut view = GridView::new(rows, cols, ViewOptions::default()).unwrap();
        view.set_sort("rate");

        view.replace_data(vec![json!({"id": 2, "name": "b"})]).unwrap();
        assert_eq!(view.status(), ViewStatus::Ready);
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.page().keys, vec![RowKey::Int(2)]);
        let rate = find_column(view.columns(), "rate").unwrap();
        assert!(rate.extract(&view.rows()[0]).is_none());
        assert_eq!(view.sort_state(), Some(&SortState::ascending("rate")));
    }

    #[test]
    fn test_accessor_failing_on_some_rows_is_accepted() {
        let cols = vec![Column::<Value>::try_computed("odd", |r| {
            match r["id"].as_i64() {
                Some(id) if id % 2 == 1 => Ok(CellValue::from(id)),
                _ => Err(ExtractError::failed("even")),
            }
        })];
        let mut view = GridView::new(materials(4), cols, ViewOptions::default()).unwrap();
        view.set_sort("odd");
        let ids: Vec<i64> = view.page().rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_row_key_fn() {
        let rows = vec![json!({"code": "A"}), json!({"code": "B"})];
        let view = GridView::with_row_key_fn(rows, columns(), ViewOptions::default(), |r: &Value| {
            r["code"].as_str().map(RowKey::from)
        })
        .unwrap();
        assert!(view.row_by_key(&RowKey::from("B")).is_some());
    }

    #[test]
    fn test_filter_on_unknown_or_computed_column_ignored() {
        let mut view = view(5);
        view.set_filter("nope", "x");
        view.set_filter("double", "x");
        assert!(view.filter_state().is_empty());
        assert_eq!(view.filtered_count(), 5);
    }

    #[test]
    fn test_sort_cycle_and_direction_indicator() {
        let mut view = view(5);
        view.set_sort("qty");
        assert_eq!(view.sort_direction_for("qty"), Some(SortDirection::Ascending));
        assert_eq!(view.sort_direction_for("name"), None);
        view.set_sort("qty");
        assert_eq!(view.sort_direction_for("qty"), Some(SortDirection::Descending));
        view.set_sort("qty");
        assert_eq!(view.sort_state(), None);
    }

    #[test]
    fn test_set_page_clamps() {
        let mut view = view(23);
        view.set_page(99);
        assert_eq!(view.page_info().page, 2);
        view.next_page();
        assert_eq!(view.page_info().page, 2);
        view.first_page();
        view.previous_page();
        assert_eq!(view.page_info().page, 0);
        view.last_page();
        assert_eq!(view.page().rows.len(), 3);
    }

    #[test]
    fn test_zero_page_size_ignored() {
        let mut view = view(23);
        view.set_page_size(0);
        assert_eq!(view.page_state().page_size, 10);
    }

    #[test]
    fn test_preserve_first_visible_row_policy() {
        let options = ViewOptions::default()
            .with_page_size(10)
            .with_policy(crate::model::PageSizePolicy::PreserveFirstVisibleRow);
        let mut view = GridView::new(materials(100), columns(), options).unwrap();
        view.set_page(4);
        // First visible row is 41, which lives on page index 1 at size 25.
        view.set_page_size(25);
        let info = view.page_info();
        assert_eq!(info.page, 1);
        assert!(info.range_start <= 41 && 41 <= info.range_end);
    }

    #[test]
    fn test_unknown_row_toggle_and_activation_ignored() {
        let mut view = view(3);
        view.toggle_row(99);
        assert!(!view.selection().has_selection());
        assert!(!view.activate_row(99));
    }

    #[test]
    fn test_row_activated_signal() {
        let view = view(3);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        view.row_activated.connect(move |key| {
            assert_eq!(*key, RowKey::Int(2));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(view.activate_row(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_status_transitions() {
        let mut view = GridView::<Value>::empty(columns(), ViewOptions::default()).unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log = seen.clone();
        view.status_changed.connect(move |status| log.lock().push(*status));

        view.begin_loading();
        view.replace_data(materials(3)).unwrap();
        view.set_filter("name", "zzz");
        view.clear_filters();
        view.reset();

        assert_eq!(
            *seen.lock(),
            vec![
                ViewStatus::Loading,
                ViewStatus::Ready,
                ViewStatus::Empty,
                ViewStatus::Ready,
                ViewStatus::Idle,
            ]
        );
    }

    #[test]
    fn test_failed_replace_keeps_previous_data() {
        let mut view = view(3);
        let err = view.replace_data(vec![json!({"name": "keyless"})]).unwrap_err();
        assert!(matches!(err, Error::UnresolvedRowKey { .. }));
        assert_eq!(view.rows().len(), 3);
    }

    #[test]
    fn test_replace_data_clears_selection() {
        let mut view = view(3);
        view.toggle_row(1);
        view.replace_data(materials(3)).unwrap();
        assert!(!view.selection().has_selection());
    }

    #[test]
    fn test_replace_columns_drops_stale_state() {
        let mut view = view(5);
        view.set_filter("name", "1");
        view.set_sort("qty");
        view.replace_columns(vec![Column::field("name", "name").filterable(false)])
            .unwrap();
        assert!(view.filter_state().is_empty());
        assert!(view.sort_state().is_none());
        assert_eq!(view.filtered_count(), 5);
    }

    #[test]
    fn test_page_changed_signal() {
        let mut view = view(23);
        let pages = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log = pages.clone();
        view.page_changed.connect(move |info| log.lock().push(info.page));

        view.set_page(2);
        view.set_page(2);
        // "Material 2" and "Material 20" to "Material 23": one page.
        view.set_filter("name", "Material 2");
        assert_eq!(*pages.lock(), vec![2, 0]);
    }

    #[test]
    fn test_position_of() {
        let mut view = view(5);
        view.set_filter("name", "Material 3");
        assert_eq!(view.position_of(&RowKey::Int(3)), Some(0));
        assert_eq!(view.position_of(&RowKey::Int(1)), None);
    }
}
