//! Filter stage.
//!
//! Applies per-column free-text queries to the raw collection. A row survives
//! only if every active query matches (logical AND across columns). The
//! default rule is a case-insensitive substring match on the stringified raw
//! value. Columns with a custom predicate use that instead.
//!
//! The stage works on row indices so row identity is preserved and rows are
//! never cloned.

use std::collections::HashMap;

use gridline_core::logging::targets;

use super::column::{Column, ColumnId, Record, find_column};

/// Column id → query text.
///
/// Absent entries and empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    queries: HashMap<ColumnId, String>,
}

impl FilterState {
    /// Creates an empty filter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query for a column. An empty query removes the entry.
    ///
    /// Returns `true` if the effective state changed.
    pub fn set(&mut self, column_id: impl Into<ColumnId>, text: impl Into<String>) -> bool {
        let column_id = column_id.into();
        let text = text.into();
        if text.is_empty() {
            return self.queries.remove(&column_id).is_some();
        }
        match self.queries.get(&column_id) {
            Some(existing) if *existing == text => false,
            _ => {
                self.queries.insert(column_id, text);
                true
            }
        }
    }

    /// Returns the query for a column, if one is active.
    pub fn get(&self, column_id: &str) -> Option<&str> {
        self.queries.get(column_id).map(String::as_str)
    }

    /// Removes the query for a column. Returns `true` if one was active.
    pub fn remove(&mut self, column_id: &str) -> bool {
        self.queries.remove(column_id).is_some()
    }

    /// Removes every query. Returns `true` if any was active.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.queries.is_empty();
        self.queries.clear();
        had_any
    }

    /// Keeps only entries accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.queries.retain(|id, _| keep(id));
    }

    /// Returns `true` when no column is constrained.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Returns the number of active queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Iterates over active (column id, query) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.queries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<ColumnId>, V: Into<String>> FromIterator<(K, V)> for FilterState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = FilterState::new();
        for (k, v) in iter {
            state.set(k, v);
        }
        state
    }
}

/// A query resolved against its column, with the needle lowercased once.
struct ActiveFilter<'a, T> {
    column: &'a Column<T>,
    query: &'a str,
    needle: String,
}

impl<T: Record> ActiveFilter<'_, T> {
    fn matches(&self, row: &T) -> bool {
        match self.column.filter_predicate() {
            Some(predicate) => predicate(row, self.query),
            None => contains_ignore_case(&self.column.extract(row).display_text(), &self.needle),
        }
    }
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

fn active_filters<'a, T>(
    columns: &'a [Column<T>],
    state: &'a FilterState,
) -> Vec<ActiveFilter<'a, T>> {
    state
        .iter()
        .filter(|(_, query)| !query.is_empty())
        .filter_map(|(id, query)| match find_column(columns, id) {
            Some(column) if column.is_filterable() => Some(ActiveFilter {
                column,
                query,
                needle: query.to_lowercase(),
            }),
            _ => {
                tracing::debug!(
                    target: targets::FILTER,
                    column = id,
                    "ignoring filter on unknown or non-filterable column"
                );
                None
            }
        })
        .collect()
}

/// Returns the indices of rows matching every active filter, in input order.
pub fn filter_indices<T: Record>(
    rows: &[T],
    columns: &[Column<T>],
    state: &FilterState,
) -> Vec<usize> {
    let filters = active_filters(columns, state);
    if filters.is_empty() {
        return (0..rows.len()).collect();
    }

    let kept: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filters.iter().all(|f| f.matches(row)))
        .map(|(i, _)| i)
        .collect();

    tracing::trace!(
        target: targets::FILTER,
        active = filters.len(),
        input = rows.len(),
        kept = kept.len(),
        "filtered rows"
    );
    kept
}

/// Returns the rows matching every active filter, in input order.
pub fn filter_rows<'a, T: Record>(
    rows: &'a [T],
    columns: &[Column<T>],
    state: &FilterState,
) -> Vec<&'a T> {
    filter_indices(rows, columns, state)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}
