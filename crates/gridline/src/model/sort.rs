//! Sort stage.
//!
//! One active sort key at a time. A column whose defined cells are all numbers
//! sorts numerically; any other column sorts every cell by its stringified
//! value. Null cells always sort after defined ones, in both directions.
//!
//! Descending order uses the reversed ascending comparator with the same
//! stable sort, so ties keep their input order in both directions and the two
//! directions mirror each other everywhere else.

use std::cmp::Ordering;

use gridline_core::logging::targets;
use serde::{Deserialize, Serialize};

use super::column::{Column, ColumnId, Record, find_column};
use super::value::CellValue;

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    /// Descending order (Z-A, 9-0).
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    /// Applies this direction to an ascending ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// The active sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    /// Column being sorted.
    pub column_id: ColumnId,
    /// Direction of the sort.
    pub direction: SortDirection,
}

impl SortState {
    /// Creates an ascending sort on a column.
    pub fn ascending(column_id: impl Into<ColumnId>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Creates a descending sort on a column.
    pub fn descending(column_id: impl Into<ColumnId>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Computes the next sort state when a column header is activated.
///
/// Repeated activation of the same column cycles
/// none → ascending → descending → none. Activating a different column starts
/// it at ascending.
pub fn cycle_sort(current: Option<&SortState>, column_id: &str) -> Option<SortState> {
    match current {
        Some(state) if state.column_id == column_id => match state.direction {
            SortDirection::Ascending => Some(SortState::descending(column_id)),
            SortDirection::Descending => None,
        },
        _ => Some(SortState::ascending(column_id)),
    }
}

/// How a sort pass compares defined cells.
///
/// The mode is chosen once per pass from every value in the column, so a
/// column mixing numbers and strings is compared as text throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortMode {
    Numeric,
    Text,
}

impl SortMode {
    fn for_cells<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> Self {
        if cells.into_iter().all(|v| v.is_none() || v.is_numeric()) {
            SortMode::Numeric
        } else {
            SortMode::Text
        }
    }

    /// Reduces a cell to its key under this mode. Null cells have no key.
    fn key(self, value: CellValue) -> Option<SortKey> {
        match (self, value) {
            (_, CellValue::None) => None,
            (SortMode::Numeric, value) => Some(SortKey::Number(value)),
            (SortMode::Text, value) => Some(SortKey::Text(value.display_text())),
        }
    }
}

#[derive(Debug)]
enum SortKey {
    Number(CellValue),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.numeric_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // A single pass never mixes modes.
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

/// Directional comparison that keeps nulls last regardless of direction.
fn compare_directed(
    a: &Option<SortKey>,
    b: &Option<SortKey>,
    direction: SortDirection,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(a.compare(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Default ascending comparison of two cell values.
///
/// Two numbers compare numerically, any other pair by display text. Null
/// values sort last. Sorting a column applies the same rule to the column as
/// a whole: it is numeric only when every defined cell is a number.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    let mode = SortMode::for_cells([a, b]);
    compare_directed(
        &mode.key(a.clone()),
        &mode.key(b.clone()),
        SortDirection::Ascending,
    )
}

/// Sorts a list of row indices by the active sort key.
///
/// With no sort state, or a sort on an unknown or non-sortable column, the
/// indices are returned in their input order.
pub fn sort_indices<T: Record>(
    rows: &[T],
    columns: &[Column<T>],
    mut indices: Vec<usize>,
    sort: Option<&SortState>,
) -> Vec<usize> {
    let Some(sort) = sort else {
        return indices;
    };
    let column = match find_column(columns, &sort.column_id) {
        Some(column) if column.is_sortable() => column,
        _ => {
            tracing::debug!(
                target: targets::SORT,
                column = %sort.column_id,
                "ignoring sort on unknown or non-sortable column"
            );
            return indices;
        }
    };

    let direction = sort.direction;
    if let Some(compare) = column.comparator() {
        indices.sort_by(|&a, &b| direction.apply(compare(&rows[a], &rows[b])));
    } else {
        // Extract once per row; accessors may be expensive.
        let cells: Vec<CellValue> = indices.iter().map(|&i| column.extract(&rows[i])).collect();
        let mode = SortMode::for_cells(&cells);
        let mut keyed: Vec<(usize, Option<SortKey>)> = indices
            .iter()
            .zip(cells)
            .map(|(&i, cell)| (i, mode.key(cell)))
            .collect();
        keyed.sort_by(|(_, a), (_, b)| compare_directed(a, b, direction));
        indices = keyed.into_iter().map(|(i, _)| i).collect();
    }

    tracing::trace!(
        target: targets::SORT,
        column = %sort.column_id,
        ?direction,
        rows = indices.len(),
        "sorted rows"
    );
    indices
}

/// Sorts row references by the active sort key. Stable.
pub fn sort_rows<'a, T: Record>(
    rows: &'a [T],
    columns: &[Column<T>],
    sort: Option<&SortState>,
) -> Vec<&'a T> {
    sort_indices(rows, columns, (0..rows.len()).collect(), sort)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        id: i64,
        qty: Option<i64>,
        name: &'static str,
    }

    impl Record for Item {
        fn field(&self, key: &str) -> Option<CellValue> {
            match key {
                "id" => Some(self.id.into()),
                "qty" => Some(self.qty.into()),
                "name" => Some(self.name.into()),
                _ => None,
            }
        }
    }

    fn items(qtys: &[Option<i64>]) -> Vec<Item> {
        qtys.iter()
            .enumerate()
            .map(|(i, &qty)| Item {
                id: i as i64 + 1,
                qty,
                name: "item",
            })
            .collect()
    }

    fn ids(rows: &[Item], order: &[usize]) -> Vec<i64> {
        order.iter().map(|&i| rows[i].id).collect()
    }

    fn columns() -> Vec<Column<Item>> {
        vec![
            Column::field("qty", "qty"),
            Column::field("name", "name"),
            Column::field("id", "id").sortable(false),
        ]
    }

    #[test]
    fn test_cycle_sort() {
        let s1 = cycle_sort(None, "qty");
        assert_eq!(s1, Some(SortState::ascending("qty")));
        let s2 = cycle_sort(s1.as_ref(), "qty");
        assert_eq!(s2, Some(SortState::descending("qty")));
        let s3 = cycle_sort(s2.as_ref(), "qty");
        assert_eq!(s3, None);
        assert_eq!(
            cycle_sort(Some(&SortState::descending("qty")), "name"),
            Some(SortState::ascending("name"))
        );
    }

    #[test]
    fn test_numeric_sort_both_directions() {
        let rows = items(&[Some(10), Some(25), Some(5), Some(100), Some(15)]);
        let all: Vec<usize> = (0..rows.len()).collect();

        let asc = sort_indices(&rows, &columns(), all.clone(), Some(&SortState::ascending("qty")));
        assert_eq!(ids(&rows, &asc), vec![3, 1, 5, 2, 4]);

        let desc = sort_indices(&rows, &columns(), all, Some(&SortState::descending("qty")));
        assert_eq!(ids(&rows, &desc), vec![4, 2, 5, 1, 3]);
    }

    #[test]
    fn test_numbers_not_compared_as_strings() {
        let rows = items(&[Some(9), Some(10), Some(100)]);
        let sort = SortState::ascending("qty");
        let asc = sort_indices(&rows, &columns(), vec![0, 1, 2], Some(&sort));
        assert_eq!(ids(&rows, &asc), vec![1, 2, 3]);
    }

    #[test]
    fn test_mixed_numbers_and_strings_sort_as_text() {
        let rows = items(&[None, None, None, None]);
        let cols = vec![Column::<Item>::computed("code", |item| match item.id {
            1 => CellValue::from(9),
            2 => CellValue::from("9"),
            3 => CellValue::from(10),
            _ => CellValue::None,
        })];
        let all: Vec<usize> = (0..rows.len()).collect();

        let asc = sort_indices(&rows, &cols, all.clone(), Some(&SortState::ascending("code")));
        assert_eq!(ids(&rows, &asc), vec![3, 1, 2, 4]);

        let desc = sort_indices(&rows, &cols, all, Some(&SortState::descending("code")));
        assert_eq!(ids(&rows, &desc), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_all_numeric_column_sorts_numerically() {
        let rows = items(&[None, None, None]);
        let cols = vec![Column::<Item>::computed("amount", |item| match item.id {
            1 => CellValue::from(10),
            2 => CellValue::from(9.5),
            _ => CellValue::from(100),
        })];
        let sort = SortState::ascending("amount");
        let asc = sort_indices(&rows, &cols, vec![0, 1, 2], Some(&sort));
        assert_eq!(ids(&rows, &asc), vec![2, 1, 3]);
    }

    #[test]
    fn test_no_sort_preserves_input_order() {
        let rows = items(&[Some(3), Some(1), Some(2)]);
        assert_eq!(sort_indices(&rows, &columns(), vec![2, 0, 1], None), vec![2, 0, 1]);
    }

    #[test]
    fn test_ties_keep_input_order_in_both_directions() {
        let rows = items(&[Some(1), Some(2), Some(1), Some(2), Some(1)]);
        let all: Vec<usize> = (0..rows.len()).collect();

        let asc = sort_indices(&rows, &columns(), all.clone(), Some(&SortState::ascending("qty")));
        assert_eq!(ids(&rows, &asc), vec![1, 3, 5, 2, 4]);

        let desc = sort_indices(&rows, &columns(), all, Some(&SortState::descending("qty")));
        assert_eq!(ids(&rows, &desc), vec![2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_nulls_last_in_both_directions() {
        let rows = items(&[None, Some(2), None, Some(1)]);
        let all: Vec<usize> = (0..rows.len()).collect();

        let asc = sort_indices(&rows, &columns(), all.clone(), Some(&SortState::ascending("qty")));
        assert_eq!(ids(&rows, &asc), vec![4, 2, 1, 3]);

        let desc = sort_indices(&rows, &columns(), all, Some(&SortState::descending("qty")));
        assert_eq!(ids(&rows, &desc), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_non_sortable_column_ignored() {
        let rows = items(&[Some(3), Some(1)]);
        let order = sort_indices(&rows, &columns(), vec![1, 0], Some(&SortState::descending("id")));
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_string_comparison_is_bytewise() {
        let a = CellValue::from("apple");
        let b = CellValue::from("Banana");
        assert_eq!(compare_values(&a, &b), Ordering::Greater);
        assert_eq!(compare_values(&CellValue::from(2), &CellValue::from("10")), Ordering::Greater);
    }

    #[test]
    fn test_custom_comparator_mirrors() {
        let rows = items(&[Some(1), Some(2), Some(3)]);
        let cols = vec![
            Column::<Item>::field("qty", "qty").compare_with(|a, b| b.qty.cmp(&a.qty)),
        ];
        let asc = sort_indices(&rows, &cols, vec![0, 1, 2], Some(&SortState::ascending("qty")));
        assert_eq!(ids(&rows, &asc), vec![3, 2, 1]);
        let desc = sort_indices(&rows, &cols, vec![0, 1, 2], Some(&SortState::descending("qty")));
        assert_eq!(ids(&rows, &desc), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_rows() {
        let rows = items(&[Some(2), Some(1)]);
        let sorted = sort_rows(&rows, &columns(), Some(&SortState::ascending("qty")));
        assert_eq!(sorted.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_direction_serde() {
        let d: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(d, SortDirection::Descending);
        assert_eq!(serde_json::to_string(&SortDirection::Ascending).unwrap(), "\"ascending\"");
    }
}
