//! Column model.
//!
//! A [`Column`] normalizes the two ways a table reads a cell:
//!
//! - **Field** columns read a named field through the [`Record`] trait
//! - **Computed** columns run an extraction closure over the whole row
//!
//! Both go through [`Column::extract`], which is the only path the filter and
//! sort stages use. Rendering (`render`) is a display concern and never feeds
//! back into comparisons.
//!
//! # Example
//!
//! ```
//! use gridline::{CellValue, Column, Record};
//!
//! struct Material {
//!     id: i64,
//!     name: String,
//!     qty: i64,
//!     unit_cost: f64,
//! }
//!
//! impl Record for Material {
//!     fn field(&self, key: &str) -> Option<CellValue> {
//!         match key {
//!             "id" => Some(self.id.into()),
//!             "name" => Some(self.name.as_str().into()),
//!             "qty" => Some(self.qty.into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let columns: Vec<Column<Material>> = vec![
//!     Column::field("Name", "name"),
//!     Column::field("Qty", "qty").render(|value, _| format!("{value} pcs")),
//!     Column::computed("Total", |m: &Material| CellValue::from(m.qty as f64 * m.unit_cost))
//!         .with_id("total"),
//! ];
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use gridline_core::logging::targets;

use super::value::{CellValue, RowKey};
use crate::error::ExtractError;

/// Stable identity of a column, used as the key of filter and sort state.
pub type ColumnId = String;

/// Type alias for a computed accessor.
pub type ExtractFn<T> = Arc<dyn Fn(&T) -> Result<CellValue, ExtractError> + Send + Sync>;

/// Type alias for a display transform: (raw value, row) -> text.
pub type RenderFn<T> = Arc<dyn Fn(&CellValue, &T) -> String + Send + Sync>;

/// Type alias for a custom filter predicate: (row, query) -> keep.
pub type FilterPredicate<T> = Arc<dyn Fn(&T, &str) -> bool + Send + Sync>;

/// Type alias for a custom ascending comparator.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Type alias for a function-based row key strategy.
pub type RowKeyFn<T> = Arc<dyn Fn(&T) -> Option<RowKey> + Send + Sync>;

/// Row types whose fields can be read by name.
///
/// Return `None` when the row has no field called `key`. A field that exists
/// but holds no value should return `Some(CellValue::None)`.
pub trait Record {
    /// Reads one named field.
    fn field(&self, key: &str) -> Option<CellValue>;
}

impl Record for serde_json::Value {
    fn field(&self, key: &str) -> Option<CellValue> {
        self.as_object()?.get(key).map(CellValue::from)
    }
}

impl Record for HashMap<String, CellValue> {
    fn field(&self, key: &str) -> Option<CellValue> {
        self.get(key).cloned()
    }
}

impl Record for BTreeMap<String, CellValue> {
    fn field(&self, key: &str) -> Option<CellValue> {
        self.get(key).cloned()
    }
}

/// How a column reads its value from a row.
pub enum Accessor<T> {
    /// A literal field key resolved through [`Record`].
    Field(String),
    /// A derivation with no backing field.
    Computed(ExtractFn<T>),
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Field(key) => Accessor::Field(key.clone()),
            Accessor::Computed(f) => Accessor::Computed(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(key) => f.debug_tuple("Field").field(key).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<T> Accessor<T> {
    /// Returns `true` for computed accessors.
    pub fn is_computed(&self) -> bool {
        matches!(self, Accessor::Computed(_))
    }
}

/// A column descriptor.
///
/// Field columns are sortable and filterable by default. Computed columns are
/// sortable but only filterable once opted in with [`Column::filterable`] or
/// given a predicate with [`Column::filter_with`].
pub struct Column<T> {
    id: ColumnId,
    header: String,
    accessor: Accessor<T>,
    sortable: bool,
    filterable: bool,
    render: Option<RenderFn<T>>,
    filter_predicate: Option<FilterPredicate<T>>,
    comparator: Option<CompareFn<T>>,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            render: self.render.clone(),
            filter_predicate: self.filter_predicate.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("accessor", &self.accessor)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("render", &self.render.is_some())
            .field("filter_predicate", &self.filter_predicate.is_some())
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}

impl<T: Record> Column<T> {
    /// Creates a column reading the named field. The header doubles as the id.
    pub fn field(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self::with_accessor(header, Accessor::Field(key.into()), true)
    }
}

impl<T> Column<T> {
    /// Creates a computed column from an infallible extraction closure.
    pub fn computed<F>(header: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&T) -> CellValue + Send + Sync + 'static,
    {
        Self::try_computed(header, move |row: &T| Ok(extract(row)))
    }

    /// Creates a computed column whose extraction may fail.
    ///
    /// A failure yields an empty cell for that row.
    pub fn try_computed<F>(header: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&T) -> Result<CellValue, ExtractError> + Send + Sync + 'static,
    {
        Self::with_accessor(header, Accessor::Computed(Arc::new(extract)), false)
    }

    fn with_accessor(header: impl Into<String>, accessor: Accessor<T>, filterable: bool) -> Self {
        let header = header.into();
        Self {
            id: header.clone(),
            header,
            accessor,
            sortable: true,
            filterable,
            render: None,
            filter_predicate: None,
            comparator: None,
        }
    }

    /// Sets an explicit id, decoupling state keys from the display header.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Enables or disables sorting on this column.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Enables or disables filtering on this column.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets a display transform.
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&CellValue, &T) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Replaces the substring rule with a custom predicate and makes the
    /// column filterable.
    pub fn filter_with<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T, &str) -> bool + Send + Sync + 'static,
    {
        self.filter_predicate = Some(Arc::new(predicate));
        self.filterable = true;
        self
    }

    /// Replaces the default comparator with a custom ascending one.
    ///
    /// Descending order is always the mirror of this comparator.
    pub fn compare_with<F>(mut self, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(compare));
        self
    }

    /// Returns the column id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display header.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Returns the accessor.
    pub fn accessor(&self) -> &Accessor<T> {
        &self.accessor
    }

    /// Returns whether sort affordances should be offered.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Returns whether filter affordances should be offered.
    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Returns the custom filter predicate, if any.
    pub fn filter_predicate(&self) -> Option<&FilterPredicate<T>> {
        self.filter_predicate.as_ref()
    }

    /// Returns the custom comparator, if any.
    pub fn comparator(&self) -> Option<&CompareFn<T>> {
        self.comparator.as_ref()
    }

    /// Renders a cell for display.
    ///
    /// Uses the column's render transform if present, otherwise the raw
    /// value's text.
    pub fn display_text(&self, row: &T) -> String
    where
        T: Record,
    {
        let value = self.extract(row);
        match &self.render {
            Some(render) => render(&value, row),
            None => value.display_text(),
        }
    }
}

impl<T> Column<T> {
    /// Extracts the raw value, reporting failures.
    pub fn try_extract(&self, row: &T) -> Result<CellValue, ExtractError>
    where
        T: Record,
    {
        match &self.accessor {
            Accessor::Field(key) => row.field(key).ok_or_else(|| ExtractError::missing_field(key)),
            Accessor::Computed(extract) => extract(row),
        }
    }

    /// Extracts the raw value used for filtering and sorting.
    ///
    /// Failures degrade to [`CellValue::None`].
    pub fn extract(&self, row: &T) -> CellValue
    where
        T: Record,
    {
        self.try_extract(row).unwrap_or_else(|err| {
            tracing::trace!(
                target: targets::COLUMN,
                column = %self.id,
                error = %err,
                "cell extraction failed"
            );
            CellValue::None
        })
    }
}

/// How a row resolves to its [`RowKey`].
pub enum RowKeyStrategy<T> {
    /// Read the key from a named field.
    Field(String),
    /// Compute the key from the row.
    Func(RowKeyFn<T>),
}

impl<T> Default for RowKeyStrategy<T> {
    fn default() -> Self {
        RowKeyStrategy::Field("id".to_string())
    }
}

impl<T> Clone for RowKeyStrategy<T> {
    fn clone(&self) -> Self {
        match self {
            RowKeyStrategy::Field(key) => RowKeyStrategy::Field(key.clone()),
            RowKeyStrategy::Func(f) => RowKeyStrategy::Func(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for RowKeyStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKeyStrategy::Field(key) => f.debug_tuple("Field").field(key).finish(),
            RowKeyStrategy::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl<T> fmt::Display for RowKeyStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKeyStrategy::Field(key) => write!(f, "field '{key}'"),
            RowKeyStrategy::Func(_) => f.write_str("key function"),
        }
    }
}

impl<T: Record> RowKeyStrategy<T> {
    /// Resolves the key of one row.
    pub fn resolve(&self, row: &T) -> Option<RowKey> {
        match self {
            RowKeyStrategy::Field(key) => row.field(key).as_ref().and_then(RowKey::from_cell),
            RowKeyStrategy::Func(f) => f(row),
        }
    }
}

/// Looks up a column by id.
pub fn find_column<'a, T>(columns: &'a [Column<T>], id: &str) -> Option<&'a Column<T>> {
    columns.iter().find(|c| c.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Shift {
        id: i64,
        crew: String,
        hours: Option<f64>,
    }

    impl Record for Shift {
        fn field(&self, key: &str) -> Option<CellValue> {
            match key {
                "id" => Some(self.id.into()),
                "crew" => Some(self.crew.as_str().into()),
                "hours" => Some(self.hours.into()),
                _ => None,
            }
        }
    }

    fn shift() -> Shift {
        Shift {
            id: 4,
            crew: "Night".into(),
            hours: Some(7.5),
        }
    }

    #[test]
    fn test_field_column_defaults() {
        let col = Column::<Shift>::field("Crew", "crew");
        assert_eq!(col.id(), "Crew");
        assert_eq!(col.header(), "Crew");
        assert!(col.is_sortable());
        assert!(col.is_filterable());
        assert!(!col.accessor().is_computed());
        assert_eq!(col.extract(&shift()), CellValue::from("Night"));
    }

    #[test]
    fn test_computed_column_defaults() {
        let col = Column::computed("Double", |s: &Shift| CellValue::from(s.id * 2));
        assert!(col.is_sortable());
        assert!(!col.is_filterable());
        assert!(col.accessor().is_computed());
        assert_eq!(col.extract(&shift()), CellValue::Int(8));
    }

    #[test]
    fn test_filter_with_enables_filtering() {
        let col = Column::computed("Double", |s: &Shift| CellValue::from(s.id * 2))
            .filter_with(|s, q| q == "even" && s.id % 2 == 0);
        assert!(col.is_filterable());
        assert!(col.filter_predicate().is_some());
    }

    #[test]
    fn test_missing_field_degrades_to_none() {
        let col = Column::<Shift>::field("Missing", "nope");
        assert_eq!(
            col.try_extract(&shift()),
            Err(ExtractError::missing_field("nope"))
        );
        assert!(col.extract(&shift()).is_none());
    }

    #[test]
    fn test_failing_accessor_degrades_to_none() {
        let col = Column::try_computed("Rate", |s: &Shift| {
            s.hours
                .map(|h| CellValue::from(h / 8.0))
                .ok_or_else(|| ExtractError::failed("no hours"))
        });
        let mut row = shift();
        assert_eq!(col.extract(&row), CellValue::Float(7.5 / 8.0));
        row.hours = None;
        assert!(col.extract(&row).is_none());
    }

    #[test]
    fn test_render_does_not_change_raw_value() {
        let col = Column::<Shift>::field("Hours", "hours").render(|v, _| format!("{v} h"));
        assert_eq!(col.display_text(&shift()), "7.5 h");
        assert_eq!(col.extract(&shift()), CellValue::Float(7.5));
    }

    #[test]
    fn test_with_id() {
        let col = Column::<Shift>::field("Crew name", "crew").with_id("crew");
        assert_eq!(col.id(), "crew");
        assert_eq!(col.header(), "Crew name");
    }

    #[test]
    fn test_row_key_strategy_default_field() {
        let strategy = RowKeyStrategy::<Shift>::default();
        assert_eq!(strategy.resolve(&shift()), Some(RowKey::Int(4)));
        assert_eq!(strategy.to_string(), "field 'id'");
    }

    #[test]
    fn test_row_key_strategy_func() {
        let strategy: RowKeyStrategy<Shift> =
            RowKeyStrategy::Func(Arc::new(|s: &Shift| Some(RowKey::from(s.crew.clone()))));
        assert_eq!(strategy.resolve(&shift()), Some(RowKey::from("Night")));
    }

    #[test]
    fn test_json_record() {
        let row = json!({"id": "a-1", "qty": 3});
        let col = Column::<serde_json::Value>::field("Qty", "qty");
        assert_eq!(col.extract(&row), CellValue::Int(3));
        assert_eq!(
            RowKeyStrategy::<serde_json::Value>::default().resolve(&row),
            Some(RowKey::from("a-1"))
        );
        assert_eq!(json!([1, 2]).field("id"), None);
    }

    #[test]
    fn test_find_column() {
        let columns = vec![
            Column::<Shift>::field("Crew", "crew"),
            Column::<Shift>::field("Hours", "hours"),
        ];
        assert_eq!(find_column(&columns, "Hours").map(Column::header), Some("Hours"));
        assert!(find_column(&columns, "Nope").is_none());
    }
}
