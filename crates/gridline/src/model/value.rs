//! Cell values and row keys.
//!
//! Every accessor in a column produces a [`CellValue`], the engine's scalar.
//! Filtering and sorting only ever look at cell values, never at rendered
//! output. Rows are tracked across recomputation by a [`RowKey`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The scalar produced by a column accessor.
///
/// `None` stands for a missing, null or unextractable value.
///
/// # Example
///
/// ```
/// use gridline::CellValue;
///
/// let qty = CellValue::from(25);
/// assert_eq!(qty.as_int(), Some(25));
/// assert_eq!(qty.display_text(), "25");
///
/// assert_eq!(CellValue::None.display_text(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No data.
    #[default]
    None,
    /// Boolean data.
    Bool(bool),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// String data.
    String(String),
}

impl CellValue {
    /// Returns `true` if this is `CellValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, CellValue::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Returns `true` for integer and floating point values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }

    /// Attempts to get the data as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Stringifies the value the way filters and the default renderer see it.
    ///
    /// `None` becomes the empty string.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::None => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(n) => n.to_string(),
            CellValue::String(s) => s.clone(),
        }
    }

    /// Compares two values numerically if both are numeric.
    ///
    /// Integers compare exactly, against each other and against floats, so the
    /// ordering stays transitive past 2^53. NaN sorts above every number and
    /// `-0.0` equals `0.0`.
    ///
    /// Returns `None` when either side is not a number.
    pub fn numeric_cmp(&self, other: &CellValue) -> Option<Ordering> {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => Some(a.cmp(b)),
            (CellValue::Int(a), CellValue::Float(b)) => Some(cmp_int_float(*a, *b)),
            (CellValue::Float(a), CellValue::Int(b)) => Some(cmp_int_float(*b, *a).reverse()),
            (CellValue::Float(a), CellValue::Float(b)) => Some(cmp_floats(*a, *b)),
            _ => None,
        }
    }
}

/// `2^63`, the first float above the `i64` range.
const I64_LIMIT: f64 = -(i64::MIN as f64);

fn cmp_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn cmp_int_float(a: i64, b: f64) -> Ordering {
    if b.is_nan() || b >= I64_LIMIT {
        return Ordering::Less;
    }
    if b < -I64_LIMIT {
        return Ordering::Greater;
    }
    let whole = b.trunc();
    // In range, so the cast is exact.
    a.cmp(&(whole as i64)).then_with(|| {
        if b > whole {
            Ordering::Less
        } else if b < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::String(s.clone())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<usize> for CellValue {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(CellValue::Float(n as f64), CellValue::Int)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        CellValue::Float(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(CellValue::None, Into::into)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::None,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map_or(CellValue::None, CellValue::Float),
            },
            Value::String(s) => CellValue::String(s.clone()),
            // Nested structures are matched against their JSON text.
            other => CellValue::String(other.to_string()),
        }
    }
}

/// The stable identity of a row.
///
/// Row keys join the raw collection with the selection set. They must be
/// unique within a dataset and stable across re-fetches of the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    /// Integer identity (database ids).
    Int(i64),
    /// String identity (uuids, codes).
    Str(String),
}

impl RowKey {
    /// Converts a cell value into a key.
    ///
    /// Integers and integral floats within the `i64` range become
    /// [`RowKey::Int`]. Strings and other floats become [`RowKey::Str`]. Null
    /// and boolean values cannot identify a row.
    pub fn from_cell(value: &CellValue) -> Option<RowKey> {
        match value {
            CellValue::Int(n) => Some(RowKey::Int(*n)),
            CellValue::Float(n) if n.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(n) => {
                Some(RowKey::Int(*n as i64))
            }
            CellValue::Float(n) => Some(RowKey::Str(n.to_string())),
            CellValue::String(s) => Some(RowKey::Str(s.clone())),
            CellValue::None | CellValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Int(n) => write!(f, "{n}"),
            RowKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(n: i64) -> Self {
        RowKey::Int(n)
    }
}

impl From<i32> for RowKey {
    fn from(n: i32) -> Self {
        RowKey::Int(n as i64)
    }
}

impl From<u32> for RowKey {
    fn from(n: u32) -> Self {
        RowKey::Int(n as i64)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey::Str(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        RowKey::Str(s)
    }
}
