//! View options.
//!
//! [`ViewOptions`] holds everything about a view that is not data or columns:
//! page size, the advisory page size choices, the page size policy, the
//! selection mode and the row key field. Options can be built in code or
//! loaded from TOML or JSON.
//!
//! # Example
//!
//! ```
//! use gridline::{PageSizePolicy, ViewOptions};
//!
//! let options = ViewOptions::from_toml_str(r#"
//!     page_size = 25
//!     page_size_policy = "preserve_first_visible_row"
//!     row_key_field = "uuid"
//! "#).unwrap();
//!
//! assert_eq!(options.page_size, 25);
//! assert_eq!(options.page_size_options, vec![10, 25, 50, 100]);
//! assert_eq!(options.page_size_policy, PageSizePolicy::PreserveFirstVisibleRow);
//! ```

use std::path::Path;

use gridline_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS, PageSizePolicy, SelectionMode};

/// Options for a [`GridView`](crate::GridView).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Initial rows per page.
    pub page_size: usize,
    /// Page size choices offered to the user. Advisory only.
    pub page_size_options: Vec<usize>,
    /// Page to land on after a page size change.
    pub page_size_policy: PageSizePolicy,
    /// Selection behavior.
    pub selection_mode: SelectionMode,
    /// Field holding each row's key.
    pub row_key_field: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            page_size_policy: PageSizePolicy::default(),
            selection_mode: SelectionMode::default(),
            row_key_field: "id".to_string(),
        }
    }
}

impl ViewOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Sets the initial page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the advisory page size choices.
    pub fn with_page_size_options(mut self, options: impl Into<Vec<usize>>) -> Self {
        self.page_size_options = options.into();
        self
    }

    /// Sets the page size policy.
    pub fn with_policy(mut self, policy: PageSizePolicy) -> Self {
        self.page_size_policy = policy;
        self
    }

    /// Sets the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Sets the field holding each row's key.
    pub fn with_row_key_field(mut self, field: impl Into<String>) -> Self {
        self.row_key_field = field.into();
        self
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Parses and validates options from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let options: Self = toml::from_str(s)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads and validates options from a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loading view options");
        Self::from_toml_str(&content)
    }

    /// Converts and validates options from a JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let options: Self = serde_json::from_value(value)?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that the page size and page size choices are positive.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            tracing::warn!(target: targets::CONFIG, "rejecting zero page size");
            return Err(Error::InvalidPageSize { size: 0 });
        }
        if self.page_size_options.is_empty() || self.page_size_options.contains(&0) {
            tracing::warn!(
                target: targets::CONFIG,
                options = ?self.page_size_options,
                "rejecting page size options"
            );
            return Err(Error::InvalidPageSizeOptions {
                options: self.page_size_options.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ViewOptions::default();
        assert_eq!(options.page_size, 10);
        assert_eq!(options.page_size_options, vec![10, 25, 50, 100]);
        assert_eq!(options.page_size_policy, PageSizePolicy::ResetToFirst);
        assert_eq!(options.selection_mode, SelectionMode::MultiSelection);
        assert_eq!(options.row_key_field, "id");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let options = ViewOptions::new()
            .with_page_size(50)
            .with_page_size_options([20, 50])
            .with_policy(PageSizePolicy::PreserveFirstVisibleRow)
            .with_selection_mode(SelectionMode::SingleSelection)
            .with_row_key_field("code");
        assert_eq!(options.page_size, 50);
        assert_eq!(options.page_size_options, vec![20, 50]);
        assert_eq!(options.selection_mode, SelectionMode::SingleSelection);
        assert_eq!(options.row_key_field, "code");
    }

    #[test]
    fn test_from_toml_partial() {
        let options = ViewOptions::from_toml_str("selection_mode = \"no_selection\"").unwrap();
        assert_eq!(options.selection_mode, SelectionMode::NoSelection);
        assert_eq!(options.page_size, 10);
    }

    #[test]
    fn test_from_toml_rejects_zero_page_size() {
        let err = ViewOptions::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidPageSize { size: 0 }));
    }

    #[test]
    fn test_from_toml_rejects_bad_options() {
        let err = ViewOptions::from_toml_str("page_size_options = []").unwrap_err();
        assert!(matches!(err, Error::InvalidPageSizeOptions { .. }));
        let err = ViewOptions::from_toml_str("page_size_options = [10, 0]").unwrap_err();
        assert!(matches!(err, Error::InvalidPageSizeOptions { .. }));
    }

    #[test]
    fn test_from_toml_syntax_error() {
        let err = ViewOptions::from_toml_str("page_size = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = 25").unwrap();
        writeln!(file, "page_size_options = [25, 75]").unwrap();

        let options = ViewOptions::load_toml(file.path()).unwrap();
        assert_eq!(options.page_size, 25);
        assert_eq!(options.page_size_options, vec![25, 75]);
    }

    #[test]
    fn test_load_toml_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewOptions::load_toml(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_from_json_value() {
        let options = ViewOptions::from_json_value(json!({
            "page_size": 100,
            "page_size_policy": "preserve_first_visible_row",
        }))
        .unwrap();
        assert_eq!(options.page_size, 100);
        assert_eq!(options.page_size_policy, PageSizePolicy::PreserveFirstVisibleRow);

        let err = ViewOptions::from_json_value(json!({"page_size": "ten"})).unwrap_err();
        assert!(matches!(err, Error::ConfigJson(_)));
    }
}
