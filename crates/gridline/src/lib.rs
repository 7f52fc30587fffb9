//! Gridline - an interactive tabular data engine.
//!
//! Gridline turns an in-memory collection of uniformly-shaped rows and a set
//! of column descriptors into a filtered, sorted, paginated view with a
//! key-based selection. It has no rendering of its own: a presentation layer
//! reads the derived page and forwards user interaction back as transitions.
//!
//! # Example
//!
//! ```
//! use gridline::{CellValue, Column, GridView, SortDirection, ViewOptions};
//! use serde_json::json;
//!
//! let rows = vec![
//!     json!({"id": 1, "name": "Bolt", "qty": 10}),
//!     json!({"id": 2, "name": "Nut", "qty": 25}),
//!     json!({"id": 3, "name": "Washer", "qty": 5}),
//! ];
//! let columns = vec![
//!     Column::field("name", "name"),
//!     Column::field("qty", "qty"),
//!     Column::computed("low", |r: &serde_json::Value| {
//!         CellValue::from(r["qty"].as_i64().unwrap_or(0) < 10)
//!     }),
//! ];
//!
//! let mut view = GridView::new(rows, columns, ViewOptions::default())?;
//!
//! // Header click sorts ascending, a second click descending.
//! view.set_sort("qty");
//! assert_eq!(view.sort_direction_for("qty"), Some(SortDirection::Ascending));
//!
//! let page = view.page();
//! let names: Vec<&str> = page.rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
//! assert_eq!(names, ["Washer", "Bolt", "Nut"]);
//!
//! // Selection is keyed by row identity and survives filtering.
//! view.toggle_row(3);
//! view.set_filter("name", "bolt");
//! view.clear_filters();
//! assert!(view.selection().is_selected(&3.into()));
//! # Ok::<(), gridline::Error>(())
//! ```
//!
//! # Logging
//!
//! Every log record uses a target from
//! [`gridline_core::logging::targets`]. Install a `tracing` subscriber to see
//! them.

pub mod config;
pub mod error;
pub mod model;

pub use config::ViewOptions;
pub use error::{Error, ExtractError, Result};
pub use model::*;

pub use gridline_core::{ConnectionId, Signal};
