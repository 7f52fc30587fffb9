//! Core primitives for Gridline.
//!
//! This crate provides the small pieces the data-grid engine builds on:
//!
//! - **Signal/Slot System**: Type-safe change notification for view state
//! - **Logging**: `tracing` targets and performance spans for the pipeline
//!
//! # Signal/Slot Example
//!
//! ```
//! use gridline_core::Signal;
//!
//! // Create a signal that notifies when the current page changes
//! let page_changed = Signal::<usize>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = page_changed.connect(|page| {
//!     println!("Now showing page {}", page + 1);
//! });
//!
//! // Emit the signal
//! page_changed.emit(2);
//!
//! // Disconnect when done
//! page_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
