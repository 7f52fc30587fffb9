//! Logging facilities for Gridline.
//!
//! Gridline uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("gridline::view=debug,gridline::perf=trace")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every record is emitted under one of the [`targets`], so a single table's
//! pipeline can be traced without the rest of the application's noise.

use std::time::Instant;

/// Span names used throughout Gridline for tracing.
pub mod span_names {
    /// Full filter → sort recomputation.
    pub const PIPELINE: &str = "gridline::pipeline";
    /// Page slicing.
    pub const PAGINATE: &str = "gridline::paginate";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// View orchestrator transitions.
    pub const VIEW: &str = "gridline::view";
    /// Filter stage.
    pub const FILTER: &str = "gridline::filter";
    /// Sort stage.
    pub const SORT: &str = "gridline::sort";
    /// Pagination stage.
    pub const PAGINATION: &str = "gridline::pagination";
    /// Selection controller.
    pub const SELECTION: &str = "gridline::selection";
    /// Column model and cell extraction.
    pub const COLUMN: &str = "gridline::column";
    /// View options loading and validation.
    pub const CONFIG: &str = "gridline::config";
    /// Signal/slot system.
    pub const SIGNAL: &str = "gridline::signal";
    /// Performance spans.
    pub const PERF: &str = "gridline::perf";
}

/// A guard that keeps a tracing span entered and reports its duration when
/// dropped.
///
/// # Example
///
/// ```
/// use gridline_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("recompute");
///     // ... work ...
/// } // elapsed time is logged here at trace level
/// ```
#[derive(Debug)]
pub struct PerfSpan {
    name: &'static str,
    started: Instant,
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "gridline::perf", "perf", operation = name);
        Self {
            name,
            started: Instant::now(),
            span: span.entered(),
        }
    }

    /// Returns the operation name this span was created with.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        tracing::trace!(
            target: "gridline::perf",
            operation = self.name,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "operation finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let span = PerfSpan::new("test_operation");
        assert_eq!(span.name(), "test_operation");
    }

    #[test]
    fn test_perf_span_with_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let _span = PerfSpan::new(span_names::PIPELINE);
        });
    }

    #[test]
    fn test_targets_share_prefix() {
        for target in [
            targets::VIEW,
            targets::FILTER,
            targets::SORT,
            targets::PAGINATION,
            targets::SELECTION,
            targets::COLUMN,
            targets::CONFIG,
            targets::SIGNAL,
            targets::PERF,
        ] {
            assert!(target.starts_with("gridline::"));
        }
    }
}
