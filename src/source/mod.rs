//! Data source abstraction for receiving metrics reports.
//!
//! The TUI does not care where a report comes from: the live sampler's
//! shared cache, or a JSON file exported by an earlier session.

mod cache;
mod file;

pub use cache::CacheSource;
pub use file::{read_report, write_report, FileSource};

use std::fmt::Debug;

use esmon_types::MetricsReport;

/// Trait for receiving metrics reports from various sources.
///
/// # Example
///
/// ```
/// use esmon::{DataSource, FileSource};
///
/// let mut source = FileSource::new("esmon_export.json");
/// if let Some(report) = source.poll() {
///     println!("{} issues", report.issues.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest report.
    ///
    /// Returns `Some(report)` if new data is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<MetricsReport>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error from the last poll, if any.
    fn error(&self) -> Option<&str>;

    /// Make the next [`poll`](Self::poll) return the current report even if
    /// it has been seen before.
    fn force_refresh(&mut self) {}
}
