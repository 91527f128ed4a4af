//! # esmon-types
//!
//! Core data model shared by the esmon crates. Every collector, the health
//! engine and the terminal front end speak in these types, and an exported
//! [`MetricsReport`] is exactly what a replay session reads back.
//!
//! ## Design Goals
//!
//! - **Plain data**: no behaviour beyond small derived accessors
//! - **Optional serialization**: enable the `serde` feature for JSON export
//! - **Versioned schema**: reports carry a [`SchemaVersion`] for replay compatibility
//!
//! ## Layout
//!
//! ```text
//! MetricsReport
//!   ├── SystemMetrics   (cpu, memory, disk, network; per-device rates)
//!   ├── ClusterMetrics  (health, node summaries, index summaries)
//!   └── Vec<HealthIssue> (severity-sorted findings)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use esmon_types::{MetricsReport, Severity};
//!
//! let report = MetricsReport::empty(1_700_000_000_000);
//! assert!(report.version.is_compatible());
//! assert_eq!(report.count(Severity::Critical), 0);
//! ```

mod cluster;
mod health;
mod report;
mod system;
mod version;

pub use cluster::*;
pub use health::*;
pub use report::*;
pub use system::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the report format.
pub const SCHEMA_VERSION: u32 = 1;

/// Milliseconds since the Unix epoch, or zero if the clock is before it.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
