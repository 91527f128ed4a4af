//! Display-side data handling.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "2s", "500ms", "1m")
//! - [`format`]: Byte, rate and count formatting
//! - [`history`]: Recent values per series for sparklines
//! - [`monitor`]: [`MonitorData`], the report plus what the UI derives from it
//!
//! ## Data Flow
//!
//! ```text
//! MetricsReport (cache or replay file)
//!        │
//!        ▼
//! MonitorData::from_report()
//!        │
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod duration;
pub mod format;
pub mod history;
pub mod monitor;

pub use history::History;
pub use monitor::{IssueCounts, MonitorData};
