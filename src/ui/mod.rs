//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`host`]: CPU, memory, throughput and per-device tables for this machine
//! - [`cluster`]: Cluster health banner, node table and index table
//! - [`issues`]: Every health finding, most urgent first
//! - [`detail`]: Modal overlay for the selected issue or node
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//! - [`text`]: Plain-text report for one-shot runs
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (host/cluster/issues::render)        │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod cluster;
pub mod common;
pub mod detail;
pub mod host;
pub mod issues;
pub mod text;
pub mod theme;

pub use cluster::NodeSortColumn;
pub use theme::Theme;
