//! # esmon
//!
//! A read-only terminal dashboard for one Elasticsearch host and the cluster
//! it belongs to.
//!
//! The sampling work lives in `esmon-engine` (rate derivation, smoothing,
//! health evaluation, the periodic sampler) and `esmon-adapters` (the host
//! counter source and the Elasticsearch REST client). This crate is the front
//! end: configuration, the data sources the TUI reads from, and rendering.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (state) │    │ (history)│    │(render) │    │         │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── CacheSource (live sampler) | FileSource     │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, filtering and export
//! - **[`config`]**: Layered settings (defaults, TOML file, `ESMON_*` environment)
//! - **[`source`]**: The [`DataSource`] trait, backed by the sampler's shared
//!   cache or by an exported report on disk
//! - **[`data`]**: [`MonitorData`] accessors, sparkline [`History`], formatting
//! - **[`ui`]**: Host, Cluster and Issues views, overlays, plain-text output
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the local node
//! esmon
//!
//! # Watch a remote node with credentials, sampling every 5 seconds
//! esmon es01:9200 -u elastic -i 5s
//!
//! # Print one report and exit
//! esmon --once
//!
//! # Save a report, then look at it later
//! esmon --export snapshot.json
//! esmon --replay snapshot.json
//! ```
//!
//! ### As a library with a file source
//!
//! ```
//! use esmon::{App, FileSource};
//! use esmon_engine::Thresholds;
//!
//! let source = Box::new(FileSource::new("snapshot.json"));
//! let app = App::new(source, Thresholds::default());
//! assert!(app.data.is_none());
//! ```
//!
//! ### As a library with a live sampler
//!
//! ```no_run
//! use esmon::{App, CacheSource};
//! use esmon_adapters::host::HostCounterSource;
//! use esmon_engine::{Sampler, Thresholds};
//!
//! # tokio_test::block_on(async {
//! let sampler = Sampler::builder()
//!     .system_source(HostCounterSource::new())
//!     .build();
//! let cache = sampler.cache();
//! let handle = sampler.start();
//!
//! let app = App::new(Box::new(CacheSource::new(cache, "local host")), Thresholds::default());
//! # drop(app);
//! handle.shutdown().await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

pub use app::{App, View};
pub use config::Settings;
pub use data::{History, MonitorData};
pub use source::{CacheSource, DataSource, FileSource};
