//! # esmon-adapters
//!
//! The real sources behind the esmon engine's [`ClusterSource`] and
//! [`CounterSource`] traits.
//!
//! ## Supported Sources
//!
//! - **Elasticsearch** (`elasticsearch` feature): cluster health, node stats
//!   and index listings over the REST API, restricted to a read-only
//!   allow-list of `GET` endpoints
//! - **Host** (`host` feature): CPU, memory, filesystems and interface/device
//!   counters via `sysinfo`, with `/proc` on Linux
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use esmon_adapters::elasticsearch::ElasticsearchAdapter;
//! use esmon_adapters::host::HostCounterSource;
//! use esmon_engine::Sampler;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = ElasticsearchAdapter::builder()
//!         .endpoint("http://localhost:9200")
//!         .build()?;
//!
//!     let handle = Sampler::builder()
//!         .system_source(HostCounterSource::new())
//!         .cluster_source(adapter)
//!         .build()
//!         .start();
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! [`ClusterSource`]: esmon_engine::ClusterSource
//! [`CounterSource`]: esmon_engine::CounterSource

pub mod error;

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;

#[cfg(feature = "host")]
pub mod host;

pub use error::AdapterError;
