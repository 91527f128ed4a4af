//! # esmon-engine
//!
//! The part of esmon that turns raw readings into something worth looking
//! at: per-second rates from cumulative counters, spike suppression for
//! aggregate throughput, interface and device classification, threshold
//! evaluation, and the sampling loop that ties them together.
//!
//! ## Pipeline
//!
//! ```text
//! CounterSource ──▶ RateDeriver ──▶ ResourceClassifier ──▶ SpikeFilter ──┐
//!                                                                         ├─▶ MetricsCache ──▶ evaluate ──▶ issues
//! ClusterSource ──▶ ClusterCollector (join health/nodes/indices) ────────┘
//! ```
//!
//! Sources are traits so the engine never touches the OS or the network
//! itself; `esmon-adapters` provides the real ones.
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use esmon_engine::{NetCounters, RateDeriver};
//!
//! let mut deriver = RateDeriver::new();
//! let t0 = Instant::now();
//! let first = NetCounters { bytes_recv: 1_000_000, ..Default::default() };
//! let later = NetCounters { bytes_recv: 1_500_000, ..Default::default() };
//!
//! assert!(!deriver.derive("eth0", first, t0).is_ready());
//! let rates = deriver
//!     .derive("eth0", later, t0 + Duration::from_secs(5))
//!     .rates()
//!     .unwrap();
//! assert_eq!(rates.bytes_recv, 100_000.0);
//! ```

mod classify;
mod collector;
mod counter;
mod error;
mod health;
mod rate;
mod readings;
mod scheduler;
mod smoothing;
mod snapshot;
mod source;
mod thresholds;

pub use classify::{ResourceClassifier, ResourceKind};
pub use collector::{ClusterCollector, SystemCollector, SystemCollectorConfig};
pub use counter::{counter_delta, rate_per_sec, CounterWidth};
pub use error::SourceError;
pub use health::{evaluate, suggestion, MetricsBatch, Observation, StatusObservation};
pub use rate::{CounterSet, Derivation, DerivedRate, RateDeriver};
pub use readings::{DiskCounters, NetCounters, SearchCounters, SearchRates};
pub use scheduler::{
    MetricsCache, Sampler, SamplerBuilder, SamplerHandle, DEFAULT_CLUSTER_INTERVAL,
    DEFAULT_REQUEST_DEADLINE, DEFAULT_SYSTEM_INTERVAL, MIN_INTERVAL,
};
pub use smoothing::{
    SpikeFilter, DEFAULT_DISK_CEILING, DEFAULT_NETWORK_CEILING, DEFAULT_SPIKE_FACTOR,
    DEFAULT_WINDOW, DISK_READ, DISK_WRITE, MAX_WINDOW, MIN_WINDOW, NET_RECV, NET_SENT,
};
pub use snapshot::{PreviousSample, SnapshotStore};
pub use source::{ClusterSource, CounterSource};
pub use thresholds::{ThresholdError, ThresholdPair, Thresholds};
