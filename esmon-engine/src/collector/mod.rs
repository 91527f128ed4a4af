//! One canonical collector per concern.
//!
//! - [`SystemCollector`]: host CPU, memory, mounts, and network/disk rates
//! - [`ClusterCollector`]: cluster health, node and index summaries with rates

mod cluster;
mod system;

pub use cluster::ClusterCollector;
pub use system::{SystemCollector, SystemCollectorConfig};
