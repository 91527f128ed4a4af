//! Traits for the external collaborators the collectors read from.
//!
//! [`CounterSource`] is the host (OS counters, CPU, memory, mounts) and is
//! read synchronously on a blocking thread. [`ClusterSource`] is the
//! Elasticsearch REST API and is async.

use std::time::Instant;

use async_trait::async_trait;
use esmon_types::{ClusterHealth, CpuMetrics, IndexSummary, MemoryMetrics, NodeSummary, PartitionMetrics};

use crate::error::SourceError;
use crate::readings::{DiskCounters, NetCounters};

/// Host-level readings.
pub trait CounterSource: Send {
    fn hostname(&self) -> Option<String> {
        None
    }

    fn cpu(&mut self) -> Result<CpuMetrics, SourceError>;

    fn memory(&mut self) -> Result<MemoryMetrics, SourceError>;

    /// Mounted filesystems with capacity.
    fn partitions(&mut self) -> Result<Vec<PartitionMetrics>, SourceError>;

    /// Cumulative counters per interface.
    fn network_counters(&mut self) -> Result<Vec<(String, NetCounters)>, SourceError>;

    /// Cumulative counters per block device.
    fn disk_counters(&mut self) -> Result<Vec<(String, DiskCounters)>, SourceError>;

    /// Monotonic capture time for the readings just taken.
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: CounterSource + ?Sized> CounterSource for Box<T> {
    fn hostname(&self) -> Option<String> {
        (**self).hostname()
    }

    fn cpu(&mut self) -> Result<CpuMetrics, SourceError> {
        (**self).cpu()
    }

    fn memory(&mut self) -> Result<MemoryMetrics, SourceError> {
        (**self).memory()
    }

    fn partitions(&mut self) -> Result<Vec<PartitionMetrics>, SourceError> {
        (**self).partitions()
    }

    fn network_counters(&mut self) -> Result<Vec<(String, NetCounters)>, SourceError> {
        (**self).network_counters()
    }

    fn disk_counters(&mut self) -> Result<Vec<(String, DiskCounters)>, SourceError> {
        (**self).disk_counters()
    }

    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Read-only view of an Elasticsearch cluster.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Human-readable endpoint, e.g. `http://localhost:9200`.
    fn describe(&self) -> String;

    async fn cluster_health(&self) -> Result<ClusterHealth, SourceError>;

    async fn node_stats(&self) -> Result<Vec<NodeSummary>, SourceError>;

    async fn indices(&self) -> Result<Vec<IndexSummary>, SourceError>;
}

#[async_trait]
impl<T: ClusterSource + ?Sized> ClusterSource for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn cluster_health(&self) -> Result<ClusterHealth, SourceError> {
        (**self).cluster_health().await
    }

    async fn node_stats(&self) -> Result<Vec<NodeSummary>, SourceError> {
        (**self).node_stats().await
    }

    async fn indices(&self) -> Result<Vec<IndexSummary>, SourceError> {
        (**self).indices().await
    }
}
