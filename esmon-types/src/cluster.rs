//! Elasticsearch cluster summaries.

use crate::system::percent;

/// Cluster or index health colour as reported by Elasticsearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClusterStatus {
    Green,
    Yellow,
    Red,
    #[default]
    Unknown,
}

impl ClusterStatus {
    /// Parse the lowercase colour string used by the REST API.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => ClusterStatus::Green,
            "yellow" => ClusterStatus::Yellow,
            "red" => ClusterStatus::Red,
            _ => ClusterStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterStatus::Green => "green",
            ClusterStatus::Yellow => "yellow",
            ClusterStatus::Red => "red",
            ClusterStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `_cluster/health` document.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: ClusterStatus,
    pub timed_out: bool,
    pub number_of_nodes: u32,
    pub number_of_data_nodes: u32,
    pub active_primary_shards: u32,
    pub active_shards: u32,
    pub relocating_shards: u32,
    pub initializing_shards: u32,
    pub unassigned_shards: u32,
    pub delayed_unassigned_shards: u32,
    pub number_of_pending_tasks: u32,
    pub active_shards_percent: f64,
}

/// Per-node statistics distilled from `_nodes/stats`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSummary {
    pub id: String,
    pub name: String,
    pub host: String,
    pub roles: Vec<String>,

    pub heap_used_percent: f64,
    pub heap_used_bytes: u64,
    pub heap_max_bytes: u64,
    pub young_gc_count: u64,
    pub young_gc_millis: u64,
    pub old_gc_count: u64,
    pub old_gc_millis: u64,

    pub cpu_percent: f64,
    pub memory_used_percent: f64,
    pub open_file_descriptors: u64,
    pub max_file_descriptors: u64,
    pub fs_total_bytes: u64,
    pub fs_available_bytes: u64,

    pub docs_count: u64,
    pub store_size_bytes: u64,
    /// Cumulative documents indexed on this node.
    pub index_total: u64,
    /// Cumulative search queries executed on this node.
    pub query_total: u64,

    /// Documents indexed per second; `None` until observed twice.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub indexing_rate: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub query_rate: Option<f64>,
}

impl NodeSummary {
    /// Data-path usage, `None` when the node reports no filesystem.
    pub fn disk_used_percent(&self) -> Option<f64> {
        (self.fs_total_bytes > 0).then(|| {
            percent(
                self.fs_total_bytes.saturating_sub(self.fs_available_bytes),
                self.fs_total_bytes,
            )
        })
    }

    /// Open file descriptors against the process limit.
    pub fn fd_used_percent(&self) -> Option<f64> {
        (self.max_file_descriptors > 0)
            .then(|| percent(self.open_file_descriptors, self.max_file_descriptors))
    }
}

/// Per-index summary merged from `_cat/indices` and `_stats`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexSummary {
    pub name: String,
    pub health: ClusterStatus,
    /// "open" or "close".
    pub status: String,
    pub primaries: u32,
    pub replicas: u32,
    pub docs_count: u64,
    pub docs_deleted: u64,
    pub store_size_bytes: u64,
    pub primary_store_size_bytes: u64,
    pub index_total: u64,
    pub query_total: u64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub indexing_rate: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub query_rate: Option<f64>,
}

/// One cluster sample.
///
/// Node and index sections fail independently of the health document; a
/// failed section is empty and carries its error string.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterMetrics {
    pub timestamp_ms: u64,
    pub health: ClusterHealth,
    pub nodes: Vec<NodeSummary>,
    pub indices: Vec<IndexSummary>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub nodes_error: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub indices_error: Option<String>,
}
