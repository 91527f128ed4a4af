//! Health findings produced by threshold classification.

/// How urgent a [`HealthIssue`] is.
///
/// Ordering puts the most urgent first, so sorting ascending yields
/// critical, warning, info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Info];

    /// Short label for tables.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Critical => "CRIT",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the deployment an issue concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Component {
    Host,
    Cluster,
    Node,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Host => "host",
            Component::Cluster => "cluster",
            Component::Node => "node",
        }
    }
}

/// A classified metric.
///
/// Declaration order is the tie-break order for issues that share a
/// severity and subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MetricDimension {
    ClusterStatus,
    HeapPercent,
    OldGcCount,
    DiskPercent,
    FileDescriptorPercent,
    CpuPercent,
    MemoryPercent,
}

impl MetricDimension {
    /// Dimensions that are classified against numeric thresholds.
    pub const THRESHOLDED: [MetricDimension; 6] = [
        MetricDimension::HeapPercent,
        MetricDimension::OldGcCount,
        MetricDimension::DiskPercent,
        MetricDimension::FileDescriptorPercent,
        MetricDimension::CpuPercent,
        MetricDimension::MemoryPercent,
    ];

    /// Stable key used in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            MetricDimension::ClusterStatus => "cluster_status",
            MetricDimension::HeapPercent => "heap",
            MetricDimension::OldGcCount => "old_gc",
            MetricDimension::DiskPercent => "disk",
            MetricDimension::FileDescriptorPercent => "file_descriptors",
            MetricDimension::CpuPercent => "cpu",
            MetricDimension::MemoryPercent => "memory",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricDimension::ClusterStatus => "Cluster status",
            MetricDimension::HeapPercent => "JVM heap",
            MetricDimension::OldGcCount => "Old-gen GC count",
            MetricDimension::DiskPercent => "Disk usage",
            MetricDimension::FileDescriptorPercent => "File descriptors",
            MetricDimension::CpuPercent => "CPU usage",
            MetricDimension::MemoryPercent => "Memory usage",
        }
    }

    /// Unit suffix for observed and threshold values.
    pub fn unit(&self) -> &'static str {
        match self {
            MetricDimension::OldGcCount | MetricDimension::ClusterStatus => "",
            _ => "%",
        }
    }
}

impl std::fmt::Display for MetricDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single finding. Rebuilt on every evaluation, never mutated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthIssue {
    pub severity: Severity,
    pub component: Component,
    pub dimension: MetricDimension,
    /// Node name, mount point or cluster name; `None` for host-wide metrics.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub subject: Option<String>,
    pub message: String,
    pub observed: f64,
    /// The bound that was crossed. Zero for status-derived issues.
    pub threshold: f64,
    pub suggestion: String,
    pub timestamp_ms: u64,
}
