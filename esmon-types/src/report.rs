//! The published report: a point-in-time view of host and cluster.

use crate::{ClusterMetrics, HealthIssue, SchemaVersion, Severity, SystemMetrics};

/// Everything the front end renders for one refresh.
///
/// Each section is last-writer-wins: the newest successful sample replaces
/// the previous one, and a failed cycle sets the section's error while the
/// last good sample stays visible.
///
/// # Example
///
/// ```rust
/// use esmon_types::{MetricsReport, SystemMetrics};
///
/// let mut report = MetricsReport::empty(0);
/// report.system = Some(SystemMetrics::default());
/// assert!(report.has_data());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsReport {
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds of the latest publish.
    pub generated_at_ms: u64,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub system: Option<SystemMetrics>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub system_error: Option<String>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub cluster: Option<ClusterMetrics>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub cluster_error: Option<String>,

    /// Sorted by severity, then subject.
    #[cfg_attr(feature = "serde", serde(default))]
    pub issues: Vec<HealthIssue>,
}

impl MetricsReport {
    /// A report with no sections filled in.
    pub fn empty(generated_at_ms: u64) -> Self {
        Self {
            version: SchemaVersion::current(),
            generated_at_ms,
            system: None,
            system_error: None,
            cluster: None,
            cluster_error: None,
            issues: Vec::new(),
        }
    }

    /// True once either section has produced a sample.
    pub fn has_data(&self) -> bool {
        self.system.is_some() || self.cluster.is_some()
    }

    /// Number of issues at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// The most urgent severity present, if any.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).min()
    }
}

impl Default for MetricsReport {
    fn default() -> Self {
        Self::empty(0)
    }
}
