//! The view model behind every screen.
//!
//! Wraps a published [`MetricsReport`] with the local time it arrived and a
//! few derived views the UI needs on every frame.

use std::time::{Duration, Instant};

use esmon_types::{
    now_ms, ClusterHealth, ClusterMetrics, HealthIssue, IndexSummary, MetricsReport, NodeSummary,
    Severity, SystemMetrics,
};

/// Issue counts for the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl IssueCounts {
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

/// A report ready for display.
#[derive(Debug, Clone)]
pub struct MonitorData {
    pub report: MetricsReport,
    pub last_updated: Instant,
}

impl MonitorData {
    pub fn from_report(report: MetricsReport) -> Self {
        Self {
            report,
            last_updated: Instant::now(),
        }
    }

    pub fn system(&self) -> Option<&SystemMetrics> {
        self.report.system.as_ref()
    }

    pub fn cluster(&self) -> Option<&ClusterMetrics> {
        self.report.cluster.as_ref()
    }

    pub fn health(&self) -> Option<&ClusterHealth> {
        self.cluster().map(|c| &c.health)
    }

    pub fn nodes(&self) -> &[NodeSummary] {
        self.cluster().map(|c| c.nodes.as_slice()).unwrap_or_default()
    }

    pub fn indices(&self) -> &[IndexSummary] {
        self.cluster().map(|c| c.indices.as_slice()).unwrap_or_default()
    }

    /// Issues in report order: severity, then subject.
    pub fn issues(&self) -> &[HealthIssue] {
        &self.report.issues
    }

    pub fn issue_counts(&self) -> IssueCounts {
        IssueCounts {
            critical: self.report.count(Severity::Critical),
            warning: self.report.count(Severity::Warning),
            info: self.report.count(Severity::Info),
        }
    }

    /// How old the report itself is, by its own timestamp.
    ///
    /// For a replayed report this is the time since it was exported.
    pub fn report_age(&self) -> Duration {
        Duration::from_millis(now_ms().saturating_sub(self.report.generated_at_ms))
    }

    /// Every error or degraded part worth surfacing, labelled by section.
    pub fn section_errors(&self) -> Vec<(&'static str, &str)> {
        let mut errors = Vec::new();
        if let Some(err) = self.report.system_error.as_deref() {
            errors.push(("host", err));
        }
        if let Some(system) = self.system() {
            errors.extend(system.degraded.iter().map(|d| ("host", d.as_str())));
        }
        if let Some(err) = self.report.cluster_error.as_deref() {
            errors.push(("cluster", err));
        }
        if let Some(cluster) = self.cluster() {
            if let Some(err) = cluster.nodes_error.as_deref() {
                errors.push(("nodes", err));
            }
            if let Some(err) = cluster.indices_error.as_deref() {
                errors.push(("indices", err));
            }
        }
        errors
    }
}
