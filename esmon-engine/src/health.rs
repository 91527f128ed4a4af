//! Threshold classification of a metrics batch into health issues.
//!
//! [`evaluate`] is pure: the same batch and thresholds always produce the same
//! sorted issue list, and nothing carries over between cycles.

use esmon_types::{
    ClusterHealth, ClusterStatus, Component, HealthIssue, MetricDimension, MetricsReport,
    NodeSummary, Severity, SystemMetrics,
};

use crate::thresholds::Thresholds;

/// One observed value to classify.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub component: Component,
    pub dimension: MetricDimension,
    pub subject: Option<String>,
    pub value: f64,
}

/// Cluster status facts that are classified without numeric thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusObservation {
    pub cluster_name: String,
    pub status: ClusterStatus,
    pub relocating_shards: u32,
    pub initializing_shards: u32,
    pub unassigned_shards: u32,
}

/// Everything evaluated in one pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsBatch {
    pub timestamp_ms: u64,
    pub observations: Vec<Observation>,
    pub cluster: Option<StatusObservation>,
}

impl MetricsBatch {
    pub fn new(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Default::default()
        }
    }

    pub fn push(
        &mut self,
        component: Component,
        dimension: MetricDimension,
        subject: Option<String>,
        value: f64,
    ) {
        if value.is_finite() {
            self.observations.push(Observation {
                component,
                dimension,
                subject,
                value,
            });
        }
    }

    /// Heap, old-gen GC, data-path disk, descriptors, CPU and memory per node.
    pub fn add_nodes(&mut self, nodes: &[NodeSummary]) {
        for node in nodes {
            let subject = || Some(node.name.clone());
            self.push(
                Component::Node,
                MetricDimension::HeapPercent,
                subject(),
                node.heap_used_percent,
            );
            self.push(
                Component::Node,
                MetricDimension::OldGcCount,
                subject(),
                node.old_gc_count as f64,
            );
            if let Some(disk) = node.disk_used_percent() {
                self.push(Component::Node, MetricDimension::DiskPercent, subject(), disk);
            }
            if let Some(fd) = node.fd_used_percent() {
                self.push(
                    Component::Node,
                    MetricDimension::FileDescriptorPercent,
                    subject(),
                    fd,
                );
            }
            self.push(
                Component::Node,
                MetricDimension::CpuPercent,
                subject(),
                node.cpu_percent,
            );
            self.push(
                Component::Node,
                MetricDimension::MemoryPercent,
                subject(),
                node.memory_used_percent,
            );
        }
    }

    /// Host CPU, memory and per-mount disk usage.
    pub fn add_system(&mut self, system: &SystemMetrics) {
        self.push(
            Component::Host,
            MetricDimension::CpuPercent,
            None,
            system.cpu.usage_percent,
        );
        if system.memory.total_bytes > 0 {
            self.push(
                Component::Host,
                MetricDimension::MemoryPercent,
                None,
                system.memory.used_percent(),
            );
        }
        for partition in &system.disk.partitions {
            if partition.total_bytes > 0 {
                self.push(
                    Component::Host,
                    MetricDimension::DiskPercent,
                    Some(partition.mount_point.clone()),
                    partition.used_percent(),
                );
            }
        }
    }

    /// Batch covering every section present in `report`.
    pub fn from_report(report: &MetricsReport) -> Self {
        let mut batch = Self::new(report.generated_at_ms);
        if let Some(system) = &report.system {
            batch.add_system(system);
        }
        if let Some(cluster) = &report.cluster {
            batch.add_cluster_health(&cluster.health);
            batch.add_nodes(&cluster.nodes);
        }
        batch
    }

    pub fn add_cluster_health(&mut self, health: &ClusterHealth) {
        self.cluster = Some(StatusObservation {
            cluster_name: health.cluster_name.clone(),
            status: health.status,
            relocating_shards: health.relocating_shards,
            initializing_shards: health.initializing_shards,
            unassigned_shards: health.unassigned_shards,
        });
    }
}

/// Classify every observation in `batch` against `thresholds`.
///
/// Dimensions without a configured pair are skipped. The result is sorted
/// by severity (critical, warning, info), then subject, then dimension.
pub fn evaluate(batch: &MetricsBatch, thresholds: &Thresholds) -> Vec<HealthIssue> {
    let mut issues = Vec::new();

    if let Some(cluster) = &batch.cluster {
        classify_status(cluster, batch.timestamp_ms, &mut issues);
    }

    for observation in &batch.observations {
        let Some(pair) = thresholds.get(observation.dimension) else {
            continue;
        };
        let Some((severity, threshold)) = pair.classify(observation.value) else {
            continue;
        };
        issues.push(HealthIssue {
            severity,
            component: observation.component,
            dimension: observation.dimension,
            subject: observation.subject.clone(),
            message: threshold_message(observation, severity, threshold),
            observed: observation.value,
            threshold,
            suggestion: suggestion(observation.dimension, severity).to_string(),
            timestamp_ms: batch.timestamp_ms,
        });
    }

    issues.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.dimension.cmp(&b.dimension))
    });
    issues
}

fn classify_status(cluster: &StatusObservation, timestamp_ms: u64, issues: &mut Vec<HealthIssue>) {
    let subject = Some(cluster.cluster_name.clone());
    let mut push = |severity: Severity, message: String, observed: f64| {
        issues.push(HealthIssue {
            severity,
            component: Component::Cluster,
            dimension: MetricDimension::ClusterStatus,
            subject: subject.clone(),
            message,
            observed,
            threshold: 0.0,
            suggestion: suggestion(MetricDimension::ClusterStatus, severity).to_string(),
            timestamp_ms,
        });
    };

    match cluster.status {
        ClusterStatus::Red => push(
            Severity::Critical,
            format!(
                "Cluster status is red: {} unassigned shards, primary data unavailable",
                cluster.unassigned_shards
            ),
            cluster.unassigned_shards as f64,
        ),
        ClusterStatus::Yellow => push(
            Severity::Warning,
            format!(
                "Cluster status is yellow: {} replica shards unassigned",
                cluster.unassigned_shards
            ),
            cluster.unassigned_shards as f64,
        ),
        ClusterStatus::Green | ClusterStatus::Unknown => {}
    }

    let moving = cluster.relocating_shards + cluster.initializing_shards;
    if moving > 0 {
        push(
            Severity::Info,
            format!(
                "{} shards relocating, {} initializing",
                cluster.relocating_shards, cluster.initializing_shards
            ),
            moving as f64,
        );
    }
}

fn threshold_message(observation: &Observation, severity: Severity, threshold: f64) -> String {
    let unit = observation.dimension.unit();
    let place = match &observation.subject {
        Some(subject) => format!(" on {subject}"),
        None => String::new(),
    };
    format!(
        "{}{} is {:.1}{unit}, at or above the {} threshold of {:.1}{unit}",
        observation.dimension.label(),
        place,
        observation.value,
        severity,
        threshold,
    )
}

/// Static remediation hint for a dimension and severity.
pub fn suggestion(dimension: MetricDimension, severity: Severity) -> &'static str {
    use MetricDimension as D;
    use Severity as S;

    match (dimension, severity) {
        (D::HeapPercent, S::Critical) => {
            "Heap is nearly exhausted: add memory or nodes, reduce shard count, and check for expensive aggregations"
        }
        (D::HeapPercent, _) => {
            "Heap pressure is building: review field data and query cache sizes and consider raising -Xmx (up to half of RAM)"
        }
        (D::OldGcCount, S::Critical) => {
            "Frequent old-generation collections: the heap is undersized for the workload, add heap or spread shards across more nodes"
        }
        (D::OldGcCount, _) => {
            "Old-generation GC activity is elevated: check slow logs for heavy queries and large bulk requests"
        }
        (D::DiskPercent, S::Critical) => {
            "Disk is near the flood-stage watermark: delete or shrink old indices, or add storage before indices go read-only"
        }
        (D::DiskPercent, _) => {
            "Disk usage is past the high watermark: plan an index lifecycle policy or add capacity"
        }
        (D::FileDescriptorPercent, S::Critical) => {
            "File descriptors are almost exhausted: raise the process limit (ulimit -n 65535) and reduce open segments by merging"
        }
        (D::FileDescriptorPercent, _) => {
            "File descriptor usage is high: verify the nofile limit and watch for shard or connection growth"
        }
        (D::CpuPercent, S::Critical) => {
            "CPU is saturated: look for hot threads and expensive queries, or add nodes"
        }
        (D::CpuPercent, _) => {
            "CPU usage is elevated: review search and indexing load and refresh intervals"
        }
        (D::MemoryPercent, S::Critical) => {
            "System memory is nearly exhausted: the OS page cache is starved, reduce other workloads or add RAM"
        }
        (D::MemoryPercent, _) => {
            "System memory usage is high: leave at least half of RAM for the filesystem cache"
        }
        (D::ClusterStatus, S::Critical) => {
            "Primary shards are unassigned: check _cluster/allocation/explain and restore missing nodes"
        }
        (D::ClusterStatus, S::Warning) => {
            "Replica shards are unassigned: add data nodes or lower the replica count"
        }
        (D::ClusterStatus, S::Info) => {
            "Shards are moving; wait for recovery to finish before maintenance"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::ThresholdPair;
    use esmon_types::{MemoryMetrics, PartitionMetrics};

    fn heap_batch(value: f64) -> MetricsBatch {
        let mut batch = MetricsBatch::new(1);
        batch.push(
            Component::Node,
            MetricDimension::HeapPercent,
            Some("node-1".to_string()),
            value,
        );
        batch
    }

    fn heap_only() -> Thresholds {
        Thresholds::empty().with(MetricDimension::HeapPercent, ThresholdPair::new(75.0, 85.0))
    }

    #[test]
    fn heap_at_critical_yields_exactly_one_critical() {
        let issues = evaluate(&heap_batch(85.0), &heap_only());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].threshold, 85.0);
        assert_eq!(issues[0].subject.as_deref(), Some("node-1"));
    }

    #[test]
    fn heap_between_bounds_yields_one_warning() {
        let issues = evaluate(&heap_batch(78.0), &heap_only());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(
            issues[0].message,
            "JVM heap on node-1 is 78.0%, at or above the warning threshold of 75.0%"
        );
        assert!(!issues[0].suggestion.is_empty());
    }

    #[test]
    fn healthy_value_yields_nothing() {
        assert!(evaluate(&heap_batch(50.0), &heap_only()).is_empty());
    }

    #[test]
    fn unconfigured_dimension_is_skipped() {
        let mut batch = MetricsBatch::new(0);
        batch.push(Component::Host, MetricDimension::CpuPercent, None, 99.0);
        assert!(evaluate(&batch, &heap_only()).is_empty());
    }

    #[test]
    fn non_finite_values_are_not_recorded() {
        let mut batch = MetricsBatch::new(0);
        batch.push(Component::Host, MetricDimension::CpuPercent, None, f64::NAN);
        assert!(batch.observations.is_empty());
    }

    #[test]
    fn sorted_by_severity_then_subject() {
        let mut batch = MetricsBatch::new(0);
        for (name, heap) in [("b", 80.0), ("c", 90.0), ("a", 80.0), ("a", 95.0)] {
            batch.push(
                Component::Node,
                MetricDimension::HeapPercent,
                Some(name.to_string()),
                heap,
            );
        }

        let issues = evaluate(&batch, &heap_only());
        let order: Vec<_> = issues
            .iter()
            .map(|i| (i.severity, i.subject.clone().unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Severity::Critical, "a".to_string()),
                (Severity::Critical, "c".to_string()),
                (Severity::Warning, "a".to_string()),
                (Severity::Warning, "b".to_string()),
            ]
        );
    }

    #[test]
    fn nodes_contribute_every_dimension() {
        let node = NodeSummary {
            name: "es-1".to_string(),
            heap_used_percent: 90.0,
            old_gc_count: 12,
            fs_total_bytes: 100,
            fs_available_bytes: 5,
            open_file_descriptors: 96,
            max_file_descriptors: 100,
            cpu_percent: 10.0,
            memory_used_percent: 10.0,
            ..Default::default()
        };
        let mut batch = MetricsBatch::new(0);
        batch.add_nodes(&[node]);

        let issues = evaluate(&batch, &Thresholds::default());
        let dims: Vec<_> = issues.iter().map(|i| (i.severity, i.dimension)).collect();
        assert_eq!(
            dims,
            vec![
                (Severity::Critical, MetricDimension::HeapPercent),
                (Severity::Critical, MetricDimension::DiskPercent),
                (Severity::Critical, MetricDimension::FileDescriptorPercent),
                (Severity::Warning, MetricDimension::OldGcCount),
            ]
        );
    }

    #[test]
    fn host_metrics_use_mount_points_as_subjects() {
        let mut system = SystemMetrics::default();
        system.cpu.usage_percent = 65.0;
        system.memory = MemoryMetrics {
            total_bytes: 100,
            used_bytes: 95,
            ..Default::default()
        };
        system.disk.partitions.push(PartitionMetrics {
            device: "/dev/sda1".to_string(),
            mount_point: "/var/lib/elasticsearch".to_string(),
            file_system: "xfs".to_string(),
            total_bytes: 100,
            available_bytes: 12,
        });

        let mut batch = MetricsBatch::new(0);
        batch.add_system(&system);
        let issues = evaluate(&batch, &Thresholds::default());

        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].dimension, MetricDimension::MemoryPercent);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[1].dimension, MetricDimension::CpuPercent);
        assert_eq!(issues[2].subject.as_deref(), Some("/var/lib/elasticsearch"));
        assert_eq!(issues[2].severity, Severity::Warning);
    }

    #[test]
    fn cluster_status_maps_to_severity() {
        let mut health = ClusterHealth {
            cluster_name: "prod".to_string(),
            status: ClusterStatus::Red,
            unassigned_shards: 3,
            ..Default::default()
        };
        let mut batch = MetricsBatch::new(0);
        batch.add_cluster_health(&health);
        let issues = evaluate(&batch, &Thresholds::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].component, Component::Cluster);

        health.status = ClusterStatus::Yellow;
        health.relocating_shards = 2;
        batch.add_cluster_health(&health);
        let issues = evaluate(&batch, &Thresholds::default());
        let severities: Vec<_> = issues.iter().map(|i| i.severity).collect();
        assert_eq!(severities, vec![Severity::Warning, Severity::Info]);
    }

    #[test]
    fn green_cluster_is_quiet() {
        let mut batch = MetricsBatch::new(0);
        batch.add_cluster_health(&ClusterHealth {
            status: ClusterStatus::Green,
            ..Default::default()
        });
        assert!(evaluate(&batch, &Thresholds::default()).is_empty());
    }

    #[test]
    fn evaluation_is_repeatable() {
        let batch = heap_batch(88.0);
        let thresholds = heap_only();
        assert_eq!(evaluate(&batch, &thresholds), evaluate(&batch, &thresholds));
    }
}
