//! Plain-text rendering of a report, for `--once` and for piping.

use std::fmt::Write;

use esmon_types::{MetricsReport, SystemMetrics};

use crate::data::format::{format_bytes, format_count, format_per_sec, format_percent, format_rate};

/// Render the whole report as plain text.
pub fn render_report(report: &MetricsReport) -> String {
    let mut out = String::new();
    // Writing to a String never fails
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &MetricsReport) -> std::fmt::Result {
    writeln!(out, "== Host ==")?;
    match (&report.system, &report.system_error) {
        (Some(system), error) => {
            write_system(out, system)?;
            if let Some(err) = error {
                writeln!(out, "  (stale: {})", err)?;
            }
        }
        (None, Some(err)) => writeln!(out, "  unavailable: {}", err)?,
        (None, None) => writeln!(out, "  not sampled")?,
    }

    writeln!(out)?;
    writeln!(out, "== Cluster ==")?;
    match (&report.cluster, &report.cluster_error) {
        (Some(cluster), error) => {
            let h = &cluster.health;
            writeln!(
                out,
                "  {} [{}] nodes {} (data {}), shards {} active / {} unassigned / {} relocating / {} initializing",
                h.cluster_name,
                h.status,
                h.number_of_nodes,
                h.number_of_data_nodes,
                h.active_shards,
                h.unassigned_shards,
                h.relocating_shards,
                h.initializing_shards
            )?;
            if let Some(err) = error {
                writeln!(out, "  (stale: {})", err)?;
            }
            match &cluster.nodes_error {
                Some(err) => writeln!(out, "  nodes unavailable: {}", err)?,
                None => {
                    for node in &cluster.nodes {
                        writeln!(
                            out,
                            "  node {:<20} heap {:>6} cpu {:>6} disk {:>6} old gc {:>6} index {:>9} query {:>9}",
                            node.name,
                            format_percent(node.heap_used_percent),
                            format_percent(node.cpu_percent),
                            node.disk_used_percent().map(format_percent).unwrap_or_else(|| "-".to_string()),
                            format_count(node.old_gc_count),
                            format_per_sec(node.indexing_rate),
                            format_per_sec(node.query_rate)
                        )?;
                    }
                }
            }
            match &cluster.indices_error {
                Some(err) => writeln!(out, "  indices unavailable: {}", err)?,
                None => writeln!(out, "  {} indices", cluster.indices.len())?,
            }
        }
        (None, Some(err)) => writeln!(out, "  unavailable: {}", err)?,
        (None, None) => writeln!(out, "  not sampled")?,
    }

    writeln!(out)?;
    writeln!(out, "== Issues ({}) ==", report.issues.len())?;
    if report.issues.is_empty() {
        writeln!(out, "  none")?;
    }
    for issue in &report.issues {
        match &issue.subject {
            Some(subject) => writeln!(out, "  [{}] {}: {}", issue.severity.symbol(), subject, issue.message)?,
            None => writeln!(out, "  [{}] {}", issue.severity.symbol(), issue.message)?,
        }
        writeln!(out, "         -> {}", issue.suggestion)?;
    }
    Ok(())
}

fn write_system(out: &mut String, system: &SystemMetrics) -> std::fmt::Result {
    if let Some(host) = &system.hostname {
        writeln!(out, "  host     {}", host)?;
    }
    let cpu = &system.cpu;
    write!(out, "  cpu      {} of {} cores", format_percent(cpu.usage_percent), cpu.logical_cores)?;
    if let Some(load) = cpu.load_average {
        write!(out, ", load {:.2} {:.2} {:.2}", load.one, load.five, load.fifteen)?;
    }
    writeln!(out)?;

    let memory = &system.memory;
    writeln!(
        out,
        "  memory   {} ({} of {}), swap {} of {}",
        format_percent(memory.used_percent()),
        format_bytes(memory.used_bytes),
        format_bytes(memory.total_bytes),
        format_bytes(memory.swap_used_bytes),
        format_bytes(memory.swap_total_bytes)
    )?;

    let net = &system.network;
    if net.warming_up {
        writeln!(out, "  network  warming up")?;
    } else {
        writeln!(
            out,
            "  network  recv {} sent {} (errors {:.1}/s, drops {:.1}/s)",
            format_rate(net.rates.bytes_recv),
            format_rate(net.rates.bytes_sent),
            net.rates.errors,
            net.rates.drops
        )?;
    }

    let disk = &system.disk;
    if disk.warming_up {
        writeln!(out, "  disk     warming up")?;
    } else {
        writeln!(
            out,
            "  disk     read {} write {} util {}",
            format_rate(disk.rates.read_bytes),
            format_rate(disk.rates.write_bytes),
            format_percent(disk.rates.io_util_percent)
        )?;
    }
    for partition in &disk.partitions {
        writeln!(
            out,
            "  fs       {:<24} {:>7} of {}",
            partition.mount_point,
            format_percent(partition.used_percent()),
            format_bytes(partition.total_bytes)
        )?;
    }
    for degraded in &system.degraded {
        writeln!(out, "  degraded {}", degraded)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use esmon_types::{
        ClusterMetrics, ClusterStatus, Component, HealthIssue, MetricDimension, Severity,
    };

    #[test]
    fn empty_report_says_not_sampled() {
        let text = render_report(&MetricsReport::empty(0));
        assert!(text.contains("== Host ==\n  not sampled"));
        assert!(text.contains("== Issues (0) ==\n  none"));
    }

    #[test]
    fn shows_errors_and_issues() {
        let mut report = MetricsReport::empty(0);
        report.system_error = Some("source unavailable: /proc".to_string());
        let mut cluster = ClusterMetrics::default();
        cluster.health.cluster_name = "logs".to_string();
        cluster.health.status = ClusterStatus::Red;
        cluster.nodes_error = Some("timed out".to_string());
        report.cluster = Some(cluster);
        report.issues.push(HealthIssue {
            severity: Severity::Critical,
            component: Component::Cluster,
            dimension: MetricDimension::ClusterStatus,
            subject: Some("logs".to_string()),
            message: "Cluster status is red".to_string(),
            observed: 2.0,
            threshold: 0.0,
            suggestion: "Check unassigned shards".to_string(),
            timestamp_ms: 0,
        });

        let text = render_report(&report);
        assert!(text.contains("unavailable: source unavailable: /proc"));
        assert!(text.contains("logs [red]"));
        assert!(text.contains("nodes unavailable: timed out"));
        assert!(text.contains("[CRIT] logs: Cluster status is red"));
        assert!(text.contains("-> Check unassigned shards"));
    }

    #[test]
    fn warming_rates_are_labelled() {
        let mut report = MetricsReport::empty(0);
        let mut system = SystemMetrics::default();
        system.network.warming_up = true;
        report.system = Some(system);

        let text = render_report(&report);
        assert!(text.contains("network  warming up"));
        assert!(text.contains("disk     read 0 B/s"));
    }
}
