//! Recent values for sparklines.
//!
//! Only what is on screen is kept, and only for the last
//! [`MAX_HISTORY_SIZE`] reports.

use std::collections::{HashMap, VecDeque};

use super::monitor::MonitorData;

/// Maximum number of points kept per series.
pub const MAX_HISTORY_SIZE: usize = 60;

pub const CPU: &str = "cpu";
pub const MEMORY: &str = "memory";
pub const NET_RECV: &str = "net.recv";
pub const NET_SENT: &str = "net.sent";
pub const DISK_READ: &str = "disk.read";
pub const DISK_WRITE: &str = "disk.write";

/// Series key for one node's heap usage.
pub fn node_heap(node: &str) -> String {
    format!("heap.{node}")
}

/// Tracks recent values per named series.
#[derive(Debug, Clone, Default)]
pub struct History {
    series: HashMap<String, VecDeque<f64>>,
    last_recorded_ms: Option<u64>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the values of a new report.
    ///
    /// A report with the same timestamp as the last one is ignored, so
    /// re-polling an unchanged source does not flatten the sparklines.
    pub fn record(&mut self, data: &MonitorData) {
        let generated = data.report.generated_at_ms;
        if self.last_recorded_ms == Some(generated) {
            return;
        }
        self.last_recorded_ms = Some(generated);

        if let Some(system) = data.system() {
            self.push(CPU, system.cpu.usage_percent);
            self.push(MEMORY, system.memory.used_percent());
            if !system.network.warming_up {
                self.push(NET_RECV, system.network.rates.bytes_recv);
                self.push(NET_SENT, system.network.rates.bytes_sent);
            }
            if !system.disk.warming_up {
                self.push(DISK_READ, system.disk.rates.read_bytes);
                self.push(DISK_WRITE, system.disk.rates.write_bytes);
            }
        }

        for node in data.nodes() {
            self.push(&node_heap(&node.name), node.heap_used_percent);
        }
    }

    fn push(&mut self, key: &str, value: f64) {
        let values = self.series.entry(key.to_string()).or_default();
        values.push_back(if value.is_finite() { value } else { 0.0 });
        if values.len() > MAX_HISTORY_SIZE {
            values.pop_front();
        }
    }

    pub fn latest(&self, key: &str) -> Option<f64> {
        self.series.get(key)?.back().copied()
    }

    pub fn len(&self, key: &str) -> usize {
        self.series.get(key).map_or(0, VecDeque::len)
    }

    /// Sparkline levels for a series (normalized to 0-7 for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self, key: &str) -> Vec<u8> {
        let Some(values) = self.series.get(key) else {
            return Vec::new();
        };
        if values.len() < 2 {
            return Vec::new();
        }

        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min).min(0.0);
        let range = (max - min).max(f64::EPSILON);

        values
            .iter()
            .map(|&v| (((v - min) / range * 7.0) as u8).min(7))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esmon_types::{MetricsReport, SystemMetrics};

    fn data_at(ts: u64, cpu: f64) -> MonitorData {
        let mut report = MetricsReport::empty(ts);
        let mut system = SystemMetrics::default();
        system.cpu.usage_percent = cpu;
        system.network.warming_up = true;
        system.disk.warming_up = true;
        report.system = Some(system);
        MonitorData::from_report(report)
    }

    #[test]
    fn same_report_is_recorded_once() {
        let mut history = History::new();
        history.record(&data_at(1, 10.0));
        history.record(&data_at(1, 10.0));
        history.record(&data_at(2, 20.0));
        assert_eq!(history.len(CPU), 2);
        assert_eq!(history.latest(CPU), Some(20.0));
    }

    #[test]
    fn warming_rates_are_not_recorded() {
        let mut history = History::new();
        history.record(&data_at(1, 10.0));
        assert_eq!(history.len(NET_RECV), 0);
    }

    #[test]
    fn series_is_capped() {
        let mut history = History::new();
        for ts in 0..(MAX_HISTORY_SIZE as u64 + 10) {
            history.record(&data_at(ts, ts as f64));
        }
        assert_eq!(history.len(CPU), MAX_HISTORY_SIZE);
    }

    #[test]
    fn sparkline_spans_full_range() {
        let mut history = History::new();
        for (ts, cpu) in [0.0, 50.0, 100.0].into_iter().enumerate() {
            history.record(&data_at(ts as u64, cpu));
        }
        assert_eq!(history.sparkline(CPU), vec![0, 3, 7]);
        assert!(history.sparkline("missing").is_empty());
    }
}
