//! Spike suppression for aggregate throughput streams.
//!
//! Each stream keeps a small FIFO of recent candidate rates. A candidate that
//! jumps far above the recent mean is replaced by that mean; otherwise the
//! window median is reported. Results above the stream's physical ceiling
//! fall back to the window minimum.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// Default number of samples kept per stream.
pub const DEFAULT_WINDOW: usize = 10;

/// Smallest window that still has a meaningful median.
pub const MIN_WINDOW: usize = 3;

/// Largest configurable window.
pub const MAX_WINDOW: usize = 60;

/// A candidate above `factor * prior mean` is a spike.
pub const DEFAULT_SPIKE_FACTOR: f64 = 10.0;

/// Stream key for aggregate bytes sent per second.
pub const NET_SENT: &str = "net.sent";
/// Stream key for aggregate bytes received per second.
pub const NET_RECV: &str = "net.recv";
/// Stream key for aggregate disk read bytes per second.
pub const DISK_READ: &str = "disk.read";
/// Stream key for aggregate disk write bytes per second.
pub const DISK_WRITE: &str = "disk.write";

/// 10 Gbit/s expressed in bytes per second.
pub const DEFAULT_NETWORK_CEILING: f64 = 1.25e9;

/// 8 GiB/s, comfortably above current NVMe arrays.
pub const DEFAULT_DISK_CEILING: f64 = 8.0 * 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Default)]
struct Window {
    samples: VecDeque<f64>,
    last_at: Option<Instant>,
}

/// Median/mean spike filter over per-stream history windows.
///
/// Deterministic: the output depends only on the window contents and the
/// candidate.
#[derive(Debug, Clone)]
pub struct SpikeFilter {
    capacity: usize,
    spike_factor: f64,
    ceilings: HashMap<String, f64>,
    windows: HashMap<String, Window>,
}

impl SpikeFilter {
    /// A filter with the given window size, clamped to
    /// [`MIN_WINDOW`]..=[`MAX_WINDOW`].
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.clamp(MIN_WINDOW, MAX_WINDOW),
            spike_factor: DEFAULT_SPIKE_FACTOR,
            ceilings: HashMap::new(),
            windows: HashMap::new(),
        }
    }

    /// Network and disk streams with their default ceilings.
    pub fn for_host(capacity: usize) -> Self {
        Self::new(capacity)
            .with_ceiling(NET_SENT, DEFAULT_NETWORK_CEILING)
            .with_ceiling(NET_RECV, DEFAULT_NETWORK_CEILING)
            .with_ceiling(DISK_READ, DEFAULT_DISK_CEILING)
            .with_ceiling(DISK_WRITE, DEFAULT_DISK_CEILING)
    }

    pub fn with_spike_factor(mut self, factor: f64) -> Self {
        if factor.is_finite() && factor > 1.0 {
            self.spike_factor = factor;
        }
        self
    }

    /// Set the implausibility ceiling for one stream.
    pub fn with_ceiling(mut self, stream: &str, ceiling: f64) -> Self {
        if ceiling.is_finite() && ceiling > 0.0 {
            self.ceilings.insert(stream.to_string(), ceiling);
        }
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn spike_factor(&self) -> f64 {
        self.spike_factor
    }

    /// Record `candidate` for `stream` and return the filtered rate.
    pub fn smooth(&mut self, stream: &str, candidate: f64, now: Instant) -> f64 {
        let candidate = if candidate.is_finite() {
            candidate.max(0.0)
        } else {
            0.0
        };

        let capacity = self.capacity;
        let window = self.windows.entry(stream.to_string()).or_default();
        window.samples.push_back(candidate);
        while window.samples.len() > capacity {
            window.samples.pop_front();
        }
        window.last_at = Some(now);

        let samples = &window.samples;
        if samples.len() < MIN_WINDOW {
            return candidate;
        }

        let prior = samples.len() - 1;
        let prior_mean = samples.iter().take(prior).sum::<f64>() / prior as f64;

        let filtered = if prior_mean > 0.0 && candidate > self.spike_factor * prior_mean {
            prior_mean
        } else {
            median(samples)
        };

        match self.ceilings.get(stream) {
            Some(&ceiling) if filtered > ceiling => {
                samples.iter().copied().fold(f64::INFINITY, f64::min)
            }
            _ => filtered,
        }
    }

    /// Current window contents for `stream`, oldest first.
    pub fn window(&self, stream: &str) -> Vec<f64> {
        self.windows
            .get(stream)
            .map(|w| w.samples.iter().copied().collect())
            .unwrap_or_default()
    }

    /// When `stream` last received a candidate.
    pub fn last_updated(&self, stream: &str) -> Option<Instant> {
        self.windows.get(stream).and_then(|w| w.last_at)
    }

    pub fn reset(&mut self, stream: &str) {
        self.windows.remove(stream);
    }
}

impl Default for SpikeFilter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// Median of a non-empty window; even lengths average the two middle values.
fn median(samples: &VecDeque<f64>) -> f64 {
    let mut sorted: Vec<f64> = samples.iter().copied().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(filter: &mut SpikeFilter, stream: &str, values: &[f64]) -> Vec<f64> {
        let now = Instant::now();
        values.iter().map(|&v| filter.smooth(stream, v, now)).collect()
    }

    #[test]
    fn cold_start_passes_candidates_through() {
        let mut filter = SpikeFilter::new(10);
        let out = feed(&mut filter, NET_SENT, &[5.0, 5_000.0]);
        assert_eq!(out, vec![5.0, 5_000.0]);
    }

    #[test]
    fn spike_is_replaced_by_prior_mean() {
        let mut filter = SpikeFilter::new(5);
        let out = feed(&mut filter, NET_SENT, &[10.0, 10.0, 10.0, 10.0, 1000.0]);
        assert!((out[4] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn steady_stream_reports_median() {
        let mut filter = SpikeFilter::new(10);
        let out = feed(&mut filter, NET_RECV, &[10.0, 30.0, 20.0]);
        assert_eq!(out[2], 20.0);
    }

    #[test]
    fn even_window_averages_middle_values() {
        let mut filter = SpikeFilter::new(4);
        let out = feed(&mut filter, NET_SENT, &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(out[3], 25.0);

        // Full window of four after eviction: [20, 30, 40, 50]
        let out = feed(&mut filter, NET_SENT, &[50.0]);
        assert_eq!(out[0], 35.0);
    }

    #[test]
    fn moderate_increase_is_not_a_spike() {
        let mut filter = SpikeFilter::new(10);
        let out = feed(&mut filter, NET_RECV, &[10.0, 10.0, 90.0]);
        // 90 < 10 * 10, so the median of [10, 10, 90] is reported.
        assert_eq!(out[2], 10.0);
    }

    #[test]
    fn zero_prior_mean_disables_spike_check() {
        let mut filter = SpikeFilter::new(10);
        let out = feed(&mut filter, DISK_READ, &[0.0, 0.0, 500.0]);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn window_evicts_oldest() {
        let mut filter = SpikeFilter::new(3);
        feed(&mut filter, NET_SENT, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(filter.window(NET_SENT), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(SpikeFilter::new(1).capacity(), MIN_WINDOW);
        assert_eq!(SpikeFilter::new(1_000).capacity(), MAX_WINDOW);
    }

    #[test]
    fn ceiling_falls_back_to_window_minimum() {
        let mut filter = SpikeFilter::new(5).with_ceiling(NET_SENT, 100.0);
        let out = feed(&mut filter, NET_SENT, &[150.0, 200.0, 250.0]);
        assert_eq!(out[2], 150.0);
    }

    #[test]
    fn streams_do_not_share_windows() {
        let mut filter = SpikeFilter::for_host(10);
        feed(&mut filter, NET_SENT, &[10.0, 10.0, 10.0]);
        let out = feed(&mut filter, NET_RECV, &[1_000.0]);
        assert_eq!(out[0], 1_000.0);
        assert_eq!(filter.window(NET_RECV).len(), 1);
    }

    #[test]
    fn non_finite_candidate_is_zeroed() {
        let mut filter = SpikeFilter::new(10);
        let out = feed(&mut filter, NET_SENT, &[f64::NAN, f64::INFINITY, -4.0]);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn records_last_update() {
        let mut filter = SpikeFilter::default();
        assert!(filter.last_updated(NET_SENT).is_none());
        let now = Instant::now();
        filter.smooth(NET_SENT, 1.0, now);
        assert_eq!(filter.last_updated(NET_SENT), Some(now));

        filter.reset(NET_SENT);
        assert!(filter.window(NET_SENT).is_empty());
    }
}
