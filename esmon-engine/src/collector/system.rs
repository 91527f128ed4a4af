//! Host sampling: counters in, smoothed rates out.

use std::time::Instant;

use esmon_types::{
    now_ms, CpuMetrics, DiskDeviceMetrics, DiskMetrics, DiskRates, InterfaceMetrics,
    MemoryMetrics, NetworkMetrics, NetworkRates, PartitionMetrics, SystemMetrics,
};
use tracing::{debug, warn};

use crate::classify::ResourceClassifier;
use crate::error::SourceError;
use crate::rate::RateDeriver;
use crate::readings::{DiskCounters, NetCounters};
use crate::smoothing::{
    SpikeFilter, DEFAULT_DISK_CEILING, DEFAULT_NETWORK_CEILING, DEFAULT_SPIKE_FACTOR,
    DEFAULT_WINDOW, DISK_READ, DISK_WRITE, NET_RECV, NET_SENT,
};
use crate::source::CounterSource;

/// Tuning for [`SystemCollector`].
#[derive(Debug, Clone)]
pub struct SystemCollectorConfig {
    pub history_size: usize,
    pub spike_factor: f64,
    /// Bytes per second above which a network rate is implausible. Applies to
    /// each interface before summing and to the smoothed aggregate.
    pub network_ceiling: f64,
    /// Bytes per second above which an aggregate disk rate is implausible.
    pub disk_ceiling: f64,
    pub network_classifier: ResourceClassifier,
    pub disk_classifier: ResourceClassifier,
}

impl Default for SystemCollectorConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_WINDOW,
            spike_factor: DEFAULT_SPIKE_FACTOR,
            network_ceiling: DEFAULT_NETWORK_CEILING,
            disk_ceiling: DEFAULT_DISK_CEILING,
            network_classifier: ResourceClassifier::network(),
            disk_classifier: ResourceClassifier::disk(),
        }
    }
}

/// Samples a [`CounterSource`] into [`SystemMetrics`].
///
/// Owns its rate derivers and spike filter; a collector is driven by exactly
/// one task. Every part of a sample degrades independently: a failed read is
/// logged, recorded in [`SystemMetrics::degraded`] and left at its default.
#[derive(Debug)]
pub struct SystemCollector<S> {
    source: S,
    network: RateDeriver<NetCounters>,
    disk: RateDeriver<DiskCounters>,
    filter: SpikeFilter,
    network_ceiling: f64,
    network_classifier: ResourceClassifier,
    disk_classifier: ResourceClassifier,
}

impl<S: CounterSource> SystemCollector<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, SystemCollectorConfig::default())
    }

    pub fn with_config(source: S, config: SystemCollectorConfig) -> Self {
        let filter = SpikeFilter::new(config.history_size)
            .with_spike_factor(config.spike_factor)
            .with_ceiling(NET_SENT, config.network_ceiling)
            .with_ceiling(NET_RECV, config.network_ceiling)
            .with_ceiling(DISK_READ, config.disk_ceiling)
            .with_ceiling(DISK_WRITE, config.disk_ceiling);

        Self {
            source,
            network: RateDeriver::new(),
            disk: RateDeriver::new(),
            filter,
            network_ceiling: config.network_ceiling,
            network_classifier: config.network_classifier,
            disk_classifier: config.disk_classifier,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Take one host sample.
    pub fn sample(&mut self) -> SystemMetrics {
        let mut degraded = Vec::new();

        let cpu: CpuMetrics = degrade("cpu", self.source.cpu(), &mut degraded);
        let memory: MemoryMetrics = degrade("memory", self.source.memory(), &mut degraded);
        let mut partitions: Vec<PartitionMetrics> =
            degrade("partitions", self.source.partitions(), &mut degraded);
        partitions.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));

        let network = match self.source.network_counters() {
            Ok(counters) => {
                let now = self.source.now();
                self.network_metrics(counters, now)
            }
            Err(err) => {
                record("network", &err, &mut degraded);
                NetworkMetrics {
                    warming_up: true,
                    ..Default::default()
                }
            }
        };

        let mut disk = match self.source.disk_counters() {
            Ok(counters) => {
                let now = self.source.now();
                self.disk_metrics(counters, now)
            }
            Err(err) => {
                record("disk", &err, &mut degraded);
                DiskMetrics {
                    warming_up: true,
                    ..Default::default()
                }
            }
        };
        disk.partitions = partitions;

        debug!(
            interfaces = network.interfaces.len(),
            devices = disk.devices.len(),
            degraded = degraded.len(),
            "system sample complete"
        );

        SystemMetrics {
            timestamp_ms: now_ms(),
            hostname: self.source.hostname(),
            cpu,
            memory,
            disk,
            network,
            degraded,
        }
    }

    fn network_metrics(&mut self, counters: Vec<(String, NetCounters)>, now: Instant) -> NetworkMetrics {
        let mut interfaces = Vec::with_capacity(counters.len());
        let mut aggregate = NetworkRates::default();
        let mut ready = false;
        let (mut total_sent, mut total_recv) = (0u64, 0u64);

        for (name, reading) in counters {
            let rates = self
                .network
                .derive(&name, reading, now)
                .rates()
                .map(|r| clamp_interface(r, self.network_ceiling));
            if self.network_classifier.is_countable(&name) {
                total_sent = total_sent.saturating_add(reading.bytes_sent);
                total_recv = total_recv.saturating_add(reading.bytes_recv);
                if let Some(r) = &rates {
                    add_network(&mut aggregate, r);
                    ready = true;
                }
            }
            interfaces.push(InterfaceMetrics {
                physical: self.network_classifier.is_physical(&name),
                name,
                total_bytes_sent: reading.bytes_sent,
                total_bytes_recv: reading.bytes_recv,
                rates,
            });
        }

        self.network
            .retain(interfaces.iter().map(|i| i.name.as_str()));
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));

        let rates = if ready {
            NetworkRates {
                bytes_sent: self.filter.smooth(NET_SENT, aggregate.bytes_sent, now),
                bytes_recv: self.filter.smooth(NET_RECV, aggregate.bytes_recv, now),
                ..aggregate
            }
        } else {
            NetworkRates::default()
        };

        NetworkMetrics {
            rates,
            warming_up: !ready,
            total_bytes_sent: total_sent,
            total_bytes_recv: total_recv,
            interfaces,
        }
    }

    fn disk_metrics(&mut self, counters: Vec<(String, DiskCounters)>, now: Instant) -> DiskMetrics {
        let mut devices = Vec::new();
        let mut aggregate = DiskRates::default();
        let mut ready = false;

        for (name, reading) in counters {
            if !self.disk_classifier.is_countable(&name) {
                continue;
            }
            let rates = self.disk.derive(&name, reading, now).rates();
            if let Some(r) = &rates {
                aggregate.read_bytes += r.read_bytes;
                aggregate.write_bytes += r.write_bytes;
                aggregate.read_ops += r.read_ops;
                aggregate.write_ops += r.write_ops;
                aggregate.io_util_percent = aggregate.io_util_percent.max(r.io_util_percent);
                ready = true;
            }
            devices.push(DiskDeviceMetrics { name, rates });
        }

        self.disk.retain(devices.iter().map(|d| d.name.as_str()));
        devices.sort_by(|a, b| a.name.cmp(&b.name));

        if !ready {
            return DiskMetrics {
                warming_up: true,
                devices,
                ..Default::default()
            };
        }

        let ops = aggregate.read_ops + aggregate.write_ops;
        if ops > 0.0 {
            aggregate.avg_request_bytes = (aggregate.read_bytes + aggregate.write_bytes) / ops;
        }
        aggregate.read_bytes = self.filter.smooth(DISK_READ, aggregate.read_bytes, now);
        aggregate.write_bytes = self.filter.smooth(DISK_WRITE, aggregate.write_bytes, now);

        DiskMetrics {
            rates: aggregate,
            warming_up: false,
            devices,
            partitions: Vec::new(),
        }
    }
}

/// Zero a byte rate no single interface can sustain.
fn clamp_interface(mut rates: NetworkRates, ceiling: f64) -> NetworkRates {
    if rates.bytes_sent > ceiling {
        warn!(rate = rates.bytes_sent, ceiling, "discarding implausible interface send rate");
        rates.bytes_sent = 0.0;
    }
    if rates.bytes_recv > ceiling {
        warn!(rate = rates.bytes_recv, ceiling, "discarding implausible interface receive rate");
        rates.bytes_recv = 0.0;
    }
    rates
}

fn add_network(total: &mut NetworkRates, rates: &NetworkRates) {
    total.bytes_sent += rates.bytes_sent;
    total.bytes_recv += rates.bytes_recv;
    total.packets_sent += rates.packets_sent;
    total.packets_recv += rates.packets_recv;
    total.errors += rates.errors;
    total.drops += rates.drops;
}

fn degrade<T: Default>(part: &str, result: Result<T, SourceError>, degraded: &mut Vec<String>) -> T {
    result.unwrap_or_else(|err| {
        record(part, &err, degraded);
        T::default()
    })
}

fn record(part: &str, err: &SourceError, degraded: &mut Vec<String>) {
    warn!(part, error = %err, "host metrics unavailable");
    degraded.push(format!("{part}: {err}"));
}
