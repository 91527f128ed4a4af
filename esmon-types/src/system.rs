//! Host resource metrics.
//!
//! Rates are per second and already passed through rate derivation and spike
//! smoothing; cumulative totals are raw counter values as last observed.

/// One full host sample.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemMetrics {
    /// Unix epoch milliseconds when the sample was taken.
    pub timestamp_ms: u64,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub hostname: Option<String>,

    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub disk: DiskMetrics,
    pub network: NetworkMetrics,

    /// Parts of the sample that could not be read this cycle, with the reason.
    ///
    /// A degraded part keeps its default values.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub degraded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpuMetrics {
    /// Whole-machine utilisation, 0..=100.
    pub usage_percent: f64,
    pub per_core_percent: Vec<f64>,
    pub logical_cores: usize,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub physical_cores: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub load_average: Option<LoadAverage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryMetrics {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub free_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
}

impl MemoryMetrics {
    /// Used memory as a percentage of total, or 0 when total is unknown.
    pub fn used_percent(&self) -> f64 {
        percent(self.used_bytes, self.total_bytes)
    }

    pub fn swap_used_percent(&self) -> f64 {
        percent(self.swap_used_bytes, self.swap_total_bytes)
    }
}

/// Per-second disk I/O rates for one device or the host aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiskRates {
    pub read_bytes: f64,
    pub write_bytes: f64,
    pub read_ops: f64,
    pub write_ops: f64,
    /// Share of wall time the device had I/O in flight, clamped to 0..=100.
    pub io_util_percent: f64,
    /// Mean bytes per completed request over the interval.
    pub avg_request_bytes: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiskDeviceMetrics {
    pub name: String,
    /// `None` until the device has been observed twice.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub rates: Option<DiskRates>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionMetrics {
    pub device: String,
    pub mount_point: String,
    pub file_system: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl PartitionMetrics {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }

    pub fn used_percent(&self) -> f64 {
        percent(self.used_bytes(), self.total_bytes)
    }
}

/// Host disk totals across countable devices.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiskMetrics {
    /// Smoothed aggregate rates; `io_util_percent` is the busiest device.
    pub rates: DiskRates,
    /// True until at least one countable device has produced a rate.
    pub warming_up: bool,
    pub devices: Vec<DiskDeviceMetrics>,
    pub partitions: Vec<PartitionMetrics>,
}

/// Per-second network rates for one interface or the host aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkRates {
    pub bytes_sent: f64,
    pub bytes_recv: f64,
    pub packets_sent: f64,
    pub packets_recv: f64,
    /// Receive and transmit errors combined.
    pub errors: f64,
    /// Receive and transmit drops combined.
    pub drops: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterfaceMetrics {
    pub name: String,
    /// Matches the physical-interface allow-list.
    pub physical: bool,
    pub total_bytes_sent: u64,
    pub total_bytes_recv: u64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub rates: Option<NetworkRates>,
}

/// Host network totals across countable interfaces.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkMetrics {
    /// Smoothed aggregate rates.
    pub rates: NetworkRates,
    pub warming_up: bool,
    pub total_bytes_sent: u64,
    pub total_bytes_recv: u64,
    pub interfaces: Vec<InterfaceMetrics>,
}

pub(crate) fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
