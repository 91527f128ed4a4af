//! Host counter source backed by `sysinfo`, with `procfs` on Linux.
//!
//! CPU, memory, swap and mounted filesystems come from `sysinfo` on every
//! platform. On Linux, interface counters are read from `/proc/net/dev`
//! (which carries drop counts) and block-device counters from
//! `/proc/diskstats`. Elsewhere network counters fall back to `sysinfo` and
//! disk counters are reported as unsupported.

use esmon_engine::{CounterSource, CounterWidth, DiskCounters, NetCounters, SourceError};
use esmon_types::{CpuMetrics, LoadAverage, MemoryMetrics, PartitionMetrics};
use sysinfo::{Disks, Networks, System};

/// Reads live host counters.
pub struct HostCounterSource {
    system: System,
    disks: Disks,
    #[cfg_attr(target_os = "linux", allow(dead_code))]
    networks: Networks,
    hostname: Option<String>,
}

impl HostCounterSource {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            hostname: System::host_name(),
        }
    }
}

impl Default for HostCounterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostCounterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCounterSource")
            .field("hostname", &self.hostname)
            .finish_non_exhaustive()
    }
}

/// Kernel counters are `unsigned long`.
fn native_width() -> CounterWidth {
    if cfg!(target_pointer_width = "32") {
        CounterWidth::Bits32
    } else {
        CounterWidth::Bits64
    }
}

impl CounterSource for HostCounterSource {
    fn hostname(&self) -> Option<String> {
        self.hostname.clone()
    }

    fn cpu(&mut self) -> Result<CpuMetrics, SourceError> {
        self.system.refresh_cpu();
        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return Err(SourceError::Unavailable("no CPUs reported".to_string()));
        }

        let load = System::load_average();
        Ok(CpuMetrics {
            usage_percent: f64::from(self.system.global_cpu_info().cpu_usage()),
            per_core_percent: cpus.iter().map(|c| f64::from(c.cpu_usage())).collect(),
            logical_cores: cpus.len(),
            physical_cores: self.system.physical_core_count(),
            load_average: (!cfg!(windows)).then_some(LoadAverage {
                one: load.one,
                five: load.five,
                fifteen: load.fifteen,
            }),
        })
    }

    fn memory(&mut self) -> Result<MemoryMetrics, SourceError> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return Err(SourceError::Unavailable("memory totals unavailable".to_string()));
        }
        Ok(MemoryMetrics {
            total_bytes: total,
            used_bytes: self.system.used_memory(),
            available_bytes: self.system.available_memory(),
            free_bytes: self.system.free_memory(),
            swap_total_bytes: self.system.total_swap(),
            swap_used_bytes: self.system.used_swap(),
        })
    }

    fn partitions(&mut self) -> Result<Vec<PartitionMetrics>, SourceError> {
        self.disks.refresh_list();
        Ok(self
            .disks
            .list()
            .iter()
            .filter(|disk| disk.total_space() > 0)
            .map(|disk| PartitionMetrics {
                device: disk.name().to_string_lossy().into_owned(),
                mount_point: disk.mount_point().to_string_lossy().into_owned(),
                file_system: disk.file_system().to_string_lossy().into_owned(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
            })
            .collect())
    }

    #[cfg(target_os = "linux")]
    fn network_counters(&mut self) -> Result<Vec<(String, NetCounters)>, SourceError> {
        let devices = procfs::net::dev_status()
            .map_err(|e| SourceError::Unavailable(format!("/proc/net/dev: {e}")))?;
        let width = native_width();
        Ok(devices
            .into_iter()
            .map(|(name, dev)| {
                let counters = NetCounters {
                    bytes_sent: dev.sent_bytes,
                    bytes_recv: dev.recv_bytes,
                    packets_sent: dev.sent_packets,
                    packets_recv: dev.recv_packets,
                    errors_in: dev.recv_errs,
                    errors_out: dev.sent_errs,
                    drops_in: dev.recv_drop,
                    drops_out: dev.sent_drop,
                    width,
                };
                (name, counters)
            })
            .collect())
    }

    #[cfg(not(target_os = "linux"))]
    fn network_counters(&mut self) -> Result<Vec<(String, NetCounters)>, SourceError> {
        self.networks.refresh_list();
        let width = native_width();
        Ok(self
            .networks
            .iter()
            .map(|(name, data)| {
                let counters = NetCounters {
                    bytes_sent: data.total_transmitted(),
                    bytes_recv: data.total_received(),
                    packets_sent: data.total_packets_transmitted(),
                    packets_recv: data.total_packets_received(),
                    errors_in: data.total_errors_on_received(),
                    errors_out: data.total_errors_on_transmitted(),
                    drops_in: 0,
                    drops_out: 0,
                    width,
                };
                (name.clone(), counters)
            })
            .collect())
    }

    #[cfg(target_os = "linux")]
    fn disk_counters(&mut self) -> Result<Vec<(String, DiskCounters)>, SourceError> {
        let stats = procfs::diskstats()
            .map_err(|e| SourceError::Unavailable(format!("/proc/diskstats: {e}")))?;
        let width = native_width();
        Ok(stats
            .into_iter()
            .map(|stat| {
                let counters = DiskCounters {
                    read_sectors: stat.sectors_read as u64,
                    write_sectors: stat.sectors_written as u64,
                    read_ops: stat.reads as u64,
                    write_ops: stat.writes as u64,
                    io_time_ms: stat.time_in_progress as u64,
                    width,
                };
                (stat.name, counters)
            })
            .collect())
    }

    #[cfg(not(target_os = "linux"))]
    fn disk_counters(&mut self) -> Result<Vec<(String, DiskCounters)>, SourceError> {
        Err(SourceError::Unsupported(
            "per-device I/O counters need /proc/diskstats".to_string(),
        ))
    }
}
