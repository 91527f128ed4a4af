//! Raw counter readings for each resource family.
//!
//! A reading is a snapshot of cumulative counters for one resource key
//! (interface, block device, node or index). Readings are replaced wholesale
//! each cycle and turned into rates by [`RateDeriver`](crate::RateDeriver).

use esmon_types::{DiskRates, NetworkRates};

use crate::counter::{counter_delta, rate_per_sec, CounterWidth};
use crate::rate::CounterSet;

/// Cumulative counters for one network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errors_in: u64,
    pub errors_out: u64,
    pub drops_in: u64,
    pub drops_out: u64,
    pub width: CounterWidth,
}

impl CounterSet for NetCounters {
    type Rates = NetworkRates;

    fn rates_since(&self, previous: &Self, elapsed_secs: f64) -> NetworkRates {
        let rate = |current: u64, prev: u64| {
            rate_per_sec(counter_delta(current, prev, self.width), elapsed_secs)
        };
        NetworkRates {
            bytes_sent: rate(self.bytes_sent, previous.bytes_sent),
            bytes_recv: rate(self.bytes_recv, previous.bytes_recv),
            packets_sent: rate(self.packets_sent, previous.packets_sent),
            packets_recv: rate(self.packets_recv, previous.packets_recv),
            errors: rate(self.errors_in, previous.errors_in)
                + rate(self.errors_out, previous.errors_out),
            drops: rate(self.drops_in, previous.drops_in) + rate(self.drops_out, previous.drops_out),
        }
    }
}

/// Bytes per kernel disk sector.
pub const SECTOR_BYTES: u64 = 512;

/// Cumulative counters for one block device.
///
/// Transfer volume is kept in sectors, the unit the kernel counts in, so a
/// 32-bit wrap is detected on the raw counter before scaling to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskCounters {
    pub read_sectors: u64,
    pub write_sectors: u64,
    pub read_ops: u64,
    pub write_ops: u64,
    /// Milliseconds the device spent with I/O in flight.
    pub io_time_ms: u64,
    pub width: CounterWidth,
}

impl CounterSet for DiskCounters {
    type Rates = DiskRates;

    fn rates_since(&self, previous: &Self, elapsed_secs: f64) -> DiskRates {
        let delta = |current: u64, prev: u64| counter_delta(current, prev, self.width);

        let read_bytes =
            delta(self.read_sectors, previous.read_sectors).saturating_mul(SECTOR_BYTES);
        let write_bytes =
            delta(self.write_sectors, previous.write_sectors).saturating_mul(SECTOR_BYTES);
        let read_ops = delta(self.read_ops, previous.read_ops);
        let write_ops = delta(self.write_ops, previous.write_ops);
        let io_time_ms = delta(self.io_time_ms, previous.io_time_ms);

        let ops = read_ops + write_ops;
        let avg_request_bytes = if ops > 0 {
            (read_bytes + write_bytes) as f64 / ops as f64
        } else {
            0.0
        };

        DiskRates {
            read_bytes: rate_per_sec(read_bytes, elapsed_secs),
            write_bytes: rate_per_sec(write_bytes, elapsed_secs),
            read_ops: rate_per_sec(read_ops, elapsed_secs),
            write_ops: rate_per_sec(write_ops, elapsed_secs),
            io_util_percent: (io_time_ms as f64 / (elapsed_secs * 1000.0) * 100.0).clamp(0.0, 100.0),
            avg_request_bytes,
        }
    }
}

/// Cumulative indexing and search totals for a node or index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchCounters {
    pub index_total: u64,
    pub query_total: u64,
}

/// Per-second indexing and query throughput.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchRates {
    pub indexing_per_sec: f64,
    pub query_per_sec: f64,
}

impl CounterSet for SearchCounters {
    type Rates = SearchRates;

    fn rates_since(&self, previous: &Self, elapsed_secs: f64) -> SearchRates {
        let rate = |current: u64, prev: u64| {
            rate_per_sec(
                counter_delta(current, prev, CounterWidth::Bits64),
                elapsed_secs,
            )
        };
        SearchRates {
            indexing_per_sec: rate(self.index_total, previous.index_total),
            query_per_sec: rate(self.query_total, previous.query_total),
        }
    }
}
