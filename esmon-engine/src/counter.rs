//! Cumulative counter arithmetic.
//!
//! Every counter esmon reads (interface bytes, disk sectors, node query
//! totals) goes through [`counter_delta`], so reset and wraparound handling is
//! identical everywhere.

/// Width of the underlying hardware or kernel counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterWidth {
    Bits32,
    #[default]
    Bits64,
}

impl CounterWidth {
    pub const fn mask(self) -> u64 {
        match self {
            CounterWidth::Bits32 => u32::MAX as u64,
            CounterWidth::Bits64 => u64::MAX,
        }
    }
}

/// Increase of a cumulative counter between two observations.
///
/// When `current < previous` the counter was reset or wrapped, and the delta
/// is taken to be `current` (the amount counted since the reset). The result
/// is never negative.
pub fn counter_delta(current: u64, previous: u64, width: CounterWidth) -> u64 {
    let mask = width.mask();
    let (current, previous) = (current & mask, previous & mask);
    if current >= previous {
        current - previous
    } else {
        current
    }
}

/// Per-second rate for a delta over `elapsed_secs`; zero for a non-positive
/// interval.
pub fn rate_per_sec(delta: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 && elapsed_secs.is_finite() {
        delta as f64 / elapsed_secs
    } else {
        0.0
    }
}
