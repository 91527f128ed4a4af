//! Rate derivation from cumulative counter readings.
//!
//! ```text
//! reading(t1) ──┐
//!               ├─▶ RateDeriver::derive ─▶ Uninitialized   (first sight / elapsed <= 0)
//! previous(t0) ─┘                       └─▶ Ready(rates)     (delta / (t1 - t0))
//! ```
//!
//! The stored previous sample is overwritten on every call, including calls
//! that return [`Derivation::Uninitialized`].

use std::time::Instant;

use crate::snapshot::SnapshotStore;

/// A family of cumulative counters that can be turned into per-second rates.
pub trait CounterSet {
    /// The per-second view of this counter family.
    type Rates;

    /// Rates accumulated between `previous` and `self` over `elapsed_secs`.
    ///
    /// `elapsed_secs` is always positive when called by [`RateDeriver`].
    fn rates_since(&self, previous: &Self, elapsed_secs: f64) -> Self::Rates;
}

/// Per-second rates plus the interval they were computed over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRate<R> {
    pub rates: R,
    pub elapsed_secs: f64,
}

/// Result of [`RateDeriver::derive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Derivation<R> {
    /// No usable previous sample; callers treat the rate as absent.
    Uninitialized,
    Ready(DerivedRate<R>),
}

impl<R> Derivation<R> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Derivation::Ready(_))
    }

    pub fn ready(self) -> Option<DerivedRate<R>> {
        match self {
            Derivation::Ready(rate) => Some(rate),
            Derivation::Uninitialized => None,
        }
    }

    pub fn rates(self) -> Option<R> {
        self.ready().map(|r| r.rates)
    }
}

/// Converts successive readings of keyed resources into rates.
///
/// Only mutates its own [`SnapshotStore`].
#[derive(Debug, Clone)]
pub struct RateDeriver<C> {
    store: SnapshotStore<C>,
}

impl<C: CounterSet> RateDeriver<C> {
    pub fn new() -> Self {
        Self {
            store: SnapshotStore::new(),
        }
    }

    /// Derive rates for `key` from `current`, captured at `now`.
    pub fn derive(&mut self, key: &str, current: C, now: Instant) -> Derivation<C::Rates> {
        let derivation = match self.store.get(key) {
            None => Derivation::Uninitialized,
            Some(previous) => match now.checked_duration_since(previous.at) {
                Some(elapsed) if !elapsed.is_zero() => {
                    let elapsed_secs = elapsed.as_secs_f64();
                    Derivation::Ready(DerivedRate {
                        rates: current.rates_since(&previous.reading, elapsed_secs),
                        elapsed_secs,
                    })
                }
                _ => Derivation::Uninitialized,
            },
        };

        self.store.replace(key, current, now);
        derivation
    }

    /// Forget resources that were not part of the latest reading.
    pub fn retain<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.store.retain_keys(keys);
    }

    pub fn forget(&mut self, key: &str) {
        self.store.remove(key);
    }

    /// Number of resources with a stored previous sample.
    pub fn tracked(&self) -> usize {
        self.store.len()
    }
}

impl<C: CounterSet> Default for RateDeriver<C> {
    fn default() -> Self {
        Self::new()
    }
}
