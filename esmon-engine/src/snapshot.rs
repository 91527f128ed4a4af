//! Previous-sample storage for rate derivation.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// The last reading seen for one resource, and when it was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousSample<C> {
    pub reading: C,
    pub at: Instant,
}

/// At most one [`PreviousSample`] per resource key.
///
/// Owned by a single deriver; not shared between tasks.
#[derive(Debug, Clone)]
pub struct SnapshotStore<C> {
    samples: HashMap<String, PreviousSample<C>>,
}

impl<C> SnapshotStore<C> {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PreviousSample<C>> {
        self.samples.get(key)
    }

    /// Store `reading` as the latest sample for `key`, returning the one it
    /// replaces.
    pub fn replace(&mut self, key: &str, reading: C, at: Instant) -> Option<PreviousSample<C>> {
        // Avoid reallocating the key for resources we already track.
        if let Some(slot) = self.samples.get_mut(key) {
            return Some(std::mem::replace(slot, PreviousSample { reading, at }));
        }
        self.samples
            .insert(key.to_string(), PreviousSample { reading, at });
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<PreviousSample<C>> {
        self.samples.remove(key)
    }

    /// Drop every key not in `keys`. Used to forget devices that disappeared.
    pub fn retain_keys<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = keys.into_iter().collect();
        self.samples.retain(|key, _| keep.contains(key.as_str()));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<C> Default for SnapshotStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_replace_returns_none() {
        let mut store = SnapshotStore::new();
        let now = Instant::now();
        assert!(store.replace("eth0", 10u64, now).is_none());
        assert_eq!(store.get("eth0").unwrap().reading, 10);
    }

    #[test]
    fn replace_returns_previous() {
        let mut store = SnapshotStore::new();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        store.replace("eth0", 10u64, t0);

        let previous = store.replace("eth0", 20u64, t1).unwrap();
        assert_eq!(previous.reading, 10);
        assert_eq!(previous.at, t0);
        assert_eq!(store.get("eth0").unwrap().at, t1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn retain_keys_forgets_vanished_resources() {
        let mut store = SnapshotStore::new();
        let now = Instant::now();
        store.replace("eth0", 1u64, now);
        store.replace("veth9", 1u64, now);
        store.replace("sda", 1u64, now);

        store.retain_keys(["eth0", "sda"]);

        assert_eq!(store.len(), 2);
        assert!(store.get("veth9").is_none());
    }
}
