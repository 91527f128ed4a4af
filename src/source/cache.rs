//! Live data source over the sampler's shared cache.
//!
//! The sampler publishes into a [`MetricsCache`]; this source hands the TUI
//! a copy whenever the cache generation has moved on.

use std::sync::Arc;

use esmon_engine::MetricsCache;
use esmon_types::MetricsReport;

use super::DataSource;

/// A data source that reads the latest report from a [`MetricsCache`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use esmon::{CacheSource, DataSource};
/// use esmon_engine::MetricsCache;
///
/// let cache = Arc::new(MetricsCache::default());
/// let mut source = CacheSource::new(cache, "http://localhost:9200");
/// assert!(source.poll().is_some());
/// assert!(source.poll().is_none());
/// ```
#[derive(Debug)]
pub struct CacheSource {
    cache: Arc<MetricsCache>,
    description: String,
    /// Generation of the last report handed out
    seen: Option<u64>,
}

impl CacheSource {
    /// Create a new cache source.
    ///
    /// `target` describes what is being sampled (e.g. the cluster endpoint).
    pub fn new(cache: Arc<MetricsCache>, target: &str) -> Self {
        Self {
            cache,
            description: format!("live: {}", target),
            seen: None,
        }
    }
}

impl DataSource for CacheSource {
    fn poll(&mut self) -> Option<MetricsReport> {
        let generation = self.cache.generation();
        if self.seen == Some(generation) {
            return None;
        }
        self.seen = Some(generation);
        Some(self.cache.report())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        // Sampling errors travel inside the report, per section
        None
    }

    fn force_refresh(&mut self) {
        self.seen = None;
    }
}
