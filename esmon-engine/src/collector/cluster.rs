use std::time::Instant;

use esmon_types::{now_ms, ClusterMetrics};
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::rate::RateDeriver;
use crate::readings::SearchCounters;
use crate::source::ClusterSource;

/// Samples a [`ClusterSource`] into [`ClusterMetrics`].
///
/// Health, node stats and index listings are requested concurrently. Health
/// is mandatory; node or index failures are recorded on the result and the
/// remaining sections are still returned.
#[derive(Debug)]
pub struct ClusterCollector<C> {
    source: C,
    nodes: RateDeriver<SearchCounters>,
    indices: RateDeriver<SearchCounters>,
}

impl<C: ClusterSource> ClusterCollector<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            nodes: RateDeriver::new(),
            indices: RateDeriver::new(),
        }
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub async fn sample(&mut self) -> Result<ClusterMetrics, SourceError> {
        let (health, nodes, indices) = tokio::join!(
            self.source.cluster_health(),
            self.source.node_stats(),
            self.source.indices(),
        );

        let mut metrics = ClusterMetrics {
            timestamp_ms: now_ms(),
            health: health?,
            ..Default::default()
        };

        match nodes {
            Ok(nodes) => metrics.nodes = nodes,
            Err(err) => {
                warn!(error = %err, "node stats unavailable");
                metrics.nodes_error = Some(err.to_string());
            }
        }
        match indices {
            Ok(indices) => metrics.indices = indices,
            Err(err) => {
                warn!(error = %err, "index listing unavailable");
                metrics.indices_error = Some(err.to_string());
            }
        }

        self.apply_rates(&mut metrics, Instant::now());
        debug!(
            cluster = %metrics.health.cluster_name,
            status = %metrics.health.status,
            nodes = metrics.nodes.len(),
            indices = metrics.indices.len(),
            "cluster sample complete"
        );
        Ok(metrics)
    }

    /// Fill indexing and query rates from cumulative totals.
    ///
    /// Nodes are keyed by id, indices by name. Keys missing from a successful
    /// listing are forgotten; a failed listing leaves its history untouched.
    pub fn apply_rates(&mut self, metrics: &mut ClusterMetrics, now: Instant) {
        for node in &mut metrics.nodes {
            let counters = SearchCounters {
                index_total: node.index_total,
                query_total: node.query_total,
            };
            let rates = self.nodes.derive(&node.id, counters, now).rates();
            node.indexing_rate = rates.map(|r| r.indexing_per_sec);
            node.query_rate = rates.map(|r| r.query_per_sec);
        }
        if metrics.nodes_error.is_none() {
            self.nodes
                .retain(metrics.nodes.iter().map(|n| n.id.as_str()));
        }

        for index in &mut metrics.indices {
            let counters = SearchCounters {
                index_total: index.index_total,
                query_total: index.query_total,
            };
            let rates = self.indices.derive(&index.name, counters, now).rates();
            index.indexing_rate = rates.map(|r| r.indexing_per_sec);
            index.query_rate = rates.map(|r| r.query_per_sec);
        }
        if metrics.indices_error.is_none() {
            self.indices
                .retain(metrics.indices.iter().map(|i| i.name.as_str()));
        }

        metrics.nodes.sort_by(|a, b| a.name.cmp(&b.name));
        metrics.indices.sort_by(|a, b| a.name.cmp(&b.name));
    }
}
