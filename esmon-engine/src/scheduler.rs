//! Periodic sampling into a shared cache.
//!
//! ```text
//!                 ┌──────────── system task (interval) ────────────┐
//!   Sampler ──────┤  spawn_blocking(SystemCollector::sample)       ├──▶ MetricsCache
//!   ::start()     ├──────────── cluster task (interval) ───────────┤      (RwLock + generation)
//!                 │  timeout(deadline, ClusterCollector::sample)   │          │
//!                 └────────────────────────────────────────────────┘          ▼
//!                                                                       readers: report()
//! ```
//!
//! Each family runs on its own task so a slow cluster never delays host
//! sampling. Missed ticks are delayed rather than bursted, so a sample that
//! overruns its interval never overlaps the next one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use esmon_types::{now_ms, ClusterMetrics, MetricsReport, SystemMetrics};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::collector::{ClusterCollector, SystemCollector, SystemCollectorConfig};
use crate::error::SourceError;
use crate::health::{evaluate, MetricsBatch};
use crate::source::{ClusterSource, CounterSource};
use crate::thresholds::Thresholds;

pub const DEFAULT_SYSTEM_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_CLUSTER_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(10);

/// Shortest accepted sampling interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

type SharedSystemCollector = Arc<Mutex<SystemCollector<Box<dyn CounterSource>>>>;
type BoxedClusterCollector = ClusterCollector<Box<dyn ClusterSource>>;

/// Latest sample of every family plus the issues derived from it.
///
/// Writers replace one section at a time; readers always see a complete
/// [`MetricsReport`]. A failed sample keeps the previous section data and
/// records the error next to it.
#[derive(Debug)]
pub struct MetricsCache {
    report: RwLock<MetricsReport>,
    thresholds: Thresholds,
    generation: AtomicU64,
}

impl MetricsCache {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            report: RwLock::new(MetricsReport::empty(now_ms())),
            thresholds,
            generation: AtomicU64::new(0),
        }
    }

    pub fn publish_system(&self, result: Result<SystemMetrics, SourceError>) {
        let mut report = self.report.write();
        match result {
            Ok(metrics) => {
                report.system = Some(metrics);
                report.system_error = None;
            }
            Err(err) => report.system_error = Some(err.to_string()),
        }
        self.refresh(&mut report);
    }

    pub fn publish_cluster(&self, result: Result<ClusterMetrics, SourceError>) {
        let mut report = self.report.write();
        match result {
            Ok(metrics) => {
                report.cluster = Some(metrics);
                report.cluster_error = None;
            }
            Err(err) => report.cluster_error = Some(err.to_string()),
        }
        self.refresh(&mut report);
    }

    fn refresh(&self, report: &mut MetricsReport) {
        report.generated_at_ms = now_ms();
        report.issues = evaluate(&MetricsBatch::from_report(report), &self.thresholds);
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// A consistent copy of the current report.
    pub fn report(&self) -> MetricsReport {
        self.report.read().clone()
    }

    /// Bumped on every publish; lets readers skip unchanged reports.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

impl Default for MetricsCache {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

/// Builder for [`Sampler`].
#[derive(Default)]
pub struct SamplerBuilder {
    system: Option<Box<dyn CounterSource>>,
    system_config: SystemCollectorConfig,
    cluster: Option<Box<dyn ClusterSource>>,
    thresholds: Option<Thresholds>,
    system_interval: Option<Duration>,
    cluster_interval: Option<Duration>,
    request_deadline: Option<Duration>,
}

impl SamplerBuilder {
    pub fn system_source(mut self, source: impl CounterSource + 'static) -> Self {
        self.system = Some(Box::new(source));
        self
    }

    pub fn system_config(mut self, config: SystemCollectorConfig) -> Self {
        self.system_config = config;
        self
    }

    pub fn cluster_source(mut self, source: impl ClusterSource + 'static) -> Self {
        self.cluster = Some(Box::new(source));
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Sets both sampling intervals.
    pub fn interval(self, interval: Duration) -> Self {
        self.system_interval(interval).cluster_interval(interval)
    }

    pub fn system_interval(mut self, interval: Duration) -> Self {
        self.system_interval = Some(interval);
        self
    }

    pub fn cluster_interval(mut self, interval: Duration) -> Self {
        self.cluster_interval = Some(interval);
        self
    }

    /// Upper bound on one cluster sample, all requests included.
    pub fn request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = Some(deadline);
        self
    }

    pub fn build(self) -> Sampler {
        let system_config = self.system_config;
        Sampler {
            system: self
                .system
                .map(|source| Arc::new(Mutex::new(SystemCollector::with_config(source, system_config)))),
            cluster: self.cluster.map(ClusterCollector::new),
            cache: Arc::new(MetricsCache::new(self.thresholds.unwrap_or_default())),
            system_interval: self
                .system_interval
                .unwrap_or(DEFAULT_SYSTEM_INTERVAL)
                .max(MIN_INTERVAL),
            cluster_interval: self
                .cluster_interval
                .unwrap_or(DEFAULT_CLUSTER_INTERVAL)
                .max(MIN_INTERVAL),
            request_deadline: self.request_deadline.unwrap_or(DEFAULT_REQUEST_DEADLINE),
        }
    }
}

/// Drives the collectors and publishes into a [`MetricsCache`].
pub struct Sampler {
    system: Option<SharedSystemCollector>,
    cluster: Option<BoxedClusterCollector>,
    cache: Arc<MetricsCache>,
    system_interval: Duration,
    cluster_interval: Duration,
    request_deadline: Duration,
}

impl Sampler {
    pub fn builder() -> SamplerBuilder {
        SamplerBuilder::default()
    }

    pub fn cache(&self) -> Arc<MetricsCache> {
        Arc::clone(&self.cache)
    }

    /// Sample every family twice, `warmup` apart, and return the report.
    ///
    /// The first pass only primes the rate derivers.
    pub async fn run_once(&mut self, warmup: Duration) -> MetricsReport {
        let Sampler {
            system,
            cluster,
            cache,
            request_deadline,
            ..
        } = self;
        let deadline = *request_deadline;

        let system_pass = async {
            if let Some(collector) = system.as_ref() {
                let _ = sample_system(Arc::clone(collector)).await;
                tokio::time::sleep(warmup).await;
                cache.publish_system(sample_system(Arc::clone(collector)).await);
            }
        };
        let cluster_pass = async {
            if let Some(collector) = cluster.as_mut() {
                let _ = sample_cluster(collector, deadline).await;
                tokio::time::sleep(warmup).await;
                cache.publish_cluster(sample_cluster(collector, deadline).await);
            }
        };
        tokio::join!(system_pass, cluster_pass);

        cache.report()
    }

    /// Spawn one sampling task per configured family.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> SamplerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tasks = Vec::new();

        if let Some(collector) = self.system {
            let cache = Arc::clone(&self.cache);
            let period = self.system_interval;
            let mut stop = stop_rx.clone();
            tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            cache.publish_system(sample_system(Arc::clone(&collector)).await);
                        }
                        _ = stop.changed() => break,
                    }
                    if *stop.borrow() {
                        break;
                    }
                }
                debug!("system sampler stopped");
            }));
        }

        if let Some(mut collector) = self.cluster {
            let cache = Arc::clone(&self.cache);
            let period = self.cluster_interval;
            let deadline = self.request_deadline;
            let mut stop = stop_rx.clone();
            tasks.push(tokio::spawn(async move {
                info!(endpoint = %collector.source().describe(), "cluster sampler started");
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = stop.changed() => break,
                    }
                    tokio::select! {
                        result = sample_cluster(&mut collector, deadline) => cache.publish_cluster(result),
                        _ = stop.changed() => break,
                    }
                    if *stop.borrow() {
                        break;
                    }
                }
                debug!("cluster sampler stopped");
            }));
        }

        SamplerHandle { stop_tx, tasks }
    }
}

async fn sample_system(collector: SharedSystemCollector) -> Result<SystemMetrics, SourceError> {
    tokio::task::spawn_blocking(move || collector.lock().sample())
        .await
        .map_err(|err| {
            warn!(error = %err, "system sample task failed");
            SourceError::Unavailable(format!("system sample task failed: {err}"))
        })
}

async fn sample_cluster(
    collector: &mut BoxedClusterCollector,
    deadline: Duration,
) -> Result<ClusterMetrics, SourceError> {
    match tokio::time::timeout(deadline, collector.sample()).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?deadline, "cluster sample timed out");
            Err(SourceError::Timeout(deadline))
        }
    }
}

/// Handle to running sampler tasks.
///
/// Dropping the handle stops the tasks.
pub struct SamplerHandle {
    stop_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SamplerHandle {
    /// Signal every task to stop after its current step.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop and wait for every task to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        for task in self.tasks.drain(..) {
            if let Err(err) = task.await {
                warn!(error = %err, "sampler task ended abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(JoinHandle::is_finished)
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Instant;

    use async_trait::async_trait;
    use esmon_types::{
        ClusterHealth, ClusterStatus, CpuMetrics, IndexSummary, MemoryMetrics, NodeSummary,
        PartitionMetrics, Severity,
    };

    use crate::readings::{DiskCounters, NetCounters};

    struct Host {
        start: Instant,
        reads: u64,
        cpu: f64,
    }

    impl Host {
        fn busy(cpu: f64) -> Self {
            Self {
                start: Instant::now(),
                reads: 0,
                cpu,
            }
        }
    }

    impl CounterSource for Host {
        fn cpu(&mut self) -> Result<CpuMetrics, SourceError> {
            Ok(CpuMetrics {
                usage_percent: self.cpu,
                ..Default::default()
            })
        }

        fn memory(&mut self) -> Result<MemoryMetrics, SourceError> {
            Ok(MemoryMetrics::default())
        }

        fn partitions(&mut self) -> Result<Vec<PartitionMetrics>, SourceError> {
            Ok(Vec::new())
        }

        fn network_counters(&mut self) -> Result<Vec<(String, NetCounters)>, SourceError> {
            self.reads += 1;
            Ok(vec![(
                "eth0".to_string(),
                NetCounters {
                    bytes_recv: self.reads * 1_000,
                    ..Default::default()
                },
            )])
        }

        fn disk_counters(&mut self) -> Result<Vec<(String, DiskCounters)>, SourceError> {
            Ok(Vec::new())
        }

        fn now(&self) -> Instant {
            self.start + Duration::from_secs(self.reads)
        }
    }

    struct Cluster {
        delay: Duration,
        status: ClusterStatus,
        calls: AtomicU32,
    }

    impl Cluster {
        fn new(status: ClusterStatus, delay: Duration) -> Self {
            Self {
                delay,
                status,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ClusterSource for Cluster {
        fn describe(&self) -> String {
            "test-cluster".to_string()
        }

        async fn cluster_health(&self) -> Result<ClusterHealth, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(ClusterHealth {
                cluster_name: "prod".to_string(),
                status: self.status,
                unassigned_shards: 2,
                ..Default::default()
            })
        }

        async fn node_stats(&self) -> Result<Vec<NodeSummary>, SourceError> {
            Ok(Vec::new())
        }

        async fn indices(&self) -> Result<Vec<IndexSummary>, SourceError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn failed_publish_keeps_previous_section() {
        let cache = MetricsCache::default();
        cache.publish_system(Ok(SystemMetrics {
            hostname: Some("db-1".to_string()),
            ..Default::default()
        }));
        assert_eq!(cache.generation(), 1);

        cache.publish_system(Err(SourceError::Unavailable("procfs".to_string())));
        let report = cache.report();
        assert_eq!(cache.generation(), 2);
        assert_eq!(report.system.unwrap().hostname.as_deref(), Some("db-1"));
        assert!(report.system_error.unwrap().contains("procfs"));
    }

    #[test]
    fn publish_recomputes_issues() {
        let cache = MetricsCache::default();
        cache.publish_system(Ok(SystemMetrics {
            cpu: CpuMetrics {
                usage_percent: 95.0,
                ..Default::default()
            },
            ..Default::default()
        }));
        assert_eq!(cache.report().worst_severity(), Some(Severity::Critical));

        cache.publish_system(Ok(SystemMetrics::default()));
        assert!(cache.report().issues.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_once_primes_then_reports_rates() {
        let mut sampler = Sampler::builder()
            .system_source(Host::busy(10.0))
            .cluster_source(Cluster::new(ClusterStatus::Yellow, Duration::ZERO))
            .build();

        let report = sampler.run_once(Duration::from_secs(1)).await;

        let system = report.system.unwrap();
        assert!(!system.network.warming_up);
        assert!((system.network.rates.bytes_recv - 1_000.0).abs() < 1e-9);
        assert_eq!(report.cluster.unwrap().health.status, ClusterStatus::Yellow);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cluster_times_out_without_blocking_host() {
        let sampler = Sampler::builder()
            .system_source(Host::busy(10.0))
            .cluster_source(Cluster::new(ClusterStatus::Green, Duration::from_secs(60)))
            .interval(Duration::from_secs(2))
            .request_deadline(Duration::from_secs(1))
            .build();
        let cache = sampler.cache();
        let handle = sampler.start();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let report = cache.report();
        assert!(report.system.is_some());
        assert!(report.cluster.is_none());
        assert!(report.cluster_error.unwrap().contains("timed out"));

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_in_flight_request() {
        let sampler = Sampler::builder()
            .cluster_source(Cluster::new(ClusterStatus::Green, Duration::from_secs(3600)))
            .request_deadline(Duration::from_secs(7200))
            .build();
        let cache = sampler.cache();
        let handle = sampler.start();

        tokio::time::sleep(Duration::from_secs(1)).await;
        let finished = tokio::time::timeout(Duration::from_secs(5), handle.shutdown()).await;
        assert!(finished.is_ok());
        assert_eq!(cache.generation(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_every_interval() {
        let sampler = Sampler::builder()
            .cluster_source(Cluster::new(ClusterStatus::Green, Duration::ZERO))
            .interval(Duration::from_secs(2))
            .build();
        let cache = sampler.cache();
        let handle = sampler.start();

        tokio::time::sleep(Duration::from_millis(4_500)).await;
        assert_eq!(cache.generation(), 3);
        assert_eq!(cache.report().cluster.unwrap().health.cluster_name, "prod");

        handle.shutdown().await;
    }
}
