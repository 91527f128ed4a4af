//! Elasticsearch adapter using the REST API, strictly read-only.
//!
//! Every request goes through a path allow-list before anything touches the
//! network, and only `GET` is ever issued.
//!
//! ## Endpoints
//!
//! - `/`: cluster name and version ([`ElasticsearchAdapter::ping`])
//! - `/_cluster/health`: status and shard counts
//! - `/_nodes/stats/jvm,os,fs,process,indices`: per-node heap, GC, CPU, disk and descriptors
//! - `/_cat/indices?format=json&bytes=b`: index listing
//! - `/_stats/indexing,search`: per-index indexing and query totals
//!
//! ## Example
//!
//! ```rust,no_run
//! use esmon_adapters::elasticsearch::ElasticsearchAdapter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = ElasticsearchAdapter::builder()
//!         .endpoint("http://localhost:9200")
//!         .credentials("elastic", "changeme")
//!         .build()?;
//!
//!     let health = adapter.cluster_health().await?;
//!     println!("{} is {}", health.cluster_name, health.status);
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use esmon_engine::{ClusterSource, SearchCounters, SourceError};
use esmon_types::{ClusterHealth, ClusterStatus, IndexSummary, NodeSummary};

use crate::AdapterError;

/// Default REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9200";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Paths the adapter may request. `/` matches only exactly; the others also
/// match when followed by `/` or `?`.
pub const ALLOWED_PATHS: &[&str] = &[
    "/",
    "/_cluster/health",
    "/_nodes/stats",
    "/_stats",
    "/_cat/indices",
];

const NODE_STATS_PATH: &str = "/_nodes/stats/jvm,os,fs,process,indices";
const CAT_INDICES_PATH: &str = "/_cat/indices?format=json&bytes=b";
const INDEX_STATS_PATH: &str = "/_stats/indexing,search";

/// Whether `path` is on the read-only allow-list.
pub fn is_allowed(path: &str) -> bool {
    ALLOWED_PATHS.iter().any(|allowed| {
        if *allowed == "/" {
            return path == "/";
        }
        match path.strip_prefix(allowed) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    })
}

/// Name and version returned by the root endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterInfo {
    pub node_name: String,
    pub cluster_name: String,
    pub version: String,
}

/// Read-only Elasticsearch REST client.
#[derive(Debug, Clone)]
pub struct ElasticsearchAdapter {
    client: Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> ElasticsearchAdapterBuilder {
        ElasticsearchAdapterBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check connectivity and read the cluster identity.
    pub async fn ping(&self) -> Result<ClusterInfo, AdapterError> {
        let root: RootResponse = self.get("/").await?;
        Ok(ClusterInfo {
            node_name: root.name,
            cluster_name: root.cluster_name,
            version: root.version.number,
        })
    }

    pub async fn cluster_health(&self) -> Result<ClusterHealth, AdapterError> {
        let health: HealthResponse = self.get("/_cluster/health").await?;
        Ok(health.into())
    }

    /// Per-node summaries, unsorted.
    pub async fn node_stats(&self) -> Result<Vec<NodeSummary>, AdapterError> {
        let stats: NodesResponse = self.get(NODE_STATS_PATH).await?;
        Ok(stats
            .nodes
            .into_iter()
            .map(|(id, node)| node.into_summary(id))
            .collect())
    }

    /// Index listing without indexing or query totals.
    pub async fn cat_indices(&self) -> Result<Vec<IndexSummary>, AdapterError> {
        let rows: Vec<CatIndexRow> = self.get(CAT_INDICES_PATH).await?;
        Ok(rows.into_iter().map(CatIndexRow::into_summary).collect())
    }

    /// Cumulative indexing and query totals keyed by index name.
    pub async fn index_stats(&self) -> Result<BTreeMap<String, SearchCounters>, AdapterError> {
        let stats: IndexStatsResponse = self.get(INDEX_STATS_PATH).await?;
        Ok(stats
            .indices
            .into_iter()
            .map(|(name, index)| {
                let counters = SearchCounters {
                    index_total: index.total.indexing.index_total,
                    query_total: index.total.search.query_total,
                };
                (name, counters)
            })
            .collect())
    }

    /// `_cat/indices` rows with totals from `_stats` merged in by name.
    pub async fn indices(&self) -> Result<Vec<IndexSummary>, AdapterError> {
        let (listing, stats) = tokio::join!(self.cat_indices(), self.index_stats());
        let mut listing = listing?;
        match stats {
            Ok(stats) => merge_index_stats(&mut listing, &stats),
            Err(err) => debug!(error = %err, "index stats unavailable, totals left at zero"),
        }
        Ok(listing)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdapterError> {
        if !is_allowed(path) {
            return Err(AdapterError::Forbidden(path.to_string()));
        }

        let url = format!("{}{}", self.endpoint, path);
        let mut request = self.client.get(&url);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(AdapterError::Auth("Invalid credentials".to_string()));
        }

        if status == StatusCode::FORBIDDEN {
            return Err(AdapterError::Auth(format!(
                "User lacks monitor privilege for {path}"
            )));
        }

        if !status.is_success() {
            return Err(AdapterError::Http(format!("API returned status {status}")));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| AdapterError::Parse(format!("{path}: {e}")))
    }
}

#[async_trait]
impl ClusterSource for ElasticsearchAdapter {
    fn describe(&self) -> String {
        self.endpoint.clone()
    }

    async fn cluster_health(&self) -> Result<ClusterHealth, SourceError> {
        Ok(ElasticsearchAdapter::cluster_health(self).await?)
    }

    async fn node_stats(&self) -> Result<Vec<NodeSummary>, SourceError> {
        Ok(ElasticsearchAdapter::node_stats(self).await?)
    }

    async fn indices(&self) -> Result<Vec<IndexSummary>, SourceError> {
        Ok(ElasticsearchAdapter::indices(self).await?)
    }
}

/// Builder for ElasticsearchAdapter.
#[derive(Debug, Default)]
pub struct ElasticsearchAdapterBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
}

impl ElasticsearchAdapterBuilder {
    /// Set the REST endpoint (e.g., "http://localhost:9200").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set basic-auth credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the adapter.
    pub fn build(self) -> Result<ElasticsearchAdapter, AdapterError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(user_agent())
            .build()
            .map_err(|e| AdapterError::Http(format!("Failed to build HTTP client: {e}")))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ElasticsearchAdapter {
            client,
            endpoint,
            username: self.username.filter(|u| !u.is_empty()),
            password: self.password,
        })
    }
}

fn user_agent() -> String {
    format!("esmon/{} (read-only)", env!("CARGO_PKG_VERSION"))
}

fn merge_index_stats(listing: &mut [IndexSummary], stats: &BTreeMap<String, SearchCounters>) {
    for index in listing {
        if let Some(counters) = stats.get(&index.name) {
            index.index_total = counters.index_total;
            index.query_total = counters.query_total;
        }
    }
}

/// `_cat` returns every number as a string, and `null` for closed indices.
fn cat_number<T: std::str::FromStr + Default>(value: Option<String>) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct RootResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cluster_name: String,
    #[serde(default)]
    version: VersionInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VersionInfo {
    #[serde(default)]
    number: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    cluster_name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    timed_out: bool,
    #[serde(default)]
    number_of_nodes: u32,
    #[serde(default)]
    number_of_data_nodes: u32,
    #[serde(default)]
    active_primary_shards: u32,
    #[serde(default)]
    active_shards: u32,
    #[serde(default)]
    relocating_shards: u32,
    #[serde(default)]
    initializing_shards: u32,
    #[serde(default)]
    unassigned_shards: u32,
    #[serde(default)]
    delayed_unassigned_shards: u32,
    #[serde(default)]
    number_of_pending_tasks: u32,
    #[serde(default)]
    active_shards_percent_as_number: f64,
}

impl From<HealthResponse> for ClusterHealth {
    fn from(h: HealthResponse) -> Self {
        ClusterHealth {
            cluster_name: h.cluster_name,
            status: ClusterStatus::parse(&h.status),
            timed_out: h.timed_out,
            number_of_nodes: h.number_of_nodes,
            number_of_data_nodes: h.number_of_data_nodes,
            active_primary_shards: h.active_primary_shards,
            active_shards: h.active_shards,
            relocating_shards: h.relocating_shards,
            initializing_shards: h.initializing_shards,
            unassigned_shards: h.unassigned_shards,
            delayed_unassigned_shards: h.delayed_unassigned_shards,
            number_of_pending_tasks: h.number_of_pending_tasks,
            active_shards_percent: h.active_shards_percent_as_number,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NodesResponse {
    #[serde(default)]
    nodes: HashMap<String, NodeStats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeStats {
    name: String,
    host: String,
    roles: Vec<String>,
    jvm: JvmStats,
    os: OsStats,
    process: ProcessStats,
    fs: FsStats,
    indices: NodeIndices,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JvmStats {
    mem: JvmMem,
    gc: GcStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JvmMem {
    heap_used_in_bytes: u64,
    heap_used_percent: f64,
    heap_max_in_bytes: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GcStats {
    collectors: GcCollectors,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GcCollectors {
    young: GcCollector,
    old: GcCollector,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GcCollector {
    collection_count: u64,
    collection_time_in_millis: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OsStats {
    cpu: OsCpu,
    mem: OsMem,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OsCpu {
    percent: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OsMem {
    used_percent: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProcessStats {
    open_file_descriptors: i64,
    max_file_descriptors: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FsStats {
    total: FsTotal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FsTotal {
    total_in_bytes: u64,
    available_in_bytes: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeIndices {
    docs: DocsStats,
    store: StoreStats,
    indexing: IndexingStats,
    search: SearchStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocsStats {
    count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreStats {
    size_in_bytes: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IndexingStats {
    index_total: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchStats {
    query_total: u64,
}

impl NodeStats {
    fn into_summary(self, id: String) -> NodeSummary {
        // -1 means the platform does not report descriptors.
        let fds = |v: i64| u64::try_from(v).unwrap_or(0);

        NodeSummary {
            id,
            name: self.name,
            host: self.host,
            roles: self.roles,
            heap_used_percent: self.jvm.mem.heap_used_percent,
            heap_used_bytes: self.jvm.mem.heap_used_in_bytes,
            heap_max_bytes: self.jvm.mem.heap_max_in_bytes,
            young_gc_count: self.jvm.gc.collectors.young.collection_count,
            young_gc_millis: self.jvm.gc.collectors.young.collection_time_in_millis,
            old_gc_count: self.jvm.gc.collectors.old.collection_count,
            old_gc_millis: self.jvm.gc.collectors.old.collection_time_in_millis,
            cpu_percent: self.os.cpu.percent,
            memory_used_percent: self.os.mem.used_percent,
            open_file_descriptors: fds(self.process.open_file_descriptors),
            max_file_descriptors: fds(self.process.max_file_descriptors),
            fs_total_bytes: self.fs.total.total_in_bytes,
            fs_available_bytes: self.fs.total.available_in_bytes,
            docs_count: self.indices.docs.count,
            store_size_bytes: self.indices.store.size_in_bytes,
            index_total: self.indices.indexing.index_total,
            query_total: self.indices.search.query_total,
            indexing_rate: None,
            query_rate: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatIndexRow {
    #[serde(default)]
    health: Option<String>,
    #[serde(default)]
    status: Option<String>,
    index: String,
    #[serde(default)]
    pri: Option<String>,
    #[serde(default)]
    rep: Option<String>,
    #[serde(default, rename = "docs.count")]
    docs_count: Option<String>,
    #[serde(default, rename = "docs.deleted")]
    docs_deleted: Option<String>,
    #[serde(default, rename = "store.size")]
    store_size: Option<String>,
    #[serde(default, rename = "pri.store.size")]
    pri_store_size: Option<String>,
}

impl CatIndexRow {
    fn into_summary(self) -> IndexSummary {
        IndexSummary {
            health: self
                .health
                .as_deref()
                .map(ClusterStatus::parse)
                .unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            name: self.index,
            primaries: cat_number(self.pri),
            replicas: cat_number(self.rep),
            docs_count: cat_number(self.docs_count),
            docs_deleted: cat_number(self.docs_deleted),
            store_size_bytes: cat_number(self.store_size),
            primary_store_size_bytes: cat_number(self.pri_store_size),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexStatsResponse {
    #[serde(default)]
    indices: HashMap<String, IndexStats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IndexStats {
    total: IndexTotals,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IndexTotals {
    indexing: IndexingStats,
    search: SearchStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const NODES_FIXTURE: &str = r#"{
        "_nodes": {"total": 1, "successful": 1, "failed": 0},
        "cluster_name": "prod",
        "nodes": {
            "aBcD": {
                "name": "data-1",
                "host": "10.0.0.5",
                "roles": ["data", "ingest"],
                "jvm": {
                    "mem": {"heap_used_in_bytes": 800, "heap_used_percent": 80, "heap_max_in_bytes": 1000},
                    "gc": {"collectors": {
                        "young": {"collection_count": 120, "collection_time_in_millis": 900},
                        "old": {"collection_count": 3, "collection_time_in_millis": 150}
                    }}
                },
                "os": {"cpu": {"percent": 42}, "mem": {"used_percent": 91}},
                "process": {"open_file_descriptors": 512, "max_file_descriptors": -1},
                "fs": {"total": {"total_in_bytes": 2000, "available_in_bytes": 500}},
                "indices": {
                    "docs": {"count": 10},
                    "store": {"size_in_bytes": 4096},
                    "indexing": {"index_total": 77},
                    "search": {"query_total": 33}
                }
            }
        }
    }"#;

    #[test]
    fn test_allow_list() {
        assert!(is_allowed("/"));
        assert!(is_allowed("/_cluster/health"));
        assert!(is_allowed("/_cluster/health?level=indices"));
        assert!(is_allowed(NODE_STATS_PATH));
        assert!(is_allowed(CAT_INDICES_PATH));
        assert!(is_allowed(INDEX_STATS_PATH));

        assert!(!is_allowed("/_bulk"));
        assert!(!is_allowed("/logs/_doc/1"));
        assert!(!is_allowed("/_cluster/settings"));
        assert!(!is_allowed("/_statsx"));
        assert!(!is_allowed("/_cat/indicesfoo"));
    }

    #[test]
    fn test_builder_defaults() {
        let adapter = ElasticsearchAdapter::builder().build().unwrap();
        assert_eq!(adapter.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(adapter.username, None);
        assert_eq!(user_agent(), format!("esmon/{} (read-only)", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_builder_custom() {
        let adapter = ElasticsearchAdapter::builder()
            .endpoint("https://es.internal:9243/")
            .credentials("elastic", "secret")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(adapter.endpoint(), "https://es.internal:9243");
        assert_eq!(adapter.username.as_deref(), Some("elastic"));
        assert_eq!(adapter.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_node_stats_decoding() {
        let stats: NodesResponse = serde_json::from_str(NODES_FIXTURE).unwrap();
        let (id, node) = stats.nodes.into_iter().next().unwrap();
        let node = node.into_summary(id);

        assert_eq!(node.id, "aBcD");
        assert_eq!(node.name, "data-1");
        assert_eq!(node.heap_used_percent, 80.0);
        assert_eq!(node.old_gc_count, 3);
        assert_eq!(node.young_gc_millis, 900);
        assert_eq!(node.memory_used_percent, 91.0);
        assert_eq!(node.max_file_descriptors, 0);
        assert_eq!(node.fd_used_percent(), None);
        assert_eq!(node.disk_used_percent(), Some(75.0));
        assert_eq!(node.index_total, 77);
        assert_eq!(node.query_total, 33);
    }

    #[test]
    fn test_health_decoding() {
        let json = r#"{
            "cluster_name": "prod", "status": "yellow", "timed_out": false,
            "number_of_nodes": 3, "number_of_data_nodes": 2,
            "active_primary_shards": 10, "active_shards": 15,
            "relocating_shards": 1, "initializing_shards": 0, "unassigned_shards": 5,
            "delayed_unassigned_shards": 0, "number_of_pending_tasks": 0,
            "number_of_in_flight_fetch": 0, "task_max_waiting_in_queue_millis": 0,
            "active_shards_percent_as_number": 75.0
        }"#;
        let health: ClusterHealth = serde_json::from_str::<HealthResponse>(json).unwrap().into();
        assert_eq!(health.status, ClusterStatus::Yellow);
        assert_eq!(health.unassigned_shards, 5);
        assert_eq!(health.active_shards_percent, 75.0);
    }

    #[test]
    fn test_cat_indices_decoding() {
        let json = r#"[
            {"health": "green", "status": "open", "index": "logs-2024", "uuid": "x",
             "pri": "1", "rep": "1", "docs.count": "1000", "docs.deleted": "2",
             "store.size": "20480", "pri.store.size": "10240"},
            {"health": "red", "status": "close", "index": "archive", "uuid": "y",
             "pri": "1", "rep": "0", "docs.count": null, "docs.deleted": null,
             "store.size": null, "pri.store.size": null}
        ]"#;
        let rows: Vec<CatIndexRow> = serde_json::from_str(json).unwrap();
        let mut indices: Vec<IndexSummary> = rows.into_iter().map(CatIndexRow::into_summary).collect();

        assert_eq!(indices[0].docs_count, 1000);
        assert_eq!(indices[0].store_size_bytes, 20480);
        assert_eq!(indices[1].health, ClusterStatus::Red);
        assert_eq!(indices[1].docs_count, 0);

        let mut stats = BTreeMap::new();
        stats.insert(
            "logs-2024".to_string(),
            SearchCounters {
                index_total: 500,
                query_total: 40,
            },
        );
        merge_index_stats(&mut indices, &stats);
        assert_eq!(indices[0].index_total, 500);
        assert_eq!(indices[1].index_total, 0);
    }

    #[tokio::test]
    async fn test_forbidden_path_sends_nothing() {
        let adapter = ElasticsearchAdapter::builder()
            .endpoint("http://127.0.0.1:9")
            .build()
            .unwrap();
        let err = adapter.get::<serde_json::Value>("/_bulk").await.unwrap_err();
        assert!(matches!(err, AdapterError::Forbidden(path) if path == "/_bulk"));
    }

    /// Serve one canned HTTP response and return the request line seen.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });
        (format!("http://{addr}"), task)
    }

    #[tokio::test]
    async fn test_health_request_against_local_server() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"cluster_name":"local","status":"green","number_of_nodes":1}"#,
        )
        .await;
        let adapter = ElasticsearchAdapter::builder()
            .endpoint(endpoint)
            .credentials("elastic", "secret")
            .build()
            .unwrap();

        let health = adapter.cluster_health().await.unwrap();
        assert_eq!(health.cluster_name, "local");
        assert_eq!(health.status, ClusterStatus::Green);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /_cluster/health HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: basic"));
        assert!(request.contains("(read-only)"));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth() {
        let (endpoint, server) = serve_once("401 Unauthorized", "{}").await;
        let adapter = ElasticsearchAdapter::builder().endpoint(endpoint).build().unwrap();

        let err = adapter.cluster_health().await.unwrap_err();
        assert!(matches!(err, AdapterError::Auth(_)));
        server.await.unwrap();
    }
}
