//! Layered configuration.
//!
//! Values come from, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `ESMON_*` environment variables, `__` between levels
//!    (`ESMON_SAMPLING__SYSTEM_INTERVAL=5s`)
//! 4. command-line flags, applied by the binary
//!
//! ```toml
//! [elasticsearch]
//! url = "https://es-01.internal:9200"
//! username = "monitor"
//! timeout = "5s"
//!
//! [sampling]
//! system_interval = "2s"
//! cluster_interval = "10s"
//!
//! [thresholds]
//! heap = { warning = 70, critical = 80 }
//!
//! [classifier]
//! extra_network_deny = ["wg"]
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use esmon_adapters::elasticsearch::DEFAULT_ENDPOINT;
use esmon_engine::{
    ResourceClassifier, SystemCollectorConfig, ThresholdPair, Thresholds, DEFAULT_DISK_CEILING,
    DEFAULT_NETWORK_CEILING, DEFAULT_SPIKE_FACTOR, DEFAULT_WINDOW, MAX_WINDOW, MIN_INTERVAL,
    MIN_WINDOW,
};
use esmon_types::MetricDimension;
use serde::Deserialize;

use crate::data::duration::parse_duration;

/// Port assumed when a bare host name is given.
pub const DEFAULT_PORT: u16 = 9200;

const ENV_PREFIX: &str = "ESMON";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub elasticsearch: ElasticsearchSettings,
    pub sampling: SamplingSettings,
    pub thresholds: ThresholdSettings,
    pub classifier: ClassifierSettings,
    pub smoothing: SmoothingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElasticsearchSettings {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-request HTTP timeout.
    pub timeout: String,
}

impl Default for ElasticsearchSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            username: None,
            password: None,
            timeout: "10s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    pub system_interval: String,
    pub cluster_interval: String,
    /// Spike filter window, clamped to 3..=60.
    pub history_size: usize,
    /// Upper bound on one whole cluster sample.
    pub request_deadline: String,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            system_interval: "2s".to_string(),
            cluster_interval: "2s".to_string(),
            history_size: DEFAULT_WINDOW,
            request_deadline: "10s".to_string(),
        }
    }
}

/// Overrides on top of the built-in threshold table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub heap: Option<ThresholdPair>,
    pub old_gc: Option<ThresholdPair>,
    pub disk: Option<ThresholdPair>,
    pub file_descriptors: Option<ThresholdPair>,
    pub cpu: Option<ThresholdPair>,
    pub memory: Option<ThresholdPair>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Interface name prefixes to exclude on top of the built-in list.
    pub extra_network_deny: Vec<String>,
    /// Block device name prefixes to exclude on top of the built-in list.
    pub extra_disk_deny: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    pub spike_factor: f64,
    /// Bytes per second.
    pub network_ceiling: f64,
    /// Bytes per second.
    pub disk_ceiling: f64,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            spike_factor: DEFAULT_SPIKE_FACTOR,
            network_ceiling: DEFAULT_NETWORK_CEILING,
            disk_ceiling: DEFAULT_DISK_CEILING,
        }
    }
}

/// Sampling durations after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub system_interval: Duration,
    pub cluster_interval: Duration,
    pub request_deadline: Duration,
    pub http_timeout: Duration,
}

impl Settings {
    /// Load defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let config = builder
            .add_source(env)
            .build()
            .context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Point at `HOST[:PORT]` or a full URL.
    pub fn set_target(&mut self, target: &str) {
        self.elasticsearch.url = endpoint_from_target(target);
    }

    /// Use one interval for both sampling families.
    pub fn set_interval(&mut self, interval: &str) {
        self.sampling.system_interval = interval.to_string();
        self.sampling.cluster_interval = interval.to_string();
    }

    pub fn timing(&self) -> Result<Timing> {
        let timing = Timing {
            system_interval: duration_setting("sampling.system_interval", &self.sampling.system_interval)?,
            cluster_interval: duration_setting("sampling.cluster_interval", &self.sampling.cluster_interval)?,
            request_deadline: duration_setting("sampling.request_deadline", &self.sampling.request_deadline)?,
            http_timeout: duration_setting("elasticsearch.timeout", &self.elasticsearch.timeout)?,
        };
        for (key, interval) in [
            ("sampling.system_interval", timing.system_interval),
            ("sampling.cluster_interval", timing.cluster_interval),
        ] {
            if interval < MIN_INTERVAL {
                bail!("{key} must be at least {}ms", MIN_INTERVAL.as_millis());
            }
        }
        if timing.request_deadline.is_zero() || timing.http_timeout.is_zero() {
            bail!("Timeouts must be greater than zero");
        }
        Ok(timing)
    }

    /// Built-in thresholds with configured overrides, validated.
    pub fn thresholds(&self) -> Result<Thresholds> {
        let overrides = [
            (MetricDimension::HeapPercent, self.thresholds.heap),
            (MetricDimension::OldGcCount, self.thresholds.old_gc),
            (MetricDimension::DiskPercent, self.thresholds.disk),
            (MetricDimension::FileDescriptorPercent, self.thresholds.file_descriptors),
            (MetricDimension::CpuPercent, self.thresholds.cpu),
            (MetricDimension::MemoryPercent, self.thresholds.memory),
        ];

        let mut thresholds = Thresholds::default();
        for (dimension, pair) in overrides {
            if let Some(pair) = pair {
                thresholds.set(dimension, pair);
            }
        }
        thresholds.validated().context("Invalid thresholds")
    }

    pub fn collector_config(&self) -> Result<SystemCollectorConfig> {
        let smoothing = &self.smoothing;
        if !smoothing.spike_factor.is_finite() || smoothing.spike_factor <= 1.0 {
            bail!("smoothing.spike_factor must be greater than 1");
        }
        for (key, ceiling) in [
            ("smoothing.network_ceiling", smoothing.network_ceiling),
            ("smoothing.disk_ceiling", smoothing.disk_ceiling),
        ] {
            if !ceiling.is_finite() || ceiling <= 0.0 {
                bail!("{key} must be a positive number of bytes per second");
            }
        }
        if !(MIN_WINDOW..=MAX_WINDOW).contains(&self.sampling.history_size) {
            tracing::warn!(
                history_size = self.sampling.history_size,
                "history size clamped to {MIN_WINDOW}..={MAX_WINDOW}"
            );
        }

        Ok(SystemCollectorConfig {
            history_size: self.sampling.history_size,
            spike_factor: smoothing.spike_factor,
            network_ceiling: smoothing.network_ceiling,
            disk_ceiling: smoothing.disk_ceiling,
            network_classifier: ResourceClassifier::network()
                .with_denied_prefixes(self.classifier.extra_network_deny.iter().cloned()),
            disk_classifier: ResourceClassifier::disk()
                .with_denied_prefixes(self.classifier.extra_disk_deny.iter().cloned()),
        })
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("classifier.extra_network_deny")
        .with_list_parse_key("classifier.extra_disk_deny")
        .try_parsing(true)
}

fn duration_setting(key: &str, value: &str) -> Result<Duration> {
    parse_duration(value).with_context(|| format!("{key}: invalid duration {value:?}"))
}

/// Turn `HOST`, `HOST:PORT` or a URL into an endpoint URL.
pub fn endpoint_from_target(target: &str) -> String {
    let target = target.trim().trim_end_matches('/');
    if target.contains("://") {
        return target.to_string();
    }
    let has_port = match target.rsplit_once(':') {
        // A bracketed IPv6 literal only has a port after the closing bracket
        Some((host, port)) => {
            port.parse::<u16>().is_ok() && (!host.contains(':') || host.ends_with(']'))
        }
        None => false,
    };
    if has_port {
        format!("http://{target}")
    } else {
        format!("http://{target}:{DEFAULT_PORT}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn defaults_without_sources() {
        let settings = Settings::load_with_env(None, env(&[])).unwrap();
        assert_eq!(settings.elasticsearch.url, DEFAULT_ENDPOINT);
        assert_eq!(settings.sampling.history_size, DEFAULT_WINDOW);

        let timing = settings.timing().unwrap();
        assert_eq!(timing.system_interval, Duration::from_secs(2));
        assert_eq!(timing.request_deadline, Duration::from_secs(10));
        assert_eq!(settings.thresholds().unwrap(), Thresholds::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = toml(
            r#"
            [elasticsearch]
            url = "https://es-01:9200"
            username = "monitor"

            [sampling]
            cluster_interval = "15s"

            [thresholds]
            heap = { warning = 70, critical = 80 }
            "#,
        );
        let settings = Settings::load_with_env(Some(file.path()), env(&[])).unwrap();
        assert_eq!(settings.elasticsearch.url, "https://es-01:9200");
        assert_eq!(settings.elasticsearch.username.as_deref(), Some("monitor"));
        assert_eq!(
            settings.timing().unwrap().cluster_interval,
            Duration::from_secs(15)
        );

        let thresholds = settings.thresholds().unwrap();
        assert_eq!(
            thresholds.get(MetricDimension::HeapPercent),
            Some(ThresholdPair::new(70.0, 80.0))
        );
        assert_eq!(
            thresholds.get(MetricDimension::CpuPercent),
            Some(ThresholdPair::new(60.0, 80.0))
        );
    }

    #[test]
    fn environment_overrides_file() {
        let file = toml("[sampling]\nsystem_interval = \"5s\"\n");
        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[
                ("ESMON_SAMPLING__SYSTEM_INTERVAL", "1m"),
                ("ESMON_CLASSIFIER__EXTRA_NETWORK_DENY", "wg,zt"),
            ]),
        )
        .unwrap();

        assert_eq!(
            settings.timing().unwrap().system_interval,
            Duration::from_secs(60)
        );
        assert_eq!(settings.classifier.extra_network_deny, vec!["wg", "zt"]);

        let collector = settings.collector_config().unwrap();
        assert!(!collector.network_classifier.is_countable("wg0"));
        assert!(collector.network_classifier.is_countable("eth0"));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let file = toml("[thresholds]\ndisk = { warning = 95, critical = 90 }\n");
        let settings = Settings::load_with_env(Some(file.path()), env(&[])).unwrap();
        let err = settings.thresholds().unwrap_err();
        assert!(format!("{:#}", err).contains("below critical"));
    }

    #[test]
    fn bad_durations_are_rejected() {
        let mut settings = Settings::default();
        settings.set_interval("fast");
        assert!(settings.timing().is_err());

        settings.set_interval("10ms");
        assert!(settings.timing().is_err());

        settings.set_interval("500ms");
        assert_eq!(
            settings.timing().unwrap().cluster_interval,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn spike_factor_must_exceed_one() {
        let mut settings = Settings::default();
        settings.smoothing.spike_factor = 1.0;
        assert!(settings.collector_config().is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let path = Path::new("/nonexistent/esmon.toml");
        assert!(Settings::load_with_env(Some(path), env(&[])).is_err());
    }

    #[test]
    fn targets_become_urls() {
        assert_eq!(endpoint_from_target("es-01"), "http://es-01:9200");
        assert_eq!(endpoint_from_target("es-01:9201"), "http://es-01:9201");
        assert_eq!(
            endpoint_from_target("https://es.example.com/"),
            "https://es.example.com"
        );
        assert_eq!(endpoint_from_target("[::1]:9200"), "http://[::1]:9200");
        assert_eq!(endpoint_from_target("[::1]"), "http://[::1]:9200");
    }
}
