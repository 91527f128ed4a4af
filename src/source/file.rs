//! File-based data source for replaying an exported report.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use esmon_types::MetricsReport;

use super::DataSource;

/// A data source that reads a [`MetricsReport`] from a JSON file.
///
/// The source tracks the file's modification time and only returns new
/// data when the file has been updated, so a report that is re-exported
/// while a replay session is open shows up without restarting.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("replay: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<MetricsReport> {
        match read_report(&self.path) {
            Ok(report) => {
                self.last_error = None;
                Some(report)
            }
            Err(e) => {
                self.last_error = Some(format!("{:#}", e));
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<MetricsReport> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, keep what we have
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(report) = self.read_file() {
                self.last_modified = current_modified;
                return Some(report);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn force_refresh(&mut self) {
        self.last_modified = None;
    }
}

/// Read and version-check an exported report.
pub fn read_report(path: &Path) -> Result<MetricsReport> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Read error: {}", path.display()))?;
    let report: MetricsReport = serde_json::from_str(&content).context("Parse error")?;
    if !report.version.is_compatible() {
        anyhow::bail!(
            "Incompatible report schema {} (this build reads {}.x)",
            report.version,
            esmon_types::SCHEMA_VERSION
        );
    }
    Ok(report)
}

/// Write a report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &MetricsReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    let mut file = fs::File::create(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}
