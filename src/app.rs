//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use esmon_engine::Thresholds;
use esmon_types::{HealthIssue, IndexSummary, NodeSummary};

use crate::data::{History, MonitorData};
use crate::source::{write_report, DataSource};
use crate::ui::cluster::{sort_nodes_by, NodeSortColumn};
use crate::ui::Theme;

/// Where `e` writes the current report.
pub const DEFAULT_EXPORT_PATH: &str = "esmon_export.json";

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Issue and node detail are shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as separate views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// CPU, memory, network and disk of the local host.
    Host,
    /// Cluster health, nodes and indices.
    Cluster,
    /// Every current health issue, most urgent first.
    Issues,
}

impl View {
    pub const ALL: [View; 3] = [View::Host, View::Cluster, View::Issues];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Host => View::Cluster,
            View::Cluster => View::Issues,
            View::Issues => View::Host,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Host => View::Issues,
            View::Cluster => View::Host,
            View::Issues => View::Cluster,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Host => "Host",
            View::Cluster => "Cluster",
            View::Issues => "Issues",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Host => 0,
            View::Cluster => 1,
            View::Issues => 2,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<MonitorData>,
    pub history: History,
    pub load_error: Option<String>,
    pub thresholds: Thresholds,

    // Navigation state
    pub selected_node_index: usize,
    pub selected_issue_index: usize,

    // Sorting (Cluster view)
    pub node_sort_column: NodeSortColumn,
    pub node_sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App, detecting the terminal theme.
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds) -> Self {
        Self::with_theme(source, thresholds, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn DataSource>, thresholds: Thresholds, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Host,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            history: History::new(),
            load_error: None,
            thresholds,
            selected_node_index: 0,
            selected_issue_index: 0,
            node_sort_column: NodeSortColumn::default(),
            node_sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for a new report.
    ///
    /// Returns true if new data was received.
    pub fn reload_data(&mut self) -> bool {
        let Some(report) = self.source.poll() else {
            self.load_error = self.source.error().map(str::to_string);
            return false;
        };

        let data = MonitorData::from_report(report);
        self.history.record(&data);
        self.data = Some(data);
        self.load_error = None;
        self.clamp_selection();
        true
    }

    /// Re-read the current report even if it has not changed.
    pub fn refresh(&mut self) {
        self.source.force_refresh();
        if self.reload_data() {
            self.set_status_message("Refreshed".to_string());
        } else if let Some(err) = self.load_error.clone() {
            self.set_status_message(format!("Refresh failed: {}", err));
        }
    }

    fn clamp_selection(&mut self) {
        let nodes = self.visible_nodes().len();
        let issues = self.visible_issues().len();
        self.selected_node_index = self.selected_node_index.min(nodes.saturating_sub(1));
        self.selected_issue_index = self.selected_issue_index.min(issues.saturating_sub(1));
    }

    /// Switch to the next view (cycles through Host → Cluster → Issues).
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_detail_overlay = false;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Host => {}
            View::Cluster => {
                let max = self.visible_nodes().len().saturating_sub(1);
                self.selected_node_index = (self.selected_node_index + n).min(max);
            }
            View::Issues => {
                let max = self.visible_issues().len().saturating_sub(1);
                self.selected_issue_index = (self.selected_issue_index + n).min(max);
            }
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Host => {}
            View::Cluster => {
                self.selected_node_index = self.selected_node_index.saturating_sub(n);
            }
            View::Issues => {
                self.selected_issue_index = self.selected_issue_index.saturating_sub(n);
            }
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        match self.current_view {
            View::Host => {}
            View::Cluster => self.selected_node_index = 0,
            View::Issues => self.selected_issue_index = 0,
        }
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        match self.current_view {
            View::Host => {}
            View::Cluster => {
                self.selected_node_index = self.visible_nodes().len().saturating_sub(1);
            }
            View::Issues => {
                self.selected_issue_index = self.visible_issues().len().saturating_sub(1);
            }
        }
    }

    /// Select a row by its visual position, if it exists.
    pub fn select_row(&mut self, row: usize) {
        match self.current_view {
            View::Host => {}
            View::Cluster => {
                if row < self.visible_nodes().len() {
                    self.selected_node_index = row;
                }
            }
            View::Issues => {
                if row < self.visible_issues().len() {
                    self.selected_issue_index = row;
                }
            }
        }
    }

    /// Nodes after filtering and sorting, in display order.
    pub fn visible_nodes(&self) -> Vec<&NodeSummary> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut nodes: Vec<&NodeSummary> = data
            .nodes()
            .iter()
            .filter(|n| self.matches_filter(&n.name) || self.matches_filter(&n.host))
            .collect();
        sort_nodes_by(&mut nodes, self.node_sort_column, self.node_sort_ascending);
        nodes
    }

    /// Indices after filtering, in report order.
    pub fn visible_indices(&self) -> Vec<&IndexSummary> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        data.indices()
            .iter()
            .filter(|i| self.matches_filter(&i.name))
            .collect()
    }

    /// Issues after filtering, in report order.
    pub fn visible_issues(&self) -> Vec<&HealthIssue> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        data.issues()
            .iter()
            .filter(|issue| self.issue_matches_filter(issue))
            .collect()
    }

    pub fn selected_node(&self) -> Option<&NodeSummary> {
        self.visible_nodes().get(self.selected_node_index).copied()
    }

    pub fn selected_issue(&self) -> Option<&HealthIssue> {
        self.visible_issues().get(self.selected_issue_index).copied()
    }

    /// Open the detail overlay for the current selection.
    pub fn enter_detail(&mut self) {
        let has_selection = match self.current_view {
            View::Host => false,
            View::Cluster => self.selected_node().is_some(),
            View::Issues => self.selected_issue().is_some(),
        };
        if has_selection {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then clear the filter, then go to Host.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if !self.filter_text.is_empty() {
            self.clear_filter();
        } else {
            self.current_view = View::Host;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next node sort column.
    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Cluster {
            self.node_sort_column = self.node_sort_column.next();
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Cluster {
            self.node_sort_ascending = !self.node_sort_ascending;
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_node_index = 0;
        self.selected_issue_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    fn issue_matches_filter(&self, issue: &HealthIssue) -> bool {
        self.matches_filter(issue.subject.as_deref().unwrap_or_default())
            || self.matches_filter(&issue.message)
            || self.matches_filter(issue.dimension.label())
            || self.matches_filter(issue.component.as_str())
            || self.matches_filter(issue.severity.as_str())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current report to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        write_report(path, &data.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esmon_types::{
        ClusterMetrics, Component, MetricDimension, MetricsReport, Severity,
    };
    use tempfile::tempdir;

    use crate::source::read_report;

    #[derive(Debug, Default)]
    struct Queue {
        reports: Vec<MetricsReport>,
    }

    impl DataSource for Queue {
        fn poll(&mut self) -> Option<MetricsReport> {
            if self.reports.is_empty() {
                None
            } else {
                Some(self.reports.remove(0))
            }
        }

        fn description(&self) -> &str {
            "queue"
        }

        fn error(&self) -> Option<&str> {
            None
        }
    }

    fn node(name: &str, heap: f64) -> NodeSummary {
        NodeSummary {
            id: name.to_string(),
            name: name.to_string(),
            heap_used_percent: heap,
            ..Default::default()
        }
    }

    fn issue(severity: Severity, subject: &str) -> HealthIssue {
        HealthIssue {
            severity,
            component: Component::Node,
            dimension: MetricDimension::HeapPercent,
            subject: Some(subject.to_string()),
            message: format!("{subject} heap is high"),
            observed: 90.0,
            threshold: 85.0,
            suggestion: String::new(),
            timestamp_ms: 0,
        }
    }

    fn report(ts: u64) -> MetricsReport {
        let mut report = MetricsReport::empty(ts);
        report.cluster = Some(ClusterMetrics {
            nodes: vec![node("data-2", 40.0), node("data-1", 90.0), node("master-1", 20.0)],
            ..Default::default()
        });
        report.issues = vec![issue(Severity::Critical, "data-1"), issue(Severity::Warning, "data-3")];
        report
    }

    fn app_with(reports: Vec<MetricsReport>) -> App {
        App::with_theme(
            Box::new(Queue { reports }),
            Thresholds::default(),
            Theme::dark(),
        )
    }

    #[test]
    fn view_cycle_round_trips() {
        for view in View::ALL {
            assert_eq!(view.next().prev(), view);
        }
        assert_eq!(View::Issues.next(), View::Host);
    }

    #[test]
    fn reload_reports_whether_data_changed() {
        let mut app = app_with(vec![report(1)]);
        assert!(app.reload_data());
        assert!(!app.reload_data());
        assert!(app.data.is_some());
    }

    #[test]
    fn nodes_are_sorted_and_filtered() {
        let mut app = app_with(vec![report(1)]);
        app.reload_data();

        let names: Vec<_> = app.visible_nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["data-1", "data-2", "master-1"]);

        app.filter_text = "DATA".to_string();
        assert_eq!(app.visible_nodes().len(), 2);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = app_with(vec![report(1)]);
        app.reload_data();
        app.set_view(View::Issues);

        app.select_next_n(10);
        assert_eq!(app.selected_issue_index, 1);
        app.select_prev_n(10);
        assert_eq!(app.selected_issue_index, 0);

        app.select_last();
        assert_eq!(app.selected_issue().unwrap().subject.as_deref(), Some("data-3"));
    }

    #[test]
    fn detail_needs_a_selection() {
        let mut app = app_with(Vec::new());
        app.set_view(View::Issues);
        app.enter_detail();
        assert!(!app.show_detail_overlay);

        let mut app = app_with(vec![report(1)]);
        app.reload_data();
        app.set_view(View::Issues);
        app.enter_detail();
        assert!(app.show_detail_overlay);

        app.go_back();
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_view, View::Issues);
        app.go_back();
        assert_eq!(app.current_view, View::Host);
    }

    #[test]
    fn issue_filter_matches_subject_and_severity() {
        let mut app = app_with(vec![report(1)]);
        app.reload_data();

        app.filter_text = "critical".to_string();
        assert_eq!(app.visible_issues().len(), 1);
        app.filter_text = "data-3".to_string();
        assert_eq!(app.visible_issues().len(), 1);
        app.filter_text = "nothing".to_string();
        assert!(app.visible_issues().is_empty());
    }

    #[test]
    fn export_writes_current_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.json");

        let app = app_with(Vec::new());
        assert!(app.export_state(&path).is_err());

        let mut app = app_with(vec![report(7)]);
        app.reload_data();
        app.export_state(&path).unwrap();
        assert_eq!(read_report(&path).unwrap(), report(7));
    }
}
