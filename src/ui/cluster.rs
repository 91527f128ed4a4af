//! Cluster view rendering.
//!
//! Health summary on top, a sortable node table, then the index listing.

use std::cmp::Ordering;

use esmon_types::{MetricDimension, NodeSummary};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_bytes, format_count, format_per_sec, format_percent};

/// Column to sort the node table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSortColumn {
    #[default]
    Name,
    Heap,
    Cpu,
    Disk,
    OldGc,
    Indexing,
}

impl NodeSortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            NodeSortColumn::Name => NodeSortColumn::Heap,
            NodeSortColumn::Heap => NodeSortColumn::Cpu,
            NodeSortColumn::Cpu => NodeSortColumn::Disk,
            NodeSortColumn::Disk => NodeSortColumn::OldGc,
            NodeSortColumn::OldGc => NodeSortColumn::Indexing,
            NodeSortColumn::Indexing => NodeSortColumn::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeSortColumn::Name => "name",
            NodeSortColumn::Heap => "heap",
            NodeSortColumn::Cpu => "cpu",
            NodeSortColumn::Disk => "disk",
            NodeSortColumn::OldGc => "old gc",
            NodeSortColumn::Indexing => "indexing",
        }
    }
}

/// Sort nodes by the given column and direction, name breaking ties.
pub fn sort_nodes_by(nodes: &mut [&NodeSummary], column: NodeSortColumn, ascending: bool) {
    nodes.sort_by(|a, b| {
        let primary = match column {
            NodeSortColumn::Name => a.name.cmp(&b.name),
            NodeSortColumn::Heap => a.heap_used_percent.total_cmp(&b.heap_used_percent),
            NodeSortColumn::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            NodeSortColumn::Disk => cmp_option(a.disk_used_percent(), b.disk_used_percent()),
            NodeSortColumn::OldGc => a.old_gc_count.cmp(&b.old_gc_count),
            NodeSortColumn::Indexing => cmp_option(a.indexing_rate, b.indexing_rate),
        };

        let primary = if ascending { primary } else { primary.reverse() };

        if primary == Ordering::Equal {
            a.name.cmp(&b.name)
        } else {
            primary
        }
    });
}

fn cmp_option(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::NEG_INFINITY).total_cmp(&b.unwrap_or(f64::NEG_INFINITY))
}

/// Rows taken by the health banner above the node table.
pub const HEALTH_HEIGHT: u16 = 4;

/// Render the Cluster view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(HEALTH_HEIGHT),
        Constraint::Min(6),
        Constraint::Percentage(35),
    ])
    .split(area);

    render_health(frame, app, chunks[0]);
    render_nodes(frame, app, chunks[1]);
    render_indices(frame, app, chunks[2]);
}

fn block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_health(frame: &mut Frame, app: &App, area: Rect) {
    let data = app.data.as_ref();
    let lines = match data.and_then(|d| d.health()) {
        Some(health) => vec![
            Line::from(vec![
                Span::styled(
                    format!(" {} ", health.cluster_name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    health.status.as_str().to_uppercase(),
                    app.theme.cluster_status_style(health.status),
                ),
                Span::raw(format!(
                    "  │ {} nodes ({} data) │ {} pending tasks",
                    health.number_of_nodes, health.number_of_data_nodes, health.number_of_pending_tasks
                )),
            ]),
            Line::from(format!(
                " Shards: {} active ({} primary), {} relocating, {} initializing, {} unassigned │ {:.1}% active",
                health.active_shards,
                health.active_primary_shards,
                health.relocating_shards,
                health.initializing_shards,
                health.unassigned_shards,
                health.active_shards_percent
            )),
        ],
        None => {
            let reason = data
                .and_then(|d| d.report.cluster_error.as_deref())
                .unwrap_or("waiting for first sample");
            vec![Line::from(Span::styled(
                format!(" No cluster data: {}", reason),
                Style::default().add_modifier(Modifier::DIM),
            ))]
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block(app, " Cluster ".to_string())), area);
}

fn threshold_style(app: &App, dimension: MetricDimension, value: Option<f64>) -> Style {
    match (value, app.thresholds.get(dimension)) {
        (Some(v), Some(pair)) => app.theme.level_style(v, pair.warning, pair.critical),
        _ => Style::default(),
    }
}

fn render_nodes(frame: &mut Frame, app: &App, area: Rect) {
    let nodes = app.visible_nodes();
    let total = app.data.as_ref().map_or(0, |d| d.nodes().len());

    let header = Row::new(vec![
        Cell::from(format_header("Node", NodeSortColumn::Name, app)),
        Cell::from(format_header("Heap", NodeSortColumn::Heap, app)),
        Cell::from(format_header("CPU", NodeSortColumn::Cpu, app)),
        Cell::from(format_header("Disk", NodeSortColumn::Disk, app)),
        Cell::from("FDs"),
        Cell::from(format_header("Old GC", NodeSortColumn::OldGc, app)),
        Cell::from(format_header("Index", NodeSortColumn::Indexing, app)),
        Cell::from("Query"),
        Cell::from("Docs"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = nodes
        .iter()
        .map(|n| {
            let disk = n.disk_used_percent();
            let fds = n.fd_used_percent();
            Row::new(vec![
                Cell::from(n.name.clone()),
                Cell::from(format_percent(n.heap_used_percent)).style(threshold_style(
                    app,
                    MetricDimension::HeapPercent,
                    Some(n.heap_used_percent),
                )),
                Cell::from(format_percent(n.cpu_percent)).style(threshold_style(
                    app,
                    MetricDimension::CpuPercent,
                    Some(n.cpu_percent),
                )),
                Cell::from(disk.map(format_percent).unwrap_or_else(|| "-".to_string()))
                    .style(threshold_style(app, MetricDimension::DiskPercent, disk)),
                Cell::from(fds.map(format_percent).unwrap_or_else(|| "-".to_string())).style(
                    threshold_style(app, MetricDimension::FileDescriptorPercent, fds),
                ),
                Cell::from(format_count(n.old_gc_count)).style(threshold_style(
                    app,
                    MetricDimension::OldGcCount,
                    Some(n.old_gc_count as f64),
                )),
                Cell::from(format_per_sec(n.indexing_rate)),
                Cell::from(format_per_sec(n.query_rate)),
                Cell::from(format_count(n.docs_count)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let selected = app.selected_node_index.min(nodes.len().saturating_sub(1));
    let sort_dir = if app.node_sort_ascending { "↑" } else { "↓" };
    let filter_info = filter_info(app);
    let position_info = if nodes.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", selected + 1, nodes.len())
    };
    let error_info = app
        .data
        .as_ref()
        .and_then(|d| d.cluster())
        .and_then(|c| c.nodes_error.as_deref())
        .map(|e| format!(" ! {}", e))
        .unwrap_or_default();

    let title = format!(
        " Nodes ({}/{}) [s:sort {}{}]{}{}{} ",
        nodes.len(),
        total,
        app.node_sort_column.label(),
        sort_dir,
        filter_info,
        position_info,
        error_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block(app, title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !nodes.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_indices(frame: &mut Frame, app: &App, area: Rect) {
    let indices = app.visible_indices();

    let header = Row::new(vec![
        Cell::from("Index"),
        Cell::from("Health"),
        Cell::from("Status"),
        Cell::from("Pri/Rep"),
        Cell::from("Docs"),
        Cell::from("Size"),
        Cell::from("Index"),
        Cell::from("Query"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = indices
        .iter()
        .map(|i| {
            Row::new(vec![
                Cell::from(i.name.clone()),
                Cell::from(i.health.as_str()).style(app.theme.cluster_status_style(i.health)),
                Cell::from(i.status.clone()),
                Cell::from(format!("{}/{}", i.primaries, i.replicas)),
                Cell::from(format_count(i.docs_count)),
                Cell::from(format_bytes(i.store_size_bytes)),
                Cell::from(format_per_sec(i.indexing_rate)),
                Cell::from(format_per_sec(i.query_rate)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let error_info = app
        .data
        .as_ref()
        .and_then(|d| d.cluster())
        .and_then(|c| c.indices_error.as_deref())
        .map(|e| format!(" ! {}", e))
        .unwrap_or_default();
    let title = format!(" Indices ({}){} ", indices.len(), error_info);

    let table = Table::new(rows, widths).header(header).block(block(app, title));
    frame.render_widget(table, area);
}

fn format_header(name: &str, col: NodeSortColumn, app: &App) -> Span<'static> {
    if app.node_sort_column == col {
        let arrow = if app.node_sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

pub(crate) fn filter_info(app: &App) -> String {
    if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, heap: f64, indexing: Option<f64>) -> NodeSummary {
        NodeSummary {
            name: name.to_string(),
            heap_used_percent: heap,
            indexing_rate: indexing,
            ..Default::default()
        }
    }

    #[test]
    fn sort_cycle_returns_to_name() {
        let mut column = NodeSortColumn::Name;
        for _ in 0..6 {
            column = column.next();
        }
        assert_eq!(column, NodeSortColumn::Name);
    }

    #[test]
    fn heap_sort_descending_with_name_tiebreak() {
        let a = node("b", 50.0, None);
        let b = node("a", 50.0, None);
        let c = node("c", 90.0, None);
        let mut nodes = vec![&a, &b, &c];
        sort_nodes_by(&mut nodes, NodeSortColumn::Heap, false);
        let names: Vec<_> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn warming_rates_sort_lowest() {
        let a = node("a", 0.0, None);
        let b = node("b", 0.0, Some(0.0));
        let mut nodes = vec![&b, &a];
        sort_nodes_by(&mut nodes, NodeSortColumn::Indexing, true);
        assert_eq!(nodes[0].name, "a");
    }
}
