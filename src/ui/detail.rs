//! Detail overlay rendering.
//!
//! On the Issues view the overlay explains the selected issue and what to
//! do about it; on the Cluster view it shows everything known about the
//! selected node.

use esmon_types::{HealthIssue, MetricDimension, NodeSummary};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::common::sparkline;
use crate::app::{App, View};
use crate::data::format::{format_bytes, format_count, format_per_sec, format_percent};
use crate::data::history;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Render the detail for the current selection as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let (title, lines) = match app.current_view {
        View::Issues => match app.selected_issue() {
            Some(issue) => (" Issue Detail ", issue_lines(app, issue)),
            None => return,
        },
        View::Cluster => match app.selected_node() {
            Some(node) => (" Node Detail ", node_lines(app, node)),
            None => return,
        },
        View::Host => return,
    };

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 100);
    let overlay_height = (lines.len() as u16 + 3).clamp(MIN_OVERLAY_HEIGHT, area.height);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    let block = Block::default()
        .title(title)
        .title_bottom(" Esc:close ↑↓:next ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Clear, overlay_area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        overlay_area,
    );
}

fn label(text: &str) -> Span<'static> {
    Span::styled(format!(" {:<14}", text), Style::default().add_modifier(Modifier::DIM))
}

fn issue_lines(app: &App, issue: &HealthIssue) -> Vec<Line<'static>> {
    let unit = issue.dimension.unit();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", issue.severity.as_str().to_uppercase()),
                app.theme.severity_style(issue.severity).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                issue.dimension.label().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![label("Component"), Span::raw(issue.component.as_str().to_string())]),
        Line::from(vec![
            label("Subject"),
            Span::raw(issue.subject.clone().unwrap_or_else(|| "host".to_string())),
        ]),
    ];

    if issue.dimension != MetricDimension::ClusterStatus {
        lines.push(Line::from(vec![
            label("Observed"),
            Span::raw(format!("{:.1}{}", issue.observed, unit)),
        ]));
        lines.push(Line::from(vec![
            label("Threshold"),
            Span::raw(format!("{:.0}{}", issue.threshold, unit)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![label("Message"), Span::raw(issue.message.clone())]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Suggestion",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!(" {}", issue.suggestion)));
    lines
}

fn node_lines(app: &App, node: &NodeSummary) -> Vec<Line<'static>> {
    let optional_percent =
        |value: Option<f64>| value.map(format_percent).unwrap_or_else(|| "-".to_string());
    let heap_spark = sparkline(&app.history.sparkline(&history::node_heap(&node.name)), 30);

    vec![
        Line::from(Span::styled(
            format!(" {} ", node.name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![label("Host"), Span::raw(node.host.clone())]),
        Line::from(vec![label("Roles"), Span::raw(node.roles.join(", "))]),
        Line::from(vec![label("Id"), Span::raw(node.id.clone())]),
        Line::from(""),
        Line::from(vec![
            label("Heap"),
            Span::raw(format!(
                "{} ({} / {})  ",
                format_percent(node.heap_used_percent),
                format_bytes(node.heap_used_bytes),
                format_bytes(node.heap_max_bytes)
            )),
            Span::styled(heap_spark, Style::default().fg(app.theme.highlight)),
        ]),
        Line::from(vec![
            label("GC young"),
            Span::raw(format!(
                "{} collections, {} ms",
                format_count(node.young_gc_count),
                format_count(node.young_gc_millis)
            )),
        ]),
        Line::from(vec![
            label("GC old"),
            Span::raw(format!(
                "{} collections, {} ms",
                format_count(node.old_gc_count),
                format_count(node.old_gc_millis)
            )),
        ]),
        Line::from(vec![
            label("CPU / memory"),
            Span::raw(format!(
                "{} / {}",
                format_percent(node.cpu_percent),
                format_percent(node.memory_used_percent)
            )),
        ]),
        Line::from(vec![
            label("Disk"),
            Span::raw(format!(
                "{} ({} free of {})",
                optional_percent(node.disk_used_percent()),
                format_bytes(node.fs_available_bytes),
                format_bytes(node.fs_total_bytes)
            )),
        ]),
        Line::from(vec![
            label("File descr."),
            Span::raw(format!(
                "{} ({} / {})",
                optional_percent(node.fd_used_percent()),
                node.open_file_descriptors,
                node.max_file_descriptors
            )),
        ]),
        Line::from(""),
        Line::from(vec![
            label("Documents"),
            Span::raw(format!(
                "{} in {}",
                format_count(node.docs_count),
                format_bytes(node.store_size_bytes)
            )),
        ]),
        Line::from(vec![
            label("Indexing"),
            Span::raw(format_per_sec(node.indexing_rate)),
        ]),
        Line::from(vec![label("Search"), Span::raw(format_per_sec(node.query_rate))]),
    ]
}
