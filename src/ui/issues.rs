//! Issues view rendering.
//!
//! One row per health issue, in report order (most urgent first).

use esmon_types::MetricDimension;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::cluster::filter_info;
use crate::app::App;

/// Render the Issues view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let issues = app.visible_issues();
    let total = app.data.as_ref().map_or(0, |d| d.issues().len());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if total == 0 {
        let message = if app.data.is_some() {
            " No issues: everything is within thresholds"
        } else {
            " Waiting for first sample"
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(app.theme.healthy))
            .block(block.title(" Issues (0) "));
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Sev"),
        Cell::from("Component"),
        Cell::from("Subject"),
        Cell::from("Metric"),
        Cell::from("Value"),
        Cell::from("Limit"),
        Cell::from("Message"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = issues
        .iter()
        .map(|issue| {
            let unit = issue.dimension.unit();
            let (value, limit) = if issue.dimension == MetricDimension::ClusterStatus {
                (format!("{:.0} shards", issue.observed), "-".to_string())
            } else {
                (
                    format!("{:.1}{}", issue.observed, unit),
                    format!("{:.0}{}", issue.threshold, unit),
                )
            };
            Row::new(vec![
                Cell::from(issue.severity.symbol())
                    .style(app.theme.severity_style(issue.severity)),
                Cell::from(issue.component.as_str()),
                Cell::from(issue.subject.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(issue.dimension.label()),
                Cell::from(value),
                Cell::from(limit).style(Style::default().add_modifier(Modifier::DIM)),
                Cell::from(issue.message.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(9),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Fill(5),
    ];

    let selected = app.selected_issue_index.min(issues.len().saturating_sub(1));
    let position_info = if issues.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", selected + 1, issues.len())
    };
    let title = format!(
        " Issues ({}/{}){}{} [Enter:suggestion] ",
        issues.len(),
        total,
        filter_info(app),
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !issues.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
