//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use esmon_types::Severity;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the last `width` sparkline levels, padded to `width`.
pub fn sparkline(levels: &[u8], width: usize) -> String {
    let start = levels.len().saturating_sub(width);
    let line: String = levels[start..]
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect();
    format!("{:<width$}", line, width = width)
}

/// Render the header bar with the overall health overview.
///
/// Displays: status indicator, cluster status, issue counts by severity, host.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" ESMON ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let counts = data.issue_counts();
    let dim = Style::default().add_modifier(Modifier::DIM);
    let count_span = |n: usize, style: Style| {
        if n > 0 {
            Span::styled(n.to_string(), style)
        } else {
            Span::styled("0", dim)
        }
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.overall_style(data.report.worst_severity())),
        Span::styled("ESMON ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
    ];

    match data.health() {
        Some(health) => {
            spans.push(Span::raw(format!("{} ", health.cluster_name)));
            spans.push(Span::styled(
                health.status.as_str().to_uppercase(),
                app.theme.cluster_status_style(health.status),
            ));
        }
        None if data.report.cluster_error.is_some() => {
            spans.push(Span::styled(
                "cluster unreachable",
                app.theme.severity_style(Severity::Warning),
            ));
        }
        None => spans.push(Span::styled("no cluster", dim)),
    }

    spans.push(Span::raw(" │ "));
    for (count, severity, label) in [
        (counts.critical, Severity::Critical, " crit "),
        (counts.warning, Severity::Warning, " warn "),
        (counts.info, Severity::Info, " info"),
    ] {
        spans.push(count_span(count, app.theme.severity_style(severity)));
        spans.push(Span::raw(label));
    }

    if let Some(host) = data.system().and_then(|s| s.hostname.as_deref()) {
        spans.push(Span::raw(format!(" │ {}", host)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view; the Issues tab carries its count.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let issue_count = app.data.as_ref().map_or(0, |d| d.issues().len());
    let titles: Vec<Line> = vec![
        Line::from(" 1:Host "),
        Line::from(" 2:Cluster "),
        Line::from(format!(" 3:Issues ({}) ", issue_count)),
    ];

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: section errors if any, source, report age, available controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref data) = app.data {
        let errors = data.section_errors();
        if !errors.is_empty() {
            let text = errors
                .iter()
                .map(|(section, err)| format!("{}: {}", section, err))
                .collect::<Vec<_>>()
                .join(" │ ");
            let paragraph = Paragraph::new(format!(" ! {} | r:refresh ?:help", text))
                .style(Style::default().fg(app.theme.warning));
            frame.render_widget(paragraph, area);
            return;
        }
    }

    let status = if let Some(ref data) = app.data {
        let controls = if app.filter_active {
            "Type to search | Enter:apply Esc:cancel"
        } else {
            match app.current_view {
                View::Host => "/:filter Tab:switch r:refresh e:export ?:help q:quit",
                View::Cluster => "/:filter s:sort S:reverse Enter:node ?:help q:quit",
                View::Issues => "/:filter Enter:suggestion e:export ?:help q:quit",
            }
        };

        format!(
            " {} | Updated {} ago | {}",
            app.source_description(),
            format_duration(data.report_age()),
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        format!(" {} | Loading... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(" Navigation", bold)]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2/3       Host / Cluster / Issues"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Issue or node detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(" Lists", bold)]),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle node sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(" General", bold)]),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export report to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 25u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_pads_and_truncates() {
        assert_eq!(sparkline(&[], 4), "    ");
        assert_eq!(sparkline(&[0, 7], 4), "▁█  ");
        assert_eq!(sparkline(&[0, 1, 2, 3, 9], 3), "▃▄█");
    }
}
