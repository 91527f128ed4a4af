//! Host view rendering.
//!
//! CPU and memory on top, smoothed throughput with sparklines below, then
//! per-interface, per-device and per-filesystem tables.

use esmon_types::{MetricDimension, SystemMetrics};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::common::sparkline;
use crate::app::App;
use crate::data::format::{format_bytes, format_percent, format_rate};
use crate::data::history;

const SPARKLINE_WIDTH: usize = 20;

/// Render the Host view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(system) = app.data.as_ref().and_then(|d| d.system()) else {
        let reason = app
            .data
            .as_ref()
            .and_then(|d| d.report.system_error.as_deref())
            .unwrap_or("waiting for first sample");
        let paragraph = Paragraph::new(format!(" No host data: {}", reason))
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block(app, " Host ".to_string()));
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Min(5),
    ])
    .split(area);

    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);
    render_cpu(frame, app, system, top[0]);
    render_memory(frame, app, system, top[1]);
    render_throughput(frame, app, system, chunks[1]);

    let bottom = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_interfaces(frame, app, system, bottom[0]);

    let right = Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(bottom[1]);
    render_devices(frame, app, system, right[0]);
    render_partitions(frame, app, system, right[1]);
}

fn block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn level(app: &App, dimension: MetricDimension, value: f64) -> Style {
    app.thresholds
        .get(dimension)
        .map(|pair| app.theme.level_style(value, pair.warning, pair.critical))
        .unwrap_or_default()
}

fn render_cpu(frame: &mut Frame, app: &App, system: &SystemMetrics, area: Rect) {
    let cpu = &system.cpu;
    let cores = match cpu.physical_cores {
        Some(physical) => format!("{} logical, {} physical", cpu.logical_cores, physical),
        None => format!("{} logical", cpu.logical_cores),
    };
    let load = cpu
        .load_average
        .map(|l| format!("{:.2} {:.2} {:.2}", l.one, l.five, l.fifteen))
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(vec![
            Span::raw(" Usage "),
            Span::styled(
                format_percent(cpu.usage_percent),
                level(app, MetricDimension::CpuPercent, cpu.usage_percent),
            ),
            Span::raw("  "),
            Span::styled(
                sparkline(&app.history.sparkline(history::CPU), SPARKLINE_WIDTH),
                Style::default().fg(app.theme.highlight),
            ),
        ]),
        Line::from(format!(" Cores {}", cores)),
        Line::from(format!(" Load  {}", load)),
    ];

    let title = match system.hostname.as_deref() {
        Some(host) => format!(" CPU · {} ", host),
        None => " CPU ".to_string(),
    };
    frame.render_widget(Paragraph::new(lines).block(block(app, title)), area);
}

fn render_memory(frame: &mut Frame, app: &App, system: &SystemMetrics, area: Rect) {
    let memory = &system.memory;
    let used = memory.used_percent();

    let lines = vec![
        Line::from(vec![
            Span::raw(" Used  "),
            Span::styled(format_percent(used), level(app, MetricDimension::MemoryPercent, used)),
            Span::raw(format!(
                " ({} / {})  ",
                format_bytes(memory.used_bytes),
                format_bytes(memory.total_bytes)
            )),
            Span::styled(
                sparkline(&app.history.sparkline(history::MEMORY), SPARKLINE_WIDTH),
                Style::default().fg(app.theme.highlight),
            ),
        ]),
        Line::from(format!(
            " Avail {}   Free {}",
            format_bytes(memory.available_bytes),
            format_bytes(memory.free_bytes)
        )),
        Line::from(format!(
            " Swap  {} / {} ({})",
            format_bytes(memory.swap_used_bytes),
            format_bytes(memory.swap_total_bytes),
            format_percent(memory.swap_used_percent())
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block(app, " Memory ".to_string())), area);
}

fn render_throughput(frame: &mut Frame, app: &App, system: &SystemMetrics, area: Rect) {
    let net = &system.network;
    let disk = &system.disk;
    let spark = |key: &str| sparkline(&app.history.sparkline(key), SPARKLINE_WIDTH);
    let accent = Style::default().fg(app.theme.highlight);

    let net_line = if net.warming_up {
        Line::from(" Net   warming up")
    } else {
        Line::from(vec![
            Span::raw(format!(" Net   ↓ {:>12} ", format_rate(net.rates.bytes_recv))),
            Span::styled(spark(history::NET_RECV), accent),
            Span::raw(format!("  ↑ {:>12} ", format_rate(net.rates.bytes_sent))),
            Span::styled(spark(history::NET_SENT), accent),
            Span::raw(format!(
                "  err {:.1}/s drop {:.1}/s",
                net.rates.errors, net.rates.drops
            )),
        ])
    };

    let disk_line = if disk.warming_up {
        Line::from(" Disk  warming up")
    } else {
        Line::from(vec![
            Span::raw(format!(" Disk  R {:>12} ", format_rate(disk.rates.read_bytes))),
            Span::styled(spark(history::DISK_READ), accent),
            Span::raw(format!("  W {:>12} ", format_rate(disk.rates.write_bytes))),
            Span::styled(spark(history::DISK_WRITE), accent),
            Span::raw(format!(
                "  util {}  {:.0} IOPS",
                format_percent(disk.rates.io_util_percent),
                disk.rates.read_ops + disk.rates.write_ops
            )),
        ])
    };

    frame.render_widget(
        Paragraph::new(vec![net_line, disk_line]).block(block(app, " Throughput ".to_string())),
        area,
    );
}

fn render_interfaces(frame: &mut Frame, app: &App, system: &SystemMetrics, area: Rect) {
    let interfaces: Vec<_> = system
        .network
        .interfaces
        .iter()
        .filter(|i| app.matches_filter(&i.name))
        .collect();

    let rows: Vec<Row> = interfaces
        .iter()
        .map(|i| {
            let style = if i.physical {
                Style::default()
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            let (recv, sent) = match i.rates {
                Some(r) => (format_rate(r.bytes_recv), format_rate(r.bytes_sent)),
                None => ("-".to_string(), "-".to_string()),
            };
            Row::new(vec![
                Cell::from(i.name.clone()),
                Cell::from(recv),
                Cell::from(sent),
                Cell::from(format_bytes(i.total_bytes_recv)),
                Cell::from(format_bytes(i.total_bytes_sent)),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec!["Interface", "Recv", "Sent", "Total in", "Total out"])
        .style(app.theme.header);
    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
    ];
    let title = format!(" Interfaces ({}) ", interfaces.len());
    frame.render_widget(
        Table::new(rows, widths).header(header).block(block(app, title)),
        area,
    );
}

fn render_devices(frame: &mut Frame, app: &App, system: &SystemMetrics, area: Rect) {
    let rows: Vec<Row> = system
        .disk
        .devices
        .iter()
        .filter(|d| app.matches_filter(&d.name))
        .map(|d| match d.rates {
            Some(r) => Row::new(vec![
                d.name.clone(),
                format_rate(r.read_bytes),
                format_rate(r.write_bytes),
                format!("{:.0}", r.read_ops + r.write_ops),
                format_percent(r.io_util_percent),
            ]),
            None => Row::new(vec![
                d.name.clone(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
            ]),
        })
        .collect();

    let header = Row::new(vec!["Device", "Read", "Write", "IOPS", "Util"]).style(app.theme.header);
    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];
    frame.render_widget(
        Table::new(rows, widths)
            .header(header)
            .block(block(app, " Devices ".to_string())),
        area,
    );
}

fn render_partitions(frame: &mut Frame, app: &App, system: &SystemMetrics, area: Rect) {
    let rows: Vec<Row> = system
        .disk
        .partitions
        .iter()
        .filter(|p| app.matches_filter(&p.mount_point) || app.matches_filter(&p.device))
        .map(|p| {
            let used = p.used_percent();
            Row::new(vec![
                Cell::from(p.mount_point.clone()),
                Cell::from(p.file_system.clone()),
                Cell::from(format_bytes(p.total_bytes)),
                Cell::from(format_bytes(p.available_bytes)),
                Cell::from(format_percent(used))
                    .style(level(app, MetricDimension::DiskPercent, used)),
            ])
        })
        .collect();

    let header =
        Row::new(vec!["Mount", "FS", "Size", "Avail", "Used"]).style(app.theme.header);
    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];
    frame.render_widget(
        Table::new(rows, widths)
            .header(header)
            .block(block(app, " Filesystems ".to_string())),
        area,
    );
}
