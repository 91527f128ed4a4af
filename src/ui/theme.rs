//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use esmon_types::{ClusterStatus, Severity};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    pub info: Color,
    pub warning: Color,
    pub critical: Color,
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            info: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            info: Color::Magenta,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for an issue severity.
    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Info => Style::default().fg(self.info),
            Severity::Warning => Style::default().fg(self.warning),
            Severity::Critical => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for the worst severity present; healthy when there is none.
    pub fn overall_style(&self, worst: Option<Severity>) -> Style {
        match worst {
            Some(severity) => self.severity_style(severity),
            None => Style::default().fg(self.healthy),
        }
    }

    pub fn cluster_status_style(&self, status: ClusterStatus) -> Style {
        match status {
            ClusterStatus::Green => Style::default().fg(self.healthy),
            ClusterStatus::Yellow => Style::default().fg(self.warning),
            ClusterStatus::Red => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
            ClusterStatus::Unknown => Style::default().add_modifier(Modifier::DIM),
        }
    }

    /// Style for a utilisation percentage against warning/critical bounds.
    pub fn level_style(&self, value: f64, warning: f64, critical: f64) -> Style {
        if value >= critical {
            self.severity_style(Severity::Critical)
        } else if value >= warning {
            self.severity_style(Severity::Warning)
        } else {
            Style::default()
        }
    }
}
