use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};
use crate::ui::cluster::HEALTH_HEIGHT;

/// Rows a table block spends on its top border and header line.
const TABLE_CHROME: u16 = 2;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Overlay keys: close, or step through the list underneath
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Host),
        KeyCode::Char('2') => app.set_view(View::Cluster),
        KeyCode::Char('3') => app.set_view(View::Issues),

        // Up/down for rows, left/right for tabs
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),

        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => app.refresh(),

        KeyCode::Char('?') => app.toggle_help(),

        // Sorting only applies to the node table
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),

        KeyCode::Char('/') => app.start_filter(),

        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = app.export_path.clone();
            match app.export_state(&export_path) {
                Ok(()) => {
                    tracing::info!(path = %export_path.display(), "exported report");
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "export failed");
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Keep text but exit input mode
        KeyCode::Esc => {
            app.cancel_filter();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
///
/// `content_start_row` is the first terminal row below the tab bar.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            let first_row = match app.current_view {
                View::Host => None,
                View::Cluster => Some(content_start_row + HEALTH_HEIGHT + TABLE_CHROME),
                View::Issues => Some(content_start_row + TABLE_CHROME),
            };
            if let Some(first_row) = first_row {
                if clicked_row >= first_row {
                    app.select_row((clicked_row - first_row) as usize);
                }
            }

            // Tab bar sits on row 1: " 1:Host " | " 2:Cluster " | " 3:Issues (n) "
            if clicked_row == 1 {
                let col = mouse.column;
                if col < 10 {
                    app.set_view(View::Host);
                } else if col < 24 {
                    app.set_view(View::Cluster);
                } else if col < 44 {
                    app.set_view(View::Issues);
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use esmon_engine::Thresholds;
    use esmon_types::{Component, HealthIssue, MetricDimension, MetricsReport, Severity};

    use crate::source::DataSource;
    use crate::ui::Theme;

    #[derive(Debug)]
    struct Once(Option<MetricsReport>);

    impl DataSource for Once {
        fn poll(&mut self) -> Option<MetricsReport> {
            self.0.take()
        }

        fn description(&self) -> &str {
            "once"
        }

        fn error(&self) -> Option<&str> {
            None
        }
    }

    fn issue(subject: &str) -> HealthIssue {
        HealthIssue {
            severity: Severity::Warning,
            component: Component::Node,
            dimension: MetricDimension::HeapPercent,
            subject: Some(subject.to_string()),
            message: format!("{subject} heap is high"),
            observed: 80.0,
            threshold: 75.0,
            suggestion: String::new(),
            timestamp_ms: 0,
        }
    }

    fn app_with_issues(subjects: &[&str]) -> App {
        let mut report = MetricsReport::empty(1);
        report.issues = subjects.iter().map(|s| issue(s)).collect();
        let mut app = App::with_theme(
            Box::new(Once(Some(report))),
            Thresholds::default(),
            Theme::dark(),
        );
        assert!(app.reload_data());
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn number_keys_switch_views() {
        let mut app = app_with_issues(&[]);
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.current_view, View::Issues);
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.current_view, View::Cluster);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Issues);
    }

    #[test]
    fn help_swallows_next_key() {
        let mut app = app_with_issues(&[]);
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn filter_mode_captures_typing() {
        let mut app = app_with_issues(&["node-1", "node-2"]);
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.filter_text, "q");
        handle_key_event(&mut app, key(KeyCode::Backspace));
        assert!(!app.filter_active);
    }

    #[test]
    fn overlay_navigation_moves_selection() {
        let mut app = app_with_issues(&["a", "b"]);
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.show_detail_overlay);
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected_issue_index, 1);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_detail_overlay);
        assert_eq!(app.current_view, View::Issues);
    }

    #[test]
    fn clicks_select_rows_and_tabs() {
        let mut app = app_with_issues(&["a", "b", "c"]);
        handle_mouse_event(&mut app, click(12, 1), 2);
        assert_eq!(app.current_view, View::Cluster);
        handle_mouse_event(&mut app, click(30, 1), 2);
        assert_eq!(app.current_view, View::Issues);

        // Content starts at row 2; border and header push the first row to 4
        handle_mouse_event(&mut app, click(5, 6), 2);
        assert_eq!(app.selected_issue_index, 2);
        handle_mouse_event(&mut app, click(5, 3), 2);
        assert_eq!(app.selected_issue_index, 2);
    }
}
