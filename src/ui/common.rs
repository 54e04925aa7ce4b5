//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar with network health overview.
///
/// Displays: status indicator, instance counts by status, activity and
/// average response time.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(health) = app.network_health() else {
        let line = Line::from(vec![
            Span::styled(" TESMAP ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    // Overall status indicator
    let status_style = if health.unhealthy > 0 {
        Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)
    } else if health.processing > 0 {
        Style::default().fg(app.theme.processing)
    } else {
        Style::default().fg(app.theme.healthy)
    };

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("TESMAP ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}", health.healthy),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(" ok "),
        if health.processing > 0 {
            Span::styled(
                format!("{}", health.processing),
                Style::default().fg(app.theme.processing),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" busy "),
        if health.unhealthy > 0 {
            Span::styled(
                format!("{}", health.unhealthy),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" down │ "),
        Span::styled(
            format!("{}", health.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" instances │ "),
        Span::raw(format!(
            "{} wf {} xfer │ {:.0}ms avg",
            health.active_workflows, health.active_transfers, health.avg_response_time_ms
        )),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Map "),
        Line::from(" 2:Instances "),
        Line::from(" 3:Workflows "),
        Line::from(" 4:Transfers "),
        Line::from(" 5:Analytics "),
    ];

    let selected = match app.current_view {
        View::Map => 0,
        View::Instances => 1,
        View::Workflows => 2,
        View::Transfers => 3,
        View::Analytics => 4,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: data source, time since last update, available controls. Also
/// displays temporary status messages and poll errors. A poll error with
/// stale data on screen keeps the data visible and flags the error here.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    // A source error with stale data still on screen
    if let (Some(err), true) = (&app.load_error, app.data.is_some()) {
        let paragraph = Paragraph::new(format!(" Stale data | Error: {} | r:retry", err))
            .style(Style::default().fg(app.theme.warning));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let elapsed = data.last_updated.elapsed();
        let cadence = if app.real_time { "fast" } else { "normal" };

        // Context-sensitive controls
        let controls = match app.current_view {
            View::Map => "↑↓:select w:paths f:transfers Enter:detail ?:help q:quit",
            View::Instances => {
                if app.filter_active {
                    "Type to search | Enter:apply Esc:cancel"
                } else {
                    "/:search s:sort Tab:switch Enter:detail ?:help q:quit"
                }
            }
            View::Workflows | View::Transfers => "↑↓:select Tab:switch Enter:detail ?:help q:quit",
            View::Analytics => "Tab:switch ?:help q:quit",
        };

        format!(
            " {} | {} | Updated {:.1}s ago ({}) | {}",
            app.current_view.label(),
            app.source_description(),
            elapsed.as_secs_f64(),
            cadence,
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       View detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Map",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  w         Toggle workflow paths"),
        Line::from("  f         Toggle transfer lines"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Instances",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  t         Toggle fast refresh"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
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
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 30u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Format a byte rate for display (e.g., "120.0 MiB/s").
pub fn format_speed(bps: f64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
    if bps >= GIB {
        format!("{:.1} GiB/s", bps / GIB)
    } else if bps >= MIB {
        format!("{:.1} MiB/s", bps / MIB)
    } else {
        format!("{:.0} KiB/s", bps / 1024.0)
    }
}

/// Format a byte count for display.
pub fn format_bytes(bytes: u64) -> String {
    const GIB: u64 = 1024 * 1024 * 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(512.0 * 1024.0), "512 KiB/s");
        assert_eq!(format_speed(120.0 * 1024.0 * 1024.0), "120.0 MiB/s");
        assert_eq!(format_speed(2.5 * 1024.0 * 1024.0 * 1024.0), "2.5 GiB/s");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
