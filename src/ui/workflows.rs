//! Workflows view rendering.
//!
//! Displays workflow executions with engine, status, traversed path,
//! and step progress.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::RunStatus;
use crate::ui::theme::Theme;

/// Style for a run-level status cell.
pub(crate) fn run_status_style(theme: &Theme, status: RunStatus) -> Style {
    match status {
        RunStatus::Running => Style::default().fg(theme.processing),
        RunStatus::Submitted => Style::default().fg(theme.highlight),
        RunStatus::Completed => Style::default().fg(theme.healthy),
        RunStatus::Failed => Style::default().fg(theme.critical).add_modifier(Modifier::BOLD),
    }
}

/// A compact textual progress bar, e.g. "▮▮▮▯▯".
pub(crate) fn progress_bar(current: u32, total: u32) -> String {
    if total == 0 {
        return String::new();
    }
    let filled = (current.min(total)) as usize;
    let empty = (total - current.min(total)) as usize;
    format!("{}{}", "▮".repeat(filled), "▯".repeat(empty))
}

/// Render the Workflows view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let snapshot = &data.snapshot;

    let header = Row::new(vec![
        Cell::from("Run"),
        Cell::from("Engine"),
        Cell::from("Status"),
        Cell::from("Path"),
        Cell::from("Progress"),
        Cell::from("Data"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = snapshot
        .workflows
        .iter()
        .map(|w| {
            let kind_style = Style::default().fg(app.theme.kind_color(w.kind));
            let status_style = run_status_style(&app.theme, w.status);

            Row::new(vec![
                Cell::from(w.id.clone()),
                Cell::from(w.kind.label()).style(kind_style),
                Cell::from(w.status.label()).style(status_style),
                Cell::from(w.path.join(" → ")),
                Cell::from(format!(
                    "{}/{} {}",
                    w.current_step,
                    w.total_steps,
                    progress_bar(w.current_step, w.total_steps)
                )),
                Cell::from(w.data_size.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // Run id
        Constraint::Min(10), // Engine
        Constraint::Min(10), // Status
        Constraint::Fill(3), // Path
        Constraint::Fill(2), // Progress
        Constraint::Min(8),  // Data size
    ];

    let active = snapshot.workflows.iter().filter(|w| w.is_active()).count();
    let selected = app.selected_workflow_index.min(snapshot.workflows.len().saturating_sub(1));

    let position_info = if !snapshot.workflows.is_empty() {
        format!(" [{}/{}]", selected + 1, snapshot.workflows.len())
    } else {
        String::new()
    };

    let title = format!(
        " Workflows ({} active / {}){} ",
        active,
        snapshot.workflows.len(),
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(3, 5), "▮▮▮▯▯");
        assert_eq!(progress_bar(0, 4), "▯▯▯▯");
        assert_eq!(progress_bar(4, 4), "▮▮▮▮");
    }

    #[test]
    fn test_progress_bar_clamps_overflow() {
        assert_eq!(progress_bar(9, 4), "▮▮▮▮");
        assert_eq!(progress_bar(1, 0), "");
    }
}
