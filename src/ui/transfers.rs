//! Transfers view rendering.
//!
//! Displays data transfers between instances and storage with size,
//! progress, and throughput.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::TransferStatus;
use crate::ui::common::{format_bytes, format_speed};

const MIB: f64 = 1024.0 * 1024.0;

fn speed_style(bps: f64) -> Style {
    if bps >= 100.0 * MIB {
        Style::default().fg(Color::Green)
    } else if bps >= 10.0 * MIB {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    }
}

/// Render the Transfers view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let snapshot = &data.snapshot;

    let header = Row::new(vec![
        Cell::from("File"),
        Cell::from("Route"),
        Cell::from("Size"),
        Cell::from("Progress"),
        Cell::from("Speed"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = snapshot
        .transfers
        .iter()
        .map(|t| {
            let status_style = match t.status {
                TransferStatus::Transferring => Style::default().fg(app.theme.processing),
                TransferStatus::Completed => Style::default().fg(app.theme.healthy),
                TransferStatus::Failed => {
                    Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)
                }
                TransferStatus::Queued => Style::default().add_modifier(Modifier::DIM),
            };

            Row::new(vec![
                Cell::from(t.file_name.clone()),
                Cell::from(format!("{} → {}", t.source_id, t.destination_id)),
                Cell::from(format_bytes(t.size_bytes)),
                Cell::from(format!("{:>5.1}%", t.progress_percent)),
                Cell::from(format_speed(t.speed_bps)).style(speed_style(t.speed_bps)),
                Cell::from(t.status.label()).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // File
        Constraint::Fill(3), // Route
        Constraint::Min(10), // Size
        Constraint::Min(8),  // Progress
        Constraint::Min(12), // Speed
        Constraint::Min(12), // Status
    ];

    let active = snapshot.transfers.iter().filter(|t| t.status.is_active()).count();
    let selected = app.selected_transfer_index.min(snapshot.transfers.len().saturating_sub(1));

    let position_info = if !snapshot.transfers.is_empty() {
        format!(" [{}/{}]", selected + 1, snapshot.transfers.len())
    } else {
        String::new()
    };

    let title = format!(
        " Transfers ({} active / {}){} ",
        active,
        snapshot.transfers.len(),
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
    fn test_speed_style_tiers() {
        assert_eq!(speed_style(150.0 * MIB).fg, Some(Color::Green));
        assert_eq!(speed_style(15.0 * MIB).fg, Some(Color::Yellow));
        assert_eq!(speed_style(1.0 * MIB).fg, Some(Color::Gray));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TransferStatus::Transferring.label(), "transferring");
        assert_eq!(TransferStatus::Queued.label(), "queued");
    }
}
