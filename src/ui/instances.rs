//! Instances view rendering.
//!
//! Displays a table of all TES instances with classified status, task
//! counts, resource metrics, and sparkline trends.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{classify, Instance, TopologySnapshot};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column to sort by in the Instances view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by instance name alphabetically.
    #[default]
    Name,
    /// Sort by country.
    Country,
    /// Sort by task count.
    Tasks,
    /// Sort by CPU utilization.
    Cpu,
    /// Sort by classified status.
    Status,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Country,
            SortColumn::Country => SortColumn::Tasks,
            SortColumn::Tasks => SortColumn::Cpu,
            SortColumn::Cpu => SortColumn::Status,
            SortColumn::Status => SortColumn::Name,
        }
    }
}

/// Render the Instances view showing all instances in a sortable table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let snapshot = &data.snapshot;

    // Get filtered and sorted instance indices
    let mut instances: Vec<(usize, &Instance)> = snapshot
        .instances
        .iter()
        .enumerate()
        .filter(|(_, i)| {
            app.matches_filter(&i.name)
                || app.matches_filter(&i.country)
                || app.matches_filter(&i.region)
        })
        .collect();
    sort_instances_by(&mut instances, snapshot, app.sort_column, app.sort_ascending);

    // A filter that matches nothing gets a hint, not a bare empty table
    if instances.is_empty() && !snapshot.instances.is_empty() {
        let block = Block::default()
            .title(format!(" Instances (0/{}) ", snapshot.instances.len()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                empty_filter_hint(&app.filter_text),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(format_header("Instance", SortColumn::Name, app)),
        Cell::from(format_header("Country", SortColumn::Country, app)),
        Cell::from(format_header("Tasks", SortColumn::Tasks, app)),
        Cell::from("Resp"),
        Cell::from(format_header("CPU", SortColumn::Cpu, app)),
        Cell::from("Mem"),
        Cell::from("Trend"),
        Cell::from(format_header("Status", SortColumn::Status, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = instances
        .iter()
        .map(|(_, i)| {
            let status = classify(&i.id, snapshot);
            let status_style = app.theme.status_style(status);

            let sparkline = render_sparkline(&app.history.task_sparkline(&i.id));
            let rate = app
                .history
                .task_rate(&i.id)
                .map(|r| format!("{:+.1}/s", r))
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(i.name.clone()),
                Cell::from(i.country.clone()),
                Cell::from(format!("{} ({})", i.metrics.task_count, rate)),
                Cell::from(format!("{:.0}ms", i.metrics.response_time_ms)),
                Cell::from(format!("{:.0}%", i.metrics.cpu_percent)),
                Cell::from(format!("{:.0}%", i.metrics.memory_percent)),
                Cell::from(sparkline),
                Cell::from(status.symbol()).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Instance name - largest share
        Constraint::Fill(2), // Country
        Constraint::Fill(2), // Tasks + rate
        Constraint::Fill(1), // Response time
        Constraint::Fill(1), // CPU
        Constraint::Fill(1), // Memory
        Constraint::Min(8),  // Trend sparkline
        Constraint::Min(6),  // Status
    ];

    let selected_visual_index = app.selected_instance_index.min(instances.len().saturating_sub(1));

    let sort_indicator = match app.sort_column {
        SortColumn::Name => "name",
        SortColumn::Country => "country",
        SortColumn::Tasks => "tasks",
        SortColumn::Cpu => "cpu",
        SortColumn::Status => "status",
    };
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !instances.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, instances.len())
    } else {
        String::new()
    };

    let title = format!(
        " Instances ({}/{}) [s:sort {}{}]{}{} ",
        instances.len(),
        snapshot.instances.len(),
        sort_indicator,
        sort_dir,
        filter_info,
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
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}

fn empty_filter_hint(filter: &str) -> String {
    format!("  No instances match \"{}\" (c to clear)", filter)
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort instances by the given column and direction (also used by App to
/// map the visual selection back to a raw index).
pub fn sort_instances_by(
    instances: &mut [(usize, &Instance)],
    snapshot: &TopologySnapshot,
    column: SortColumn,
    ascending: bool,
) {
    instances.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.1.name.cmp(&b.1.name),
            SortColumn::Country => a.1.country.cmp(&b.1.country),
            SortColumn::Tasks => a.1.metrics.task_count.cmp(&b.1.metrics.task_count),
            SortColumn::Cpu => a
                .1
                .metrics
                .cpu_percent
                .partial_cmp(&b.1.metrics.cpu_percent)
                .unwrap_or(std::cmp::Ordering::Equal),
            SortColumn::Status => classify(&a.1.id, snapshot).cmp(&classify(&b.1.id, snapshot)),
        };

        let primary = if ascending { primary } else { primary.reverse() };

        // Secondary sort by name for stability when primary values are equal
        if primary == std::cmp::Ordering::Equal {
            a.1.name.cmp(&b.1.name)
        } else {
            primary
        }
    });
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FixtureGenerator;

    #[test]
    fn test_sort_by_tasks_descending_puts_gateway_first() {
        let mut generator = FixtureGenerator::new(1);
        let snapshot = generator.snapshot();

        let mut rows: Vec<(usize, &Instance)> = snapshot.instances.iter().enumerate().collect();
        sort_instances_by(&mut rows, &snapshot, SortColumn::Tasks, false);

        // tes-gateway has the highest declared task count in the demo table
        assert_eq!(rows[0].1.id, "tes-gateway");
    }

    #[test]
    fn test_sort_is_stable_by_name() {
        let mut generator = FixtureGenerator::new(1);
        let snapshot = generator.snapshot();

        let mut rows: Vec<(usize, &Instance)> = snapshot.instances.iter().enumerate().collect();
        sort_instances_by(&mut rows, &snapshot, SortColumn::Country, true);

        // Ties on country resolve alphabetically by name
        let czech: Vec<&str> = rows
            .iter()
            .filter(|(_, i)| i.country == "Czech Republic")
            .map(|(_, i)| i.name.as_str())
            .collect();
        let mut sorted = czech.clone();
        sorted.sort();
        assert_eq!(czech, sorted);
    }

    #[test]
    fn test_empty_filter_hint_names_the_term() {
        let hint = empty_filter_hint("tesk-nowhere");
        assert!(hint.contains("tesk-nowhere"));
        assert!(hint.contains("c to clear"));
    }

    #[test]
    fn test_sort_column_cycle_round_trips() {
        let mut col = SortColumn::Name;
        for _ in 0..5 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::Name);
    }
}
