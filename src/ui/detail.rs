//! Detail overlay rendering.
//!
//! Displays a modal overlay with detailed information about the current
//! selection: an instance (Map and Instances views), a workflow execution,
//! or a transfer.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, View};
use crate::data::{classify, Instance, StepStatus, Transfer, WorkflowExecution};
use crate::ui::common::{format_bytes, format_speed};
use crate::ui::workflows::{progress_bar, run_status_style};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the detail for the current selection as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref data) = app.data else {
        return;
    };

    // Calculate overlay size - use most of the screen
    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 100);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    match app.current_view {
        View::Map | View::Instances => {
            let Some(raw_index) = app.selected_instance_raw_index() else {
                return;
            };
            let Some(instance) = data.snapshot.instances.get(raw_index) else {
                return;
            };
            render_instance_detail(frame, app, overlay_area, instance);
        }
        View::Workflows => {
            let Some(workflow) = data.snapshot.workflows.get(app.selected_workflow_index) else {
                return;
            };
            render_workflow_detail(frame, app, overlay_area, workflow);
        }
        View::Transfers => {
            let Some(transfer) = data.snapshot.transfers.get(app.selected_transfer_index) else {
                return;
            };
            render_transfer_detail(frame, app, overlay_area, transfer);
        }
        // Analytics has no per-item selection and never opens an overlay
        View::Analytics => {}
    }
}

fn render_instance_detail(frame: &mut Frame, app: &App, area: Rect, instance: &Instance) {
    let data = match app.data {
        Some(ref d) => d,
        None => return,
    };
    let snapshot = &data.snapshot;
    let status = classify(&instance.id, snapshot);

    let chunks = Layout::vertical([
        Constraint::Length(7), // Header with instance info
        Constraint::Min(8),    // Workflows traversing this instance
        Constraint::Length(1), // Footer
    ])
    .split(area);

    let coords = instance
        .coordinates
        .map(|c| format!("{:.2}, {:.2}", c.lat, c.lng))
        .unwrap_or_else(|| "-".to_string());

    let header_lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", instance.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("[{}]", status.label()),
                app.theme.status_style(status).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!(" {} ({}) · {}", instance.country, instance.region, coords)),
        Line::from(format!(" {} · {}", instance.url, instance.version)),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Capacity: "),
            Span::styled(
                format!(
                    "{} cores / {} mem / {} disk",
                    instance.capacity.cpu_cores, instance.capacity.memory, instance.capacity.storage
                ),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "    Tasks: {}    Resp: {:.0}ms    CPU: {:.0}%    Mem: {:.0}%",
                instance.metrics.task_count,
                instance.metrics.response_time_ms,
                instance.metrics.cpu_percent,
                instance.metrics.memory_percent,
            )),
        ]),
    ];

    let header_block = Block::default()
        .title(" Instance Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // Workflows whose path includes this instance
    let traversing: Vec<&WorkflowExecution> =
        snapshot.workflows.iter().filter(|w| w.references(&instance.id)).collect();

    if !traversing.is_empty() {
        let wf_header = Row::new(vec![
            Cell::from("Run"),
            Cell::from("Engine"),
            Cell::from("Status"),
            Cell::from("Progress"),
        ])
        .height(1)
        .style(app.theme.header);

        let wf_rows: Vec<Row> = traversing
            .iter()
            .map(|w| {
                Row::new(vec![
                    Cell::from(w.id.clone()),
                    Cell::from(w.kind.label())
                        .style(Style::default().fg(app.theme.kind_color(w.kind))),
                    Cell::from(w.status.label()).style(run_status_style(&app.theme, w.status)),
                    Cell::from(progress_bar(w.current_step, w.total_steps)),
                ])
            })
            .collect();

        let wf_widths = [
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Fill(1),
        ];

        let wf_table = Table::new(wf_rows, wf_widths).header(wf_header).block(
            Block::default()
                .title(format!(" Workflows here ({}) ", traversing.len()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );

        frame.render_widget(wf_table, chunks[1]);
    } else {
        let empty_block = Block::default()
            .title(" Workflows here (0) ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No workflows traverse this instance",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(empty_block);
        frame.render_widget(empty, chunks[1]);
    }

    render_footer(frame, chunks[2]);
}

fn render_workflow_detail(frame: &mut Frame, app: &App, area: Rect, workflow: &WorkflowExecution) {
    let chunks = Layout::vertical([
        Constraint::Length(6), // Header
        Constraint::Min(8),    // Steps table
        Constraint::Length(1), // Footer
    ])
    .split(area);

    let header_lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", workflow.id),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                workflow.kind.label(),
                Style::default().fg(app.theme.kind_color(workflow.kind)),
            ),
            Span::raw("  "),
            Span::styled(
                workflow.status.label(),
                run_status_style(&app.theme, workflow.status).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!(
            " Submitted to {}{}",
            workflow.tes_instance,
            workflow
                .submitted_at
                .as_deref()
                .map(|t| format!(" at {}", t))
                .unwrap_or_default()
        )),
        Line::from(format!(" Path: {}", workflow.path.join(" → "))),
        Line::from(format!(
            " Progress: {}/{} {}   Data: {}   Storage: {}",
            workflow.current_step,
            workflow.total_steps,
            progress_bar(workflow.current_step, workflow.total_steps),
            workflow.data_size,
            if workflow.storage_ids.is_empty() {
                "-".to_string()
            } else {
                workflow.storage_ids.join(", ")
            }
        )),
    ];

    let header_block = Block::default()
        .title(" Workflow Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    let steps_header = Row::new(vec![
        Cell::from("Step"),
        Cell::from("Status"),
        Cell::from("Duration"),
        Cell::from("Instance"),
    ])
    .height(1)
    .style(app.theme.header);

    let steps_rows: Vec<Row> = workflow
        .steps
        .iter()
        .map(|s| {
            let style = match s.status {
                StepStatus::Completed => Style::default().fg(app.theme.healthy),
                StepStatus::Running => Style::default().fg(app.theme.processing),
                StepStatus::Failed => {
                    Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)
                }
                StepStatus::Pending => Style::default().add_modifier(Modifier::DIM),
            };
            let duration = if s.duration_secs > 0 {
                format!("{}m{:02}s", s.duration_secs / 60, s.duration_secs % 60)
            } else {
                "-".to_string()
            };
            Row::new(vec![
                Cell::from(s.name.clone()),
                Cell::from(format!("{:?}", s.status)).style(style),
                Cell::from(duration),
                Cell::from(s.instance_id.clone()),
            ])
        })
        .collect();

    let steps_widths = [
        Constraint::Fill(3),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Fill(2),
    ];

    let steps_table = Table::new(steps_rows, steps_widths).header(steps_header).block(
        Block::default()
            .title(format!(" Steps ({}) ", workflow.steps.len()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(steps_table, chunks[1]);
    render_footer(frame, chunks[2]);
}

fn render_transfer_detail(frame: &mut Frame, app: &App, area: Rect, transfer: &Transfer) {
    let chunks = Layout::vertical([Constraint::Min(8), Constraint::Length(1)]).split(area);

    let lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", transfer.file_name),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(format!(
            " Route:    {} → {}",
            transfer.source_id, transfer.destination_id
        )),
        Line::from(format!(" Size:     {}", format_bytes(transfer.size_bytes))),
        Line::from(format!(" Progress: {:.1}%", transfer.progress_percent)),
        Line::from(format!(" Speed:    {}", format_speed(transfer.speed_bps))),
        Line::from(format!(" Status:   {}", transfer.status.label())),
    ];

    let block = Block::default()
        .title(" Transfer Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);
    render_footer(frame, chunks[1]);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, area);
}
