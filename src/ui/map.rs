//! World map view.
//!
//! Renders the network on a braille canvas: instance markers colored by
//! classified status, storage sites by usage tier, active workflow paths
//! by engine, and active transfers by throughput. References to ids that
//! are absent from the snapshot are skipped without comment; a dangling
//! path hop just isn't drawn.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
        Block, Borders,
    },
    Frame,
};

use crate::app::App;
use crate::data::{classify, Thresholds, TopologySnapshot, Transfer, WorkflowExecution};

const MIB: f64 = 1024.0 * 1024.0;

/// Throughput tier color for a transfer line.
fn speed_color(bps: f64) -> Color {
    if bps >= 100.0 * MIB {
        Color::Green
    } else if bps >= 10.0 * MIB {
        Color::Yellow
    } else {
        Color::Gray
    }
}

/// Coordinates for both endpoints of a transfer, if both resolve.
fn transfer_endpoints(snapshot: &TopologySnapshot, transfer: &Transfer) -> Option<[(f64, f64); 2]> {
    let source = snapshot.instance(&transfer.source_id)?.coordinates?;
    let destination = snapshot.storage_by_id(&transfer.destination_id)?.coordinates;
    Some([(source.lng, source.lat), (destination.lng, destination.lat)])
}

/// Resolvable coordinates along a workflow's path, in order.
fn path_points(snapshot: &TopologySnapshot, workflow: &WorkflowExecution) -> Vec<(f64, f64)> {
    workflow
        .path
        .iter()
        .filter_map(|id| snapshot.instance(id))
        .filter_map(|i| i.coordinates)
        .map(|c| (c.lng, c.lat))
        .collect()
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Min(8), Constraint::Length(1)]).split(area);

    render_canvas(frame, app, chunks[0]);
    render_legend(frame, app, chunks[1]);
}

fn render_canvas(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Network Map ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(ref data) = app.data else {
        frame.render_widget(block, area);
        return;
    };
    let snapshot = &data.snapshot;
    let selected_id = app.selected_instance_id().map(str::to_string);
    let thresholds = app.thresholds.clone();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-180.0, 180.0])
        .y_bounds([-90.0, 90.0])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });

            if app.show_transfers {
                draw_transfers(ctx, snapshot);
            }
            if app.show_workflow_paths {
                draw_workflow_paths(ctx, app, snapshot);
            }

            draw_storage(ctx, app, snapshot, &thresholds);
            draw_instances(ctx, app, snapshot, selected_id.as_deref());
        });

    frame.render_widget(canvas, area);
}

fn draw_transfers(ctx: &mut ratatui::widgets::canvas::Context, snapshot: &TopologySnapshot) {
    for transfer in snapshot.transfers.iter().filter(|t| t.status.is_active()) {
        let Some([(x1, y1), (x2, y2)]) = transfer_endpoints(snapshot, transfer) else {
            continue;
        };
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: speed_color(transfer.speed_bps),
        });
    }
}

fn draw_workflow_paths(
    ctx: &mut ratatui::widgets::canvas::Context,
    app: &App,
    snapshot: &TopologySnapshot,
) {
    for (idx, workflow) in snapshot.workflows.iter().enumerate() {
        if !workflow.is_active() {
            continue;
        }
        let points = path_points(snapshot, workflow);
        let selected = idx == app.selected_workflow_index;
        let color = if selected {
            app.theme.highlight
        } else {
            app.theme.kind_color(workflow.kind)
        };
        for pair in points.windows(2) {
            ctx.draw(&CanvasLine {
                x1: pair[0].0,
                y1: pair[0].1,
                x2: pair[1].0,
                y2: pair[1].1,
                color,
            });
        }
    }
}

fn draw_storage(
    ctx: &mut ratatui::widgets::canvas::Context,
    app: &App,
    snapshot: &TopologySnapshot,
    thresholds: &Thresholds,
) {
    for storage in &snapshot.storage {
        let tier = thresholds.usage_tier(storage.usage_percent);
        let style = app.theme.usage_style(tier);
        ctx.print(
            storage.coordinates.lng,
            storage.coordinates.lat,
            Line::styled("▣", style),
        );
    }
}

fn draw_instances(
    ctx: &mut ratatui::widgets::canvas::Context,
    app: &App,
    snapshot: &TopologySnapshot,
    selected_id: Option<&str>,
) {
    for instance in &snapshot.instances {
        let Some(coords) = instance.coordinates else {
            continue;
        };
        let status = classify(&instance.id, snapshot);
        let style = app.theme.status_style(status);
        let symbol = if Some(instance.id.as_str()) == selected_id {
            "◉"
        } else {
            "●"
        };
        ctx.print(coords.lng, coords.lat, Line::styled(symbol, style));
    }
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" ●", Style::default().fg(app.theme.healthy)),
        Span::raw("ok "),
        Span::styled("●", Style::default().fg(app.theme.processing)),
        Span::raw("busy "),
        Span::styled("●", Style::default().fg(app.theme.critical)),
        Span::raw("down "),
        Span::styled("▣", Style::default().fg(app.theme.healthy)),
        Span::raw("storage │ "),
    ];

    if let Some(ref data) = app.data {
        if let Some(idx) = app.selected_instance_raw_index() {
            if let Some(instance) = data.snapshot.instances.get(idx) {
                let status = classify(&instance.id, &data.snapshot);
                spans.push(Span::styled(
                    format!("{} ", instance.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(
                    format!("[{}] ", status.label()),
                    app.theme.status_style(status),
                ));
                spans.push(Span::raw(format!(
                    "{} · {} tasks",
                    instance.country, instance.metrics.task_count
                )));
            }
        }
    }

    let layers = format!(
        " │ paths:{} transfers:{}",
        if app.show_workflow_paths { "on" } else { "off" },
        if app.show_transfers { "on" } else { "off" },
    );
    spans.push(Span::styled(layers, Style::default().add_modifier(Modifier::DIM)));

    frame.render_widget(ratatui::widgets::Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FixtureGenerator, TransferStatus};

    #[test]
    fn test_speed_tiers() {
        assert_eq!(speed_color(120.0 * MIB), Color::Green);
        assert_eq!(speed_color(50.0 * MIB), Color::Yellow);
        assert_eq!(speed_color(2.0 * MIB), Color::Gray);
    }

    #[test]
    fn test_transfer_with_missing_endpoint_is_skipped() {
        let mut generator = FixtureGenerator::new(1);
        let mut snapshot = generator.snapshot();

        snapshot.transfers.push(Transfer {
            id: "t-ghost".into(),
            source_id: "no-such-instance".into(),
            destination_id: "storage-global".into(),
            file_name: String::new(),
            size_bytes: 0,
            progress_percent: 0.0,
            speed_bps: 0.0,
            status: TransferStatus::Transferring,
        });

        let ghost = snapshot.transfers.last().unwrap();
        assert!(transfer_endpoints(&snapshot, ghost).is_none());
    }

    #[test]
    fn test_path_points_drop_unresolvable_hops() {
        let mut generator = FixtureGenerator::new(1);
        let mut snapshot = generator.snapshot();

        snapshot.workflows[0].path = vec![
            "elixir-cz".into(),
            "no-such-instance".into(),
            "elixir-fi".into(),
        ];
        let points = path_points(&snapshot, &snapshot.workflows[0]);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_transfer_endpoints_resolve_for_fixture_data() {
        let mut generator = FixtureGenerator::new(5);
        let snapshot = generator.snapshot();
        for transfer in &snapshot.transfers {
            assert!(transfer_endpoints(&snapshot, transfer).is_some());
        }
    }
}
