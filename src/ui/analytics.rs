//! Analytics view rendering.
//!
//! Network-wide aggregates: health score, activity counters, performance
//! averages, and a storage overview with usage tiers.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::NetworkHealth;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };
    let health = NetworkHealth::compute(&data.snapshot);

    let rows = Layout::vertical([
        Constraint::Length(3), // Health score gauge
        Constraint::Length(7), // Cards
        Constraint::Min(6),    // Storage overview
    ])
    .split(area);

    render_score(frame, app, rows[0], &health);

    let cards =
        Layout::horizontal([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(rows[1]);
    render_status_card(frame, app, cards[0], &health);
    render_activity_card(frame, app, cards[1], &health);
    render_performance_card(frame, app, cards[2], &health);

    render_storage(frame, app, rows[2]);
}

fn render_score(frame: &mut Frame, app: &App, area: Rect, health: &NetworkHealth) {
    let score = health.score();
    let color = if score >= 80 {
        app.theme.healthy
    } else if score >= 50 {
        app.theme.warning
    } else {
        app.theme.critical
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Network Health Score ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .gauge_style(Style::default().fg(color))
        .percent(score as u16)
        .label(format!("{}% healthy", score));

    frame.render_widget(gauge, area);
}

fn render_status_card(frame: &mut Frame, app: &App, area: Rect, health: &NetworkHealth) {
    let lines = vec![
        Line::from(vec![
            Span::raw(" Healthy     "),
            Span::styled(
                format!("{}", health.healthy),
                Style::default().fg(app.theme.healthy).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Processing  "),
            Span::styled(
                format!("{}", health.processing),
                Style::default().fg(app.theme.processing).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Unhealthy   "),
            Span::styled(
                format!("{}", health.unhealthy),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Unknown     "),
            Span::styled(
                format!("{}", health.unknown),
                Style::default().fg(app.theme.unknown),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Total       "),
            Span::styled(
                format!("{}", health.total),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(card_block(app, " Instances ")),
        area,
    );
}

fn render_activity_card(frame: &mut Frame, app: &App, area: Rect, health: &NetworkHealth) {
    let lines = vec![
        Line::from(format!(" Active workflows   {}", health.active_workflows)),
        Line::from(format!(" Active transfers   {}", health.active_transfers)),
        Line::from(format!(" Running tasks      {}", health.total_tasks)),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(card_block(app, " Activity ")),
        area,
    );
}

fn render_performance_card(frame: &mut Frame, app: &App, area: Rect, health: &NetworkHealth) {
    let lines = vec![
        Line::from(format!(" Avg response   {:.0} ms", health.avg_response_time_ms)),
        Line::from(format!(" Avg CPU        {:.1} %", health.avg_cpu_percent)),
        Line::from(format!(" Avg memory     {:.1} %", health.avg_memory_percent)),
        Line::from(format!(" Storage pool   {:.0} TB", health.storage_total_tb)),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(card_block(app, " Performance ")),
        area,
    );
}

fn render_storage(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let lines: Vec<Line> = data
        .snapshot
        .storage
        .iter()
        .map(|s| {
            let tier = app.thresholds.usage_tier(s.usage_percent);
            let style = app.theme.usage_style(tier);
            let bar_width = 20usize;
            let filled = ((s.usage_percent / 100.0) * bar_width as f64).round() as usize;
            let bar: String = "█".repeat(filled.min(bar_width))
                + &"░".repeat(bar_width - filled.min(bar_width));

            Line::from(vec![
                Span::raw(format!(" {:<22}", s.name)),
                Span::raw(format!("{:<10}", s.kind.label())),
                Span::styled(bar, style),
                Span::styled(format!(" {:>5.1}%", s.usage_percent), style),
                Span::raw(format!("  of {}", s.capacity)),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(card_block(app, " Storage ")),
        area,
    );
}

fn card_block(app: &App, title: &'static str) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}
