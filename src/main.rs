// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Terminal,
};

mod app;
mod data;
mod events;
mod settings;
mod source;
mod ui;

use app::{App, View};
use settings::Settings;
use source::{DataSource, DemoSource, FileSource, HttpSource};

#[derive(Parser, Debug)]
#[command(name = "tesmap")]
#[command(about = "Terminal dashboard for monitoring a federated GA4GH TES network")]
struct Args {
    /// Path to a topology JSON file to poll
    #[arg(short, long, conflicts_with = "endpoint")]
    file: Option<PathBuf>,

    /// Base URL of a live dashboard service
    #[arg(short, long, conflicts_with = "file")]
    endpoint: Option<String>,

    /// Seed for the demo data generator (used when no file or endpoint)
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Path to a config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Normal refresh interval in milliseconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Storage usage warning threshold (percent)
    #[arg(long)]
    usage_warn: Option<f64>,

    /// Storage usage critical threshold (percent)
    #[arg(long)]
    usage_crit: Option<f64>,

    /// Export current network state to JSON file and exit
    #[arg(long, conflicts_with = "endpoint")]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging();

    let mut settings = Settings::load(args.config.as_deref())?;

    // CLI flags override file and environment settings
    if let Some(ms) = args.refresh {
        settings.poll.normal_ms = ms;
    }
    if let Some(warn) = args.usage_warn {
        settings.thresholds.usage_warning = warn;
    }
    if let Some(crit) = args.usage_crit {
        settings.thresholds.usage_critical = crit;
    }
    if args.file.is_some() {
        settings.file = args.file.clone();
    }
    if args.endpoint.is_some() {
        settings.endpoint = args.endpoint.clone();
    }
    let seed = settings.demo_seed.unwrap_or(args.seed);

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&settings, seed, export_path);
    }

    // Live HTTP mode needs a runtime for the background poll task
    if let Some(endpoint) = settings.endpoint.clone() {
        let rt = tokio::runtime::Runtime::new()?;
        let source = {
            let _guard = rt.enter();
            HttpSource::start(&endpoint, settings.poll.normal())
        };
        // The runtime must outlive the TUI so the poll task keeps running
        let result = run_tui(Box::new(source), settings);
        drop(rt);
        return result;
    }

    if let Some(path) = settings.file.clone() {
        let source = Box::new(FileSource::new(path));
        return run_tui(source, settings);
    }

    // Default: seeded demo data
    let source = Box::new(DemoSource::new(seed));
    run_tui(source, settings)
}

/// Set up tracing when TESMAP_LOG names a log file.
///
/// Logs go to a file rather than stderr; anything written to the terminal
/// would corrupt the TUI.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let Ok(path) = std::env::var("TESMAP_LOG") else {
        return;
    };
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(file)
        .with_ansi(false)
        .init();
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, settings: Settings) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Create app and load initial data
    let mut app = App::new(source, settings.thresholds, settings.poll);
    let _ = app.reload_data();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                frame.render_widget(paragraph, resize_notice_area(area));
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            // Render header with network health
            ui::common::render_header(frame, app, chunks[0]);

            // Render tabs
            ui::common::render_tabs(frame, app, chunks[1]);

            // Render current view
            match app.current_view {
                View::Map => ui::map::render(frame, app, chunks[2]),
                View::Instances => ui::instances::render(frame, app, chunks[2]),
                View::Workflows => ui::workflows::render(frame, app, chunks[2]),
                View::Transfers => ui::transfers::render(frame, app, chunks[2]),
                View::Analytics => ui::analytics::render(frame, app, chunks[2]),
            }

            // Render status bar
            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render detail overlay if active
            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(std::time::Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Auto-refresh data on the active cadence
        if last_refresh.elapsed() >= app.refresh_interval() {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Vertically centered area for the resize notice, clamped so it stays
/// inside the buffer even on terminals shorter than the notice itself.
fn resize_notice_area(area: Rect) -> Rect {
    let height = 5.min(area.height);
    let y = (area.height / 2)
        .saturating_sub(2)
        .min(area.height - height);
    Rect::new(area.x, area.y + y, area.width, height)
}

/// Export the current network state to a JSON file without the TUI.
fn export_to_file(settings: &Settings, seed: u64, export_path: &std::path::Path) -> Result<()> {
    use data::{classify, NetworkHealth, TopologySnapshot};
    use std::io::Write;

    let snapshot: TopologySnapshot = if let Some(ref path) = settings.file {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        data::FixtureGenerator::new(seed).snapshot()
    };

    let health = NetworkHealth::compute(&snapshot);

    let instances: Vec<serde_json::Value> = snapshot
        .instances
        .iter()
        .map(|i| {
            serde_json::json!({
                "id": i.id,
                "name": i.name,
                "country": i.country,
                "status": classify(&i.id, &snapshot).label(),
                "tasks": i.metrics.task_count,
                "response_time_ms": i.metrics.response_time_ms,
            })
        })
        .collect();

    let workflows: Vec<serde_json::Value> = snapshot
        .workflows
        .iter()
        .map(|w| {
            serde_json::json!({
                "id": w.id,
                "engine": w.kind.label(),
                "status": w.status.label(),
                "path": w.path,
                "progress": format!("{}/{}", w.current_step, w.total_steps),
            })
        })
        .collect();

    let export = serde_json::json!({
        "summary": {
            "total_instances": health.total,
            "healthy": health.healthy,
            "processing": health.processing,
            "unhealthy": health.unhealthy,
            "unknown": health.unknown,
            "active_workflows": health.active_workflows,
            "active_transfers": health.active_transfers,
            "health_score": health.score(),
            "avg_response_time_ms": health.avg_response_time_ms,
            "storage_total_tb": health.storage_total_tb,
        },
        "instances": instances,
        "workflows": workflows,
    });

    let json = serde_json::to_string_pretty(&export)?;
    let mut file = std::fs::File::create(export_path)?;
    file.write_all(json.as_bytes())?;

    println!("Exported network state to: {}", export_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_notice_fits_tiny_terminals() {
        for height in 0..8 {
            let area = Rect::new(0, 0, 40, height);
            let notice = resize_notice_area(area);
            assert!(notice.y + notice.height <= height);
        }
    }
}
