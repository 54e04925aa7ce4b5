//! Application state and navigation logic.

use anyhow::Result;

use crate::data::{classify, History, NetworkHealth, Thresholds, TopologyData};
use crate::settings::PollSettings;
use crate::source::DataSource;
use crate::ui::instances::SortColumn;
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Instance detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// World map with instances, storage, workflow paths and transfers.
    Map,
    /// Instance table with metrics and trends.
    Instances,
    /// Workflow executions with per-step progress.
    Workflows,
    /// Data transfers between instances and storage.
    Transfers,
    /// Network-wide aggregates.
    Analytics,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Map => View::Instances,
            View::Instances => View::Workflows,
            View::Workflows => View::Transfers,
            View::Transfers => View::Analytics,
            View::Analytics => View::Map,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Map => View::Analytics,
            View::Instances => View::Map,
            View::Workflows => View::Instances,
            View::Transfers => View::Workflows,
            View::Analytics => View::Transfers,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Map => "Map",
            View::Instances => "Instances",
            View::Workflows => "Workflows",
            View::Transfers => "Transfers",
            View::Analytics => "Analytics",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<TopologyData>,
    pub history: History,
    pub load_error: Option<String>,
    pub thresholds: Thresholds,

    // Poll cadence
    pub poll: PollSettings,
    pub real_time: bool,

    // Map layers
    pub show_workflow_paths: bool,
    pub show_transfers: bool,

    // Navigation state
    pub selected_instance_index: usize,
    pub selected_workflow_index: usize,
    pub selected_transfer_index: usize,

    // Sorting (Instances view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App with the given data source, thresholds and cadence.
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds, poll: PollSettings) -> Self {
        Self {
            running: true,
            current_view: View::Map,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            history: History::new(),
            load_error: None,
            thresholds,
            poll,
            real_time: false,
            show_workflow_paths: true,
            show_transfers: true,
            selected_instance_index: 0,
            selected_workflow_index: 0,
            selected_transfer_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The active poll interval, depending on the real-time toggle.
    pub fn refresh_interval(&self) -> std::time::Duration {
        if self.real_time {
            self.poll.fast()
        } else {
            self.poll.normal()
        }
    }

    /// Toggle between normal and fast poll cadence.
    pub fn toggle_real_time(&mut self) {
        self.real_time = !self.real_time;
        let label = if self.real_time { "fast" } else { "normal" };
        self.set_status_message(format!("Refresh: {}", label));
    }

    /// Toggle the workflow-path layer on the map.
    pub fn toggle_workflow_paths(&mut self) {
        self.show_workflow_paths = !self.show_workflow_paths;
    }

    /// Toggle the transfer layer on the map.
    pub fn toggle_transfers(&mut self) {
        self.show_transfers = !self.show_transfers;
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for new data.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) if no new data.
    /// On source errors the previous snapshot is kept and the error is
    /// surfaced in the status bar instead.
    pub fn reload_data(&mut self) -> Result<bool> {
        // Poll first: sources set or clear their error during the poll
        // itself, so reading the error before polling would make a past
        // failure permanent and turn retry into a no-op.
        let snapshot = self.source.poll();
        self.load_error = self.source.error();

        if let Some(snapshot) = snapshot {
            let data = TopologyData::from_snapshot(snapshot);

            // Record history before updating
            self.history.record(&data);
            self.data = Some(data);

            self.clamp_selection();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Network aggregates for the current snapshot.
    pub fn network_health(&self) -> Option<NetworkHealth> {
        self.data.as_ref().map(|d| NetworkHealth::compute(&d.snapshot))
    }

    /// Keep selection indices inside the new collections after a reload.
    fn clamp_selection(&mut self) {
        if let Some(ref data) = self.data {
            let s = &data.snapshot;
            self.selected_instance_index =
                self.selected_instance_index.min(s.instances.len().saturating_sub(1));
            self.selected_workflow_index =
                self.selected_workflow_index.min(s.workflows.len().saturating_sub(1));
            self.selected_transfer_index =
                self.selected_transfer_index.min(s.transfers.len().saturating_sub(1));
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let Some(ref data) = self.data else { return };
        let s = &data.snapshot;
        match self.current_view {
            View::Map => {
                let max = s.instances.len().saturating_sub(1);
                self.selected_instance_index = (self.selected_instance_index + n).min(max);
            }
            View::Instances => {
                // Navigate by visual position in the filtered/sorted list
                let max = self.filtered_instance_count(data).saturating_sub(1);
                self.selected_instance_index = (self.selected_instance_index + n).min(max);
            }
            View::Workflows => {
                let max = s.workflows.len().saturating_sub(1);
                self.selected_workflow_index = (self.selected_workflow_index + n).min(max);
            }
            View::Transfers => {
                let max = s.transfers.len().saturating_sub(1);
                self.selected_transfer_index = (self.selected_transfer_index + n).min(max);
            }
            View::Analytics => {}
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Map | View::Instances => {
                self.selected_instance_index = self.selected_instance_index.saturating_sub(n);
            }
            View::Workflows => {
                self.selected_workflow_index = self.selected_workflow_index.saturating_sub(n);
            }
            View::Transfers => {
                self.selected_transfer_index = self.selected_transfer_index.saturating_sub(n);
            }
            View::Analytics => {}
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        match self.current_view {
            View::Map | View::Instances => self.selected_instance_index = 0,
            View::Workflows => self.selected_workflow_index = 0,
            View::Transfers => self.selected_transfer_index = 0,
            View::Analytics => {}
        }
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let Some(ref data) = self.data else { return };
        let s = &data.snapshot;
        match self.current_view {
            View::Map => {
                self.selected_instance_index = s.instances.len().saturating_sub(1);
            }
            View::Instances => {
                self.selected_instance_index = self.filtered_instance_count(data).saturating_sub(1);
            }
            View::Workflows => {
                self.selected_workflow_index = s.workflows.len().saturating_sub(1);
            }
            View::Transfers => {
                self.selected_transfer_index = s.transfers.len().saturating_sub(1);
            }
            View::Analytics => {}
        }
    }

    /// Get count of instances after applying filter.
    fn filtered_instance_count(&self, data: &TopologyData) -> usize {
        data.snapshot
            .instances
            .iter()
            .filter(|i| {
                self.matches_filter(&i.name)
                    || self.matches_filter(&i.country)
                    || self.matches_filter(&i.region)
            })
            .count()
    }

    /// Get the actual instance index from the visual index.
    ///
    /// The Instances view applies sorting and filtering, so the visual row
    /// differs from the raw index into `snapshot.instances`. The Map view
    /// navigates the raw order directly.
    pub fn selected_instance_raw_index(&self) -> Option<usize> {
        let data = self.data.as_ref()?;
        let s = &data.snapshot;

        match self.current_view {
            View::Instances => {
                let mut rows: Vec<(usize, &crate::data::Instance)> = s
                    .instances
                    .iter()
                    .enumerate()
                    .filter(|(_, i)| {
                        self.matches_filter(&i.name)
                            || self.matches_filter(&i.country)
                            || self.matches_filter(&i.region)
                    })
                    .collect();
                crate::ui::instances::sort_instances_by(
                    &mut rows,
                    s,
                    self.sort_column,
                    self.sort_ascending,
                );
                rows.get(self.selected_instance_index).map(|(idx, _)| *idx)
            }
            _ => {
                if self.selected_instance_index < s.instances.len() {
                    Some(self.selected_instance_index)
                } else {
                    None
                }
            }
        }
    }

    /// The currently selected instance id, if any.
    pub fn selected_instance_id(&self) -> Option<&str> {
        let idx = self.selected_instance_raw_index()?;
        let data = self.data.as_ref()?;
        data.snapshot.instances.get(idx).map(|i| i.id.as_str())
    }

    /// Open the detail overlay for the current selection.
    pub fn enter_detail(&mut self) {
        if self.current_view != View::Analytics {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to the map.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        if self.current_view != View::Map {
            self.current_view = View::Map;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column (Instances view).
    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Instances {
            self.sort_column = self.sort_column.next();
        }
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Instances {
            self.sort_ascending = !self.sort_ascending;
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current network state to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        let s = &data.snapshot;
        let health = NetworkHealth::compute(s);

        let instances: Vec<serde_json::Value> = s
            .instances
            .iter()
            .map(|i| {
                serde_json::json!({
                    "id": i.id,
                    "name": i.name,
                    "country": i.country,
                    "status": classify(&i.id, s).label(),
                    "tasks": i.metrics.task_count,
                })
            })
            .collect();

        let export = serde_json::json!({
            "summary": {
                "total_instances": health.total,
                "healthy": health.healthy,
                "processing": health.processing,
                "unhealthy": health.unhealthy,
                "active_workflows": health.active_workflows,
                "active_transfers": health.active_transfers,
                "health_score": health.score(),
            },
            "instances": instances,
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DemoSource, FileSource};

    fn demo_app() -> App {
        App::new(
            Box::new(DemoSource::new(42)),
            Thresholds::default(),
            PollSettings::default(),
        )
    }

    #[test]
    fn test_view_cycle_round_trips() {
        let mut view = View::Map;
        for _ in 0..5 {
            view = view.next();
        }
        assert_eq!(view, View::Map);
        assert_eq!(View::Map.prev(), View::Analytics);
    }

    #[test]
    fn test_reload_replaces_snapshot_wholesale() {
        let mut app = demo_app();
        assert!(app.reload_data().unwrap());
        let first_ids: Vec<String> = app
            .data
            .as_ref()
            .unwrap()
            .snapshot
            .workflows
            .iter()
            .map(|w| w.id.clone())
            .collect();

        assert!(app.reload_data().unwrap());
        let second_ids: Vec<String> = app
            .data
            .as_ref()
            .unwrap()
            .snapshot
            .workflows
            .iter()
            .map(|w| w.id.clone())
            .collect();

        // New tick, new run ids; nothing merged over from the old snapshot
        assert_ne!(first_ids, second_ids);
    }

    #[test]
    fn test_selection_clamped_on_reload() {
        let mut app = demo_app();
        app.reload_data().unwrap();
        app.current_view = View::Transfers;
        app.selected_transfer_index = 999;
        app.reload_data().unwrap();
        let count = app.data.as_ref().unwrap().snapshot.transfers.len();
        assert!(app.selected_transfer_index < count);
    }

    #[test]
    fn test_real_time_toggle_changes_interval() {
        let mut app = demo_app();
        let normal = app.refresh_interval();
        app.toggle_real_time();
        let fast = app.refresh_interval();
        assert!(fast < normal);
    }

    #[test]
    fn test_selected_instance_id_follows_map_order() {
        let mut app = demo_app();
        app.reload_data().unwrap();
        app.select_next();
        let idx = app.selected_instance_index;
        let expected = app.data.as_ref().unwrap().snapshot.instances[idx].id.clone();
        assert_eq!(app.selected_instance_id(), Some(expected.as_str()));
    }

    #[test]
    fn test_retry_recovers_after_transient_file_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();

        let mut app = App::new(
            Box::new(FileSource::new(file.path())),
            Thresholds::default(),
            PollSettings::default(),
        );

        assert!(!app.reload_data().unwrap());
        assert!(app.load_error.is_some());

        // Fix the file on disk; the next reload must re-read it
        std::fs::write(
            file.path(),
            r#"{ "instances": [ { "id": "elixir-cz", "name": "TESK Production" } ] }"#,
        )
        .unwrap();

        assert!(app.reload_data().unwrap());
        assert!(app.load_error.is_none());
        assert_eq!(app.data.unwrap().snapshot.instances.len(), 1);
    }

    #[test]
    fn test_filter_with_no_matches_yields_empty_selection() {
        let mut app = demo_app();
        app.reload_data().unwrap();
        app.current_view = View::Instances;
        app.filter_text = "zzzz".into();

        // Empty result set, no panic, nothing selectable
        assert_eq!(app.selected_instance_raw_index(), None);
        assert_eq!(app.selected_instance_id(), None);
        app.select_last();
        assert_eq!(app.selected_instance_index, 0);
    }

    #[test]
    fn test_filter_matches_case_insensitive() {
        let mut app = demo_app();
        app.filter_text = "finland".into();
        assert!(app.matches_filter("Finland"));
        assert!(!app.matches_filter("Czech Republic"));
    }
}
