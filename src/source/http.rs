//! HTTP polling data source.
//!
//! Polls a dashboard service for live topology data: the instance catalog
//! from `/api/tes_locations` and the current workflow runs from
//! `/api/dashboard_data`. The poll task is spawned by [`HttpSource::start`]
//! and torn down by [`HttpSource::stop`] (or drop); nothing lives in module
//! globals, so tests and embedders can run several sources side by side.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::data::fixture;
use crate::data::model::{
    Capacity, Coordinates, Instance, InstanceMetrics, InstanceStatus, RunStatus, StepStatus,
    TopologySnapshot, WorkflowExecution, WorkflowKind, WorkflowStep,
};

use super::{ChannelSource, DataSource};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching topology data over HTTP.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

/// Run record as served by the dashboard endpoint.
///
/// Single workflow runs carry the engine under `type`, batch runs under
/// `workflow_type`; both shapes land in the same record.
#[derive(Debug, Deserialize)]
struct RunRecord {
    run_id: String,
    #[serde(default, alias = "type")]
    workflow_type: Option<WorkflowKind>,
    status: RunStatus,
    #[serde(default)]
    submitted_at: Option<String>,
    #[serde(default)]
    tes_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DashboardPayload {
    #[serde(default)]
    workflow_runs: Vec<RunRecord>,
    #[serde(default)]
    batch_runs: Vec<RunRecord>,
}

/// Instance record as served by the discovery endpoint.
///
/// Coordinates arrive flat as `lat`/`lng` and the status is a free-form
/// string, so the record is mapped into [`Instance`] by hand rather than
/// deserialized directly.
#[derive(Debug, Deserialize)]
struct LocationRecord {
    id: String,
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    status: Option<String>,
}

impl LocationRecord {
    fn into_instance(self) -> Instance {
        let coordinates = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };
        Instance {
            id: self.id,
            name: self.name,
            country: self.country,
            region: self.region,
            url: self.url,
            description: self.description,
            version: String::new(),
            status: self.status.as_deref().and_then(baseline_from_str),
            coordinates,
            capacity: Capacity::default(),
            metrics: InstanceMetrics::default(),
        }
    }
}

/// Map the service's free-form status strings onto a declared baseline.
///
/// The discovery endpoint reports "unreachable" for instances it cannot
/// contact and "unknown" when it has no location record; anything
/// unrecognized leaves the baseline undeclared.
fn baseline_from_str(status: &str) -> Option<InstanceStatus> {
    match status {
        "healthy" => Some(InstanceStatus::Healthy),
        "processing" => Some(InstanceStatus::Processing),
        "unhealthy" | "unreachable" => Some(InstanceStatus::Unhealthy),
        _ => None,
    }
}

/// A data source that polls an HTTP endpoint on a fixed interval.
///
/// `start` spawns a background task on the current tokio runtime; snapshots
/// flow to the TUI through a watch channel, errors through a second one.
/// The most recent fetch error (if any) is what `error()` reports, and it
/// clears on the next successful fetch.
#[derive(Debug)]
pub struct HttpSource {
    inner: ChannelSource,
    last_error: watch::Receiver<Option<String>>,
    handle: JoinHandle<()>,
    description: String,
}

impl HttpSource {
    /// Start polling the given endpoint.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(endpoint: &str, interval: Duration) -> Self {
        let base = endpoint.trim_end_matches('/').to_string();
        let (tx, rx) = watch::channel(TopologySnapshot::default());
        let (err_tx, err_rx) = watch::channel(None);
        let inner = ChannelSource::new(rx, &base);
        let description = format!("http: {}", base);

        let poll_base = base.clone();
        let handle = tokio::spawn(async move {
            let client = match reqwest::Client::builder().timeout(HTTP_TIMEOUT).build() {
                Ok(client) => client,
                Err(e) => {
                    let _ = err_tx.send(Some(format!("HTTP client init failed: {}", e)));
                    return;
                }
            };
            poll_loop(client, poll_base, interval, tx, err_tx).await;
        });

        Self {
            inner,
            last_error: err_rx,
            handle,
            description,
        }
    }

    /// Stop the background poll task.
    ///
    /// Idempotent; polling after stop simply yields no further snapshots.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl DataSource for HttpSource {
    fn poll(&mut self) -> Option<TopologySnapshot> {
        self.inner.poll()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }
}

async fn poll_loop(
    client: reqwest::Client,
    base: String,
    interval: Duration,
    tx: watch::Sender<TopologySnapshot>,
    err_tx: watch::Sender<Option<String>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match fetch_snapshot(&client, &base).await {
            Ok(snapshot) => {
                debug!(
                    instances = snapshot.instances.len(),
                    workflows = snapshot.workflows.len(),
                    "fetched topology"
                );
                let _ = err_tx.send(None);
                if tx.send(snapshot).is_err() {
                    // Receiver dropped, dashboard is gone
                    break;
                }
            }
            Err(e) => {
                warn!(endpoint = %base, error = %e, "topology fetch failed");
                let _ = err_tx.send(Some(e.to_string()));
            }
        }
    }
}

async fn fetch_snapshot(
    client: &reqwest::Client,
    base: &str,
) -> Result<TopologySnapshot, SourceError> {
    let locations: Vec<LocationRecord> = client
        .get(format!("{}/api/tes_locations", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let instances: Vec<Instance> =
        locations.into_iter().map(LocationRecord::into_instance).collect();

    let dashboard: DashboardPayload = client
        .get(format!("{}/api/dashboard_data", base))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(assemble_snapshot(instances, dashboard))
}

/// Combine the two payloads into one snapshot.
///
/// The storage catalog is deployment configuration rather than live state,
/// so it comes from the built-in table. Transfers are not exposed by the
/// service; live mode shows workflow traffic only.
fn assemble_snapshot(instances: Vec<Instance>, dashboard: DashboardPayload) -> TopologySnapshot {
    let workflows = dashboard
        .workflow_runs
        .into_iter()
        .chain(dashboard.batch_runs)
        .map(|run| workflow_from_run(run, &instances))
        .collect();

    TopologySnapshot {
        storage: fixture::demo_storage(),
        instances,
        workflows,
        transfers: Vec::new(),
    }
}

fn workflow_from_run(run: RunRecord, instances: &[Instance]) -> WorkflowExecution {
    let kind = run.workflow_type.unwrap_or(WorkflowKind::Nextflow);
    let tes_instance = run.tes_name.unwrap_or_default();

    // Runs name their home instance; resolve that to an id for the path.
    // A name we cannot resolve leaves the path empty and the run is simply
    // not drawn on the map.
    let path: Vec<String> = instances
        .iter()
        .find(|i| i.name == tes_instance || i.id == tes_instance)
        .map(|i| vec![i.id.clone()])
        .unwrap_or_default();

    let steps = steps_for(kind, run.status, &path);
    let total_steps = steps.len() as u32;
    let current_step = steps
        .iter()
        .filter(|s| matches!(s.status, StepStatus::Completed | StepStatus::Running))
        .count() as u32;

    WorkflowExecution {
        id: run.run_id,
        kind,
        status: run.status,
        tes_instance,
        submitted_at: run.submitted_at,
        path,
        current_step,
        total_steps,
        data_size: String::new(),
        storage_ids: Vec::new(),
        steps,
    }
}

/// Derive per-step statuses from the run-level status.
///
/// The service reports runs, not steps; the step list shown in the detail
/// view is inferred from the engine's canonical pipeline.
fn steps_for(kind: WorkflowKind, status: RunStatus, path: &[String]) -> Vec<WorkflowStep> {
    fixture::step_names(kind)
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let step_status = match status {
                RunStatus::Completed => StepStatus::Completed,
                RunStatus::Running if i < 2 => StepStatus::Completed,
                RunStatus::Running if i == 2 => StepStatus::Running,
                RunStatus::Failed if i == 1 => StepStatus::Failed,
                _ => StepStatus::Pending,
            };
            WorkflowStep {
                name: (*name).to_string(),
                status: step_status,
                duration_secs: 0,
                instance_id: path.get(i % path.len().max(1)).cloned().unwrap_or_default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixture::demo_instances;

    fn run(status: RunStatus, tes_name: &str) -> RunRecord {
        RunRecord {
            run_id: "run-abc".into(),
            workflow_type: Some(WorkflowKind::Nextflow),
            status,
            submitted_at: Some("2026-08-30T12:00:00Z".into()),
            tes_name: Some(tes_name.into()),
        }
    }

    #[test]
    fn test_deserialize_dashboard_payload() {
        // Shape as the service serves it: workflow runs keyed by `type`,
        // batch runs by `workflow_type`, extra keys ignored.
        let json = r#"{
            "tasks": [],
            "workflow_runs": [
                {
                    "run_id": "run-1",
                    "type": "cwl",
                    "tes_url": "https://tesk-prod.cloud.e-infra.cz",
                    "tes_name": "TESK Production",
                    "status": "RUNNING",
                    "submitted_at": "2026-08-30T11:58:02Z",
                    "files": []
                }
            ],
            "batch_runs": [
                { "run_id": "run-2", "workflow_type": "nextflow", "status": "RUNNING" },
                { "run_id": "run-3", "status": "COMPLETED" }
            ],
            "instances_count": 9
        }"#;
        let payload: DashboardPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.workflow_runs.len(), 1);
        assert_eq!(payload.batch_runs.len(), 2);
        assert_eq!(payload.workflow_runs[0].workflow_type, Some(WorkflowKind::Cwl));
        assert_eq!(payload.batch_runs[0].workflow_type, Some(WorkflowKind::Nextflow));
        assert!(payload.batch_runs[1].tes_name.is_none());
    }

    #[test]
    fn test_assemble_merges_workflow_and_batch_runs() {
        let json = r#"{
            "workflow_runs": [ { "run_id": "wf-1", "type": "cwl", "status": "RUNNING" } ],
            "batch_runs": [ { "run_id": "b-1", "workflow_type": "snakemake", "status": "RUNNING" } ]
        }"#;
        let payload: DashboardPayload = serde_json::from_str(json).unwrap();
        let snapshot = assemble_snapshot(demo_instances(), payload);
        let ids: Vec<&str> = snapshot.workflows.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["wf-1", "b-1"]);
        assert_eq!(snapshot.workflows[1].kind, WorkflowKind::Snakemake);
    }

    #[test]
    fn test_deserialize_flat_location_record() {
        // The discovery endpoint serves flat lat/lng and string statuses.
        let json = r#"[
            {
                "id": "elixir-cz",
                "name": "TESK Production",
                "url": "https://tesk-prod.cloud.e-infra.cz",
                "lat": 49.75,
                "lng": 15.5,
                "lon": 15.5,
                "country": "Czech Republic",
                "region": "EU",
                "status": "healthy",
                "instanceType": "compute"
            },
            { "id": "down-site", "name": "Down Site", "status": "unreachable" },
            { "id": "new-site", "name": "New Site", "status": "unknown" }
        ]"#;
        let locations: Vec<LocationRecord> = serde_json::from_str(json).unwrap();
        let instances: Vec<Instance> =
            locations.into_iter().map(LocationRecord::into_instance).collect();

        let coords = instances[0].coordinates.unwrap();
        assert_eq!(coords.lat, 49.75);
        assert_eq!(coords.lng, 15.5);
        assert_eq!(instances[0].status, Some(InstanceStatus::Healthy));

        assert!(instances[1].coordinates.is_none());
        assert_eq!(instances[1].status, Some(InstanceStatus::Unhealthy));

        // "unknown" leaves the baseline undeclared rather than failing
        assert_eq!(instances[2].status, None);
    }

    #[test]
    fn test_run_name_resolves_to_instance_id() {
        let instances = demo_instances();
        let workflow = workflow_from_run(run(RunStatus::Running, "TESK Production"), &instances);
        assert_eq!(workflow.path, vec!["elixir-cz".to_string()]);
        assert_eq!(workflow.tes_instance, "TESK Production");
    }

    #[test]
    fn test_unresolvable_run_name_leaves_path_empty() {
        let instances = demo_instances();
        let workflow = workflow_from_run(run(RunStatus::Running, "no-such-site"), &instances);
        assert!(workflow.path.is_empty());
    }

    #[test]
    fn test_step_statuses_follow_run_status() {
        let instances = demo_instances();

        let done = workflow_from_run(run(RunStatus::Completed, "TESK Production"), &instances);
        assert!(done.steps.iter().all(|s| s.status == StepStatus::Completed));
        assert_eq!(done.current_step, done.total_steps);

        let failed = workflow_from_run(run(RunStatus::Failed, "TESK Production"), &instances);
        assert_eq!(failed.steps[1].status, StepStatus::Failed);
        assert_eq!(failed.current_step, 0);

        let active = workflow_from_run(run(RunStatus::Running, "TESK Production"), &instances);
        assert_eq!(active.steps[2].status, StepStatus::Running);
        assert_eq!(active.current_step, 3);
    }

    #[tokio::test]
    async fn test_http_source_reports_connection_error() {
        // Nothing listens on this port; the first fetch fails fast.
        let mut source = HttpSource::start("http://127.0.0.1:9", Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(source.poll().is_none());
        assert!(source.error().is_some());
        source.stop();
    }

    #[tokio::test]
    async fn test_http_source_description() {
        let source = HttpSource::start("http://localhost:8080/", Duration::from_secs(5));
        assert_eq!(source.description(), "http: http://localhost:8080");
        source.stop();
    }
}
