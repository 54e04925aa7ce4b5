//! Core domain types for topology snapshots.
//!
//! A [`TopologySnapshot`] is the wholesale unit of replacement: every poll
//! cycle produces a complete new snapshot and derived state is recomputed
//! from scratch. Nothing in here is ever patched in place.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Classified status of a TES instance.
///
/// `Processing` is derived (an active workflow or transfer references the
/// instance), the others come from the declared baseline. `Unknown` is
/// returned for lookups of ids absent from the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Healthy,
    Processing,
    Unhealthy,
    Unknown,
}

impl InstanceStatus {
    /// Returns a short symbol for table display.
    pub fn symbol(&self) -> &'static str {
        match self {
            InstanceStatus::Healthy => "OK",
            InstanceStatus::Processing => "BUSY",
            InstanceStatus::Unhealthy => "DOWN",
            InstanceStatus::Unknown => "?",
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            InstanceStatus::Healthy => "Healthy",
            InstanceStatus::Processing => "Processing",
            InstanceStatus::Unhealthy => "Unhealthy",
            InstanceStatus::Unknown => "Unknown",
        }
    }
}

/// Storage usage tier for progress-bar colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageTier {
    Normal,
    Warning,
    Critical,
}

/// Thresholds for storage usage tiering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Usage percentage above which a storage location enters the warning tier.
    pub usage_warning: f64,
    /// Usage percentage above which a storage location is critical.
    pub usage_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            usage_warning: 80.0,
            usage_critical: 95.0,
        }
    }
}

impl Thresholds {
    /// Tier a usage percentage. The warning tier engages only strictly above
    /// the warning threshold, so 80% itself is still the normal tier.
    pub fn usage_tier(&self, percent: f64) -> UsageTier {
        if percent > self.usage_critical {
            UsageTier::Critical
        } else if percent > self.usage_warning {
            UsageTier::Warning
        } else {
            UsageTier::Normal
        }
    }
}

/// Workflow engine kind, a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    #[serde(alias = "CWL")]
    Cwl,
    #[serde(alias = "Nextflow", alias = "NEXTFLOW")]
    Nextflow,
    #[serde(alias = "Snakemake", alias = "SNAKEMAKE")]
    Snakemake,
}

impl WorkflowKind {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowKind::Cwl => "CWL",
            WorkflowKind::Nextflow => "Nextflow",
            WorkflowKind::Snakemake => "Snakemake",
        }
    }
}

/// Lifecycle status of a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Submitted,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// Active runs are the ones that mark their path instances as processing.
    pub fn is_active(&self) -> bool {
        matches!(self, RunStatus::Submitted | RunStatus::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Submitted => "SUBMITTED",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
        }
    }
}

/// Status of a single workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    S3,
    MinIO,
    Hdfs,
    Nfs,
}

impl StorageKind {
    pub fn label(&self) -> &'static str {
        match self {
            StorageKind::S3 => "S3",
            StorageKind::MinIO => "MinIO",
            StorageKind::Hdfs => "HDFS",
            StorageKind::Nfs => "NFS",
        }
    }
}

/// Geographic coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Declared capacity of a compute instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capacity {
    pub cpu_cores: u32,
    pub memory: String,
    pub storage: String,
}

/// Per-instance metrics from the discovery/metrics service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceMetrics {
    pub task_count: u32,
    pub response_time_ms: f64,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// A TES compute endpoint.
///
/// Defined at load (demo source) or received from discovery (http source);
/// never mutated except by wholesale replacement on the next poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    /// Declared baseline status; `None` means undeclared (treated as healthy).
    #[serde(default)]
    pub status: Option<InstanceStatus>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub capacity: Capacity,
    #[serde(default)]
    pub metrics: InstanceMetrics,
}

impl Instance {
    /// Declared baseline status, defaulting to healthy when undeclared.
    pub fn baseline(&self) -> InstanceStatus {
        self.status.unwrap_or(InstanceStatus::Healthy)
    }
}

/// One step of a workflow execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub status: StepStatus,
    pub duration_secs: u64,
    pub instance_id: String,
}

/// One run of a multi-step pipeline traversing one or more instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: String,
    pub kind: WorkflowKind,
    pub status: RunStatus,
    /// Name of the instance the run was submitted to.
    pub tes_instance: String,
    #[serde(default)]
    pub submitted_at: Option<String>,
    /// Ordered path of instance ids the execution traverses.
    pub path: Vec<String>,
    pub current_step: u32,
    pub total_steps: u32,
    #[serde(default)]
    pub data_size: String,
    #[serde(default)]
    pub storage_ids: Vec<String>,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowExecution {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether this execution's path includes the given instance id.
    pub fn references(&self, instance_id: &str) -> bool {
        self.path.iter().any(|p| p == instance_id)
    }
}

/// A storage endpoint. Static, read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: String,
    pub name: String,
    pub kind: StorageKind,
    pub location: String,
    pub coordinates: Coordinates,
    pub capacity: String,
    pub usage_percent: f64,
}

/// Lifecycle status of a data transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Queued,
    Transferring,
    Completed,
    Failed,
}

impl TransferStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, TransferStatus::Transferring)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransferStatus::Queued => "queued",
            TransferStatus::Transferring => "transferring",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
        }
    }
}

/// One in-progress data movement between an instance and a storage endpoint
/// (or another instance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub source_id: String,
    pub destination_id: String,
    #[serde(default)]
    pub file_name: String,
    pub size_bytes: u64,
    pub progress_percent: f64,
    /// Transfer speed in bytes per second.
    pub speed_bps: f64,
    pub status: TransferStatus,
}

impl Transfer {
    /// Whether this transfer's endpoints include the given instance id.
    pub fn references(&self, instance_id: &str) -> bool {
        self.source_id == instance_id || self.destination_id == instance_id
    }
}

/// Complete network state for one poll cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySnapshot {
    pub instances: Vec<Instance>,
    pub storage: Vec<StorageLocation>,
    pub workflows: Vec<WorkflowExecution>,
    pub transfers: Vec<Transfer>,
}

impl TopologySnapshot {
    pub fn instance(&self, id: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn storage_by_id(&self, id: &str) -> Option<&StorageLocation> {
        self.storage.iter().find(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.storage.is_empty()
    }
}

/// A snapshot paired with its arrival time, ready for display.
#[derive(Debug, Clone)]
pub struct TopologyData {
    pub snapshot: TopologySnapshot,
    pub last_updated: Instant,
}

impl TopologyData {
    pub fn from_snapshot(snapshot: TopologySnapshot) -> Self {
        Self {
            snapshot,
            last_updated: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_tier_thresholds() {
        let thresholds = Thresholds::default();

        // The warning tier engages only above 80%.
        assert_eq!(thresholds.usage_tier(65.0), UsageTier::Normal);
        assert_eq!(thresholds.usage_tier(80.0), UsageTier::Normal);
        assert_eq!(thresholds.usage_tier(81.0), UsageTier::Warning);
        assert_eq!(thresholds.usage_tier(96.0), UsageTier::Critical);
    }

    #[test]
    fn test_baseline_defaults_to_healthy() {
        let instance = Instance {
            id: "test".into(),
            name: "Test".into(),
            country: String::new(),
            region: String::new(),
            url: String::new(),
            description: String::new(),
            version: String::new(),
            status: None,
            coordinates: None,
            capacity: Capacity::default(),
            metrics: InstanceMetrics::default(),
        };
        assert_eq!(instance.baseline(), InstanceStatus::Healthy);
    }

    #[test]
    fn test_deserialize_snapshot() {
        let json = r#"{
            "instances": [
                {
                    "id": "elixir-cz",
                    "name": "TESK Production",
                    "country": "Czech Republic",
                    "status": "healthy",
                    "coordinates": { "lat": 49.75, "lng": 15.5 }
                }
            ],
            "workflows": [
                {
                    "id": "run-1",
                    "kind": "nextflow",
                    "status": "RUNNING",
                    "tes_instance": "TESK Production",
                    "path": ["elixir-cz"],
                    "current_step": 2,
                    "total_steps": 5
                }
            ]
        }"#;

        let snapshot: TopologySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.instances.len(), 1);
        assert_eq!(snapshot.workflows.len(), 1);
        assert!(snapshot.workflows[0].is_active());
        assert!(snapshot.workflows[0].references("elixir-cz"));
        assert!(snapshot.instance("elixir-cz").is_some());
        assert!(snapshot.instance("missing").is_none());
    }
}
