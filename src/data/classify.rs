//! Derived status classification for instances.
//!
//! An instance is shown as processing whenever any active workflow path or
//! active transfer endpoint references it; otherwise it falls back to its
//! declared baseline. The classification is a pure scan over the current
//! snapshot, recomputed on every render — O(instances x workflows) with no
//! memoization, which is fine at the collection sizes a TES federation has.

use super::model::{InstanceStatus, TopologySnapshot};

/// Classify a single instance against the current snapshot.
///
/// Returns [`InstanceStatus::Unknown`] when the id is not present in the
/// snapshot's instance collection at all.
pub fn classify(instance_id: &str, snapshot: &TopologySnapshot) -> InstanceStatus {
    let Some(instance) = snapshot.instance(instance_id) else {
        return InstanceStatus::Unknown;
    };

    if is_referenced_by_active(instance_id, snapshot) {
        return InstanceStatus::Processing;
    }

    instance.baseline()
}

/// Whether any active workflow or transfer references the given instance.
fn is_referenced_by_active(instance_id: &str, snapshot: &TopologySnapshot) -> bool {
    let in_workflow = snapshot
        .workflows
        .iter()
        .any(|w| w.is_active() && w.references(instance_id));
    if in_workflow {
        return true;
    }

    snapshot
        .transfers
        .iter()
        .any(|t| t.status.is_active() && t.references(instance_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{
        Capacity, Instance, InstanceMetrics, RunStatus, Transfer, TransferStatus,
        WorkflowExecution, WorkflowKind,
    };

    fn instance(id: &str, status: Option<InstanceStatus>) -> Instance {
        Instance {
            id: id.into(),
            name: id.into(),
            country: String::new(),
            region: String::new(),
            url: String::new(),
            description: String::new(),
            version: String::new(),
            status,
            coordinates: None,
            capacity: Capacity::default(),
            metrics: InstanceMetrics::default(),
        }
    }

    fn workflow(id: &str, status: RunStatus, path: &[&str]) -> WorkflowExecution {
        WorkflowExecution {
            id: id.into(),
            kind: WorkflowKind::Nextflow,
            status,
            tes_instance: String::new(),
            submitted_at: None,
            path: path.iter().map(|p| p.to_string()).collect(),
            current_step: 0,
            total_steps: 5,
            data_size: String::new(),
            storage_ids: Vec::new(),
            steps: Vec::new(),
        }
    }

    fn transfer(source: &str, dest: &str, status: TransferStatus) -> Transfer {
        Transfer {
            id: "t-1".into(),
            source_id: source.into(),
            destination_id: dest.into(),
            file_name: String::new(),
            size_bytes: 0,
            progress_percent: 0.0,
            speed_bps: 0.0,
            status,
        }
    }

    #[test]
    fn test_running_workflow_marks_instance_processing() {
        // elixir-cz is declared healthy, but a RUNNING workflow traverses it.
        let snapshot = TopologySnapshot {
            instances: vec![instance("elixir-cz", Some(InstanceStatus::Healthy))],
            workflows: vec![workflow("run-1", RunStatus::Running, &["elixir-cz"])],
            ..Default::default()
        };
        assert_eq!(classify("elixir-cz", &snapshot), InstanceStatus::Processing);
    }

    #[test]
    fn test_submitted_workflow_also_counts_as_active() {
        let snapshot = TopologySnapshot {
            instances: vec![instance("elixir-fi", Some(InstanceStatus::Healthy))],
            workflows: vec![workflow("run-1", RunStatus::Submitted, &["elixir-fi"])],
            ..Default::default()
        };
        assert_eq!(classify("elixir-fi", &snapshot), InstanceStatus::Processing);
    }

    #[test]
    fn test_completed_workflow_falls_back_to_baseline() {
        let snapshot = TopologySnapshot {
            instances: vec![instance("elixir-cz", Some(InstanceStatus::Unhealthy))],
            workflows: vec![workflow("run-1", RunStatus::Completed, &["elixir-cz"])],
            ..Default::default()
        };
        assert_eq!(classify("elixir-cz", &snapshot), InstanceStatus::Unhealthy);
    }

    #[test]
    fn test_active_transfer_marks_both_endpoints() {
        let snapshot = TopologySnapshot {
            instances: vec![
                instance("src", Some(InstanceStatus::Healthy)),
                instance("dst", Some(InstanceStatus::Healthy)),
            ],
            transfers: vec![transfer("src", "dst", TransferStatus::Transferring)],
            ..Default::default()
        };
        assert_eq!(classify("src", &snapshot), InstanceStatus::Processing);
        assert_eq!(classify("dst", &snapshot), InstanceStatus::Processing);
    }

    #[test]
    fn test_queued_transfer_does_not_count() {
        let snapshot = TopologySnapshot {
            instances: vec![instance("src", Some(InstanceStatus::Healthy))],
            transfers: vec![transfer("src", "dst", TransferStatus::Queued)],
            ..Default::default()
        };
        assert_eq!(classify("src", &snapshot), InstanceStatus::Healthy);
    }

    #[test]
    fn test_undeclared_baseline_defaults_to_healthy() {
        let snapshot = TopologySnapshot {
            instances: vec![instance("bare", None)],
            ..Default::default()
        };
        assert_eq!(classify("bare", &snapshot), InstanceStatus::Healthy);
    }

    #[test]
    fn test_missing_instance_is_unknown() {
        // Neither the static view's "healthy" nor the live view's
        // "unhealthy" default; an absent id is explicitly unknown.
        let snapshot = TopologySnapshot::default();
        assert_eq!(classify("ghost", &snapshot), InstanceStatus::Unknown);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let snapshot = TopologySnapshot {
            instances: vec![
                instance("a", Some(InstanceStatus::Healthy)),
                instance("b", Some(InstanceStatus::Unhealthy)),
            ],
            workflows: vec![workflow("run-1", RunStatus::Running, &["a"])],
            ..Default::default()
        };

        let first: Vec<_> = snapshot.instances.iter().map(|i| classify(&i.id, &snapshot)).collect();
        let second: Vec<_> = snapshot.instances.iter().map(|i| classify(&i.id, &snapshot)).collect();
        assert_eq!(first, second);
    }
}
