//! Aggregate network health computed from a classified snapshot.

use super::classify::classify;
use super::model::{InstanceStatus, TopologySnapshot};

/// Summary counts and averages for the whole network.
///
/// Pure single-pass reduction over the snapshot; empty collections yield 0
/// for every average rather than dividing by zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkHealth {
    pub total: usize,
    pub healthy: usize,
    pub processing: usize,
    pub unhealthy: usize,
    pub unknown: usize,
    pub active_workflows: usize,
    pub active_transfers: usize,
    pub total_tasks: u64,
    pub avg_response_time_ms: f64,
    pub avg_cpu_percent: f64,
    pub avg_memory_percent: f64,
    /// Summed declared storage capacity in terabytes.
    pub storage_total_tb: f64,
}

impl NetworkHealth {
    /// Compute aggregates from the current snapshot.
    pub fn compute(snapshot: &TopologySnapshot) -> Self {
        let mut health = NetworkHealth {
            total: snapshot.instances.len(),
            ..Default::default()
        };

        let mut response_sum = 0.0;
        let mut cpu_sum = 0.0;
        let mut memory_sum = 0.0;

        for instance in &snapshot.instances {
            match classify(&instance.id, snapshot) {
                InstanceStatus::Healthy => health.healthy += 1,
                InstanceStatus::Processing => health.processing += 1,
                InstanceStatus::Unhealthy => health.unhealthy += 1,
                InstanceStatus::Unknown => health.unknown += 1,
            }
            health.total_tasks += u64::from(instance.metrics.task_count);
            response_sum += instance.metrics.response_time_ms;
            cpu_sum += instance.metrics.cpu_percent;
            memory_sum += instance.metrics.memory_percent;
        }

        if health.total > 0 {
            let n = health.total as f64;
            health.avg_response_time_ms = response_sum / n;
            health.avg_cpu_percent = cpu_sum / n;
            health.avg_memory_percent = memory_sum / n;
        }

        health.active_workflows = snapshot.workflows.iter().filter(|w| w.is_active()).count();
        health.active_transfers =
            snapshot.transfers.iter().filter(|t| t.status.is_active()).count();
        health.storage_total_tb =
            snapshot.storage.iter().map(|s| parse_capacity_tb(&s.capacity)).sum();

        health
    }

    /// Network health score, 0-100: fraction of instances that are healthy.
    pub fn score(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.healthy as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Parse a declared capacity string like "500TB" or "2PB" into terabytes.
///
/// Unparseable strings contribute 0 rather than erroring; capacity labels
/// are display data, not a wire contract.
fn parse_capacity_tb(capacity: &str) -> f64 {
    let numeric: String =
        capacity.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let value: f64 = numeric.parse().unwrap_or(0.0);
    if capacity.contains("PB") {
        value * 1000.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{
        Capacity, Coordinates, Instance, InstanceMetrics, InstanceStatus, RunStatus,
        StorageKind, StorageLocation, WorkflowExecution, WorkflowKind,
    };

    fn instance(id: &str, status: InstanceStatus, tasks: u32, cpu: f64) -> Instance {
        Instance {
            id: id.into(),
            name: id.into(),
            country: String::new(),
            region: String::new(),
            url: String::new(),
            description: String::new(),
            version: String::new(),
            status: Some(status),
            coordinates: None,
            capacity: Capacity::default(),
            metrics: InstanceMetrics {
                task_count: tasks,
                response_time_ms: 100.0,
                cpu_percent: cpu,
                memory_percent: 50.0,
            },
        }
    }

    fn storage(id: &str, capacity: &str) -> StorageLocation {
        StorageLocation {
            id: id.into(),
            name: id.into(),
            kind: StorageKind::S3,
            location: String::new(),
            coordinates: Coordinates { lat: 0.0, lng: 0.0 },
            capacity: capacity.into(),
            usage_percent: 50.0,
        }
    }

    #[test]
    fn test_counts_sum_to_total() {
        let snapshot = TopologySnapshot {
            instances: vec![
                instance("a", InstanceStatus::Healthy, 5, 20.0),
                instance("b", InstanceStatus::Unhealthy, 0, 0.0),
                instance("c", InstanceStatus::Healthy, 3, 40.0),
            ],
            workflows: vec![WorkflowExecution {
                id: "run-1".into(),
                kind: WorkflowKind::Cwl,
                status: RunStatus::Running,
                tes_instance: String::new(),
                submitted_at: None,
                path: vec!["c".into()],
                current_step: 1,
                total_steps: 4,
                data_size: String::new(),
                storage_ids: Vec::new(),
                steps: Vec::new(),
            }],
            ..Default::default()
        };

        let health = NetworkHealth::compute(&snapshot);
        assert_eq!(health.total, 3);
        assert_eq!(
            health.healthy + health.processing + health.unhealthy + health.unknown,
            health.total
        );
        // c is traversed by an active workflow, so it counts as processing.
        assert_eq!(health.processing, 1);
        assert_eq!(health.healthy, 1);
        assert_eq!(health.unhealthy, 1);
        assert_eq!(health.active_workflows, 1);
        assert_eq!(health.total_tasks, 8);
    }

    #[test]
    fn test_empty_snapshot_yields_zero_averages() {
        let health = NetworkHealth::compute(&TopologySnapshot::default());
        assert_eq!(health.total, 0);
        assert_eq!(health.avg_response_time_ms, 0.0);
        assert_eq!(health.avg_cpu_percent, 0.0);
        assert_eq!(health.score(), 0);
    }

    #[test]
    fn test_averages() {
        let snapshot = TopologySnapshot {
            instances: vec![
                instance("a", InstanceStatus::Healthy, 0, 20.0),
                instance("b", InstanceStatus::Healthy, 0, 60.0),
            ],
            ..Default::default()
        };
        let health = NetworkHealth::compute(&snapshot);
        assert_eq!(health.avg_cpu_percent, 40.0);
        assert_eq!(health.avg_response_time_ms, 100.0);
        assert_eq!(health.score(), 100);
    }

    #[test]
    fn test_storage_capacity_units() {
        let snapshot = TopologySnapshot {
            storage: vec![storage("s1", "500TB"), storage("s2", "2PB"), storage("s3", "junk")],
            ..Default::default()
        };
        let health = NetworkHealth::compute(&snapshot);
        assert_eq!(health.storage_total_tb, 2500.0);
    }
}
