//! Deterministic demo fixtures.
//!
//! The demo source animates the map without any live endpoints: a fixed
//! table of instances and storage locations, plus a seeded generator that
//! rebuilds the workflow and transfer collections from scratch on every
//! tick. Seeding is explicit so two runs with the same seed replay the same
//! sequence of snapshots.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::model::{
    Capacity, Coordinates, Instance, InstanceMetrics, InstanceStatus, RunStatus, StepStatus,
    StorageKind, StorageLocation, TopologySnapshot, Transfer, TransferStatus, WorkflowExecution,
    WorkflowKind, WorkflowStep,
};

/// Workflows fabricated per tick.
const WORKFLOWS_PER_TICK: usize = 10;
/// Transfers fabricated per tick.
const TRANSFERS_PER_TICK: usize = 5;

const DATA_SIZES: [&str; 5] = ["1.2GB", "850MB", "2.8GB", "450MB", "3.4GB"];

const NEXTFLOW_STEPS: [&str; 5] =
    ["Data Ingestion", "Quality Control", "Alignment", "Variant Calling", "Annotation"];
const CWL_STEPS: [&str; 4] = ["Preprocessing", "Analysis", "Validation", "Report Generation"];
const SNAKEMAKE_STEPS: [&str; 4] = ["Data Import", "Processing", "Validation", "Export"];

/// The canonical step names an engine runs through.
pub(crate) fn step_names(kind: WorkflowKind) -> &'static [&'static str] {
    match kind {
        WorkflowKind::Nextflow => &NEXTFLOW_STEPS,
        WorkflowKind::Cwl => &CWL_STEPS,
        WorkflowKind::Snakemake => &SNAKEMAKE_STEPS,
    }
}

/// The fixed demo instance table: real European/North American TES
/// deployments with their geographic coordinates.
pub fn demo_instances() -> Vec<Instance> {
    let make = |id: &str,
                name: &str,
                country: &str,
                region: &str,
                status: InstanceStatus,
                lat: f64,
                lng: f64,
                url: &str,
                description: &str,
                cpu: u32,
                memory: &str,
                storage: &str,
                version: &str,
                tasks: u32| Instance {
        id: id.into(),
        name: name.into(),
        country: country.into(),
        region: region.into(),
        url: url.into(),
        description: description.into(),
        version: version.into(),
        status: Some(status),
        coordinates: Some(Coordinates { lat, lng }),
        capacity: Capacity {
            cpu_cores: cpu,
            memory: memory.into(),
            storage: storage.into(),
        },
        metrics: InstanceMetrics {
            task_count: tasks,
            response_time_ms: 80.0 + f64::from(tasks) * 4.0,
            cpu_percent: f64::from(tasks.min(25)) * 3.0,
            memory_percent: f64::from(tasks.min(25)) * 2.5,
        },
    };

    vec![
        make(
            "elixir-cz",
            "TESK Production",
            "Czech Republic",
            "EU",
            InstanceStatus::Healthy,
            49.75,
            15.5,
            "https://tesk-prod.cloud.e-infra.cz",
            "Primary TESK production instance",
            1000,
            "2TB",
            "10TB",
            "v1.1.0",
            15,
        ),
        make(
            "elixir-fi",
            "TESK/OpenShift @ ELIXIR-FI",
            "Finland",
            "EU",
            InstanceStatus::Processing,
            60.1699,
            24.9384,
            "https://csc-tesk-noauth.rahtiapp.fi/ga4gh/tes",
            "OpenShift-based TESK instance",
            800,
            "1.5TB",
            "8TB",
            "v1.0.8",
            12,
        ),
        make(
            "elixir-gr",
            "TESK/Kubernetes @ ELIXIR-GR",
            "Greece",
            "EU",
            InstanceStatus::Healthy,
            37.9838,
            23.7275,
            "https://tesk.c3g.calculquebec.ca",
            "Kubernetes-based TESK instance",
            600,
            "1TB",
            "5TB",
            "v1.1.2",
            8,
        ),
        make(
            "elixir-ca",
            "TESK North America",
            "Canada",
            "NA",
            InstanceStatus::Healthy,
            45.4215,
            -75.6972,
            "https://tesk-na.cloud.e-infra.cz",
            "North American TESK instance",
            1200,
            "2.5TB",
            "12TB",
            "v1.1.1",
            8,
        ),
        make(
            "funnel-cz",
            "Funnel/OpenPBS @ ELIXIR-CZ",
            "Czech Republic",
            "EU",
            InstanceStatus::Healthy,
            50.0755,
            14.4378,
            "https://funnel.cloud.e-infra.cz",
            "Funnel with OpenPBS backend",
            1500,
            "3TB",
            "15TB",
            "v0.10.1",
            20,
        ),
        make(
            "funnel-fi",
            "Funnel/Slurm @ ELIXIR-FI",
            "Finland",
            "EU",
            InstanceStatus::Processing,
            61.4978,
            23.761,
            "https://vm4816.kaj.pouta.csc.fi",
            "Funnel with Slurm backend",
            900,
            "1.8TB",
            "9TB",
            "v0.10.0",
            16,
        ),
        make(
            "tes-gateway",
            "TES Gateway",
            "Global",
            "Global",
            InstanceStatus::Healthy,
            0.0,
            0.0,
            "https://tes.prodrun.cloud",
            "Central TES Gateway for federated execution",
            2000,
            "4TB",
            "20TB",
            "v2.0.0",
            45,
        ),
        make(
            "elixir-nl",
            "TESK @ SURF",
            "Netherlands",
            "EU",
            InstanceStatus::Healthy,
            52.3667,
            4.8945,
            "https://tesk.surf.nl/ga4gh/tes",
            "SURF-hosted TESK instance",
            700,
            "1.2TB",
            "6TB",
            "v1.0.9",
            10,
        ),
        make(
            "elixir-uk",
            "TESK @ EBI",
            "United Kingdom",
            "EU",
            InstanceStatus::Processing,
            52.0799,
            0.1827,
            "https://tes.ebi.ac.uk/ga4gh/tes",
            "EBI-hosted TESK instance",
            1100,
            "2.2TB",
            "11TB",
            "v1.1.0",
            14,
        ),
    ]
}

/// The fixed demo storage table.
pub fn demo_storage() -> Vec<StorageLocation> {
    let make = |id: &str,
                name: &str,
                kind: StorageKind,
                location: &str,
                lat: f64,
                lng: f64,
                capacity: &str,
                usage: f64| StorageLocation {
        id: id.into(),
        name: name.into(),
        kind,
        location: location.into(),
        coordinates: Coordinates { lat, lng },
        capacity: capacity.into(),
        usage_percent: usage,
    };

    vec![
        make(
            "storage-eu-central",
            "EU Central Storage",
            StorageKind::S3,
            "Frankfurt, Germany",
            50.1109,
            8.6821,
            "500TB",
            65.0,
        ),
        make(
            "storage-eu-north",
            "EU North Storage",
            StorageKind::MinIO,
            "Stockholm, Sweden",
            59.3293,
            18.0686,
            "300TB",
            45.0,
        ),
        make(
            "storage-na-east",
            "NA East Storage",
            StorageKind::S3,
            "Virginia, USA",
            39.0458,
            -76.6413,
            "800TB",
            78.0,
        ),
        make(
            "storage-na-west",
            "NA West Storage",
            StorageKind::Hdfs,
            "California, USA",
            37.7749,
            -122.4194,
            "1.2PB",
            52.0,
        ),
        make(
            "storage-global",
            "Global Cache Hub",
            StorageKind::MinIO,
            "London, UK",
            51.5074,
            -0.1278,
            "2PB",
            34.0,
        ),
    ]
}

/// Seeded generator for demo workflow/transfer collections.
///
/// Each call to [`FixtureGenerator::snapshot`] fabricates a fresh snapshot;
/// nothing carries over between ticks except the rng state, so the whole
/// sequence is a function of the seed.
#[derive(Debug)]
pub struct FixtureGenerator {
    rng: StdRng,
    tick: u64,
}

impl FixtureGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
        }
    }

    /// Build the next snapshot in the sequence.
    pub fn snapshot(&mut self) -> TopologySnapshot {
        let instances = demo_instances();
        let storage = demo_storage();

        let instance_ids: Vec<String> = instances.iter().map(|i| i.id.clone()).collect();
        let storage_ids: Vec<String> = storage.iter().map(|s| s.id.clone()).collect();

        let workflows = (0..WORKFLOWS_PER_TICK)
            .map(|i| self.workflow(i, &instance_ids, &storage_ids))
            .collect();
        let transfers = (0..TRANSFERS_PER_TICK)
            .map(|i| self.transfer(i, &instance_ids, &storage_ids))
            .collect();

        self.tick += 1;

        TopologySnapshot {
            instances,
            storage,
            workflows,
            transfers,
        }
    }

    fn workflow(
        &mut self,
        index: usize,
        instance_ids: &[String],
        storage_ids: &[String],
    ) -> WorkflowExecution {
        let kind = match self.rng.gen_range(0..3) {
            0 => WorkflowKind::Nextflow,
            1 => WorkflowKind::Cwl,
            _ => WorkflowKind::Snakemake,
        };

        // The first few runs are always active so the map has something
        // to animate; the rest settle into terminal states.
        let status = if index < 3 {
            RunStatus::Running
        } else {
            match self.rng.gen_range(0..5) {
                0 | 1 => RunStatus::Submitted,
                2 | 3 => RunStatus::Completed,
                _ => RunStatus::Failed,
            }
        };

        let path = self.pick_path(instance_ids);
        let steps = self.steps(kind, status, &path);
        let total_steps = steps.len() as u32;
        let current_step = steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Completed | StepStatus::Running))
            .count() as u32;

        let storage_count = (index % 3) + 1;
        let storage_refs = storage_ids.iter().take(storage_count).cloned().collect();

        WorkflowExecution {
            id: format!("run-{:04}-{}", self.tick, index),
            kind,
            status,
            tes_instance: path.first().cloned().unwrap_or_default(),
            submitted_at: None,
            path,
            current_step,
            total_steps,
            data_size: DATA_SIZES[index % DATA_SIZES.len()].into(),
            storage_ids: storage_refs,
            steps,
        }
    }

    /// Pick a 2-3 hop path of distinct instance ids.
    fn pick_path(&mut self, instance_ids: &[String]) -> Vec<String> {
        let hops = self.rng.gen_range(2..=3usize).min(instance_ids.len());
        let mut path = Vec::with_capacity(hops);
        while path.len() < hops {
            let candidate = &instance_ids[self.rng.gen_range(0..instance_ids.len())];
            if !path.contains(candidate) {
                path.push(candidate.clone());
            }
        }
        path
    }

    fn steps(
        &mut self,
        kind: WorkflowKind,
        status: RunStatus,
        path: &[String],
    ) -> Vec<WorkflowStep> {
        let names = step_names(kind);

        names
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
                let duration_secs =
                    if matches!(step_status, StepStatus::Completed | StepStatus::Running) {
                        self.rng.gen_range(60..660)
                    } else {
                        0
                    };
                WorkflowStep {
                    name: (*name).into(),
                    status: step_status,
                    duration_secs,
                    instance_id: path[i % path.len()].clone(),
                }
            })
            .collect()
    }

    fn transfer(
        &mut self,
        index: usize,
        instance_ids: &[String],
        storage_ids: &[String],
    ) -> Transfer {
        let source = instance_ids[self.rng.gen_range(0..instance_ids.len())].clone();
        let destination = storage_ids[self.rng.gen_range(0..storage_ids.len())].clone();
        let status = if self.rng.gen_bool(0.7) {
            TransferStatus::Transferring
        } else {
            TransferStatus::Completed
        };
        let progress = if status == TransferStatus::Completed {
            100.0
        } else {
            self.rng.gen_range(0.0..100.0)
        };

        Transfer {
            id: format!("transfer-{:04}-{}", self.tick, index),
            source_id: source,
            destination_id: destination,
            file_name: format!("dataset-{}.tar", index),
            size_bytes: self.rng.gen_range(1..50) * 1024 * 1024 * 1024,
            progress_percent: progress,
            speed_bps: self.rng.gen_range(1.0..150.0) * 1024.0 * 1024.0,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = FixtureGenerator::new(42);
        let mut b = FixtureGenerator::new(42);

        for _ in 0..3 {
            let sa = a.snapshot();
            let sb = b.snapshot();
            assert_eq!(
                serde_json::to_string(&sa).unwrap(),
                serde_json::to_string(&sb).unwrap()
            );
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = FixtureGenerator::new(1);
        let mut b = FixtureGenerator::new(2);
        assert_ne!(
            serde_json::to_string(&a.snapshot()).unwrap(),
            serde_json::to_string(&b.snapshot()).unwrap()
        );
    }

    #[test]
    fn test_generated_paths_reference_known_instances() {
        let mut generator = FixtureGenerator::new(7);
        let snapshot = generator.snapshot();

        for workflow in &snapshot.workflows {
            assert!(workflow.path.len() >= 2);
            for hop in &workflow.path {
                assert!(snapshot.instance(hop).is_some(), "unknown hop {hop}");
            }
        }
        for transfer in &snapshot.transfers {
            assert!(snapshot.instance(&transfer.source_id).is_some());
            assert!(snapshot.storage_by_id(&transfer.destination_id).is_some());
        }
    }

    #[test]
    fn test_first_three_workflows_are_running() {
        let mut generator = FixtureGenerator::new(0);
        let snapshot = generator.snapshot();
        for workflow in snapshot.workflows.iter().take(3) {
            assert_eq!(workflow.status, RunStatus::Running);
        }
    }

    #[test]
    fn test_step_counters_match_step_list() {
        let mut generator = FixtureGenerator::new(3);
        let snapshot = generator.snapshot();
        for workflow in &snapshot.workflows {
            assert_eq!(workflow.total_steps as usize, workflow.steps.len());
            assert!(workflow.current_step <= workflow.total_steps);
        }
    }
}
