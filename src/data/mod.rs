//! Data models and processing for topology snapshots.
//!
//! This module handles the transformation of raw topology snapshots into
//! classified, aggregated data suitable for display.
//!
//! ## Submodules
//!
//! - [`model`]: Core data models ([`TopologySnapshot`], [`Instance`], [`Transfer`])
//! - [`classify`]: Pure derived-status classification for instances
//! - [`aggregate`]: Network-wide health summary ([`NetworkHealth`])
//! - [`fixture`]: Deterministic seeded demo data
//! - [`history`]: Historical tracking for sparklines and rate calculations
//!
//! ## Data Flow
//!
//! ```text
//! TopologySnapshot (raw JSON or fixture)
//!        │
//!        ▼
//! TopologyData::from_snapshot()
//!        │
//!        ├──▶ classify() per instance (at render time)
//!        │
//!        ├──▶ NetworkHealth::compute() (header and analytics)
//!        │
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod aggregate;
pub mod classify;
pub mod fixture;
pub mod history;
pub mod model;

pub use aggregate::NetworkHealth;
pub use classify::classify;
pub use fixture::FixtureGenerator;
pub use history::History;
pub use model::{
    Instance, InstanceStatus, RunStatus, StepStatus, StorageKind, StorageLocation, Thresholds,
    TopologyData, TopologySnapshot, Transfer, TransferStatus, UsageTier, WorkflowExecution,
    WorkflowKind,
};
