// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # tesmap
//!
//! A terminal dashboard and library for monitoring a federated GA4GH TES
//! (Task Execution Service) network.
//!
//! Topology snapshots arrive from a data source (demo fixtures, a JSON
//! file, an HTTP endpoint, or an in-memory channel), get classified and
//! aggregated, and are rendered as an interactive terminal UI with a
//! world-map view.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(classify)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── DemoSource | FileSource | HttpSource       │
//! │  │ (input) │               | ChannelSource                 │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with implementations
//!   for seeded demo data, file polling, HTTP polling, and channel-based input
//! - **[`data`]**: Data models and processing - pure status classification,
//!   network-wide aggregation, deterministic fixtures, and trend history
//! - **[`ui`]**: Terminal rendering using ratatui - the map canvas, instance
//!   tables, workflow and transfer views, and theme support
//! - **[`settings`]**: Layered configuration (defaults, file, environment)
//!
//! ## Status classification
//!
//! An instance's displayed status is derived, not stored: any active
//! workflow whose path includes the instance, or any in-flight transfer
//! touching it, shows the instance as processing. Otherwise the declared
//! baseline applies. Looking up an id that is absent from the snapshot
//! yields an explicit unknown status.
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Demo mode with deterministic data
//! tesmap --seed 42
//!
//! # Poll a topology JSON file
//! tesmap --file topology.json
//!
//! # Poll a live dashboard service
//! tesmap --endpoint http://localhost:8080
//! ```
//!
//! ### As a library with the demo source
//!
//! ```
//! use tesmap::{App, DemoSource, PollSettings, Thresholds};
//!
//! let source = Box::new(DemoSource::new(42));
//! let app = App::new(source, Thresholds::default(), PollSettings::default());
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use tesmap::{App, ChannelSource, PollSettings, Thresholds};
//!
//! // Create a channel for pushing snapshots from your own producer
//! let (tx, source) = ChannelSource::create("my-producer");
//! let app = App::new(Box::new(source), Thresholds::default(), PollSettings::default());
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    classify, FixtureGenerator, Instance, InstanceStatus, NetworkHealth, Thresholds,
    TopologyData, TopologySnapshot, Transfer, WorkflowExecution,
};
pub use settings::{PollSettings, Settings};
pub use source::{ChannelSource, DataSource, DemoSource, FileSource, HttpSource, SourceError};
