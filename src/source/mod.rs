//! Data source abstraction for receiving topology snapshots.
//!
//! This module provides a trait-based abstraction for receiving topology
//! data from various sources (demo fixtures, files, HTTP endpoints, or
//! in-memory channels).

mod channel;
mod demo;
mod file;
mod http;

pub use channel::ChannelSource;
pub use demo::DemoSource;
pub use file::FileSource;
pub use http::{HttpSource, SourceError};

use std::fmt::Debug;

use crate::data::TopologySnapshot;

/// Trait for receiving topology snapshots from various sources.
///
/// Implementations of this trait provide snapshots from different
/// backends - fixture generation, file polling, HTTP polling, or
/// in-memory channels.
///
/// # Example
///
/// ```
/// use tesmap::{DataSource, DemoSource};
///
/// let mut source = DemoSource::new(42);
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} instances", snapshot.instances.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method should be non-blocking. A returned snapshot replaces the
    /// previous one wholesale; sources never merge.
    fn poll(&mut self) -> Option<TopologySnapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if an error occurred during the last poll.
    /// Owned so that sources whose errors live behind a background task can
    /// report them without holding a lock across the call.
    fn error(&self) -> Option<String>;
}
