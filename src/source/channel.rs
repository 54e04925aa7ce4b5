//! Channel-based data source.
//!
//! Receives topology snapshots via a tokio watch channel. This is the
//! seam between async producers (the HTTP poll task, or embedding code
//! that pushes its own snapshots) and the synchronous TUI loop.

use tokio::sync::watch;

use crate::data::TopologySnapshot;

use super::DataSource;

/// A data source that receives topology snapshots via a channel.
///
/// The producer sends snapshots through the watch channel and this source
/// hands the most recent one to the TUI. Intermediate snapshots that arrive
/// between polls are dropped; only the latest matters.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<TopologySnapshot>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// The channel's initial (placeholder) value is never returned from
    /// `poll`; only snapshots sent after creation are.
    pub fn new(receiver: watch::Receiver<TopologySnapshot>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
        }
    }

    /// Create a channel pair for sending snapshots to a ChannelSource.
    ///
    /// Returns (sender, source) where the sender can be used to push
    /// snapshots and the source can be handed to the dashboard.
    pub fn create(source_description: &str) -> (watch::Sender<TopologySnapshot>, Self) {
        let (tx, rx) = watch::channel(TopologySnapshot::default());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<TopologySnapshot> {
        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        // Connection errors are reported by the producing side (see
        // HttpSource); a bare channel has none of its own.
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixture::demo_instances;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // The placeholder initial value is not surfaced
        assert!(source.poll().is_none());

        tx.send(TopologySnapshot {
            instances: demo_instances(),
            ..Default::default()
        })
        .unwrap();

        let snapshot = source.poll().unwrap();
        assert!(!snapshot.instances.is_empty());

        // No change, so poll returns None again
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_channel_source_keeps_latest_only() {
        let (tx, mut source) = ChannelSource::create("test");

        tx.send(TopologySnapshot::default()).unwrap();
        tx.send(TopologySnapshot {
            instances: demo_instances(),
            ..Default::default()
        })
        .unwrap();

        // Only the most recent send is observed
        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.instances.len(), demo_instances().len());
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_channel_source_description() {
        let (_tx, source) = ChannelSource::create("http://localhost:8080");
        assert_eq!(source.description(), "channel: http://localhost:8080");
    }
}
