//! Historical task-count tracking for sparklines and rate calculations.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use super::model::TopologyData;

/// Maximum number of historical snapshots to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks per-instance task counts over time.
///
/// Records a reading on every poll so the instances view can show a trend
/// sparkline and a tasks-per-second rate next to each instance.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Historical task counts per instance (instance id -> readings).
    task_counts: HashMap<String, VecDeque<u64>>,
    /// Timestamps of snapshots for rate calculations.
    timestamps: VecDeque<Instant>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new data snapshot.
    pub fn record(&mut self, data: &TopologyData) {
        for instance in &data.snapshot.instances {
            let counts = self.task_counts.entry(instance.id.clone()).or_default();
            counts.push_back(u64::from(instance.metrics.task_count));
            if counts.len() > MAX_HISTORY_SIZE {
                counts.pop_front();
            }
        }

        self.timestamps.push_back(data.last_updated);
        if self.timestamps.len() > MAX_HISTORY_SIZE {
            self.timestamps.pop_front();
        }
    }

    /// Get sparkline data for an instance's task counts (normalized to 0-7
    /// for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn task_sparkline(&self, instance_id: &str) -> Vec<u8> {
        let Some(values) = self.task_counts.get(instance_id) else {
            return Vec::new();
        };

        if values.len() < 2 {
            return Vec::new();
        }

        let max = values.iter().copied().max().unwrap_or(1).max(1);
        let min = values.iter().copied().min().unwrap_or(0);
        let range = (max - min).max(1) as f64;

        values
            .iter()
            .map(|&v| {
                let normalized = ((v - min) as f64 / range * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }

    /// Get the rate of change (tasks per second) for an instance.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn task_rate(&self, instance_id: &str) -> Option<f64> {
        let counts = self.task_counts.get(instance_id)?;
        if counts.len() < 2 || self.timestamps.len() < 2 {
            return None;
        }

        let current = *counts.back()?;
        let previous = *counts.get(counts.len() - 2)?;
        let delta = current as i64 - previous as i64;

        let current_time = self.timestamps.back()?;
        let previous_time = self.timestamps.get(self.timestamps.len() - 2)?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some(delta as f64 / elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixture::demo_instances;
    use crate::data::model::TopologySnapshot;

    fn data_with_tasks(tasks: u32) -> TopologyData {
        let mut instances = demo_instances();
        instances.truncate(1);
        instances[0].metrics.task_count = tasks;
        TopologyData::from_snapshot(TopologySnapshot {
            instances,
            ..Default::default()
        })
    }

    #[test]
    fn test_sparkline_needs_two_readings() {
        let mut history = History::new();
        history.record(&data_with_tasks(5));
        assert!(history.task_sparkline("elixir-cz").is_empty());

        history.record(&data_with_tasks(10));
        let spark = history.task_sparkline("elixir-cz");
        assert_eq!(spark.len(), 2);
        assert!(spark.iter().all(|&v| v <= 7));
    }

    #[test]
    fn test_sparkline_normalizes_to_range() {
        let mut history = History::new();
        for tasks in [0, 5, 10] {
            history.record(&data_with_tasks(tasks));
        }
        let spark = history.task_sparkline("elixir-cz");
        assert_eq!(spark, vec![0, 3, 7]);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for i in 0..100 {
            history.record(&data_with_tasks(i));
        }
        assert_eq!(history.task_sparkline("elixir-cz").len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_rate_requires_history() {
        let mut history = History::new();
        assert!(history.task_rate("elixir-cz").is_none());
        history.record(&data_with_tasks(5));
        assert!(history.task_rate("elixir-cz").is_none());
    }
}
