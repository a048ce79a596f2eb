use std::sync::Arc;
use std::time::Duration;

use crate::core::accumulator::accumulator::Accumulator;

/// Notification from a compute run, tagged with the run's generation.
#[derive(Debug, Clone)]
pub enum ComputeEvent {
    /// Percentage in `1..=100`, strictly increasing within a run.
    Progress { generation: u64, percent: u8 },
    Completed {
        generation: u64,
        accumulator: Arc<Accumulator>,
        elapsed: Duration,
    },
    Failed { generation: u64, message: String },
}

impl ComputeEvent {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::Progress { generation, .. }
            | Self::Completed { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}
