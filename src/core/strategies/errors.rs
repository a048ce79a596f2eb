use thiserror::Error;

use crate::core::accumulator::errors::AccumulatorError;
use crate::core::actions::cancellation::Cancelled;
use crate::core::strategies::accelerator::kernel::KernelError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    #[error("invalid compute argument: {0}")]
    InvalidArgument(String),

    #[error(
        "iteration count overflows the accumulator range for density {density} over {width}x{height} cells"
    )]
    IterationOverflow {
        density: u32,
        width: usize,
        height: usize,
    },

    #[error("strategy {0} is not supported on this host")]
    Unsupported(&'static str),

    #[error("worker pool could not be created: {0}")]
    WorkerPool(String),

    #[error("compute thread could not be spawned: {0}")]
    WorkerSpawn(String),

    #[error("accelerator failure: {0}")]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),
}

/// Outcome of a run that did not produce an accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("{0}")]
    Cancelled(#[from] Cancelled),

    #[error(transparent)]
    Failed(#[from] ComputeError),
}

impl From<AccumulatorError> for RunError {
    fn from(error: AccumulatorError) -> Self {
        RunError::Failed(error.into())
    }
}

impl From<KernelError> for RunError {
    fn from(error: KernelError) -> Self {
        RunError::Failed(error.into())
    }
}
