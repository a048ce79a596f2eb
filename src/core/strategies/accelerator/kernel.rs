use std::fmt::Debug;

use thiserror::Error;

use crate::core::strategies::accelerator::marshal::KernelJob;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("no compatible accelerator: {0}")]
    Unavailable(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("wave {wave} failed: {message}")]
    Dispatch { wave: u64, message: String },

    #[error("readback failed: {0}")]
    Download(String),
}

/// Per-cell totals read back from the accelerator.
///
/// `color_sums[i]` is the plain sum of the colour indices of the hits in
/// cell `i`, not their mean.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KernelReadback {
    pub hits: Vec<u64>,
    pub color_sums: Vec<f64>,
}

/// One accelerator session running the parallel chaos-game walks.
///
/// Lane state (current point, colour index, random state) lives on the
/// accelerator and persists across waves. Lanes run the warm-up before
/// their first recorded iteration.
pub trait ComputeKernel: Send {
    fn upload(&mut self, job: &KernelJob) -> Result<(), KernelError>;

    /// Advances every lane by `iterations_per_lane` recorded iterations.
    fn dispatch_wave(&mut self, wave: u64, iterations_per_lane: u32) -> Result<(), KernelError>;

    fn download(&mut self) -> Result<KernelReadback, KernelError>;
}

/// Discovers accelerators and opens kernel sessions on them.
pub trait KernelProvider: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Cheap runtime check; strategies are only selected when this holds.
    fn is_available(&self) -> bool;

    fn create_kernel(&self) -> Result<Box<dyn ComputeKernel>, KernelError>;
}
