use std::num::NonZeroUsize;

/// Worker count for a run: the requested count, else the host's available parallelism.
#[must_use]
pub fn calculate_worker_count(requested: Option<NonZeroUsize>) -> usize {
    requested
        .or_else(|| std::thread::available_parallelism().ok())
        .map_or(1, NonZeroUsize::get)
}
