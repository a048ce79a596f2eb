pub mod calculate_worker_count;
pub mod partition_iterations;
