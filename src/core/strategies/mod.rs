pub mod accelerator;
pub mod compute_config;
pub mod compute_job;
pub mod compute_strategy;
pub mod errors;
pub mod multi_core;
pub mod sequential;
