use std::num::NonZeroUsize;
use std::str::FromStr;

use tracing::warn;

use crate::core::actions::chaos_game::chaos_game::DEFAULT_WARMUP_ITERATIONS;
use crate::core::util::calculate_worker_count::calculate_worker_count;

pub const DEFAULT_SEED: u64 = 0x0F1A_3E5E_ED00_2545;
pub const DEFAULT_PROGRESS_STEPS: u32 = 100;
/// Fewest progress steps that still report at least every 5%.
pub const MIN_PROGRESS_STEPS: u32 = 20;
pub const DEFAULT_ACCELERATOR_LANES: u32 = 4096;
pub const DEFAULT_WAVE_ITERATIONS: u32 = 1024;

pub const ENV_SEED: &str = "FLAME_SEED";
pub const ENV_WORKERS: &str = "FLAME_WORKERS";
pub const ENV_WAVE_ITERATIONS: &str = "FLAME_WAVE_ITERATIONS";
pub const ENV_ACCELERATOR_LANES: &str = "FLAME_ACCELERATOR_LANES";

/// Tunables shared by every compute strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeConfig {
    warmup_iterations: u32,
    seed: u64,
    worker_count: Option<NonZeroUsize>,
    progress_steps: u32,
    accelerator_lanes: u32,
    wave_iterations: u32,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: DEFAULT_WARMUP_ITERATIONS,
            seed: DEFAULT_SEED,
            worker_count: None,
            progress_steps: DEFAULT_PROGRESS_STEPS,
            accelerator_lanes: DEFAULT_ACCELERATOR_LANES,
            wave_iterations: DEFAULT_WAVE_ITERATIONS,
        }
    }
}

impl ComputeConfig {
    /// Defaults overridden by the `FLAME_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `FLAME_*` keys.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(seed) = parse_var::<u64>(&lookup, ENV_SEED) {
            config.seed = seed;
        }
        if let Some(workers) = parse_var::<NonZeroUsize>(&lookup, ENV_WORKERS) {
            config.worker_count = Some(workers);
        }
        if let Some(iterations) = parse_var::<u32>(&lookup, ENV_WAVE_ITERATIONS) {
            config = config.with_wave_iterations(iterations);
        }
        if let Some(lanes) = parse_var::<u32>(&lookup, ENV_ACCELERATOR_LANES) {
            config = config.with_accelerator_lanes(lanes);
        }

        config
    }

    #[must_use]
    pub fn with_warmup_iterations(mut self, warmup_iterations: u32) -> Self {
        self.warmup_iterations = warmup_iterations;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_worker_count(mut self, worker_count: Option<NonZeroUsize>) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Clamped to at least [`MIN_PROGRESS_STEPS`].
    #[must_use]
    pub fn with_progress_steps(mut self, progress_steps: u32) -> Self {
        self.progress_steps = progress_steps.max(MIN_PROGRESS_STEPS);
        self
    }

    #[must_use]
    pub fn with_accelerator_lanes(mut self, accelerator_lanes: u32) -> Self {
        self.accelerator_lanes = accelerator_lanes.max(1);
        self
    }

    #[must_use]
    pub fn with_wave_iterations(mut self, wave_iterations: u32) -> Self {
        self.wave_iterations = wave_iterations.max(1);
        self
    }

    #[must_use]
    pub fn warmup_iterations(&self) -> u32 {
        self.warmup_iterations
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn requested_worker_count(&self) -> Option<NonZeroUsize> {
        self.worker_count
    }

    /// Requested worker count, falling back to the host's parallelism.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        calculate_worker_count(self.worker_count)
    }

    #[must_use]
    pub fn progress_steps(&self) -> u32 {
        self.progress_steps
    }

    #[must_use]
    pub fn accelerator_lanes(&self) -> u32 {
        self.accelerator_lanes
    }

    #[must_use]
    pub fn wave_iterations(&self) -> u32 {
        self.wave_iterations
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;

    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable compute setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ComputeConfig::default();

        assert_eq!(config.warmup_iterations(), 20);
        assert_eq!(config.seed(), DEFAULT_SEED);
        assert_eq!(config.requested_worker_count(), None);
        assert_eq!(config.progress_steps(), 100);
        assert_eq!(config.accelerator_lanes(), 4096);
        assert_eq!(config.wave_iterations(), 1024);
    }

    #[test]
    fn test_lookup_overrides_fields() {
        let config = ComputeConfig::from_lookup(lookup_from(&[
            (ENV_SEED, "99"),
            (ENV_WORKERS, "3"),
            (ENV_WAVE_ITERATIONS, "64"),
            (ENV_ACCELERATOR_LANES, " 128 "),
        ]));

        assert_eq!(config.seed(), 99);
        assert_eq!(config.worker_count(), 3);
        assert_eq!(config.wave_iterations(), 64);
        assert_eq!(config.accelerator_lanes(), 128);
    }

    #[test]
    fn test_unparsable_values_are_ignored() {
        let config = ComputeConfig::from_lookup(lookup_from(&[
            (ENV_SEED, "not-a-number"),
            (ENV_WORKERS, "0"),
        ]));

        assert_eq!(config.seed(), DEFAULT_SEED);
        assert_eq!(config.requested_worker_count(), None);
    }

    #[test]
    fn test_progress_steps_never_below_five_percent() {
        assert_eq!(ComputeConfig::default().with_progress_steps(4).progress_steps(), 20);
        assert_eq!(ComputeConfig::default().with_progress_steps(50).progress_steps(), 50);
    }
}
