use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::accumulator::accumulator::Accumulator;
use crate::core::accumulator::accumulator_builder::AccumulatorBuilder;
use crate::core::actions::cancellation::CancelToken;
use crate::core::strategies::accelerator::kernel::KernelProvider;
use crate::core::strategies::accelerator::offload::run_offload;
use crate::core::strategies::compute_config::ComputeConfig;
use crate::core::strategies::compute_job::ComputeJob;
use crate::core::strategies::errors::RunError;
use crate::core::strategies::multi_core::run_multi_core;
use crate::core::strategies::sequential::run_sequential;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Sequential,
    MultiCore,
    AcceleratorOffload,
}

impl StrategyKind {
    /// Most capable first.
    pub const ALL: [Self; 3] = [Self::AcceleratorOffload, Self::MultiCore, Self::Sequential];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::MultiCore => "Multi-core",
            Self::AcceleratorOffload => "Accelerator offload",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How a compute run is executed.
#[derive(Debug, Clone)]
pub enum ComputeStrategy {
    Sequential,
    MultiCore,
    AcceleratorOffload(Arc<dyn KernelProvider>),
}

impl ComputeStrategy {
    #[must_use]
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Sequential => StrategyKind::Sequential,
            Self::MultiCore => StrategyKind::MultiCore,
            Self::AcceleratorOffload(_) => StrategyKind::AcceleratorOffload,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    /// Whether this strategy can run on the current host.
    #[must_use]
    pub fn is_supported(&self, config: &ComputeConfig) -> bool {
        match self {
            Self::Sequential => true,
            Self::MultiCore => config.worker_count() > 1,
            Self::AcceleratorOffload(provider) => provider.is_available(),
        }
    }

    /// Runs `job` to completion on the calling thread.
    ///
    /// Blocks until every execution unit of the run has stopped, so nothing
    /// writes to the run's grid once this returns.
    pub fn execute(
        &self,
        job: &ComputeJob,
        config: &ComputeConfig,
        cancel: &dyn CancelToken,
        progress_sink: &(dyn Fn(u8) + Sync),
    ) -> Result<Accumulator, RunError> {
        let iterations = job.total_iterations()?;
        let builder = AccumulatorBuilder::new(job.viewport(), job.width(), job.height())?;

        debug!(
            strategy = self.name(),
            iterations,
            width = job.width(),
            height = job.height(),
            "executing compute job"
        );

        let flame = job.flame();
        match self {
            Self::Sequential => {
                run_sequential(flame, &builder, iterations, config, cancel, progress_sink)?;
            }
            Self::MultiCore => {
                run_multi_core(flame, &builder, iterations, config, cancel, progress_sink)?;
            }
            Self::AcceleratorOffload(provider) => {
                run_offload(
                    provider.as_ref(),
                    flame,
                    &builder,
                    iterations,
                    config,
                    cancel,
                    progress_sink,
                )?;
            }
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::cancellation::NeverCancel;
    use crate::core::data::affine_transformation::AffineTransformation;
    use crate::core::data::point::Point;
    use crate::core::data::viewport::Viewport;
    use crate::core::flame::flame::Flame;
    use crate::core::flame::flame_transformation::FlameTransformation;
    use crate::core::strategies::accelerator::host_kernel::HostKernelProvider;
    use crate::core::strategies::errors::ComputeError;
    use std::num::NonZeroUsize;

    fn identity_job(density: u32) -> ComputeJob {
        let flame = Flame::new(vec![
            FlameTransformation::new(AffineTransformation::IDENTITY, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0])
                .unwrap(),
        ])
        .unwrap();
        ComputeJob::new(flame, Viewport::new(Point::ORIGIN, 2.0, 2.0).unwrap(), 10, 10, density).unwrap()
    }

    fn strategies() -> Vec<ComputeStrategy> {
        vec![
            ComputeStrategy::Sequential,
            ComputeStrategy::MultiCore,
            ComputeStrategy::AcceleratorOffload(Arc::new(HostKernelProvider::new())),
        ]
    }

    #[test]
    fn test_kinds_and_names() {
        let kinds: Vec<StrategyKind> = strategies().iter().map(ComputeStrategy::kind).collect();

        assert_eq!(
            kinds,
            vec![
                StrategyKind::Sequential,
                StrategyKind::MultiCore,
                StrategyKind::AcceleratorOffload
            ]
        );
        assert_eq!(ComputeStrategy::MultiCore.name(), "Multi-core");
        assert_eq!(StrategyKind::AcceleratorOffload.to_string(), "Accelerator offload");
    }

    #[test]
    fn test_multi_core_needs_more_than_one_worker() {
        let single = ComputeConfig::default().with_worker_count(NonZeroUsize::new(1));
        let dual = ComputeConfig::default().with_worker_count(NonZeroUsize::new(2));

        assert!(!ComputeStrategy::MultiCore.is_supported(&single));
        assert!(ComputeStrategy::MultiCore.is_supported(&dual));
        assert!(ComputeStrategy::Sequential.is_supported(&single));
    }

    #[test]
    fn test_accelerator_support_follows_provider() {
        let config = ComputeConfig::default();

        assert!(
            !ComputeStrategy::AcceleratorOffload(Arc::new(HostKernelProvider::unavailable()))
                .is_supported(&config)
        );
        assert!(
            ComputeStrategy::AcceleratorOffload(Arc::new(HostKernelProvider::new()))
                .is_supported(&config)
        );
    }

    #[test]
    fn test_every_strategy_hits_only_the_center_cell() {
        let config = ComputeConfig::default()
            .with_worker_count(NonZeroUsize::new(2))
            .with_accelerator_lanes(8);
        let sink = |_: u8| {};

        for strategy in strategies() {
            let accumulator = strategy
                .execute(&identity_job(1), &config, &NeverCancel, &sink)
                .unwrap();

            assert!(accumulator.hits(5, 5).unwrap() >= 100, "{}", strategy.name());
            assert_eq!(accumulator.total_hits(), accumulator.hits(5, 5).unwrap());
            assert_eq!(accumulator.intensity(0, 0), Ok(0.0));
        }
    }

    #[test]
    fn test_overflow_fails_before_allocating() {
        let flame = identity_job(1).flame().clone();
        let job = ComputeJob::new(
            flame,
            Viewport::new(Point::ORIGIN, 2.0, 2.0).unwrap(),
            1 << 30,
            1 << 30,
            u32::MAX,
        )
        .unwrap();
        let sink = |_: u8| {};

        let result = ComputeStrategy::Sequential.execute(&job, &ComputeConfig::default(), &NeverCancel, &sink);

        assert!(matches!(
            result,
            Err(RunError::Failed(ComputeError::IterationOverflow { .. }))
        ));
    }
}
