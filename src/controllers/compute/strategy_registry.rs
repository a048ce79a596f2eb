use std::sync::Arc;

use tracing::{debug, info};

use crate::controllers::compute::flame_computer::FlameComputer;
use crate::core::flame::flame::Flame;
use crate::core::strategies::accelerator::kernel::KernelProvider;
use crate::core::strategies::compute_config::ComputeConfig;
use crate::core::strategies::compute_strategy::ComputeStrategy;

/// Known strategies, most capable first.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: Vec<ComputeStrategy>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self {
            strategies: vec![ComputeStrategy::MultiCore, ComputeStrategy::Sequential],
        }
    }
}

impl StrategyRegistry {
    /// Registers an accelerator ahead of the CPU strategies.
    #[must_use]
    pub fn with_accelerator(mut self, provider: Arc<dyn KernelProvider>) -> Self {
        self.strategies
            .insert(0, ComputeStrategy::AcceleratorOffload(provider));
        self
    }

    #[must_use]
    pub fn strategies(&self) -> &[ComputeStrategy] {
        &self.strategies
    }

    /// Strategies usable on this host, in preference order.
    pub fn supported<'a>(
        &'a self,
        config: &'a ComputeConfig,
    ) -> impl Iterator<Item = &'a ComputeStrategy> + 'a {
        self.strategies.iter().filter(move |strategy| {
            let supported = strategy.is_supported(config);
            debug!(strategy = strategy.name(), supported, "checked strategy support");
            supported
        })
    }

    /// The most capable supported strategy; sequential when nothing else fits.
    #[must_use]
    pub fn select(&self, config: &ComputeConfig) -> ComputeStrategy {
        let strategy = self
            .supported(config)
            .next()
            .cloned()
            .unwrap_or(ComputeStrategy::Sequential);

        info!(strategy = strategy.name(), "selected compute strategy");
        strategy
    }

    /// Binds `flame` to the selected strategy.
    #[must_use]
    pub fn bind(&self, flame: Flame, config: ComputeConfig) -> FlameComputer {
        FlameComputer::new(flame, self.select(&config), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::affine_transformation::AffineTransformation;
    use crate::core::flame::flame_transformation::FlameTransformation;
    use crate::core::strategies::accelerator::host_kernel::HostKernelProvider;
    use crate::core::strategies::compute_strategy::StrategyKind;
    use std::num::NonZeroUsize;

    fn workers(n: usize) -> ComputeConfig {
        ComputeConfig::default().with_worker_count(NonZeroUsize::new(n))
    }

    fn kinds<'a>(strategies: impl Iterator<Item = &'a ComputeStrategy>) -> Vec<StrategyKind> {
        strategies.map(ComputeStrategy::kind).collect()
    }

    #[test]
    fn test_default_order_prefers_multi_core() {
        let registry = StrategyRegistry::default();

        assert_eq!(
            kinds(registry.strategies().iter()),
            vec![StrategyKind::MultiCore, StrategyKind::Sequential]
        );
        assert_eq!(registry.select(&workers(4)).kind(), StrategyKind::MultiCore);
    }

    #[test]
    fn test_single_core_falls_back_to_sequential() {
        let registry = StrategyRegistry::default();

        assert_eq!(
            kinds(registry.supported(&workers(1))),
            vec![StrategyKind::Sequential]
        );
        assert_eq!(registry.select(&workers(1)).kind(), StrategyKind::Sequential);
    }

    #[test]
    fn test_available_accelerator_wins() {
        let registry = StrategyRegistry::default().with_accelerator(Arc::new(HostKernelProvider::new()));

        assert_eq!(
            registry.select(&workers(4)).kind(),
            StrategyKind::AcceleratorOffload
        );
    }

    #[test]
    fn test_unavailable_accelerator_is_skipped() {
        let registry =
            StrategyRegistry::default().with_accelerator(Arc::new(HostKernelProvider::unavailable()));

        assert_eq!(registry.strategies().len(), 3);
        assert_eq!(registry.select(&workers(4)).kind(), StrategyKind::MultiCore);
        assert_eq!(registry.select(&workers(1)).kind(), StrategyKind::Sequential);
    }

    #[test]
    fn test_bind_uses_selected_strategy() {
        let flame = Flame::new(vec![
            FlameTransformation::new(AffineTransformation::IDENTITY, &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0])
                .unwrap(),
        ])
        .unwrap();

        let computer = StrategyRegistry::default().bind(flame.clone(), workers(1));

        assert_eq!(computer.strategy().kind(), StrategyKind::Sequential);
        assert_eq!(computer.flame(), &flame);
    }
}
