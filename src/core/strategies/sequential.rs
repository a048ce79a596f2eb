use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::accumulator::accumulator_builder::AccumulatorBuilder;
use crate::core::actions::cancellation::CancelToken;
use crate::core::actions::chaos_game::chaos_game::ChaosGame;
use crate::core::actions::chaos_game::progress::ProgressReporter;
use crate::core::flame::flame::Flame;
use crate::core::strategies::compute_config::ComputeConfig;
use crate::core::strategies::errors::RunError;

/// Single walk on the calling thread, seeded with `config.seed()`.
///
/// Identical inputs give identical accumulators.
pub fn run_sequential(
    flame: &Flame,
    builder: &AccumulatorBuilder,
    iterations: u64,
    config: &ComputeConfig,
    cancel: &dyn CancelToken,
    progress_sink: &(dyn Fn(u8) + Sync),
) -> Result<(), RunError> {
    let reporter = ProgressReporter::new(1, config.progress_steps(), progress_sink);
    let mut rng = StdRng::seed_from_u64(config.seed());

    ChaosGame::new(flame, config.warmup_iterations()).run(
        &mut rng,
        iterations,
        builder,
        cancel,
        &mut reporter.worker(0, iterations),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::cancellation::{Cancelled, NeverCancel};
    use crate::core::data::affine_transformation::AffineTransformation;
    use crate::core::data::point::Point;
    use crate::core::data::viewport::Viewport;
    use crate::core::flame::flame_transformation::FlameTransformation;
    use std::sync::Mutex;

    fn swirl_flame() -> Flame {
        Flame::new(vec![
            FlameTransformation::new(
                AffineTransformation::rotation(0.4).compose_with(&AffineTransformation::scaling(0.7, 0.7)),
                &[0.6, 0.0, 0.0, 0.4, 0.0, 0.0],
            )
            .unwrap(),
            FlameTransformation::new(
                AffineTransformation::translation(0.3, -0.2),
                &[0.0, 0.5, 0.0, 0.0, 0.0, 0.5],
            )
            .unwrap(),
        ])
        .unwrap()
    }

    fn builder() -> AccumulatorBuilder {
        AccumulatorBuilder::new(Viewport::new(Point::ORIGIN, 4.0, 4.0).unwrap(), 40, 40).unwrap()
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let flame = swirl_flame();
        let config = ComputeConfig::default();
        let sink = |_: u8| {};

        let first = builder();
        run_sequential(&flame, &first, 50_000, &config, &NeverCancel, &sink).unwrap();
        let second = builder();
        run_sequential(&flame, &second, 50_000, &config, &NeverCancel, &sink).unwrap();

        assert_eq!(first.build(), second.build());
    }

    #[test]
    fn test_progress_reaches_one_hundred_in_small_steps() {
        let seen = Mutex::new(Vec::new());
        let sink = |p: u8| seen.lock().unwrap().push(p);

        run_sequential(&swirl_flame(), &builder(), 10_000, &ComputeConfig::default(), &NeverCancel, &sink)
            .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1] && w[1] - w[0] <= 5));
        assert!(seen[0] <= 5);
    }

    #[test]
    fn test_cancellation_is_reported() {
        let cancel = || true;
        let sink = |_: u8| {};

        let result = run_sequential(&swirl_flame(), &builder(), 10_000, &ComputeConfig::default(), &cancel, &sink);

        assert_eq!(result, Err(RunError::Cancelled(Cancelled)));
    }
}
