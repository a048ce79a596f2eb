use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::debug;

use crate::core::accumulator::accumulator_builder::AccumulatorBuilder;
use crate::core::actions::cancellation::CancelToken;
use crate::core::actions::chaos_game::chaos_game::ChaosGame;
use crate::core::actions::chaos_game::progress::ProgressReporter;
use crate::core::flame::flame::Flame;
use crate::core::strategies::compute_config::ComputeConfig;
use crate::core::strategies::errors::{ComputeError, RunError};
use crate::core::util::partition_iterations::partition_iterations;

/// Seed for worker `index`, decorrelated from its neighbours.
#[must_use]
pub fn worker_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Independent walks on a dedicated rayon pool, all writing to `builder`.
///
/// Returns once every worker has stopped, cancelled or not.
pub fn run_multi_core(
    flame: &Flame,
    builder: &AccumulatorBuilder,
    iterations: u64,
    config: &ComputeConfig,
    cancel: &dyn CancelToken,
    progress_sink: &(dyn Fn(u8) + Sync),
) -> Result<(), RunError> {
    let workers = config.worker_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("flame-worker-{index}"))
        .build()
        .map_err(|e| ComputeError::WorkerPool(e.to_string()))?;

    let shares = partition_iterations(iterations, workers);
    let reporter = ProgressReporter::new(workers, config.progress_steps(), progress_sink);
    let game = ChaosGame::new(flame, config.warmup_iterations());

    debug!(workers, iterations, "starting multi-core walks");

    pool.install(|| {
        shares
            .par_iter()
            .enumerate()
            .try_for_each(|(index, share)| {
                let mut rng = StdRng::seed_from_u64(worker_seed(config.seed(), index));
                game.run(&mut rng, *share, builder, cancel, &mut reporter.worker(index, *share))
            })
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::cancellation::{CancelFlag, Cancelled, NeverCancel};
    use crate::core::data::affine_transformation::AffineTransformation;
    use crate::core::data::point::Point;
    use crate::core::data::viewport::Viewport;
    use crate::core::flame::flame_transformation::FlameTransformation;
    use std::num::NonZeroUsize;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    fn sierpinski() -> Flame {
        let half = AffineTransformation::scaling(0.5, 0.5);
        let linear = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        Flame::new(vec![
            FlameTransformation::new(half, &linear).unwrap(),
            FlameTransformation::new(AffineTransformation::translation(0.5, 0.0).compose_with(&half), &linear)
                .unwrap(),
            FlameTransformation::new(AffineTransformation::translation(0.0, 0.5).compose_with(&half), &linear)
                .unwrap(),
        ])
        .unwrap()
    }

    fn builder(size: usize) -> AccumulatorBuilder {
        AccumulatorBuilder::new(Viewport::new(Point::new(0.5, 0.5), 1.0, 1.0).unwrap(), size, size).unwrap()
    }

    fn config(workers: usize) -> ComputeConfig {
        ComputeConfig::default().with_worker_count(NonZeroUsize::new(workers))
    }

    #[test]
    fn test_worker_seeds_differ() {
        let seeds: Vec<u64> = (0..8).map(|i| worker_seed(42, i)).collect();

        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_all_iterations_are_recorded() {
        let builder = builder(32);
        let sink = |_: u8| {};

        run_multi_core(&sierpinski(), &builder, 100_003, &config(4), &NeverCancel, &sink).unwrap();

        assert_eq!(builder.build().total_hits(), 100_003);
    }

    #[test]
    fn test_statistically_matches_sequential() {
        let sink = |_: u8| {};
        let parallel = builder(4);
        run_multi_core(&sierpinski(), &parallel, 400_000, &config(4), &NeverCancel, &sink).unwrap();
        let parallel = parallel.build();

        // The bottom-left quadrant of the 4x4 grid holds a third of the attractor
        let quadrant: u64 = [(0, 0), (1, 0), (0, 1), (1, 1)]
            .iter()
            .map(|&(x, y)| parallel.hits(x, y).unwrap())
            .sum();
        let share = quadrant as f64 / parallel.total_hits() as f64;

        assert!((share - 1.0 / 3.0).abs() < 0.02, "share {share}");
    }

    #[test]
    fn test_progress_is_monotone_and_completes() {
        let seen = Mutex::new(Vec::new());
        let sink = |p: u8| seen.lock().unwrap().push(p);

        run_multi_core(&sierpinski(), &builder(8), 200_000, &config(3), &NeverCancel, &sink).unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1] && w[1] - w[0] <= 5));
    }

    #[test]
    fn test_abort_leaves_grid_quiescent() {
        let builder = builder(16);
        let cancel = CancelFlag::new();
        let sink = |_: u8| {};

        let result = thread::scope(|s| {
            let run = s.spawn(|| {
                run_multi_core(&sierpinski(), &builder, u64::MAX / 2, &config(4), &cancel, &sink)
            });

            thread::sleep(Duration::from_millis(50));
            cancel.cancel();
            run.join().unwrap()
        });

        assert_eq!(result, Err(RunError::Cancelled(Cancelled)));

        let after_abort = builder.total_hits();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(builder.total_hits(), after_abort);
    }
}
