use rand::Rng;

use crate::core::accumulator::accumulator_builder::AccumulatorBuilder;
use crate::core::actions::cancellation::{CancelToken, Cancelled};
use crate::core::actions::chaos_game::colour_index::color_indices;
use crate::core::actions::chaos_game::progress::WorkerProgress;
use crate::core::data::point::Point;
use crate::core::flame::flame::Flame;

pub const DEFAULT_WARMUP_ITERATIONS: u32 = 20;

/// One random walk over a flame's transformations.
#[derive(Debug, Clone)]
pub struct ChaosGame<'f> {
    flame: &'f Flame,
    color_indices: Vec<f64>,
    warmup_iterations: u32,
}

impl<'f> ChaosGame<'f> {
    #[must_use]
    pub fn new(flame: &'f Flame, warmup_iterations: u32) -> Self {
        Self {
            flame,
            color_indices: color_indices(flame.transformations_count()),
            warmup_iterations,
        }
    }

    /// Runs the warm-up then `iterations` recorded iterations into `builder`.
    ///
    /// Cancellation is checked before every iteration.
    pub fn run<R: Rng>(
        &self,
        rng: &mut R,
        iterations: u64,
        builder: &AccumulatorBuilder,
        cancel: &dyn CancelToken,
        progress: &mut WorkerProgress<'_, '_>,
    ) -> Result<(), Cancelled> {
        let transformations = self.flame.transformations();
        let count = transformations.len();

        let mut point = Point::ORIGIN;
        let mut color_index = 0.0;

        for _ in 0..self.warmup_iterations {
            let i = rng.gen_range(0..count);
            point = transformations[i].transform_point(point);
            color_index = (color_index + self.color_indices[i]) / 2.0;
        }

        for done in 0..iterations {
            cancel.check()?;

            let i = rng.gen_range(0..count);
            point = transformations[i].transform_point(point);
            color_index = (color_index + self.color_indices[i]) / 2.0;
            builder.hit(point, color_index);

            progress.update(done + 1);
        }

        progress.finish();
        Ok(())
    }
}
