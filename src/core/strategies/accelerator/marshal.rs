use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::core::actions::chaos_game::colour_index::color_index_of;
use crate::core::data::affine_transformation::AffineTransformation;
use crate::core::flame::flame::Flame;
use crate::core::flame::variation::VARIATION_COUNT;
use crate::core::strategies::accelerator::kernel::KernelError;

pub const AFFINE_STRIDE: usize = 6;
/// Waves planned per run at minimum so progress can move in 5% steps.
pub const MIN_WAVES: u64 = 20;

/// Flat buffers describing one run, ready for upload to a kernel.
///
/// Transformation `i` occupies `affine[6i..6i+6]` as `[a, b, c, d, e, f]`
/// and `weights[6i..6i+6]` in variation order.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelJob {
    pub affine: Vec<f32>,
    pub weights: Vec<f32>,
    pub color_indices: Vec<f32>,
    pub grid_transform: [f32; AFFINE_STRIDE],
    pub transformation_count: u32,
    pub width: u32,
    pub height: u32,
    pub lanes: u32,
    pub warmup_iterations: u32,
    pub seeds: Vec<u32>,
}

impl KernelJob {
    #[allow(clippy::too_many_arguments)]
    pub fn marshal(
        flame: &Flame,
        grid_transform: AffineTransformation,
        width: usize,
        height: usize,
        lanes: u32,
        warmup_iterations: u32,
        seed: u64,
    ) -> Result<Self, KernelError> {
        let dimension = |value: usize| {
            u32::try_from(value)
                .map_err(|_| KernelError::Upload(format!("grid dimension {value} exceeds u32")))
        };

        let transformations = flame.transformations();
        let mut affine = Vec::with_capacity(transformations.len() * AFFINE_STRIDE);
        let mut weights = Vec::with_capacity(transformations.len() * VARIATION_COUNT);
        for transformation in transformations {
            affine.extend(transformation.affine().coefficients().map(|c| c as f32));
            weights.extend(transformation.weights().map(|w| w as f32));
        }

        let mut rng = StdRng::seed_from_u64(seed);

        Ok(Self {
            affine,
            weights,
            color_indices: (0..transformations.len())
                .map(|i| color_index_of(i) as f32)
                .collect(),
            grid_transform: grid_transform.coefficients().map(|c| c as f32),
            transformation_count: transformations.len() as u32,
            width: dimension(width)?,
            height: dimension(height)?,
            lanes,
            warmup_iterations,
            seeds: (0..lanes).map(|_| rng.next_u32()).collect(),
        })
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Splits a run's iterations into bounded waves over a fixed set of lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavePlan {
    total: u64,
    lanes: u32,
    iterations_per_lane: u32,
    waves: u64,
}

impl WavePlan {
    #[must_use]
    pub fn new(total: u64, max_lanes: u32, wave_iterations: u32) -> Self {
        // A full wave never exceeds 1/MIN_WAVES of the total once total >= MIN_WAVES
        let lanes = u64::from(max_lanes.max(1)).min((total / MIN_WAVES).max(1));
        let iterations_per_lane = (total / (lanes * MIN_WAVES))
            .clamp(1, u64::from(wave_iterations.max(1)));
        let waves = total.div_ceil(lanes * iterations_per_lane);

        Self {
            total,
            lanes: lanes as u32,
            iterations_per_lane: iterations_per_lane as u32,
            waves,
        }
    }

    #[must_use]
    pub fn lanes(&self) -> u32 {
        self.lanes
    }

    #[must_use]
    pub fn waves(&self) -> u64 {
        self.waves
    }

    /// Iterations each lane runs in `wave`; the last wave is trimmed so the
    /// run overshoots its total by fewer than `lanes` iterations.
    #[must_use]
    pub fn iterations_in_wave(&self, wave: u64) -> u32 {
        let per_wave = u64::from(self.lanes) * u64::from(self.iterations_per_lane);
        let remaining = self.total.saturating_sub(wave.saturating_mul(per_wave));

        remaining
            .div_ceil(u64::from(self.lanes))
            .min(u64::from(self.iterations_per_lane)) as u32
    }

    /// Iterations actually run across all waves and lanes.
    #[must_use]
    pub fn dispatched_iterations(&self) -> u64 {
        (0..self.waves)
            .map(|wave| u64::from(self.iterations_in_wave(wave)) * u64::from(self.lanes))
            .sum()
    }
}
