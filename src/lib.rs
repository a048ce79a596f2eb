mod controllers;
mod core;

pub use controllers::compute::events::compute_event::ComputeEvent;
pub use controllers::compute::flame_computer::FlameComputer;
pub use controllers::compute::ports::listener::ComputeListener;
pub use controllers::compute::status::ComputeStatus;
pub use controllers::compute::strategy_registry::StrategyRegistry;

pub use crate::core::accumulator::accumulator::Accumulator;
pub use crate::core::accumulator::accumulator_builder::{
    AccumulatorBuilder, COLOR_FIXED_POINT_SCALE, MAX_CELL_HITS,
};
pub use crate::core::accumulator::errors::AccumulatorError;
pub use crate::core::accumulator::palettes::fire_gradient::FireGradientPalette;
pub use crate::core::accumulator::palettes::interpolated::{
    InterpolatedPalette, InterpolatedPaletteError,
};
pub use crate::core::accumulator::ports::palette::Palette;
pub use crate::core::actions::cancellation::{CancelFlag, CancelToken, Cancelled, NeverCancel};
pub use crate::core::actions::chaos_game::chaos_game::{ChaosGame, DEFAULT_WARMUP_ITERATIONS};
pub use crate::core::actions::chaos_game::colour_index::color_index_of;
pub use crate::core::actions::chaos_game::progress::{ProgressReporter, WorkerProgress};
pub use crate::core::data::affine_transformation::AffineTransformation;
pub use crate::core::data::colour::Colour;
pub use crate::core::data::point::Point;
pub use crate::core::data::viewport::{Viewport, ViewportError};
pub use crate::core::flame::errors::FlameError;
pub use crate::core::flame::flame::{Flame, MAX_TRANSFORMATION_COUNT};
pub use crate::core::flame::flame_builder::FlameBuilder;
pub use crate::core::flame::flame_transformation::{
    FlameTransformation, FlameTransformationBuilder,
};
pub use crate::core::flame::ports::change_listener::{FlameChange, FlameChangeListener};
pub use crate::core::flame::variation::{VARIATION_COUNT, Variation};
pub use crate::core::strategies::accelerator::host_kernel::HostKernelProvider;
pub use crate::core::strategies::accelerator::kernel::{
    ComputeKernel, KernelError, KernelProvider, KernelReadback,
};
pub use crate::core::strategies::accelerator::marshal::{KernelJob, WavePlan};
#[cfg(feature = "gpu")]
pub use crate::core::strategies::accelerator::wgpu_kernel::WgpuKernelProvider;
pub use crate::core::strategies::compute_config::{
    ComputeConfig, DEFAULT_ACCELERATOR_LANES, DEFAULT_PROGRESS_STEPS, DEFAULT_SEED,
    DEFAULT_WAVE_ITERATIONS, ENV_ACCELERATOR_LANES, ENV_SEED, ENV_WAVE_ITERATIONS, ENV_WORKERS,
    MIN_PROGRESS_STEPS,
};
pub use crate::core::strategies::compute_job::{ComputeJob, MAX_TOTAL_ITERATIONS};
pub use crate::core::strategies::compute_strategy::{ComputeStrategy, StrategyKind};
pub use crate::core::strategies::errors::{ComputeError, RunError};
