use crate::core::accumulator::accumulator_builder::MAX_CELL_HITS;
use crate::core::data::viewport::Viewport;
use crate::core::flame::flame::Flame;
use crate::core::strategies::errors::ComputeError;

/// Largest run accepted. Even with accelerator overshoot no cell can pass
/// [`MAX_CELL_HITS`].
pub const MAX_TOTAL_ITERATIONS: u64 = MAX_CELL_HITS - u32::MAX as u64;

/// Everything a strategy needs to render one accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeJob {
    flame: Flame,
    viewport: Viewport,
    width: usize,
    height: usize,
    density: u32,
}

impl ComputeJob {
    pub fn new(
        flame: Flame,
        viewport: Viewport,
        width: usize,
        height: usize,
        density: u32,
    ) -> Result<Self, ComputeError> {
        if width == 0 || height == 0 {
            return Err(ComputeError::InvalidArgument(format!(
                "grid size must be positive, got {width}x{height}"
            )));
        }

        if density == 0 {
            return Err(ComputeError::InvalidArgument(
                "density must be positive".to_string(),
            ));
        }

        Ok(Self {
            flame,
            viewport,
            width,
            height,
            density,
        })
    }

    #[must_use]
    pub fn flame(&self) -> &Flame {
        &self.flame
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn density(&self) -> u32 {
        self.density
    }

    /// `density * width * height`, failing instead of wrapping or exceeding
    /// [`MAX_TOTAL_ITERATIONS`].
    pub fn total_iterations(&self) -> Result<u64, ComputeError> {
        let overflow = || ComputeError::IterationOverflow {
            density: self.density,
            width: self.width,
            height: self.height,
        };

        let width = u64::try_from(self.width).map_err(|_| overflow())?;
        let height = u64::try_from(self.height).map_err(|_| overflow())?;

        u64::from(self.density)
            .checked_mul(width)
            .and_then(|n| n.checked_mul(height))
            .filter(|total| *total <= MAX_TOTAL_ITERATIONS)
            .ok_or_else(overflow)
    }
}
