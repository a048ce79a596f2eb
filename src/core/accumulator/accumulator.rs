use crate::core::accumulator::errors::AccumulatorError;
use crate::core::accumulator::ports::palette::Palette;
use crate::core::data::colour::Colour;

/// Immutable hit histogram over a `width` x `height` grid.
///
/// Cell `(x, y)` has `y = 0` at the bottom of the viewport it was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    width: usize,
    height: usize,
    hits: Vec<u64>,
    color_indices: Vec<f64>,
    max_hit: u64,
}

impl Accumulator {
    pub(crate) fn new(width: usize, height: usize, hits: Vec<u64>, color_indices: Vec<f64>) -> Self {
        let max_hit = hits.iter().copied().max().unwrap_or(0);

        Self {
            width,
            height,
            hits,
            color_indices,
            max_hit,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn hits(&self, x: usize, y: usize) -> Result<u64, AccumulatorError> {
        Ok(self.hits[self.offset(x, y)?])
    }

    /// Mean colour index of the points that landed in the cell, 0 for empty cells.
    pub fn color_index(&self, x: usize, y: usize) -> Result<f64, AccumulatorError> {
        Ok(self.color_indices[self.offset(x, y)?])
    }

    #[must_use]
    pub fn max_hit(&self) -> u64 {
        self.max_hit
    }

    #[must_use]
    pub fn total_hits(&self) -> u64 {
        self.hits.iter().sum()
    }

    /// Number of cells with at least one hit.
    #[must_use]
    pub fn filled_cells(&self) -> usize {
        self.hits.iter().filter(|h| **h > 0).count()
    }

    /// Coordinates of the first cell holding [`max_hit`](Self::max_hit) hits.
    #[must_use]
    pub fn brightest_cell(&self) -> Option<(usize, usize)> {
        if self.max_hit == 0 {
            return None;
        }

        let offset = self.hits.iter().position(|h| *h == self.max_hit)?;
        Some((offset % self.width, offset / self.width))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max_hit == 0
    }

    /// Log-scaled density in `[0, 1]`.
    pub fn intensity(&self, x: usize, y: usize) -> Result<f64, AccumulatorError> {
        let hits = self.hits(x, y)?;
        if self.max_hit == 0 {
            return Ok(0.0);
        }

        Ok((hits as f64).ln_1p() / (self.max_hit as f64).ln_1p())
    }

    /// Palette colour for the cell blended over `background` by intensity.
    pub fn color(
        &self,
        palette: &dyn Palette,
        background: Colour,
        x: usize,
        y: usize,
    ) -> Result<Colour, AccumulatorError> {
        let intensity = self.intensity(x, y)?;
        let index = self.color_index(x, y)?;

        Ok(palette.colour_for_index(index).mix_with(background, intensity))
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize, AccumulatorError> {
        if x >= self.width || y >= self.height {
            return Err(AccumulatorError::CellOutsideBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        Ok(y * self.width + x)
    }
}
