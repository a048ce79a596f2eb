use thiserror::Error;

use crate::core::accumulator::ports::palette::Palette;
use crate::core::data::colour::Colour;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolatedPaletteError {
    #[error("a palette needs at least one colour")]
    NoColours,
}

/// Evenly spaced colour stops with linear interpolation between them.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedPalette {
    colours: Vec<Colour>,
}

impl InterpolatedPalette {
    pub fn new(colours: Vec<Colour>) -> Result<Self, InterpolatedPaletteError> {
        if colours.is_empty() {
            return Err(InterpolatedPaletteError::NoColours);
        }

        Ok(Self { colours })
    }

    #[must_use]
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }
}

impl Palette for InterpolatedPalette {
    fn colour_for_index(&self, index: f64) -> Colour {
        let last = self.colours.len() - 1;
        if last == 0 {
            return self.colours[0];
        }

        let t = if index.is_nan() { 0.0 } else { index.clamp(0.0, 1.0) };
        let position = t * last as f64;
        let lower = (position.floor() as usize).min(last - 1);
        let fraction = position - lower as f64;

        self.colours[lower + 1].mix_with(self.colours[lower], fraction)
    }
}
