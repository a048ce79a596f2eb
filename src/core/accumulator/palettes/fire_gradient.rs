use crate::core::accumulator::ports::palette::Palette;
use crate::core::data::colour::Colour;

/// Black through red and orange to white.
#[derive(Debug, Default, Clone, Copy)]
pub struct FireGradientPalette;

impl Palette for FireGradientPalette {
    fn colour_for_index(&self, index: f64) -> Colour {
        let t = if index.is_nan() { 0.0 } else { index.clamp(0.0, 1.0) };

        if t < 0.25 {
            let local_t = t / 0.25;
            Colour::new(local_t, 0.0, 0.0)
        } else if t < 0.5 {
            let local_t = (t - 0.25) / 0.25;
            Colour::new(1.0, local_t * 165.0 / 255.0, 0.0)
        } else if t < 0.75 {
            let local_t = (t - 0.5) / 0.25;
            Colour::new(1.0, (165.0 + local_t * 90.0) / 255.0, 0.0)
        } else {
            let local_t = (t - 0.75) / 0.25;
            Colour::new(1.0, 1.0, local_t)
        }
    }
}
