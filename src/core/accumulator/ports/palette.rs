use crate::core::data::colour::Colour;

/// Maps a colour index in `[0, 1]` to a colour.
pub trait Palette: Send + Sync {
    fn colour_for_index(&self, index: f64) -> Colour;
}
