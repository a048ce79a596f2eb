pub mod chaos_game;
pub mod colour_index;
pub mod progress;
