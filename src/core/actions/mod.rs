pub mod cancellation;
pub mod chaos_game;
