pub mod accumulator;
pub mod accumulator_builder;
pub mod errors;
pub mod palettes;
pub mod ports;
