pub mod errors;
pub mod flame;
pub mod flame_builder;
pub mod flame_transformation;
pub mod ports;
pub mod variation;
