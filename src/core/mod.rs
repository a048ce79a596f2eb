pub mod accumulator;
pub mod actions;
pub mod data;
pub mod flame;
pub mod strategies;
pub mod util;
