pub mod events;
pub mod flame_computer;
pub mod ports;
pub mod status;
pub mod strategy_registry;
