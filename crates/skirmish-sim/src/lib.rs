//! Headless simulation harness for SKIRMISH.
//!
//! Owns the hecs ECS world, runs the variable-rate decision tick and the
//! fixed-rate physics tick, and produces `SimSnapshot`s for collaborators.

pub mod brain;
pub mod engine;
pub mod ids;
pub mod physics;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use skirmish_core as core;
pub use skirmish_pilot as pilot;
