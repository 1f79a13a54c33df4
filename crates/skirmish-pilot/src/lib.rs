//! Autonomous pilot for SKIRMISH.
//!
//! Implements the agent control core: PID steering, collision avoidance,
//! intercept prediction, periodic target acquisition, the flight controller
//! and the behavior state machine. No ECS dependency. Everything operates
//! on plain data plus the collaborator traits in [`sensing`].

pub mod acquisition;
pub mod avoidance;
pub mod behavior;
pub mod controls;
pub mod flight;
pub mod intercept;
pub mod pid;
pub mod sensing;
pub mod timer;
pub mod weapons;

pub use skirmish_core as core;

#[cfg(test)]
mod tests;
