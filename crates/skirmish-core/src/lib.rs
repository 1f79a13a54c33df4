//! Core types and definitions for the SKIRMISH flight-combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, components, configuration, state snapshots, events, and constants.
//! It has no dependency on the ECS or any runtime framework.

pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
