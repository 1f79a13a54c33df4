//! ECS systems that operate on the simulation world.
//!
//! Systems are free functions over `&mut World` (or `&World` when read-only).
//! Decision-tick systems read geometry from a shared [`PhysicsScene`]
//! captured at the start of the tick.
//!
//! [`PhysicsScene`]: crate::physics::PhysicsScene

pub mod attachments;
pub mod behavior;
pub mod cleanup;
pub mod damage;
pub mod flight;
pub mod lifecycle;
pub mod physics;
pub mod sensing;
pub mod snapshot;
pub mod targeting;
pub mod weapons;

use hecs::World;

use skirmish_core::components::{Inactive, Player};
use skirmish_core::types::{EntityId, Pose};

use crate::ids::entity_id;

/// The active player ship, if one exists.
pub fn find_player(world: &World) -> Option<(EntityId, Pose)> {
    world
        .query::<(&Player, &Pose, Option<&Inactive>)>()
        .iter()
        .find(|(_, (_, _, inactive))| inactive.is_none())
        .map(|(entity, (_, pose, _))| (entity_id(entity), *pose))
}
