//! Cleanup system: removes markers and attached parts whose owner no longer exists.

use hecs::{Entity, World};

use skirmish_core::components::{EphemeralMarker, Parent};

use crate::ids::entity_of;

/// Despawn orphaned markers and parts. Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, marker) in world.query::<&EphemeralMarker>().iter() {
        let owner_alive = entity_of(marker.owner).is_some_and(|owner| world.contains(owner));
        if !owner_alive {
            despawn_buffer.push(entity);
        }
    }
    for (entity, parent) in world.query::<&Parent>().iter() {
        if !entity_of(parent.0).is_some_and(|owner| world.contains(owner)) {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
