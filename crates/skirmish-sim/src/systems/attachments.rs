//! Attached parts: placement and bookkeeping for colliders mounted on a ship.
//!
//! A part carries `Parent` and `Mount`. Its pose is derived from the parent
//! after every physics pass, and it shares the parent's active state.

use hecs::{Entity, World};

use skirmish_core::components::{Mount, Parent};
use skirmish_core::types::Pose;

use crate::ids::{entity_id, entity_of};

/// World pose of a part mounted at `offset` on `parent`.
pub fn mounted_pose(parent: &Pose, offset: glam::DVec3) -> Pose {
    Pose::new(parent.to_world(offset), parent.rotation)
}

/// Move every part to its mount point on the parent's current pose.
pub fn run(world: &mut World) {
    // Collect updates in a buffer to avoid borrow issues with hecs
    let mut placed: Vec<(Entity, Pose)> = Vec::new();
    for (entity, (parent, mount)) in world.query::<(&Parent, &Mount)>().iter() {
        let Some(parent_entity) = entity_of(parent.0) else {
            continue;
        };
        let Ok(parent_pose) = world.get::<&Pose>(parent_entity) else {
            continue;
        };
        placed.push((entity, mounted_pose(&parent_pose, mount.offset)));
    }

    for (entity, pose) in placed {
        if let Ok(mut current) = world.get::<&mut Pose>(entity) {
            *current = pose;
        }
    }
}

/// Parts attached directly to `owner`, in spawn order.
pub fn parts_of(world: &World, owner: Entity) -> Vec<Entity> {
    let owner_id = entity_id(owner);
    let mut parts: Vec<Entity> = world
        .query::<&Parent>()
        .iter()
        .filter(|(_, parent)| parent.0 == owner_id)
        .map(|(entity, _)| entity)
        .collect();
    parts.sort_by_key(|e| entity_id(*e));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_parts_follow_parent_pose() {
        let mut world = World::new();
        let hull = world.spawn((Pose::with_yaw(DVec3::new(10.0, 0.0, 0.0), 90.0),));
        let wing = world.spawn((
            Pose::default(),
            Parent(entity_id(hull)),
            Mount {
                offset: DVec3::new(0.0, 0.0, 5.0),
            },
        ));
        let other = world.spawn((Pose::default(),));

        run(&mut world);
        let placed = *world.get::<&Pose>(wing).unwrap();
        // Yawed 90 degrees, the hull's nose points along +X.
        assert!((placed.position - DVec3::new(15.0, 0.0, 0.0)).length() < 1e-9);
        assert_eq!(placed.rotation, world.get::<&Pose>(hull).unwrap().rotation);
        assert_eq!(parts_of(&world, hull), vec![wing]);
        assert!(parts_of(&world, other).is_empty());
    }

    #[test]
    fn test_orphaned_part_stays_put() {
        let mut world = World::new();
        let hull = world.spawn((Pose::default(),));
        let wing = world.spawn((
            Pose::at(DVec3::ONE),
            Parent(entity_id(hull)),
            Mount {
                offset: DVec3::new(0.0, 0.0, 5.0),
            },
        ));
        world.despawn(hull).unwrap();
        run(&mut world);
        assert_eq!(world.get::<&Pose>(wing).unwrap().position, DVec3::ONE);
    }
}
