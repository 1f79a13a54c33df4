//! Geometric query layer over the world's sphere colliders.
//!
//! `PhysicsScene` is a read-only capture of the world taken once per
//! decision tick. Every sensor in that tick queries the same capture.

use std::collections::HashMap;

use glam::DVec3;
use hecs::World;

use skirmish_core::components::{Collider, Inactive, Parent, RigidBody};
use skirmish_core::types::{EntityId, Layer, LayerMask, Pose};
use skirmish_pilot::sensing::{PhysicsQuery, RayHit, SceneGraph};

use crate::ids::entity_id;

#[derive(Debug, Clone, Copy)]
struct SceneNode {
    pose: Pose,
    velocity: DVec3,
    collider: Option<Collider>,
    parent: Option<EntityId>,
    active: bool,
}

/// Snapshot of poses, colliders and hierarchy answering pilot queries.
#[derive(Debug, Default)]
pub struct PhysicsScene {
    nodes: HashMap<EntityId, SceneNode>,
    /// Active colliders in spawn order, for deterministic query results.
    colliders: Vec<EntityId>,
}

impl PhysicsScene {
    pub fn capture(world: &World) -> Self {
        let mut scene = Self::default();
        let mut query = world.query::<(
            &Pose,
            Option<&RigidBody>,
            Option<&Collider>,
            Option<&Parent>,
            Option<&Inactive>,
        )>();
        for (entity, (pose, body, collider, parent, inactive)) in query.iter() {
            let id = entity_id(entity);
            let active = inactive.is_none();
            scene.nodes.insert(
                id,
                SceneNode {
                    pose: *pose,
                    velocity: body.map_or(DVec3::ZERO, |b| b.linear_velocity),
                    collider: collider.copied(),
                    parent: parent.map(|p| p.0),
                    active,
                },
            );
            if collider.is_some() && active {
                scene.colliders.push(id);
            }
        }
        scene.colliders.sort_unstable();
        scene
    }

    fn candidates(&self, mask: LayerMask) -> impl Iterator<Item = (EntityId, &SceneNode, Collider)> + '_ {
        self.colliders.iter().filter_map(move |id| {
            let node = self.nodes.get(id)?;
            let collider = node.collider?;
            mask.contains(collider.layer).then_some((*id, node, collider))
        })
    }

    /// Nearest entry point of a ray against spheres grown by `inflate`.
    fn sweep(
        &self,
        origin: DVec3,
        inflate: f64,
        direction: DVec3,
        max_distance: f64,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        let mut best: Option<RayHit> = None;
        for (id, node, collider) in self.candidates(mask) {
            let center = node.pose.position;
            let Some(t) = ray_sphere_entry(origin, dir, center, collider.radius + inflate) else {
                continue;
            };
            if t > max_distance || best.is_some_and(|b| b.distance <= t) {
                continue;
            }
            let swept_center = origin + dir * t;
            // Contact point on the collider surface.
            let point = center + (swept_center - center).normalize_or_zero() * collider.radius;
            best = Some(RayHit {
                entity: id,
                point,
                distance: t,
            });
        }
        best
    }
}

/// Distance along `dir` at which a ray from `origin` enters the sphere.
/// Rays starting inside the sphere do not hit it.
fn ray_sphere_entry(origin: DVec3, dir: DVec3, center: DVec3, radius: f64) -> Option<f64> {
    let oc = origin - center;
    let c = oc.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let half_b = oc.dot(dir);
    let discriminant = half_b * half_b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -half_b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

impl PhysicsQuery for PhysicsScene {
    fn ray_cast(
        &self,
        origin: DVec3,
        direction: DVec3,
        max_distance: f64,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.sweep(origin, 0.0, direction, max_distance, mask)
    }

    fn sphere_cast(
        &self,
        origin: DVec3,
        radius: f64,
        direction: DVec3,
        max_distance: f64,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.sweep(origin, radius.max(0.0), direction, max_distance, mask)
    }

    fn overlap_sphere(
        &self,
        center: DVec3,
        radius: f64,
        mask: LayerMask,
        max_results: usize,
        results: &mut Vec<EntityId>,
    ) -> usize {
        let mut written = 0;
        for (id, node, collider) in self.candidates(mask) {
            if written >= max_results {
                break;
            }
            let reach = radius + collider.radius;
            if node.pose.position.distance_squared(center) <= reach * reach {
                results.push(id);
                written += 1;
            }
        }
        written
    }
}

impl SceneGraph for PhysicsScene {
    fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.nodes.get(&entity).and_then(|n| n.parent)
    }

    fn layer(&self, entity: EntityId) -> Option<Layer> {
        self.nodes
            .get(&entity)
            .and_then(|n| n.collider)
            .map(|c| c.layer)
    }

    fn is_active(&self, entity: EntityId) -> bool {
        self.nodes.get(&entity).is_some_and(|n| n.active)
    }

    fn pose(&self, entity: EntityId) -> Option<Pose> {
        self.nodes.get(&entity).map(|n| n.pose)
    }

    fn velocity(&self, entity: EntityId) -> Option<DVec3> {
        self.nodes.get(&entity).map(|n| n.velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::constants::{AGENT_LAYER, OBSTACLE_LAYER};

    fn obstacle(world: &mut World, position: DVec3, radius: f64) -> EntityId {
        entity_id(world.spawn((
            Pose::at(position),
            Collider {
                radius,
                layer: OBSTACLE_LAYER,
            },
        )))
    }

    #[test]
    fn test_ray_hits_nearest_sphere() {
        let mut world = World::new();
        let far = obstacle(&mut world, DVec3::new(0.0, 0.0, 80.0), 5.0);
        let near = obstacle(&mut world, DVec3::new(0.0, 0.0, 40.0), 5.0);
        let scene = PhysicsScene::capture(&world);

        let hit = scene
            .ray_cast(DVec3::ZERO, DVec3::Z, 100.0, LayerMask::ALL)
            .expect("hit");
        assert_eq!(hit.entity, near);
        assert!((hit.distance - 35.0).abs() < 1e-9);
        assert!((hit.point - DVec3::new(0.0, 0.0, 35.0)).length() < 1e-9);

        let short = scene.ray_cast(DVec3::ZERO, DVec3::Z, 30.0, LayerMask::ALL);
        assert!(short.is_none(), "beyond max distance");
        assert_ne!(far, near);
    }

    #[test]
    fn test_sphere_cast_widens_the_ray() {
        let mut world = World::new();
        obstacle(&mut world, DVec3::new(6.0, 0.0, 50.0), 2.0);
        let scene = PhysicsScene::capture(&world);
        assert!(scene.ray_cast(DVec3::ZERO, DVec3::Z, 100.0, LayerMask::ALL).is_none());
        assert!(scene
            .sphere_cast(DVec3::ZERO, 5.0, DVec3::Z, 100.0, LayerMask::ALL)
            .is_some());
    }

    #[test]
    fn test_queries_respect_mask_and_inactive() {
        let mut world = World::new();
        let rock = world.spawn((
            Pose::at(DVec3::new(0.0, 0.0, 20.0)),
            Collider {
                radius: 3.0,
                layer: OBSTACLE_LAYER,
            },
        ));
        let agent_mask = LayerMask::NONE.with(AGENT_LAYER);
        let scene = PhysicsScene::capture(&world);
        assert!(scene.ray_cast(DVec3::ZERO, DVec3::Z, 100.0, agent_mask).is_none());

        world.insert_one(rock, Inactive).unwrap();
        let scene = PhysicsScene::capture(&world);
        assert!(scene.ray_cast(DVec3::ZERO, DVec3::Z, 100.0, LayerMask::ALL).is_none());
        assert!(!scene.is_active(entity_id(rock)));
    }

    #[test]
    fn test_ray_from_inside_ignores_own_sphere() {
        let mut world = World::new();
        obstacle(&mut world, DVec3::ZERO, 5.0);
        let scene = PhysicsScene::capture(&world);
        assert!(scene.ray_cast(DVec3::ZERO, DVec3::Z, 100.0, LayerMask::ALL).is_none());
    }

    #[test]
    fn test_overlap_is_bounded() {
        let mut world = World::new();
        for i in 0..6 {
            obstacle(&mut world, DVec3::new(i as f64 * 10.0, 0.0, 0.0), 1.0);
        }
        let scene = PhysicsScene::capture(&world);
        let mut results = Vec::new();
        assert_eq!(scene.overlap_sphere(DVec3::ZERO, 100.0, LayerMask::ALL, 4, &mut results), 4);
        assert_eq!(results.len(), 4);

        results.clear();
        assert_eq!(scene.overlap_sphere(DVec3::ZERO, 15.0, LayerMask::ALL, 10, &mut results), 2);
    }
}
