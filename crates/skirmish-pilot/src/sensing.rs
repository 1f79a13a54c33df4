//! Collaborator interfaces the pilot consumes from the physics layer.

use glam::DVec3;
use skirmish_core::types::{EntityId, Layer, LayerMask, Pose};

/// First object struck by a cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: EntityId,
    pub point: DVec3,
    pub distance: f64,
}

/// Ray, sphere and overlap queries against collidable geometry.
///
/// Directions need not be normalized. Inactive entities never match.
pub trait PhysicsQuery {
    fn ray_cast(
        &self,
        origin: DVec3,
        direction: DVec3,
        max_distance: f64,
        mask: LayerMask,
    ) -> Option<RayHit>;

    fn sphere_cast(
        &self,
        origin: DVec3,
        radius: f64,
        direction: DVec3,
        max_distance: f64,
        mask: LayerMask,
    ) -> Option<RayHit>;

    /// Fill `results` with up to `max_results` colliders overlapping the sphere.
    /// Returns the number written.
    fn overlap_sphere(
        &self,
        center: DVec3,
        radius: f64,
        mask: LayerMask,
        max_results: usize,
        results: &mut Vec<EntityId>,
    ) -> usize;
}

/// Read access to entity hierarchy and kinematic state.
pub trait SceneGraph {
    fn parent(&self, entity: EntityId) -> Option<EntityId>;
    fn layer(&self, entity: EntityId) -> Option<Layer>;
    fn is_active(&self, entity: EntityId) -> bool;
    fn pose(&self, entity: EntityId) -> Option<Pose>;
    fn velocity(&self, entity: EntityId) -> Option<DVec3>;
}

const MAX_HIERARCHY_DEPTH: usize = 64;

/// Walk up the ownership chain while the parent shares the starting layer.
///
/// Several colliders on one vehicle resolve to the same root.
pub fn root_entity(scene: &dyn SceneGraph, entity: EntityId) -> EntityId {
    let Some(layer) = scene.layer(entity) else {
        return entity;
    };
    let mut root = entity;
    for _ in 0..MAX_HIERARCHY_DEPTH {
        match scene.parent(root) {
            Some(parent) if scene.layer(parent) == Some(layer) => root = parent,
            _ => break,
        }
    }
    root
}
