//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems and in the pilot crate, not components.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::MarkerKind;
use crate::types::{EntityId, Layer};

/// Linear and angular velocity of a simulated body (world frame).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub linear_velocity: DVec3,
    /// Axis-angle rate in radians per second.
    pub angular_velocity: DVec3,
}

/// Sphere collider used by physics queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub radius: f64,
    pub layer: Layer,
}

/// Ownership link to the entity this one is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent(pub EntityId);

/// Placement of an attached part in its parent's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mount {
    pub offset: DVec3,
}

/// Hit points of a damageable entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

/// Normalized steering command. Yaw, pitch and roll are in [-1, 1], thrust in [0, 1].
///
/// Positive yaw turns right, positive pitch lowers the nose, positive roll
/// rotates about the forward axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SteeringCommand {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub thrust: f64,
}

/// Weapon trigger state for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireCommand {
    pub primary: bool,
    pub secondary: bool,
}

/// Synthetic steering destination owned by exactly one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EphemeralMarker {
    pub owner: EntityId,
    pub kind: MarkerKind,
}

/// Marks the human-controlled ship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player;

/// Marks an autonomous agent ship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Agent;

/// Marks static collidable geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle;

/// Marks an entity as deactivated: ignored by queries, sensors and physics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Inactive;
