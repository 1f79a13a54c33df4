//! Fundamental geometric and simulation types.
//!
//! Local frame convention: +X right, +Y up, +Z forward.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Opaque identity of a simulation entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Classification layer an entity belongs to (0..32).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer(pub u8);

/// Set of layers used to filter physics queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn from_layers(layers: &[Layer]) -> Self {
        layers
            .iter()
            .fold(Self::NONE, |mask, layer| mask.with(*layer))
    }

    /// Mask with `layer` added. Layers outside 0..32 are ignored.
    pub fn with(self, layer: Layer) -> Self {
        match 1u32.checked_shl(layer.0 as u32) {
            Some(bit) => LayerMask(self.0 | bit),
            None => self,
        }
    }

    pub fn contains(self, layer: Layer) -> bool {
        1u32
            .checked_shl(layer.0 as u32)
            .is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Position plus orientation. The rotation maps local axes into world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with identity orientation (facing +Z).
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Pose at `position` turned `yaw_deg` degrees about the world up axis.
    pub fn with_yaw(position: DVec3, yaw_deg: f64) -> Self {
        Self {
            position,
            rotation: DQuat::from_rotation_y(yaw_deg.to_radians()),
        }
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    pub fn right(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// Express a world-space point in this pose's local frame.
    pub fn to_local(&self, world_point: DVec3) -> DVec3 {
        self.rotation.inverse() * (world_point - self.position)
    }

    /// Express a local-frame point in world space.
    pub fn to_world(&self, local_point: DVec3) -> DVec3 {
        self.position + self.rotation * local_point
    }

    /// Rotate a local-frame direction into world space.
    pub fn direction_to_world(&self, local_direction: DVec3) -> DVec3 {
        self.rotation * local_direction
    }

    pub fn distance_to(&self, point: DVec3) -> f64 {
        self.position.distance(point)
    }
}

/// Unsigned angle between two vectors in degrees, 0 when either is degenerate.
pub fn angle_between_deg(a: DVec3, b: DVec3) -> f64 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < 1e-15 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Simulation time tracking for the two tick rates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Decision ticks run so far (one per rendered frame).
    pub frame: u64,
    /// Fixed physics steps run so far.
    pub fixed_steps: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one decision tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.frame += 1;
        self.elapsed_secs += dt.max(0.0);
    }
}
