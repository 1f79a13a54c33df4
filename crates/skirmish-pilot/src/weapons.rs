//! AI weapon aiming.
//!
//! While armed, fires the primary weapon when a short forward ray meets the
//! target mask, and the secondary when a wider forward sweep meets it with
//! the target flying the same way as the shooter.

use glam::DVec3;
use skirmish_core::components::FireCommand;
use skirmish_core::config::WeaponConfig;
use skirmish_core::error::ConfigError;
use skirmish_core::types::{EntityId, LayerMask, Pose};
use tracing::trace;

use crate::intercept;
use crate::sensing::{PhysicsQuery, SceneGraph};

/// What weapons are pointed at while armed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponAim {
    pub target: EntityId,
    pub attack_range: f64,
    pub mask: LayerMask,
}

pub struct AiWeaponControls {
    config: WeaponConfig,
    aim: Option<WeaponAim>,
    fire: FireCommand,
    aim_point: Option<DVec3>,
}

impl AiWeaponControls {
    pub fn new(config: WeaponConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            aim: None,
            fire: FireCommand::default(),
            aim_point: None,
        })
    }

    pub fn arm(&mut self, aim: WeaponAim) {
        self.aim = Some(aim);
    }

    /// Stop firing. Takes effect immediately.
    pub fn disarm(&mut self) {
        self.aim = None;
        self.fire = FireCommand::default();
        self.aim_point = None;
    }

    pub fn is_armed(&self) -> bool {
        self.aim.is_some()
    }

    pub fn aim(&self) -> Option<WeaponAim> {
        self.aim
    }

    /// Evaluate both triggers for this tick.
    pub fn update(
        &mut self,
        pose: &Pose,
        physics: &dyn PhysicsQuery,
        scene: &dyn SceneGraph,
    ) -> FireCommand {
        self.fire = FireCommand::default();
        self.aim_point = None;

        let Some(aim) = self.aim else {
            return self.fire;
        };
        if !scene.is_active(aim.target) {
            return self.fire;
        }
        let Some(target_pose) = scene.pose(aim.target) else {
            return self.fire;
        };
        let target_velocity = scene.velocity(aim.target).unwrap_or(DVec3::ZERO);

        let forward = pose.forward();
        let primary_range = aim.attack_range * self.config.primary_range_fraction;
        let primary = physics
            .ray_cast(pose.position, forward, primary_range, aim.mask)
            .is_some();

        let aligned = (target_pose.forward() - forward).length() < self.config.alignment_tolerance;
        let secondary = aligned
            && physics
                .sphere_cast(
                    pose.position,
                    self.config.cast_radius,
                    forward,
                    aim.attack_range,
                    aim.mask,
                )
                .is_some();

        self.aim_point = Some(intercept::solve(
            pose.position,
            target_pose.position,
            target_velocity,
            self.config.projectile_speed,
        ));
        self.fire = FireCommand { primary, secondary };
        if primary || secondary {
            trace!(target = aim.target.0, primary, secondary, "weapons firing");
        }
        self.fire
    }

    /// Trigger state from the last update.
    pub fn fire(&self) -> FireCommand {
        self.fire
    }

    /// Lead point on the armed target from the last update.
    pub fn aim_point(&self) -> Option<DVec3> {
        self.aim_point
    }
}
