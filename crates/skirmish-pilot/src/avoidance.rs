//! Discrete directional obstacle detector.
//!
//! Each tick the sensor casts its probes from the ship's pose and reports
//! one override per axis. Scans are first-hit-wins in probe order; no
//! distance comparison is made across probes.

use skirmish_core::config::{AvoidanceConfig, ProbeConfig};
use skirmish_core::enums::{HorizontalAvoidance, VerticalAvoidance};
use skirmish_core::error::ConfigError;
use skirmish_core::types::{EntityId, Pose};
use tracing::trace;

use crate::sensing::{PhysicsQuery, RayHit};

/// Steering override for one tick. Never carried across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvoidanceSignal {
    pub vertical: VerticalAvoidance,
    pub horizontal: HorizontalAvoidance,
}

impl AvoidanceSignal {
    pub const NONE: AvoidanceSignal = AvoidanceSignal {
        vertical: VerticalAvoidance::None,
        horizontal: HorizontalAvoidance::None,
    };

    /// True when either axis is overriding steering.
    pub fn is_active(&self) -> bool {
        self.vertical != VerticalAvoidance::None || self.horizontal != HorizontalAvoidance::None
    }
}

/// Which probe produced an override, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub probe: String,
    pub entity: EntityId,
    pub distance: f64,
}

pub struct CollisionAvoidanceSensor {
    config: AvoidanceConfig,
    signal: AvoidanceSignal,
    last_vertical: Option<Detection>,
    last_horizontal: Option<Detection>,
}

impl CollisionAvoidanceSensor {
    pub fn new(config: AvoidanceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            signal: AvoidanceSignal::NONE,
            last_vertical: None,
            last_horizontal: None,
        })
    }

    /// Cast every probe from `pose` and recompute the signal.
    pub fn sense(&mut self, pose: &Pose, physics: &dyn PhysicsQuery) -> AvoidanceSignal {
        let config = &self.config;

        let vertical = if let Some(hit) = self.cast_vertical(&config.up_probe, pose, physics) {
            Some((VerticalAvoidance::Down, detection(&config.up_probe, hit)))
        } else {
            self.cast_vertical(&config.down_probe, pose, physics)
                .map(|hit| (VerticalAvoidance::Up, detection(&config.down_probe, hit)))
        };

        let horizontal = first_ray_hit(&config.left_probes, pose, physics, config)
            .map(|(probe, hit)| (HorizontalAvoidance::Right, detection(probe, hit)))
            .or_else(|| {
                first_ray_hit(&config.right_probes, pose, physics, config)
                    .map(|(probe, hit)| (HorizontalAvoidance::Left, detection(probe, hit)))
            });

        self.signal = AvoidanceSignal {
            vertical: vertical
                .as_ref()
                .map_or(VerticalAvoidance::None, |(axis, _)| *axis),
            horizontal: horizontal
                .as_ref()
                .map_or(HorizontalAvoidance::None, |(axis, _)| *axis),
        };

        if let Some((axis, d)) = &vertical {
            trace!(probe = %d.probe, entity = d.entity.0, distance = d.distance, ?axis, "vertical probe hit");
            self.last_vertical = Some(d.clone());
        }
        if let Some((axis, d)) = &horizontal {
            trace!(probe = %d.probe, entity = d.entity.0, distance = d.distance, ?axis, "horizontal probe hit");
            self.last_horizontal = Some(d.clone());
        }

        self.signal
    }

    /// Signal computed by the most recent `sense` call.
    pub fn signal(&self) -> AvoidanceSignal {
        self.signal
    }

    /// Most recent vertical detection, retained after the obstacle clears.
    pub fn last_vertical_detection(&self) -> Option<&Detection> {
        self.last_vertical.as_ref()
    }

    /// Most recent horizontal detection, retained after the obstacle clears.
    pub fn last_horizontal_detection(&self) -> Option<&Detection> {
        self.last_horizontal.as_ref()
    }

    pub fn reset(&mut self) {
        self.signal = AvoidanceSignal::NONE;
    }

    pub fn config(&self) -> &AvoidanceConfig {
        &self.config
    }

    fn cast_vertical(
        &self,
        probe: &ProbeConfig,
        pose: &Pose,
        physics: &dyn PhysicsQuery,
    ) -> Option<RayHit> {
        physics.sphere_cast(
            pose.to_world(probe.offset),
            self.config.vertical_probe_radius,
            pose.direction_to_world(probe.direction),
            self.config.detection_range,
            self.config.mask,
        )
    }
}

fn first_ray_hit<'a>(
    probes: &'a [ProbeConfig],
    pose: &Pose,
    physics: &dyn PhysicsQuery,
    config: &AvoidanceConfig,
) -> Option<(&'a ProbeConfig, RayHit)> {
    probes.iter().find_map(|probe| {
        physics
            .ray_cast(
                pose.to_world(probe.offset),
                pose.direction_to_world(probe.direction),
                config.detection_range,
                config.mask,
            )
            .map(|hit| (probe, hit))
    })
}

fn detection(probe: &ProbeConfig, hit: RayHit) -> Detection {
    Detection {
        probe: probe.name.clone(),
        entity: hit.entity,
        distance: hit.distance,
    }
}
