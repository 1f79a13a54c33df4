//! Periodic volume scan and lock-on selection.
//!
//! A repeating timer paces the scan so it runs independently of the
//! decision tick. Each scan rebuilds the in-range set from scratch and
//! picks the nearest candidate inside the lock cone.

use skirmish_core::config::AcquisitionConfig;
use skirmish_core::error::ConfigError;
use skirmish_core::types::{angle_between_deg, EntityId, Pose};
use tracing::{debug, trace};

use crate::sensing::{root_entity, PhysicsQuery, SceneGraph};
use crate::timer::RepeatingTimer;

/// An in-range target eligible for lock-on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockCandidate {
    pub target: EntityId,
    pub distance: f64,
    /// Angle off boresight in degrees.
    pub angle_deg: f64,
}

/// Edge of the combat state, reported only when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatTransition {
    Entered,
    Left,
}

pub struct TargetAcquisition {
    config: AcquisitionConfig,
    owner: Option<EntityId>,
    timer: RepeatingTimer,
    hits: Vec<EntityId>,
    in_range: Vec<EntityId>,
    best_lock: Option<LockCandidate>,
    in_combat: bool,
}

impl TargetAcquisition {
    pub fn new(config: AcquisitionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            timer: RepeatingTimer::new(config.scan_interval_secs),
            hits: Vec::with_capacity(config.max_targets),
            config,
            owner: None,
            in_range: Vec::new(),
            best_lock: None,
            in_combat: false,
        })
    }

    /// Exclude the sensor's own vehicle from scan results.
    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn start(&mut self) {
        self.timer.start();
    }

    /// Cancel scanning. Results from the last scan are kept for diagnostics.
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Advance the scan timer and scan when it fires.
    pub fn tick(
        &mut self,
        dt: f64,
        origin: &Pose,
        physics: &dyn PhysicsQuery,
        scene: &dyn SceneGraph,
    ) -> Option<CombatTransition> {
        if self.timer.tick(dt) {
            self.scan(origin, physics, scene)
        } else {
            None
        }
    }

    /// Rebuild the in-range set and lock candidate immediately.
    pub fn scan(
        &mut self,
        origin: &Pose,
        physics: &dyn PhysicsQuery,
        scene: &dyn SceneGraph,
    ) -> Option<CombatTransition> {
        self.hits.clear();
        physics.overlap_sphere(
            origin.position,
            self.config.scan_radius,
            self.config.target_mask,
            self.config.max_targets,
            &mut self.hits,
        );

        self.in_range.clear();
        self.best_lock = None;
        let forward = origin.forward();

        for &hit in &self.hits {
            let root = root_entity(scene, hit);
            if Some(root) == self.owner || !scene.is_active(root) || self.in_range.contains(&root) {
                continue;
            }
            self.in_range.push(root);

            let Some(pose) = scene.pose(root) else {
                continue;
            };
            let offset = pose.position - origin.position;
            let distance = offset.length();
            let angle_deg = angle_between_deg(forward, offset);
            let closer = self
                .best_lock
                .map_or(true, |best| distance < best.distance);
            if angle_deg <= self.config.lock_cone_deg
                && distance <= self.config.lock_range
                && closer
            {
                self.best_lock = Some(LockCandidate {
                    target: root,
                    distance,
                    angle_deg,
                });
            }
        }

        trace!(
            hits = self.hits.len(),
            in_range = self.in_range.len(),
            lock = ?self.best_lock.map(|c| c.target.0),
            "acquisition scan"
        );

        let now_in_combat = !self.in_range.is_empty();
        if now_in_combat == self.in_combat {
            return None;
        }
        self.in_combat = now_in_combat;
        debug!(owner = ?self.owner.map(|o| o.0), in_combat = now_in_combat, "combat state changed");
        Some(if now_in_combat {
            CombatTransition::Entered
        } else {
            CombatTransition::Left
        })
    }

    /// Distinct active targets found by the last scan, in scan order.
    pub fn in_range(&self) -> &[EntityId] {
        &self.in_range
    }

    pub fn best_lock(&self) -> Option<LockCandidate> {
        self.best_lock
    }

    pub fn in_combat(&self) -> bool {
        self.in_combat
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }
}
