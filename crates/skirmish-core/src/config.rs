//! Tuning configuration for agents and ships.
//!
//! Every struct deserializes with `#[serde(default)]` so scenario files only
//! need to name the values they change. `validate()` is called when a
//! component is built and rejects wiring mistakes up front.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{DerivativeMode, ThrustSmoothing};
use crate::error::{ensure_non_negative, ensure_positive, ConfigError};
use crate::types::LayerMask;

/// Gains and limits for a single-axis PID controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub proportional_gain: f64,
    pub integral_gain: f64,
    pub derivative_gain: f64,
    pub min_output: f64,
    pub max_output: f64,
    /// Clamp on the accumulated error-time, not on the scaled integral term.
    pub integral_saturation: f64,
    pub derivative_mode: DerivativeMode,
    /// When false the controller passes the setpoint straight through.
    pub enabled: bool,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            proportional_gain: PID_PROPORTIONAL_GAIN,
            integral_gain: 0.0,
            derivative_gain: PID_DERIVATIVE_GAIN,
            min_output: -1.0,
            max_output: 1.0,
            integral_saturation: 0.0,
            derivative_mode: DerivativeMode::default(),
            enabled: true,
        }
    }
}

impl PidConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_output > self.max_output || self.min_output.is_nan() || self.max_output.is_nan()
        {
            return Err(ConfigError::InvertedBounds {
                field: "pid.output",
                min: self.min_output,
                max: self.max_output,
            });
        }
        ensure_non_negative("pid.integral_saturation", self.integral_saturation)
    }
}

/// Flight controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub yaw_pid: PidConfig,
    pub pitch_pid: PidConfig,
    pub enable_yaw: bool,
    pub enable_pitch: bool,
    pub thrust_distance_threshold: f64,
    pub roll_deadband_deg: f64,
    pub thrust_smoothing: ThrustSmoothing,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            yaw_pid: PidConfig::default(),
            pitch_pid: PidConfig::default(),
            enable_yaw: true,
            enable_pitch: true,
            thrust_distance_threshold: THRUST_DISTANCE_THRESHOLD,
            roll_deadband_deg: ROLL_DEADBAND_DEG,
            thrust_smoothing: ThrustSmoothing::default(),
        }
    }
}

impl FlightConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.yaw_pid.validate()?;
        self.pitch_pid.validate()?;
        ensure_non_negative("flight.thrust_distance_threshold", self.thrust_distance_threshold)?;
        ensure_non_negative("flight.roll_deadband_deg", self.roll_deadband_deg)?;
        if let ThrustSmoothing::TimeConstant { secs } = self.thrust_smoothing {
            ensure_positive("flight.thrust_smoothing.secs", secs)?;
        }
        Ok(())
    }
}

/// One avoidance probe, expressed in the ship's local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub name: String,
    pub offset: DVec3,
    pub direction: DVec3,
}

impl ProbeConfig {
    pub fn new(name: &str, offset: DVec3, direction: DVec3) -> Self {
        Self {
            name: name.to_string(),
            offset,
            direction,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.direction.length_squared() < 1e-12 || !self.direction.is_finite() {
            return Err(ConfigError::ZeroProbeDirection {
                probe: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Collision-avoidance probe layout.
///
/// Left and right probes are scanned in list order; the first hit wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    pub up_probe: ProbeConfig,
    pub down_probe: ProbeConfig,
    pub left_probes: Vec<ProbeConfig>,
    pub right_probes: Vec<ProbeConfig>,
    pub detection_range: f64,
    pub vertical_probe_radius: f64,
    pub mask: LayerMask,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            up_probe: ProbeConfig::new("top", DVec3::new(0.0, 2.0, 2.0), DVec3::new(0.0, 0.4, 1.0)),
            down_probe: ProbeConfig::new(
                "bottom",
                DVec3::new(0.0, -2.0, 2.0),
                DVec3::new(0.0, -0.4, 1.0),
            ),
            left_probes: vec![
                ProbeConfig::new("left_front", DVec3::new(-2.0, 0.0, 2.0), DVec3::new(-0.2, 0.0, 1.0)),
                ProbeConfig::new("left_wide", DVec3::new(-2.0, 0.0, 0.0), DVec3::new(-1.0, 0.0, 1.0)),
            ],
            right_probes: vec![
                ProbeConfig::new("right_front", DVec3::new(2.0, 0.0, 2.0), DVec3::new(0.2, 0.0, 1.0)),
                ProbeConfig::new("right_wide", DVec3::new(2.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 1.0)),
            ],
            detection_range: AVOIDANCE_DETECTION_RANGE,
            vertical_probe_radius: AVOIDANCE_VERTICAL_PROBE_RADIUS,
            mask: LayerMask::NONE.with(OBSTACLE_LAYER),
        }
    }
}

impl AvoidanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("avoidance.detection_range", self.detection_range)?;
        ensure_non_negative("avoidance.vertical_probe_radius", self.vertical_probe_radius)?;
        if self.left_probes.is_empty() {
            return Err(ConfigError::EmptyProbeList { side: "left" });
        }
        if self.right_probes.is_empty() {
            return Err(ConfigError::EmptyProbeList { side: "right" });
        }
        self.up_probe.validate()?;
        self.down_probe.validate()?;
        for probe in self.left_probes.iter().chain(&self.right_probes) {
            probe.validate()?;
        }
        Ok(())
    }
}

/// Periodic volume scan and lock-on tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub scan_interval_secs: f64,
    pub scan_radius: f64,
    pub max_targets: usize,
    pub target_mask: LayerMask,
    /// Half-angle of the lock-on cone around the forward axis (degrees).
    pub lock_cone_deg: f64,
    pub lock_range: f64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: ACQUISITION_SCAN_INTERVAL_SECS,
            scan_radius: ACQUISITION_SCAN_RADIUS,
            max_targets: ACQUISITION_MAX_TARGETS,
            target_mask: LayerMask::NONE.with(AGENT_LAYER),
            lock_cone_deg: LOCK_CONE_DEG,
            lock_range: LOCK_RANGE,
        }
    }
}

impl AcquisitionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("acquisition.scan_interval_secs", self.scan_interval_secs)?;
        ensure_positive("acquisition.scan_radius", self.scan_radius)?;
        if self.max_targets == 0 {
            return Err(ConfigError::NonPositive {
                field: "acquisition.max_targets",
                value: 0.0,
            });
        }
        ensure_non_negative("acquisition.lock_cone_deg", self.lock_cone_deg)?;
        ensure_non_negative("acquisition.lock_range", self.lock_range)
    }
}

/// Behavior state machine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub patrol_range: f64,
    pub attack_range: f64,
    pub retreat_health_fraction: f64,
    pub waypoint_arrival_radius: f64,
    pub reposition_arrival_radius: f64,
    pub reposition_distance: f64,
    pub retreat_distance: f64,
    pub too_close_radius: f64,
    pub too_close_range: f64,
    /// Layers the too-close sensor looks for.
    pub player_mask: LayerMask,
    /// Layers weapons are armed against while attacking.
    pub target_mask: LayerMask,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        let player = LayerMask::NONE.with(PLAYER_LAYER);
        Self {
            patrol_range: PATROL_RANGE,
            attack_range: ATTACK_RANGE,
            retreat_health_fraction: RETREAT_HEALTH_FRACTION,
            waypoint_arrival_radius: WAYPOINT_ARRIVAL_RADIUS,
            reposition_arrival_radius: REPOSITION_ARRIVAL_RADIUS,
            reposition_distance: REPOSITION_DISTANCE,
            retreat_distance: RETREAT_DISTANCE,
            too_close_radius: TOO_CLOSE_RADIUS,
            too_close_range: TOO_CLOSE_RANGE,
            player_mask: player,
            target_mask: player,
        }
    }
}

impl BehaviorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("behavior.patrol_range", self.patrol_range)?;
        ensure_non_negative("behavior.attack_range", self.attack_range)?;
        ensure_non_negative("behavior.retreat_health_fraction", self.retreat_health_fraction)?;
        ensure_non_negative("behavior.waypoint_arrival_radius", self.waypoint_arrival_radius)?;
        ensure_non_negative("behavior.reposition_arrival_radius", self.reposition_arrival_radius)?;
        ensure_positive("behavior.reposition_distance", self.reposition_distance)?;
        ensure_positive("behavior.retreat_distance", self.retreat_distance)?;
        ensure_non_negative("behavior.too_close_radius", self.too_close_radius)?;
        ensure_non_negative("behavior.too_close_range", self.too_close_range)
    }
}

/// AI weapon aiming tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub projectile_speed: f64,
    pub primary_range_fraction: f64,
    pub cast_radius: f64,
    pub alignment_tolerance: f64,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            projectile_speed: PROJECTILE_SPEED,
            primary_range_fraction: PRIMARY_RANGE_FRACTION,
            cast_radius: WEAPON_CAST_RADIUS,
            alignment_tolerance: SECONDARY_ALIGNMENT_TOLERANCE,
        }
    }
}

impl WeaponConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("weapons.projectile_speed", self.projectile_speed)?;
        ensure_non_negative("weapons.primary_range_fraction", self.primary_range_fraction)?;
        ensure_non_negative("weapons.cast_radius", self.cast_radius)?;
        ensure_non_negative("weapons.alignment_tolerance", self.alignment_tolerance)
    }
}

/// Physical properties and force constants of a ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub max_health: f64,
    pub thrust_force: f64,
    pub pitch_force: f64,
    pub roll_force: f64,
    pub yaw_force: f64,
    /// Thrust is split evenly across this many engines.
    pub engine_count: usize,
    pub mass: f64,
    pub angular_inertia: f64,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub collider_radius: f64,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
            thrust_force: THRUST_FORCE,
            pitch_force: PITCH_FORCE,
            roll_force: ROLL_FORCE,
            yaw_force: YAW_FORCE,
            engine_count: 2,
            mass: SHIP_MASS,
            angular_inertia: SHIP_ANGULAR_INERTIA,
            linear_damping: SHIP_LINEAR_DAMPING,
            angular_damping: SHIP_ANGULAR_DAMPING,
            collider_radius: SHIP_COLLIDER_RADIUS,
        }
    }
}

impl ShipConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("ship.max_health", self.max_health)?;
        ensure_non_negative("ship.thrust_force", self.thrust_force)?;
        ensure_non_negative("ship.pitch_force", self.pitch_force)?;
        ensure_non_negative("ship.roll_force", self.roll_force)?;
        ensure_non_negative("ship.yaw_force", self.yaw_force)?;
        if self.engine_count == 0 {
            return Err(ConfigError::NoEngines);
        }
        ensure_positive("ship.mass", self.mass)?;
        ensure_positive("ship.angular_inertia", self.angular_inertia)?;
        ensure_non_negative("ship.linear_damping", self.linear_damping)?;
        ensure_non_negative("ship.angular_damping", self.angular_damping)?;
        ensure_positive("ship.collider_radius", self.collider_radius)
    }
}

/// Everything needed to wire one autonomous agent at spawn.
///
/// The default agent has avoidance fitted and acquisition aimed at the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub ship: ShipConfig,
    pub flight: FlightConfig,
    pub behavior: BehaviorConfig,
    /// `None` disables collision avoidance entirely.
    pub avoidance: Option<AvoidanceConfig>,
    pub acquisition: AcquisitionConfig,
    pub weapons: WeaponConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ship: ShipConfig::default(),
            flight: FlightConfig::default(),
            behavior: BehaviorConfig::default(),
            avoidance: Some(AvoidanceConfig::default()),
            acquisition: AcquisitionConfig {
                target_mask: LayerMask::NONE.with(PLAYER_LAYER),
                scan_radius: ATTACK_RANGE,
                ..AcquisitionConfig::default()
            },
            weapons: WeaponConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ship.validate()?;
        self.flight.validate()?;
        self.behavior.validate()?;
        if let Some(avoidance) = &self.avoidance {
            avoidance.validate()?;
        }
        self.acquisition.validate()?;
        self.weapons.validate()
    }
}
