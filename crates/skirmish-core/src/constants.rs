//! Simulation constants and tuning parameters.

use crate::types::Layer;

// --- Timing ---

/// Fixed physics step (seconds).
pub const FIXED_DT: f64 = 0.02;

/// Nominal decision tick used by the headless runner (seconds).
pub const FRAME_DT: f64 = 1.0 / 60.0;

// --- Layers ---

pub const PLAYER_LAYER: Layer = Layer(8);
pub const AGENT_LAYER: Layer = Layer(9);
pub const OBSTACLE_LAYER: Layer = Layer(10);

// --- PID ---

pub const PID_PROPORTIONAL_GAIN: f64 = 0.5;
pub const PID_DERIVATIVE_GAIN: f64 = 0.1;

// --- Flight ---

/// Beyond this distance the agent ramps thrust to full, otherwise to idle.
pub const THRUST_DISTANCE_THRESHOLD: f64 = 100.0;

/// Bearing (degrees) below which no roll is commanded.
pub const ROLL_DEADBAND_DEG: f64 = 0.25;

// --- Collision avoidance ---

pub const AVOIDANCE_DETECTION_RANGE: f64 = 100.0;

/// Radius of the sphere casts used by the vertical probes.
pub const AVOIDANCE_VERTICAL_PROBE_RADIUS: f64 = 2.0;

// --- Target acquisition ---

pub const ACQUISITION_SCAN_INTERVAL_SECS: f64 = 0.25;
pub const ACQUISITION_SCAN_RADIUS: f64 = 500.0;
pub const ACQUISITION_MAX_TARGETS: usize = 200;
pub const LOCK_CONE_DEG: f64 = 15.0;
pub const LOCK_RANGE: f64 = 400.0;

// --- Behavior ---

/// Health fraction below which an agent retreats.
pub const RETREAT_HEALTH_FRACTION: f64 = 0.33;
pub const PATROL_RANGE: f64 = 2000.0;
pub const ATTACK_RANGE: f64 = 1000.0;
pub const WAYPOINT_ARRIVAL_RADIUS: f64 = 0.15;
pub const REPOSITION_ARRIVAL_RADIUS: f64 = 100.0;
pub const REPOSITION_DISTANCE: f64 = 250.0;
pub const RETREAT_DISTANCE: f64 = 5000.0;
pub const TOO_CLOSE_RADIUS: f64 = 3.0;
pub const TOO_CLOSE_RANGE: f64 = 100.0;

// --- Weapons ---

pub const PROJECTILE_SPEED: f64 = 800.0;
/// Primary fire reaches this fraction of the attack range.
pub const PRIMARY_RANGE_FRACTION: f64 = 0.5;
pub const WEAPON_CAST_RADIUS: f64 = 3.0;
/// Max `|forward_target - forward_self|` for secondary fire.
pub const SECONDARY_ALIGNMENT_TOLERANCE: f64 = 0.5;

// --- Intercept ---

/// Below this, intercept coefficients and times count as zero.
pub const INTERCEPT_EPSILON: f64 = 1e-9;

// --- Ship ---

pub const THRUST_FORCE: f64 = 7500.0;
pub const PITCH_FORCE: f64 = 6000.0;
pub const ROLL_FORCE: f64 = 1000.0;
pub const YAW_FORCE: f64 = 2000.0;
pub const MAX_HEALTH: f64 = 5000.0;
pub const SHIP_MASS: f64 = 10.0;
pub const SHIP_ANGULAR_INERTIA: f64 = 20.0;
pub const SHIP_LINEAR_DAMPING: f64 = 0.5;
pub const SHIP_ANGULAR_DAMPING: f64 = 3.0;
pub const SHIP_COLLIDER_RADIUS: f64 = 5.0;

// --- Human input ---

pub const DESKTOP_DEAD_ZONE: f64 = 0.1;
