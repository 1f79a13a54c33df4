//! Enumeration types used throughout the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Behavior state of an autonomous agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Wander between random waypoints.
    Patrol,
    /// Pursue and fire on the player.
    Attack,
    /// Break off to a point beside the agent after closing too far.
    Reposition,
    /// Run away from the player. Never left once entered.
    Retreat,
}

impl BehaviorState {
    pub fn name(self) -> &'static str {
        match self {
            BehaviorState::Patrol => "Patrol",
            BehaviorState::Attack => "Attack",
            BehaviorState::Reposition => "Reposition",
            BehaviorState::Retreat => "Retreat",
        }
    }
}

impl fmt::Display for BehaviorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vertical collision-avoidance axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAvoidance {
    #[default]
    None,
    /// Obstacle below: climb.
    Up,
    /// Obstacle above: dive.
    Down,
}

impl VerticalAvoidance {
    /// Pitch command that overrides pursuit steering. Negative pitch raises the nose.
    pub fn pitch_command(self) -> Option<f64> {
        match self {
            VerticalAvoidance::None => None,
            VerticalAvoidance::Up => Some(-1.0),
            VerticalAvoidance::Down => Some(1.0),
        }
    }
}

/// Horizontal collision-avoidance axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAvoidance {
    #[default]
    None,
    /// Obstacle on the right: turn left.
    Left,
    /// Obstacle on the left: turn right.
    Right,
}

impl HorizontalAvoidance {
    /// Yaw command that overrides pursuit steering. Positive yaw turns right.
    pub fn yaw_command(self) -> Option<f64> {
        match self {
            HorizontalAvoidance::None => None,
            HorizontalAvoidance::Left => Some(-1.0),
            HorizontalAvoidance::Right => Some(1.0),
        }
    }
}

/// Which rate of change feeds the PID derivative term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivativeMode {
    /// Negated rate of change of the measured value. Immune to setpoint kick.
    #[default]
    Velocity,
    /// Rate of change of the error.
    ErrorRateOfChange,
}

/// Purpose of an ephemeral steering marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    PatrolWaypoint,
    RepositionPoint,
    RetreatPoint,
}

/// Source of movement and weapon commands for a ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlScheme {
    HumanDesktop,
    HumanGamepad,
    #[default]
    Ai,
}

/// How the flight controller ramps thrust toward its goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ThrustSmoothing {
    /// `lerp(current, goal, dt)`. Frame-rate dependent.
    #[default]
    FrameLerp,
    /// First-order response with the given time constant.
    TimeConstant { secs: f64 },
}
