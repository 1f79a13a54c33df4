//! Diagnostic snapshot: the read-only view handed to collaborators each frame.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::components::{FireCommand, SteeringCommand};
use crate::enums::{BehaviorState, HorizontalAvoidance, VerticalAvoidance};
use crate::events::SimEvent;
use crate::types::{EntityId, SimTime};

/// Complete state published after each decision tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub agents: Vec<AgentDiagnostics>,
    pub player: Option<PlayerView>,
    pub events: Vec<SimEvent>,
}

/// Per-agent diagnostic accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDiagnostics {
    pub agent: EntityId,
    pub active: bool,
    pub state: Option<BehaviorState>,
    pub target: Option<EntityId>,
    /// Distance to the current flight target, entity or marker.
    pub target_distance: Option<f64>,
    pub health: f64,
    pub max_health: f64,
    pub health_ratio: f64,
    pub vertical_avoidance: VerticalAvoidance,
    pub horizontal_avoidance: HorizontalAvoidance,
    /// Bearing to the flight target in the agent's frame (degrees), when steering.
    pub bearing_deg: Option<f64>,
    /// Elevation of the flight target (degrees), when steering.
    pub pitch_deg: Option<f64>,
    pub steering: SteeringCommand,
    pub fire: FireCommand,
    /// Lead point on the armed weapon target.
    pub aim_point: Option<DVec3>,
    pub in_combat: bool,
}

/// Targeting view for the human player's reticle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player: EntityId,
    pub position: DVec3,
    pub targets_in_range: Vec<EntityId>,
    pub lock: Option<LockView>,
}

/// Current lock-on target plus where to aim to hit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockView {
    pub target: EntityId,
    pub distance: f64,
    pub angle_deg: f64,
    pub lead_point: DVec3,
}
