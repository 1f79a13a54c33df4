//! Scenario files: the initial world for a headless run.
//!
//! Scenarios are JSON. Every field has a default so a file only needs to
//! list what it changes.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use skirmish_core::config::{AcquisitionConfig, AgentConfig, ShipConfig};
use skirmish_core::constants::{FIXED_DT, PROJECTILE_SPEED};
use skirmish_core::enums::ControlScheme;
use skirmish_core::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub fixed_dt: f64,
    pub player: Option<PlayerSpawn>,
    pub agents: Vec<AgentSpawn>,
    pub obstacles: Vec<ObstacleSpawn>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            fixed_dt: FIXED_DT,
            player: Some(PlayerSpawn::default()),
            agents: Vec::new(),
            obstacles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpawn {
    pub position: DVec3,
    pub yaw_deg: f64,
    pub velocity: DVec3,
    pub scheme: ControlScheme,
    pub ship: ShipConfig,
    pub radar: AcquisitionConfig,
    pub projectile_speed: f64,
    pub parts: Vec<PartSpawn>,
}

impl Default for PlayerSpawn {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            yaw_deg: 0.0,
            velocity: DVec3::ZERO,
            scheme: ControlScheme::HumanDesktop,
            ship: ShipConfig::default(),
            radar: AcquisitionConfig::default(),
            projectile_speed: PROJECTILE_SPEED,
            parts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpawn {
    pub position: DVec3,
    pub yaw_deg: f64,
    pub config: AgentConfig,
    pub parts: Vec<PartSpawn>,
}

impl Default for AgentSpawn {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            yaw_deg: 0.0,
            config: AgentConfig::default(),
            parts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleSpawn {
    pub position: DVec3,
    pub radius: f64,
}

impl Default for ObstacleSpawn {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            radius: 50.0,
        }
    }
}

/// Where an attached part sends the hits it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageRoute {
    /// The ship the part is attached to.
    Hull,
    /// Another part of the same ship, by index.
    Part(usize),
}

/// Extra collider attached to a ship, such as a wing or a turret.
///
/// A part either forwards hits to its `receivers` or, with `health` set and
/// no receivers, absorbs them itself. A part with neither shrugs hits off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartSpawn {
    /// Position in the ship's local frame.
    pub offset: DVec3,
    pub radius: f64,
    pub health: Option<f64>,
    pub receivers: Vec<DamageRoute>,
}

impl Default for PartSpawn {
    fn default() -> Self {
        Self {
            offset: DVec3::ZERO,
            radius: 3.0,
            health: None,
            receivers: vec![DamageRoute::Hull],
        }
    }
}

/// Check that every part has a real collider and routes hits somewhere that exists.
pub fn validate_parts(parts: &[PartSpawn]) -> Result<(), ConfigError> {
    for (index, part) in parts.iter().enumerate() {
        if !(part.radius > 0.0 && part.radius.is_finite()) {
            return Err(ConfigError::NonPositive {
                field: "part.radius",
                value: part.radius,
            });
        }
        if !part.offset.is_finite() {
            return Err(ConfigError::InvalidPart {
                part: index,
                reason: "offset is not finite",
            });
        }
        if let Some(health) = part.health {
            if !(health > 0.0 && health.is_finite()) {
                return Err(ConfigError::NonPositive {
                    field: "part.health",
                    value: health,
                });
            }
            if !part.receivers.is_empty() {
                return Err(ConfigError::InvalidPart {
                    part: index,
                    reason: "a part with its own health cannot forward hits",
                });
            }
        }
        for route in &part.receivers {
            match *route {
                DamageRoute::Hull => {}
                DamageRoute::Part(target) if target == index => {
                    return Err(ConfigError::InvalidPart {
                        part: index,
                        reason: "forwards hits to itself",
                    });
                }
                DamageRoute::Part(target) if target >= parts.len() => {
                    return Err(ConfigError::InvalidPart {
                        part: index,
                        reason: "forwards hits to a part that does not exist",
                    });
                }
                DamageRoute::Part(_) => {}
            }
        }
    }
    Ok(())
}

impl ScenarioConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let scenario: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return Err(ConfigError::NonPositive {
                field: "scenario.fixed_dt",
                value: self.fixed_dt,
            });
        }
        if let Some(player) = &self.player {
            player.ship.validate()?;
            validate_parts(&player.parts)?;
            player.radar.validate()?;
            if !(player.projectile_speed > 0.0) {
                return Err(ConfigError::NonPositive {
                    field: "player.projectile_speed",
                    value: player.projectile_speed,
                });
            }
        }
        for agent in &self.agents {
            agent.config.validate()?;
            validate_parts(&agent.parts)?;
        }
        for obstacle in &self.obstacles {
            if !(obstacle.radius > 0.0) {
                return Err(ConfigError::NonPositive {
                    field: "obstacle.radius",
                    value: obstacle.radius,
                });
            }
        }
        Ok(())
    }
}
