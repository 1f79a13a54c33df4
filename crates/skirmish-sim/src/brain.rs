//! Sim-side components that own pilot state.
//!
//! Each agent exclusively owns its controllers, sensors and state machine,
//! so nothing here is shared between entities.

use glam::DVec3;
use hecs::Entity;

use skirmish_core::components::{FireCommand, SteeringCommand};
use skirmish_core::config::{AcquisitionConfig, AgentConfig};
use skirmish_core::error::ConfigError;
use skirmish_core::types::EntityId;
use skirmish_pilot::acquisition::{LockCandidate, TargetAcquisition};
use skirmish_pilot::avoidance::{AvoidanceSignal, CollisionAvoidanceSensor};
use skirmish_pilot::behavior::BehaviorStateMachine;
use skirmish_pilot::controls::ControlSource;
use skirmish_pilot::flight::FlightController;
use skirmish_pilot::weapons::AiWeaponControls;

/// The autonomous pilot fitted to an agent ship.
pub struct AgentBrain {
    pub flight: FlightController,
    pub behavior: BehaviorStateMachine,
    /// `None` when the ship has no avoidance sensor fitted.
    pub avoidance: Option<CollisionAvoidanceSensor>,
    pub acquisition: TargetAcquisition,
    pub weapons: AiWeaponControls,
    /// Signal from this tick's avoidance sense, if a sensor is fitted.
    pub signal: Option<AvoidanceSignal>,
    /// Marker entity standing in for the behavior's ephemeral target.
    pub marker: Option<Entity>,
    pub steering: SteeringCommand,
    pub fire: FireCommand,
}

impl AgentBrain {
    /// Wire every pilot component for `owner`. Fails on invalid tuning.
    pub fn new(owner: EntityId, config: &AgentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            flight: FlightController::new(config.flight.clone())?,
            behavior: BehaviorStateMachine::new(config.behavior.clone())?,
            avoidance: config
                .avoidance
                .clone()
                .map(CollisionAvoidanceSensor::new)
                .transpose()?,
            acquisition: TargetAcquisition::new(config.acquisition.clone())?.with_owner(owner),
            weapons: AiWeaponControls::new(config.weapons.clone())?,
            signal: None,
            marker: None,
            steering: SteeringCommand::default(),
            fire: FireCommand::default(),
        })
    }
}

/// Source of movement and weapon commands for any ship.
pub struct ShipControls(pub ControlSource);

/// The player's targeting radar and reticle lead.
pub struct PlayerRadar {
    pub acquisition: TargetAcquisition,
    pub projectile_speed: f64,
    /// Lead point on the current lock, updated every decision tick.
    pub lead: Option<(LockCandidate, DVec3)>,
}

impl PlayerRadar {
    pub fn new(
        owner: EntityId,
        config: AcquisitionConfig,
        projectile_speed: f64,
    ) -> Result<Self, ConfigError> {
        if !(projectile_speed > 0.0 && projectile_speed.is_finite()) {
            return Err(ConfigError::NonPositive {
                field: "player.projectile_speed",
                value: projectile_speed,
            });
        }
        Ok(Self {
            acquisition: TargetAcquisition::new(config)?.with_owner(owner),
            projectile_speed,
            lead: None,
        })
    }
}
