//! Snapshot system: builds the diagnostic `SimSnapshot` from the world.
//!
//! This system is read-only. It never modifies the world.

use hecs::{Entity, World};

use skirmish_core::components::{Agent, Health, Inactive, Player};
use skirmish_core::enums::{HorizontalAvoidance, VerticalAvoidance};
use skirmish_core::events::SimEvent;
use skirmish_core::state::{AgentDiagnostics, LockView, PlayerView, SimSnapshot};
use skirmish_core::types::{EntityId, Pose, SimTime};
use skirmish_pilot::behavior::FlightTarget;

use crate::brain::{AgentBrain, PlayerRadar};
use crate::ids::{entity_id, entity_of};

pub fn build_snapshot(world: &World, time: &SimTime, events: Vec<SimEvent>) -> SimSnapshot {
    let mut agents: Vec<AgentDiagnostics> = world
        .query::<(&Agent, &AgentBrain)>()
        .iter()
        .filter_map(|(entity, _)| agent_diagnostics(world, entity))
        .collect();
    agents.sort_by_key(|a| a.agent);

    SimSnapshot {
        time: *time,
        agents,
        player: build_player(world),
        events,
    }
}

/// Diagnostics for one agent. `None` if `entity` is not an agent.
pub fn agent_diagnostics(world: &World, entity: Entity) -> Option<AgentDiagnostics> {
    let mut query = world
        .query_one::<(&Agent, &Pose, &Health, &AgentBrain, Option<&Inactive>)>(entity)
        .ok()?;
    let (_, pose, health, brain, inactive) = query.get()?;

    let (target, target_distance) = match brain.behavior.flight_target() {
        Some(FlightTarget::Entity(id)) => (
            Some(id),
            entity_position(world, id).map(|p| pose.distance_to(p)),
        ),
        Some(FlightTarget::Point(point)) => (
            brain.marker.map(entity_id),
            Some(pose.distance_to(point)),
        ),
        None => (None, None),
    };
    let signal = brain.signal.unwrap_or_default();
    let telemetry = brain.flight.telemetry();

    Some(AgentDiagnostics {
        agent: entity_id(entity),
        active: inactive.is_none(),
        state: brain.behavior.state(),
        target,
        target_distance,
        health: health.current,
        max_health: health.max,
        health_ratio: if health.max > 0.0 {
            health.current / health.max
        } else {
            0.0
        },
        vertical_avoidance: if inactive.is_none() {
            signal.vertical
        } else {
            VerticalAvoidance::None
        },
        horizontal_avoidance: if inactive.is_none() {
            signal.horizontal
        } else {
            HorizontalAvoidance::None
        },
        bearing_deg: telemetry.map(|t| t.bearing_deg),
        pitch_deg: telemetry.map(|t| t.pitch_deg),
        steering: brain.steering,
        fire: brain.fire,
        aim_point: brain.weapons.aim_point(),
        in_combat: brain.acquisition.in_combat(),
    })
}

fn entity_position(world: &World, id: EntityId) -> Option<glam::DVec3> {
    let entity = entity_of(id)?;
    let pose = world.get::<&Pose>(entity).ok()?;
    Some(pose.position)
}

fn build_player(world: &World) -> Option<PlayerView> {
    let mut query = world.query::<(&Player, &Pose, &PlayerRadar)>();
    let (entity, (_, pose, radar)) = query.iter().next()?;
    Some(PlayerView {
        player: entity_id(entity),
        position: pose.position,
        targets_in_range: radar.acquisition.in_range().to_vec(),
        lock: radar.lead.map(|(lock, lead_point)| LockView {
            target: lock.target,
            distance: lock.distance,
            angle_deg: lock.angle_deg,
            lead_point,
        }),
    })
}
