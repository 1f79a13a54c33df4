//! Activation and deactivation of ships.
//!
//! Activation puts an agent into Patrol and starts its acquisition timer.
//! Deactivation stops the timer, releases the agent's marker, zeroes its
//! commands and freezes the entity together with its attached parts;
//! nothing it owns runs afterward.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use skirmish_core::components::{FireCommand, Health, Inactive, SteeringCommand};
use skirmish_core::events::SimEvent;
use skirmish_core::types::Pose;
use skirmish_pilot::behavior::{too_close, BehaviorContext};

use crate::brain::{AgentBrain, PlayerRadar, ShipControls};
use crate::ids::entity_id;
use crate::physics::PhysicsScene;

use super::attachments::parts_of;
use super::behavior::apply_events;
use super::find_player;

/// Bring an inactive entity back. Returns false if it was already active or is gone.
pub fn activate(
    world: &mut World,
    entity: Entity,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
) -> bool {
    if !world.contains(entity) || world.get::<&Inactive>(entity).is_err() {
        return false;
    }
    let _ = world.remove_one::<Inactive>(entity);
    for part in parts_of(world, entity) {
        let _ = world.remove_one::<Inactive>(part);
    }

    if let Ok(mut radar) = world.get::<&mut PlayerRadar>(entity) {
        radar.acquisition.start();
    }

    let player = find_player(world);
    let scene = PhysicsScene::capture(world);
    let behavior_events = {
        let mut query = match world.query_one::<(&Pose, &Health, &mut AgentBrain)>(entity) {
            Ok(query) => query,
            Err(_) => return true,
        };
        let Some((pose, health, brain)) = query.get() else {
            return true;
        };
        brain.behavior.set_player(player.map(|(id, _)| id));
        let ctx = BehaviorContext {
            pose: *pose,
            health: health.current,
            max_health: health.max,
            player_position: player.map(|(_, p)| p.position),
            too_close: too_close(&scene, pose, brain.behavior.config()),
            player_sighted: false,
        };
        let update = brain.behavior.activate(&ctx, rng);
        brain.acquisition.start();
        update.events
    };
    apply_events(world, entity, behavior_events, events);
    info!(entity = entity_id(entity).0, "agent activated");
    true
}

/// Stop everything an entity runs. Returns false if it was already inactive or is gone.
pub fn deactivate(world: &mut World, entity: Entity, events: &mut Vec<SimEvent>) -> bool {
    if !world.contains(entity) || world.get::<&Inactive>(entity).is_ok() {
        return false;
    }

    if let Ok(mut radar) = world.get::<&mut PlayerRadar>(entity) {
        radar.acquisition.stop();
        radar.lead = None;
    }
    if let Ok(mut controls) = world.get::<&mut ShipControls>(entity) {
        controls.0.set_ai(SteeringCommand::default(), FireCommand::default());
    }

    let behavior_events = match world.get::<&mut AgentBrain>(entity) {
        Ok(mut brain) => {
            brain.acquisition.stop();
            brain.weapons.disarm();
            brain.flight.reset();
            brain.signal = None;
            brain.steering = SteeringCommand::default();
            brain.fire = FireCommand::default();
            Some(brain.behavior.deactivate())
        }
        Err(_) => None,
    };
    let is_agent = behavior_events.is_some();
    if let Some(behavior_events) = behavior_events {
        apply_events(world, entity, behavior_events, events);
    }

    let _ = world.insert_one(entity, Inactive);
    for part in parts_of(world, entity) {
        let _ = world.insert_one(part, Inactive);
    }
    if is_agent {
        events.push(SimEvent::AgentDeactivated {
            agent: entity_id(entity),
        });
        info!(entity = entity_id(entity).0, "agent deactivated");
    }
    true
}
