//! Behavior system: evaluates each agent's state machine and applies the
//! resulting marker and weapon wiring to the world.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::{EphemeralMarker, Health, Inactive};
use skirmish_core::events::SimEvent;
use skirmish_core::types::Pose;
use skirmish_pilot::behavior::{too_close, BehaviorContext, BehaviorEvent};
use skirmish_pilot::sensing::SceneGraph;

use crate::brain::AgentBrain;
use crate::ids::entity_id;
use crate::physics::PhysicsScene;
use crate::world_setup;

use super::find_player;

pub fn run(
    world: &mut World,
    scene: &PhysicsScene,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<SimEvent>,
) {
    let player = find_player(world).map(|(id, _)| id);
    let player_position = player.and_then(|id| scene.pose(id)).map(|p| p.position);

    // Collect updates in a buffer to avoid borrow issues with hecs
    let mut pending: Vec<(Entity, Vec<BehaviorEvent>)> = Vec::new();

    for (entity, (pose, health, brain, inactive)) in
        world.query_mut::<(&Pose, &Health, &mut AgentBrain, Option<&Inactive>)>()
    {
        if inactive.is_some() {
            continue;
        }

        brain.behavior.set_player(player);
        let ctx = BehaviorContext {
            pose: *pose,
            health: health.current,
            max_health: health.max,
            player_position,
            too_close: too_close(scene, pose, brain.behavior.config()),
            player_sighted: player.is_some_and(|p| brain.acquisition.in_range().contains(&p)),
        };
        let update = brain.behavior.update(&ctx, rng);
        if !update.events.is_empty() {
            pending.push((entity, update.events));
        }
    }

    for (entity, behavior_events) in pending {
        apply_events(world, entity, behavior_events, events);
    }
}

/// Carry out the side effects a state machine asked for.
pub fn apply_events(
    world: &mut World,
    agent: Entity,
    behavior_events: Vec<BehaviorEvent>,
    events: &mut Vec<SimEvent>,
) {
    let owner = entity_id(agent);
    for event in behavior_events {
        match event {
            BehaviorEvent::Entered { from, to } => {
                events.push(SimEvent::BehaviorChanged {
                    agent: owner,
                    from,
                    to,
                });
            }
            BehaviorEvent::MarkerCreated { kind, position } => {
                release_marker_entity(world, agent);
                let marker = world_setup::spawn_marker(world, EphemeralMarker { owner, kind }, position);
                if let Ok(mut brain) = world.get::<&mut AgentBrain>(agent) {
                    brain.marker = Some(marker);
                }
                events.push(SimEvent::MarkerCreated {
                    owner,
                    kind,
                    position,
                });
            }
            BehaviorEvent::MarkerMoved { position } => {
                let marker = world
                    .get::<&AgentBrain>(agent)
                    .ok()
                    .and_then(|brain| brain.marker);
                if let Some(marker) = marker {
                    if let Ok(mut pose) = world.get::<&mut Pose>(marker) {
                        pose.position = position;
                    }
                }
            }
            BehaviorEvent::MarkerReleased { kind } => {
                release_marker_entity(world, agent);
                events.push(SimEvent::MarkerReleased { owner, kind });
            }
            BehaviorEvent::WeaponsArmed(aim) => {
                if let Ok(mut brain) = world.get::<&mut AgentBrain>(agent) {
                    brain.weapons.arm(aim);
                }
            }
            BehaviorEvent::WeaponsDisarmed => {
                if let Ok(mut brain) = world.get::<&mut AgentBrain>(agent) {
                    brain.weapons.disarm();
                }
            }
        }
    }
}

fn release_marker_entity(world: &mut World, agent: Entity) {
    let marker = world
        .get::<&mut AgentBrain>(agent)
        .ok()
        .and_then(|mut brain| brain.marker.take());
    if let Some(marker) = marker {
        let _ = world.despawn(marker);
    }
}
