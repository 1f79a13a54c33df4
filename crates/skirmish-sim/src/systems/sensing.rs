//! Sensing system: avoidance probes every tick, acquisition on its timer.

use hecs::World;

use skirmish_core::components::Inactive;
use skirmish_core::events::SimEvent;
use skirmish_core::types::Pose;
use skirmish_pilot::acquisition::CombatTransition;

use crate::brain::AgentBrain;
use crate::ids::entity_id;
use crate::physics::PhysicsScene;

pub fn run(world: &mut World, scene: &PhysicsScene, dt: f64, events: &mut Vec<SimEvent>) {
    for (entity, (pose, brain, inactive)) in
        world.query_mut::<(&Pose, &mut AgentBrain, Option<&Inactive>)>()
    {
        if inactive.is_some() {
            continue;
        }

        brain.signal = brain
            .avoidance
            .as_mut()
            .map(|sensor| sensor.sense(pose, scene));

        if let Some(transition) = brain.acquisition.tick(dt, pose, scene, scene) {
            events.push(SimEvent::CombatStateChanged {
                scanner: entity_id(entity),
                in_combat: transition == CombatTransition::Entered,
            });
        }
    }
}
