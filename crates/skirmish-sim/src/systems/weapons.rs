//! Weapons system: evaluates AI triggers and publishes pilot commands.

use hecs::World;

use skirmish_core::components::Inactive;
use skirmish_core::types::Pose;

use crate::brain::{AgentBrain, ShipControls};
use crate::physics::PhysicsScene;

pub fn run(world: &mut World, scene: &PhysicsScene) {
    for (_entity, (pose, brain, controls, inactive)) in
        world.query_mut::<(&Pose, &mut AgentBrain, &mut ShipControls, Option<&Inactive>)>()
    {
        if inactive.is_some() {
            continue;
        }
        brain.fire = brain.weapons.update(pose, scene, scene);
        controls.0.set_ai(brain.steering, brain.fire);
    }
}
