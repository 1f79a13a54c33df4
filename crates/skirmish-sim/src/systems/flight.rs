//! Flight system: turns each agent's flight target into steering.

use hecs::World;

use skirmish_core::components::Inactive;
use skirmish_core::types::Pose;
use skirmish_pilot::behavior::FlightTarget;
use skirmish_pilot::sensing::SceneGraph;

use crate::brain::AgentBrain;
use crate::physics::PhysicsScene;

pub fn run(world: &mut World, scene: &PhysicsScene, dt: f64) {
    for (_entity, (pose, brain, inactive)) in
        world.query_mut::<(&Pose, &mut AgentBrain, Option<&Inactive>)>()
    {
        if inactive.is_some() {
            continue;
        }

        let target = match brain.behavior.flight_target() {
            Some(FlightTarget::Entity(id)) if scene.is_active(id) => {
                scene.pose(id).map(|p| p.position)
            }
            Some(FlightTarget::Point(point)) => Some(point),
            _ => None,
        };
        brain.steering = brain.flight.update(dt, pose, target, brain.signal, true);
    }
}
