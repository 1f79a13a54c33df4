//! Player targeting: radar scan, lock-on and reticle lead.

use hecs::World;

use skirmish_core::components::Inactive;
use skirmish_core::events::SimEvent;
use skirmish_core::types::Pose;
use skirmish_pilot::acquisition::CombatTransition;
use skirmish_pilot::intercept;
use skirmish_pilot::sensing::SceneGraph;

use crate::brain::PlayerRadar;
use crate::ids::entity_id;
use crate::physics::PhysicsScene;

pub fn run(world: &mut World, scene: &PhysicsScene, dt: f64, events: &mut Vec<SimEvent>) {
    for (entity, (pose, radar, inactive)) in
        world.query_mut::<(&Pose, &mut PlayerRadar, Option<&Inactive>)>()
    {
        if inactive.is_some() {
            continue;
        }

        if let Some(transition) = radar.acquisition.tick(dt, pose, scene, scene) {
            events.push(SimEvent::CombatStateChanged {
                scanner: entity_id(entity),
                in_combat: transition == CombatTransition::Entered,
            });
        }

        // The lock comes from the last scan; the lead follows the target every tick.
        radar.lead = radar.acquisition.best_lock().and_then(|lock| {
            if !scene.is_active(lock.target) {
                return None;
            }
            let target = scene.pose(lock.target)?;
            let velocity = scene.velocity(lock.target).unwrap_or_default();
            let lead = intercept::solve(
                pose.position,
                target.position,
                velocity,
                radar.projectile_speed,
            );
            Some((lock, lead))
        });
    }
}
