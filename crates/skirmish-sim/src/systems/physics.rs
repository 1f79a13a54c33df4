//! Fixed-step physics: applies ship forces and integrates rigid bodies.
//!
//! Forces are scaled by the control amount, the per-axis force constant and
//! the fixed step, then integrated over the same step. Axes with a zero
//! command apply nothing.

use glam::{DQuat, DVec3};
use hecs::World;

use skirmish_core::components::{Inactive, RigidBody};
use skirmish_core::config::ShipConfig;
use skirmish_core::types::Pose;
use skirmish_pilot::controls::MovementControls;

use crate::brain::ShipControls;

const ZERO_COMMAND: f64 = 1e-6;

/// Advance every active rigid body by one fixed step.
pub fn run(world: &mut World, fixed_dt: f64) {
    for (_entity, (pose, body, ship, controls, inactive)) in world.query_mut::<(
        &mut Pose,
        &mut RigidBody,
        Option<&ShipConfig>,
        Option<&ShipControls>,
        Option<&Inactive>,
    )>() {
        if inactive.is_some() {
            continue;
        }

        if let (Some(ship), Some(controls)) = (ship, controls) {
            let force = thrust_force(pose, ship, controls.0.thrust(), fixed_dt);
            let torque = control_torque(pose, ship, &controls.0, fixed_dt);
            body.linear_velocity += force / ship.mass * fixed_dt;
            body.angular_velocity += torque / ship.angular_inertia * fixed_dt;
            body.linear_velocity *= 1.0 / (1.0 + ship.linear_damping * fixed_dt);
            body.angular_velocity *= 1.0 / (1.0 + ship.angular_damping * fixed_dt);
        }

        integrate(pose, body, fixed_dt);
    }
}

/// Sum of every engine's forward push. Thrust is shared evenly between engines.
pub fn thrust_force(pose: &Pose, ship: &ShipConfig, amount: f64, fixed_dt: f64) -> DVec3 {
    if amount.abs() < ZERO_COMMAND {
        return DVec3::ZERO;
    }
    let per_engine = ship.thrust_force / ship.engine_count as f64;
    let forward = pose.forward();
    (0..ship.engine_count).fold(DVec3::ZERO, |total, _| {
        total + forward * (per_engine * amount * fixed_dt)
    })
}

/// World-space torque from pitch about the right axis, roll about forward
/// and yaw about up.
pub fn control_torque(
    pose: &Pose,
    ship: &ShipConfig,
    controls: &dyn MovementControls,
    fixed_dt: f64,
) -> DVec3 {
    let axes = [
        (pose.right(), ship.pitch_force, controls.pitch()),
        (pose.forward(), ship.roll_force, controls.roll()),
        (pose.up(), ship.yaw_force, controls.yaw()),
    ];
    axes.iter()
        .filter(|(_, _, amount)| amount.abs() >= ZERO_COMMAND)
        .fold(DVec3::ZERO, |torque, (axis, force, amount)| {
            torque + *axis * (force * amount * fixed_dt)
        })
}

fn integrate(pose: &mut Pose, body: &RigidBody, dt: f64) {
    pose.position += body.linear_velocity * dt;
    let spin = body.angular_velocity * dt;
    if spin.length_squared() > 0.0 {
        pose.rotation = (DQuat::from_scaled_axis(spin) * pose.rotation).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::components::SteeringCommand;
    use skirmish_pilot::controls::AiControls;

    fn ai(steering: SteeringCommand) -> AiControls {
        AiControls {
            steering,
            ..AiControls::default()
        }
    }

    #[test]
    fn test_thrust_split_across_engines_sums_to_full_force() {
        let pose = Pose::default();
        let two = ShipConfig::default();
        let four = ShipConfig {
            engine_count: 4,
            ..ShipConfig::default()
        };
        let a = thrust_force(&pose, &two, 1.0, 0.02);
        let b = thrust_force(&pose, &four, 1.0, 0.02);
        assert!((a - DVec3::new(0.0, 0.0, 7500.0 * 0.02)).length() < 1e-9);
        assert!((a - b).length() < 1e-9);
    }

    #[test]
    fn test_torque_axes() {
        let pose = Pose::default();
        let ship = ShipConfig::default();
        let yaw = control_torque(
            &pose,
            &ship,
            &ai(SteeringCommand {
                yaw: 1.0,
                ..SteeringCommand::default()
            }),
            0.02,
        );
        assert!((yaw - DVec3::new(0.0, 2000.0 * 0.02, 0.0)).length() < 1e-9);

        let pitch = control_torque(
            &pose,
            &ship,
            &ai(SteeringCommand {
                pitch: -0.5,
                ..SteeringCommand::default()
            }),
            0.02,
        );
        assert!((pitch - DVec3::new(-6000.0 * 0.5 * 0.02, 0.0, 0.0)).length() < 1e-9);

        let idle = control_torque(&pose, &ship, &ai(SteeringCommand::default()), 0.02);
        assert_eq!(idle, DVec3::ZERO);
    }

    #[test]
    fn test_positive_yaw_turns_nose_right() {
        let mut world = World::new();
        let ship = world.spawn((
            Pose::default(),
            RigidBody::default(),
            ShipConfig::default(),
            ShipControls(skirmish_pilot::controls::ControlSource::Ai(ai(SteeringCommand {
                yaw: 1.0,
                ..SteeringCommand::default()
            }))),
        ));
        for _ in 0..25 {
            run(&mut world, 0.02);
        }
        let pose = *world.get::<&Pose>(ship).unwrap();
        assert!(pose.forward().x > 0.0, "forward {:?}", pose.forward());
    }

    #[test]
    fn test_inactive_bodies_frozen() {
        let mut world = World::new();
        let body = world.spawn((
            Pose::default(),
            RigidBody {
                linear_velocity: DVec3::new(0.0, 0.0, 50.0),
                ..RigidBody::default()
            },
            Inactive,
        ));
        run(&mut world, 0.02);
        assert_eq!(world.get::<&Pose>(body).unwrap().position, DVec3::ZERO);
    }

    #[test]
    fn test_bodies_without_controls_coast() {
        let mut world = World::new();
        let body = world.spawn((
            Pose::default(),
            RigidBody {
                linear_velocity: DVec3::new(0.0, 0.0, 50.0),
                ..RigidBody::default()
            },
        ));
        run(&mut world, 0.02);
        let z = world.get::<&Pose>(body).unwrap().position.z;
        assert!((z - 1.0).abs() < 1e-12);
    }
}
