//! Entity spawn factories for setting up the simulation world.

use hecs::{Entity, World};
use tracing::info;

use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::ControlScheme;
use skirmish_core::error::ConfigError;
use skirmish_core::types::{Layer, Pose};
use skirmish_pilot::controls::ControlSource;

use crate::brain::{AgentBrain, PlayerRadar, ShipControls};
use crate::ids::entity_id;
use crate::scenario::{
    validate_parts, AgentSpawn, DamageRoute, ObstacleSpawn, PartSpawn, PlayerSpawn,
};
use crate::systems::attachments::mounted_pose;
use crate::systems::damage::DamageDelegator;

/// Spawn the human-controlled ship with its targeting radar.
pub fn spawn_player(world: &mut World, spawn: &PlayerSpawn) -> Result<Entity, ConfigError> {
    spawn.ship.validate()?;
    validate_parts(&spawn.parts)?;
    let entity = world.spawn((
        Player,
        Pose::with_yaw(spawn.position, spawn.yaw_deg),
        RigidBody {
            linear_velocity: spawn.velocity,
            ..RigidBody::default()
        },
        Collider {
            radius: spawn.ship.collider_radius,
            layer: PLAYER_LAYER,
        },
        Health {
            current: spawn.ship.max_health,
            max: spawn.ship.max_health,
        },
        spawn.ship.clone(),
        ShipControls(ControlSource::from_scheme(spawn.scheme)),
    ));
    let radar = match PlayerRadar::new(entity_id(entity), spawn.radar.clone(), spawn.projectile_speed) {
        Ok(radar) => radar,
        Err(e) => {
            let _ = world.despawn(entity);
            return Err(e);
        }
    };
    let _ = world.insert_one(entity, radar);
    spawn_parts(world, entity, PLAYER_LAYER, false, &spawn.parts);
    info!(entity = entity_id(entity).0, position = ?spawn.position, "player spawned");
    Ok(entity)
}

/// Spawn an inert agent ship. Activation is a separate step.
pub fn spawn_agent(world: &mut World, spawn: &AgentSpawn) -> Result<Entity, ConfigError> {
    spawn.config.validate()?;
    validate_parts(&spawn.parts)?;
    let ship = &spawn.config.ship;
    let entity = world.spawn((
        Agent,
        Pose::with_yaw(spawn.position, spawn.yaw_deg),
        RigidBody::default(),
        Collider {
            radius: ship.collider_radius,
            layer: AGENT_LAYER,
        },
        Health {
            current: ship.max_health,
            max: ship.max_health,
        },
        ship.clone(),
        ShipControls(ControlSource::from_scheme(ControlScheme::Ai)),
        Inactive,
    ));
    let brain = match AgentBrain::new(entity_id(entity), &spawn.config) {
        Ok(brain) => brain,
        Err(e) => {
            let _ = world.despawn(entity);
            return Err(e);
        }
    };
    let _ = world.insert_one(entity, brain);
    spawn_parts(world, entity, AGENT_LAYER, true, &spawn.parts);
    info!(
        entity = entity_id(entity).0,
        position = ?spawn.position,
        parts = spawn.parts.len(),
        "agent spawned"
    );
    Ok(entity)
}

/// Attach a ship's parts. Parts share the hull's layer so scans resolve them to the hull.
fn spawn_parts(
    world: &mut World,
    owner: Entity,
    layer: Layer,
    inactive: bool,
    parts: &[PartSpawn],
) {
    let Ok(hull_pose) = world.get::<&Pose>(owner).map(|p| *p) else {
        return;
    };
    let spawned: Vec<Entity> = parts
        .iter()
        .map(|part| {
            let entity = world.spawn((
                mounted_pose(&hull_pose, part.offset),
                Collider {
                    radius: part.radius,
                    layer,
                },
                Parent(entity_id(owner)),
                Mount {
                    offset: part.offset,
                },
            ));
            if inactive {
                let _ = world.insert_one(entity, Inactive);
            }
            entity
        })
        .collect();

    for (part, &entity) in parts.iter().zip(&spawned) {
        if !part.receivers.is_empty() {
            let receivers = part
                .receivers
                .iter()
                .filter_map(|route| match *route {
                    DamageRoute::Hull => Some(entity_id(owner)),
                    DamageRoute::Part(index) => spawned.get(index).map(|e| entity_id(*e)),
                })
                .collect();
            let _ = world.insert_one(entity, DamageDelegator { receivers });
        } else if let Some(health) = part.health {
            let _ = world.insert_one(
                entity,
                Health {
                    current: health,
                    max: health,
                },
            );
        }
    }
}

/// Spawn static collidable geometry.
pub fn spawn_obstacle(world: &mut World, spawn: &ObstacleSpawn) -> Entity {
    world.spawn((
        Obstacle,
        Pose::at(spawn.position),
        Collider {
            radius: spawn.radius,
            layer: OBSTACLE_LAYER,
        },
    ))
}

/// Spawn a marker entity standing in for an ephemeral steering target.
pub fn spawn_marker(world: &mut World, marker: EphemeralMarker, position: glam::DVec3) -> Entity {
    world.spawn((marker, Pose::at(position)))
}
