//! Damage application.
//!
//! Anything with `Health` can take damage. A `DamageDelegator` on a part
//! (a wing, a turret) forwards hits to the entities that really hold health.

use glam::DVec3;
use hecs::{Entity, World};

use skirmish_core::components::{Health, Inactive};
use skirmish_core::events::SimEvent;
use skirmish_core::types::EntityId;
use tracing::debug;

use crate::ids::{entity_id, entity_of};

/// Receiver of hits.
pub trait Damageable {
    /// Apply `amount` at `hit_point`. Returns true when this hit was fatal.
    fn take_damage(&mut self, amount: f64, hit_point: DVec3) -> bool;
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: f64, _hit_point: DVec3) -> bool {
        if self.current <= 0.0 || !(amount > 0.0) {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        self.current <= 0.0
    }
}

/// Forwards every hit to each receiver in turn.
#[derive(Debug, Clone, Default)]
pub struct DamageDelegator {
    pub receivers: Vec<EntityId>,
}

const MAX_DELEGATION_DEPTH: usize = 8;

/// Apply a hit to `target`, following delegators. Returns entities destroyed by it.
pub fn apply(
    world: &mut World,
    target: Entity,
    amount: f64,
    hit_point: DVec3,
    events: &mut Vec<SimEvent>,
) -> Vec<Entity> {
    let mut destroyed = Vec::new();
    apply_inner(world, target, amount, hit_point, events, &mut destroyed, 0);
    destroyed
}

fn apply_inner(
    world: &mut World,
    target: Entity,
    amount: f64,
    hit_point: DVec3,
    events: &mut Vec<SimEvent>,
    destroyed: &mut Vec<Entity>,
    depth: usize,
) {
    if depth > MAX_DELEGATION_DEPTH || world.get::<&Inactive>(target).is_ok() {
        return;
    }

    let receivers = world
        .get::<&DamageDelegator>(target)
        .ok()
        .map(|d| d.receivers.clone());
    if let Some(receivers) = receivers {
        for receiver in receivers.into_iter().filter_map(entity_of) {
            apply_inner(world, receiver, amount, hit_point, events, destroyed, depth + 1);
        }
        return;
    }

    let fatal = match world.get::<&mut Health>(target) {
        Ok(mut health) => {
            let fatal = health.take_damage(amount, hit_point);
            debug!(
                entity = entity_id(target).0,
                amount,
                remaining = health.current,
                "damage taken"
            );
            fatal
        }
        Err(_) => false,
    };
    if fatal && !destroyed.contains(&target) {
        destroyed.push(target);
        events.push(SimEvent::TargetDestroyed {
            entity: entity_id(target),
            hit_point,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps_at_zero_and_reports_once() {
        let mut health = Health {
            current: 100.0,
            max: 100.0,
        };
        assert!(!health.take_damage(60.0, DVec3::ZERO));
        assert!(health.take_damage(60.0, DVec3::ZERO));
        assert_eq!(health.current, 0.0);
        assert!(!health.take_damage(10.0, DVec3::ZERO), "already destroyed");
    }

    #[test]
    fn test_non_positive_or_nan_hits_do_nothing() {
        let mut health = Health {
            current: 100.0,
            max: 100.0,
        };
        for amount in [0.0, -5.0, f64::NAN] {
            assert!(!health.take_damage(amount, DVec3::ZERO), "{amount} was fatal");
            assert_eq!(health.current, 100.0, "{amount} changed health");
        }
    }

    #[test]
    fn test_delegator_forwards_to_receivers() {
        let mut world = World::new();
        let hull = world.spawn((Health {
            current: 100.0,
            max: 100.0,
        },));
        let shield = world.spawn((Health {
            current: 30.0,
            max: 30.0,
        },));
        let wing = world.spawn((DamageDelegator {
            receivers: vec![entity_id(hull), entity_id(shield)],
        },));

        let mut events = Vec::new();
        let destroyed = apply(&mut world, wing, 40.0, DVec3::ONE, &mut events);
        assert_eq!(destroyed, vec![shield]);
        assert_eq!(world.get::<&Health>(hull).unwrap().current, 60.0);
        assert_eq!(
            events,
            vec![SimEvent::TargetDestroyed {
                entity: entity_id(shield),
                hit_point: DVec3::ONE,
            }]
        );
    }

    #[test]
    fn test_inactive_targets_ignore_damage() {
        let mut world = World::new();
        let ship = world.spawn((
            Health {
                current: 100.0,
                max: 100.0,
            },
            Inactive,
        ));
        let mut events = Vec::new();
        assert!(apply(&mut world, ship, 500.0, DVec3::ZERO, &mut events).is_empty());
        assert_eq!(world.get::<&Health>(ship).unwrap().current, 100.0);
    }
}
