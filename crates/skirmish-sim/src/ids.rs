//! Conversion between hecs entity handles and the shared `EntityId`.

use hecs::Entity;
use skirmish_core::types::EntityId;

pub fn entity_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// `None` for ids that never came from a hecs handle.
pub fn entity_of(id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn test_round_trip() {
        let mut world = World::new();
        let a = world.spawn((1u32,));
        let b = world.spawn((2u32,));
        assert_eq!(entity_of(entity_id(a)), Some(a));
        assert_eq!(entity_of(entity_id(b)), Some(b));
        assert_ne!(entity_id(a), entity_id(b));
        assert_eq!(entity_of(EntityId(0)), None);
    }
}
