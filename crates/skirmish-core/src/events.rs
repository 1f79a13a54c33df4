//! Events emitted by the simulation for UI, audio and bookkeeping collaborators.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::{BehaviorState, MarkerKind};
use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A scanner's in-range set became non-empty (`in_combat`) or empty.
    CombatStateChanged { scanner: EntityId, in_combat: bool },
    /// An agent changed behavior state. `from` is `None` on activation.
    BehaviorChanged {
        agent: EntityId,
        from: Option<BehaviorState>,
        to: BehaviorState,
    },
    /// An agent created a steering marker.
    MarkerCreated {
        owner: EntityId,
        kind: MarkerKind,
        position: DVec3,
    },
    /// An agent released a steering marker it owned.
    MarkerReleased { owner: EntityId, kind: MarkerKind },
    /// A damageable entity ran out of health.
    TargetDestroyed { entity: EntityId, hit_point: DVec3 },
    /// An agent was deactivated and stopped sensing and steering.
    AgentDeactivated { agent: EntityId },
}
