//! Agent behavior state machine.
//!
//! Transition decisions are a pure function of the current state and the
//! sensed facts. Entry actions run only on a transition and rewire the
//! flight target, the weapon aim and the owned ephemeral marker.

use glam::DVec3;
use rand::Rng;
use skirmish_core::config::BehaviorConfig;
use skirmish_core::enums::{BehaviorState, MarkerKind};
use skirmish_core::error::ConfigError;
use skirmish_core::types::{EntityId, Pose};
use tracing::{debug, warn};

use crate::sensing::PhysicsQuery;
use crate::weapons::WeaponAim;

/// Facts the transition table is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorFacts {
    pub health: f64,
    pub max_health: f64,
    /// `None` when the player cannot be resolved.
    pub distance_to_player: Option<f64>,
    /// Distance to the owned marker, if any.
    pub distance_to_marker: Option<f64>,
    pub too_close: bool,
    /// The agent's own acquisition scan has the player in its in-range set.
    pub player_sighted: bool,
}

/// Outcome of evaluating one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Stay,
    Transition(BehaviorState),
    /// Stay in Patrol with a fresh waypoint.
    NewPatrolWaypoint,
}

/// Evaluate the transition table for `state`.
pub fn decide(state: BehaviorState, facts: &BehaviorFacts, config: &BehaviorConfig) -> Decision {
    // Retreat never exits.
    if state == BehaviorState::Retreat {
        return Decision::Stay;
    }
    if facts.health < facts.max_health * config.retreat_health_fraction {
        return Decision::Transition(BehaviorState::Retreat);
    }

    match state {
        BehaviorState::Patrol => decide_patrol(facts, config),
        BehaviorState::Attack => decide_attack(facts),
        BehaviorState::Reposition => decide_reposition(facts, config),
        BehaviorState::Retreat => Decision::Stay,
    }
}

fn decide_patrol(facts: &BehaviorFacts, config: &BehaviorConfig) -> Decision {
    if facts.player_sighted
        || facts
            .distance_to_player
            .is_some_and(|d| d <= config.attack_range)
    {
        return Decision::Transition(BehaviorState::Attack);
    }
    match facts.distance_to_marker {
        Some(d) if d < config.waypoint_arrival_radius => Decision::NewPatrolWaypoint,
        _ => Decision::Stay,
    }
}

fn decide_attack(facts: &BehaviorFacts) -> Decision {
    if facts.too_close {
        Decision::Transition(BehaviorState::Reposition)
    } else {
        Decision::Stay
    }
}

fn decide_reposition(facts: &BehaviorFacts, config: &BehaviorConfig) -> Decision {
    // Returning to Attack needs a player to attack.
    if facts.distance_to_player.is_none() {
        return Decision::Stay;
    }
    match facts.distance_to_marker {
        Some(d) if d < config.reposition_arrival_radius => {
            Decision::Transition(BehaviorState::Attack)
        }
        _ => Decision::Stay,
    }
}

/// Forward sphere sweep for the player, used to break off an attack run.
pub fn too_close(physics: &dyn PhysicsQuery, pose: &Pose, config: &BehaviorConfig) -> bool {
    physics
        .sphere_cast(
            pose.position,
            config.too_close_radius,
            pose.forward(),
            config.too_close_range,
            config.player_mask,
        )
        .is_some()
}

/// Per-tick input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorContext {
    pub pose: Pose,
    pub health: f64,
    pub max_health: f64,
    pub player_position: Option<DVec3>,
    pub too_close: bool,
    /// Last acquisition scan reported the player in range.
    pub player_sighted: bool,
}

/// Synthetic steering destination owned by one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemeralTarget {
    pub kind: MarkerKind,
    pub position: DVec3,
}

/// What the flight controller is steering toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightTarget {
    Entity(EntityId),
    Point(DVec3),
}

/// Side effects of a tick, for the owner to apply to the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorEvent {
    Entered {
        from: Option<BehaviorState>,
        to: BehaviorState,
    },
    MarkerCreated {
        kind: MarkerKind,
        position: DVec3,
    },
    MarkerMoved {
        position: DVec3,
    },
    MarkerReleased {
        kind: MarkerKind,
    },
    WeaponsArmed(WeaponAim),
    WeaponsDisarmed,
}

/// Result of one activation or update.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorUpdate {
    pub state: Option<BehaviorState>,
    pub changed: bool,
    pub events: Vec<BehaviorEvent>,
}

pub struct BehaviorStateMachine {
    config: BehaviorConfig,
    state: Option<BehaviorState>,
    player: Option<EntityId>,
    marker: Option<EphemeralTarget>,
    flight_target: Option<FlightTarget>,
    weapon_aim: Option<WeaponAim>,
}

impl BehaviorStateMachine {
    /// New inert machine. Nothing happens until [`activate`](Self::activate).
    pub fn new(config: BehaviorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
            player: None,
            marker: None,
            flight_target: None,
            weapon_aim: None,
        })
    }

    /// Entity attacked while in Attack. `None` when no player exists.
    pub fn set_player(&mut self, player: Option<EntityId>) {
        self.player = player;
    }

    /// Enter Patrol. Does nothing if already active.
    pub fn activate<R: Rng + ?Sized>(
        &mut self,
        ctx: &BehaviorContext,
        rng: &mut R,
    ) -> BehaviorUpdate {
        let mut events = Vec::new();
        let changed = self.state.is_none();
        if changed {
            self.enter(BehaviorState::Patrol, ctx, rng, &mut events);
        }
        BehaviorUpdate {
            state: self.state,
            changed,
            events,
        }
    }

    /// Evaluate transitions for one decision tick.
    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &BehaviorContext, rng: &mut R) -> BehaviorUpdate {
        let mut events = Vec::new();
        let Some(state) = self.state else {
            return BehaviorUpdate {
                state: None,
                changed: false,
                events,
            };
        };

        let facts = self.facts(ctx);
        let changed = match decide(state, &facts, &self.config) {
            Decision::Stay => false,
            Decision::NewPatrolWaypoint => {
                let position = random_patrol_point(rng, self.config.patrol_range);
                if let Some(marker) = self.marker.as_mut() {
                    marker.position = position;
                    self.flight_target = Some(FlightTarget::Point(position));
                    events.push(BehaviorEvent::MarkerMoved { position });
                }
                false
            }
            Decision::Transition(next) => {
                self.enter(next, ctx, rng, &mut events);
                true
            }
        };

        BehaviorUpdate {
            state: self.state,
            changed,
            events,
        }
    }

    /// Return to the inert state, releasing the marker and disarming weapons.
    pub fn deactivate(&mut self) -> Vec<BehaviorEvent> {
        let mut events = Vec::new();
        self.release_marker(&mut events);
        if self.weapon_aim.take().is_some() {
            events.push(BehaviorEvent::WeaponsDisarmed);
        }
        self.flight_target = None;
        self.state = None;
        events
    }

    /// Point the flight controller at `target` until the next state entry.
    pub fn set_target(&mut self, target: Option<FlightTarget>) {
        self.flight_target = target;
    }

    pub fn state(&self) -> Option<BehaviorState> {
        self.state
    }

    pub fn flight_target(&self) -> Option<FlightTarget> {
        self.flight_target
    }

    pub fn weapon_aim(&self) -> Option<WeaponAim> {
        self.weapon_aim
    }

    pub fn marker(&self) -> Option<EphemeralTarget> {
        self.marker
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    fn facts(&self, ctx: &BehaviorContext) -> BehaviorFacts {
        let distance_to_player = match (self.player, ctx.player_position) {
            (Some(_), Some(position)) => Some(ctx.pose.distance_to(position)),
            _ => None,
        };
        BehaviorFacts {
            health: ctx.health,
            max_health: ctx.max_health,
            distance_to_player,
            distance_to_marker: self.marker.map(|m| ctx.pose.distance_to(m.position)),
            too_close: ctx.too_close,
            player_sighted: ctx.player_sighted && self.player.is_some(),
        }
    }

    fn enter<R: Rng + ?Sized>(
        &mut self,
        next: BehaviorState,
        ctx: &BehaviorContext,
        rng: &mut R,
        events: &mut Vec<BehaviorEvent>,
    ) {
        let from = self.state;
        self.state = Some(next);
        debug!(?from, to = %next, "behavior state changed");
        events.push(BehaviorEvent::Entered { from, to: next });

        match next {
            BehaviorState::Patrol => {
                if self.marker.is_none() {
                    let position = random_patrol_point(rng, self.config.patrol_range);
                    self.create_marker(MarkerKind::PatrolWaypoint, position, events);
                }
            }
            BehaviorState::Attack => {
                self.release_marker(events);
                match self.player {
                    Some(player) => {
                        self.flight_target = Some(FlightTarget::Entity(player));
                        let aim = WeaponAim {
                            target: player,
                            attack_range: self.config.attack_range,
                            mask: self.config.target_mask,
                        };
                        self.weapon_aim = Some(aim);
                        events.push(BehaviorEvent::WeaponsArmed(aim));
                    }
                    None => {
                        warn!("attack entered without a player to target");
                        self.flight_target = None;
                    }
                }
            }
            BehaviorState::Reposition => {
                let offsets = [
                    ctx.pose.right(),
                    -ctx.pose.right(),
                    ctx.pose.up(),
                    -ctx.pose.up(),
                ];
                let direction = offsets[rng.gen_range(0..offsets.len())];
                let position = ctx.pose.position + direction * self.config.reposition_distance;
                self.release_marker(events);
                self.create_marker(MarkerKind::RepositionPoint, position, events);
                self.disarm(events);
            }
            BehaviorState::Retreat => {
                let away = ctx
                    .player_position
                    .filter(|_| self.player.is_some())
                    .map(|player| ctx.pose.position - player)
                    .and_then(|v| v.try_normalize())
                    .unwrap_or_else(|| -ctx.pose.forward());
                let position = ctx.pose.position + away * self.config.retreat_distance;
                self.release_marker(events);
                self.create_marker(MarkerKind::RetreatPoint, position, events);
                self.disarm(events);
            }
        }
    }

    fn create_marker(&mut self, kind: MarkerKind, position: DVec3, events: &mut Vec<BehaviorEvent>) {
        self.marker = Some(EphemeralTarget { kind, position });
        self.flight_target = Some(FlightTarget::Point(position));
        events.push(BehaviorEvent::MarkerCreated { kind, position });
    }

    fn release_marker(&mut self, events: &mut Vec<BehaviorEvent>) {
        if let Some(marker) = self.marker.take() {
            if self.flight_target == Some(FlightTarget::Point(marker.position)) {
                self.flight_target = None;
            }
            events.push(BehaviorEvent::MarkerReleased { kind: marker.kind });
        }
    }

    fn disarm(&mut self, events: &mut Vec<BehaviorEvent>) {
        if self.weapon_aim.take().is_some() {
            events.push(BehaviorEvent::WeaponsDisarmed);
        }
    }
}

/// Uniform point inside a sphere of `radius` about the world origin.
fn random_patrol_point<R: Rng + ?Sized>(rng: &mut R, radius: f64) -> DVec3 {
    loop {
        let p = DVec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p * radius;
        }
    }
}
