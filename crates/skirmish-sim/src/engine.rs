//! Simulation engine.
//!
//! `SimulationEngine` owns the hecs world and runs one frame at a time.
//! Each frame first spends the accumulated time on fixed physics steps,
//! which consume the steering decided last frame, then runs the decision
//! tick: sensing, behavior, flight, weapons and player targeting.

use glam::DVec3;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use skirmish_core::constants::FIXED_DT;
use skirmish_core::error::ConfigError;
use skirmish_core::events::SimEvent;
use skirmish_core::state::{AgentDiagnostics, SimSnapshot};
use skirmish_core::types::{EntityId, SimTime};
use skirmish_pilot::behavior::FlightTarget;
use skirmish_pilot::controls::{DesktopInput, GamepadInput};

use crate::brain::{AgentBrain, PlayerRadar, ShipControls};
use crate::ids::{entity_id, entity_of};
use crate::physics::PhysicsScene;
use crate::scenario::{AgentSpawn, ObstacleSpawn, PlayerSpawn, ScenarioConfig};
use crate::systems;
use crate::world_setup;

/// Upper bound on physics steps run by a single frame.
const MAX_STEPS_PER_FRAME: u32 = 64;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Physics step length in seconds.
    pub fixed_dt: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            fixed_dt: FIXED_DT,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    fixed_dt: f64,
    accumulator: f64,
    events: Vec<SimEvent>,
    despawn_buffer: Vec<hecs::Entity>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            fixed_dt: if config.fixed_dt > 0.0 {
                config.fixed_dt
            } else {
                FIXED_DT
            },
            accumulator: 0.0,
            events: Vec::new(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Build a world from a scenario. Agents start active.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self, ConfigError> {
        scenario.validate()?;
        let mut engine = Self::new(SimConfig {
            seed: scenario.seed,
            fixed_dt: scenario.fixed_dt,
        });
        for obstacle in &scenario.obstacles {
            engine.spawn_obstacle(obstacle);
        }
        if let Some(player) = &scenario.player {
            engine.spawn_player(player)?;
        }
        for agent in &scenario.agents {
            engine.spawn_agent(agent)?;
        }
        Ok(engine)
    }

    pub fn spawn_player(&mut self, spawn: &PlayerSpawn) -> Result<EntityId, ConfigError> {
        let entity = world_setup::spawn_player(&mut self.world, spawn)?;
        if let Ok(mut radar) = self.world.get::<&mut PlayerRadar>(entity) {
            radar.acquisition.start();
        }
        Ok(entity_id(entity))
    }

    /// Spawn an agent and activate it into Patrol.
    pub fn spawn_agent(&mut self, spawn: &AgentSpawn) -> Result<EntityId, ConfigError> {
        let entity = world_setup::spawn_agent(&mut self.world, spawn)?;
        systems::lifecycle::activate(&mut self.world, entity, &mut self.rng, &mut self.events);
        Ok(entity_id(entity))
    }

    pub fn spawn_obstacle(&mut self, spawn: &ObstacleSpawn) -> EntityId {
        entity_id(world_setup::spawn_obstacle(&mut self.world, spawn))
    }

    /// Advance by one rendered frame of `dt` seconds and return the snapshot.
    pub fn frame(&mut self, dt: f64) -> SimSnapshot {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt {
            if steps == MAX_STEPS_PER_FRAME {
                warn!(dropped_secs = self.accumulator, "physics falling behind, dropping time");
                self.accumulator = 0.0;
                break;
            }
            systems::physics::run(&mut self.world, self.fixed_dt);
            self.accumulator -= self.fixed_dt;
            self.time.fixed_steps += 1;
            steps += 1;
        }

        systems::attachments::run(&mut self.world);

        self.time.advance(dt);
        self.run_decision_tick(dt);

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, events)
    }

    fn run_decision_tick(&mut self, dt: f64) {
        let scene = PhysicsScene::capture(&self.world);
        systems::sensing::run(&mut self.world, &scene, dt, &mut self.events);
        systems::behavior::run(&mut self.world, &scene, &mut self.rng, &mut self.events);
        systems::flight::run(&mut self.world, &scene, dt);
        systems::weapons::run(&mut self.world, &scene);
        systems::targeting::run(&mut self.world, &scene, dt, &mut self.events);
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    /// Deal damage to an entity. Entities reduced to zero health are deactivated.
    pub fn apply_damage(&mut self, target: EntityId, amount: f64, hit_point: DVec3) {
        let Some(entity) = entity_of(target).filter(|e| self.world.contains(*e)) else {
            warn!(target = target.0, "damage to unknown entity ignored");
            return;
        };
        let destroyed =
            systems::damage::apply(&mut self.world, entity, amount, hit_point, &mut self.events);
        for entity in destroyed {
            systems::lifecycle::deactivate(&mut self.world, entity, &mut self.events);
        }
    }

    /// Point an agent's flight controller at `target` until its next state change.
    pub fn set_target(&mut self, agent: EntityId, target: Option<EntityId>) -> bool {
        let Some(entity) = entity_of(agent) else {
            return false;
        };
        match self.world.get::<&mut AgentBrain>(entity) {
            Ok(mut brain) => {
                brain.behavior.set_target(target.map(FlightTarget::Entity));
                debug!(agent = agent.0, target = ?target.map(|t| t.0), "flight target set");
                true
            }
            Err(_) => false,
        }
    }

    pub fn activate(&mut self, entity: EntityId) -> bool {
        match entity_of(entity) {
            Some(e) => {
                systems::lifecycle::activate(&mut self.world, e, &mut self.rng, &mut self.events)
            }
            None => false,
        }
    }

    pub fn deactivate(&mut self, entity: EntityId) -> bool {
        match entity_of(entity) {
            Some(e) => systems::lifecycle::deactivate(&mut self.world, e, &mut self.events),
            None => false,
        }
    }

    /// Deactivate and remove an entity. Its markers go with it.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        let Some(e) = entity_of(entity).filter(|e| self.world.contains(*e)) else {
            return false;
        };
        systems::lifecycle::deactivate(&mut self.world, e, &mut self.events);
        self.world.despawn(e).is_ok()
    }

    /// Attached parts of a ship, in spawn order. Hits on a part go through [`apply_damage`].
    ///
    /// [`apply_damage`]: Self::apply_damage
    pub fn parts(&self, owner: EntityId) -> Vec<EntityId> {
        entity_of(owner)
            .filter(|e| self.world.contains(*e))
            .map(|e| systems::attachments::parts_of(&self.world, e))
            .unwrap_or_default()
            .into_iter()
            .map(entity_id)
            .collect()
    }

    /// Feed mouse and keyboard state to every desktop-controlled ship.
    pub fn set_desktop_input(&mut self, input: DesktopInput) {
        for (_entity, controls) in self.world.query_mut::<&mut ShipControls>() {
            controls.0.set_desktop_input(input);
        }
    }

    /// Feed gamepad state to every gamepad-controlled ship.
    pub fn set_gamepad_input(&mut self, input: GamepadInput) {
        for (_entity, controls) in self.world.query_mut::<&mut ShipControls>() {
            controls.0.set_gamepad_input(input);
        }
    }

    pub fn diagnostics(&self, agent: EntityId) -> Option<AgentDiagnostics> {
        systems::snapshot::agent_diagnostics(&self.world, entity_of(agent)?)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }
}
