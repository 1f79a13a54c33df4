//! skirmish-headless: run an agent skirmish without a renderer.
//!
//! Usage:
//!   skirmish-headless --scenario scenarios/duel.json --seconds 30
//!   RUST_LOG=skirmish_pilot=debug skirmish-headless -v
//!
//! Without `--scenario` a lone player is spawned at the origin with three
//! agents around it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::DVec3;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use skirmish_core::constants::FRAME_DT;
use skirmish_core::error::ConfigError;
use skirmish_core::events::SimEvent;
use skirmish_core::state::SimSnapshot;
use skirmish_sim::scenario::{AgentSpawn, ObstacleSpawn, ScenarioConfig};
use skirmish_sim::SimulationEngine;

#[derive(Parser)]
#[command(name = "skirmish-headless", about = "Headless agent skirmish runner")]
struct Cli {
    /// Scenario JSON file
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,
    /// Simulated seconds to run
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,
    /// Decision ticks per simulated second
    #[arg(long, default_value_t = 1.0 / FRAME_DT)]
    fps: f64,
    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,
    /// Seconds between agent diagnostic reports
    #[arg(long, default_value_t = 1.0)]
    report_every: f64,
    /// Print the final snapshot as JSON to stdout
    #[arg(long)]
    json: bool,
    /// Log verbosity (-v: debug, -vv: trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ConfigError> {
    if !(cli.fps > 0.0 && cli.fps.is_finite()) {
        return Err(ConfigError::NonPositive {
            field: "--fps",
            value: cli.fps,
        });
    }
    if cli.seconds < 0.0 || cli.seconds.is_nan() {
        return Err(ConfigError::Negative {
            field: "--seconds",
            value: cli.seconds,
        });
    }

    let mut scenario = match &cli.scenario {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => default_scenario(),
    };
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    info!(
        seed = scenario.seed,
        agents = scenario.agents.len(),
        obstacles = scenario.obstacles.len(),
        "scenario loaded"
    );

    let mut engine = SimulationEngine::from_scenario(&scenario)?;
    let dt = 1.0 / cli.fps;
    let frames = (cli.seconds * cli.fps).round() as u64;
    let report_frames = ((cli.report_every * cli.fps).round() as u64).max(1);

    let mut last = SimSnapshot::default();
    for frame in 1..=frames {
        last = engine.frame(dt);
        for event in &last.events {
            log_event(last.time.elapsed_secs, event);
        }
        if frame % report_frames == 0 {
            report(&last);
        }
    }

    info!(
        frames = last.time.frame,
        fixed_steps = last.time.fixed_steps,
        elapsed_secs = last.time.elapsed_secs,
        "run complete"
    );
    if cli.json {
        match serde_json::to_string_pretty(&last) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                return Err(ConfigError::Parse {
                    message: e.to_string(),
                })
            }
        }
    }
    Ok(())
}

fn default_scenario() -> ScenarioConfig {
    ScenarioConfig {
        agents: vec![
            AgentSpawn {
                position: DVec3::new(0.0, 0.0, 1800.0),
                yaw_deg: 180.0,
                ..AgentSpawn::default()
            },
            AgentSpawn {
                position: DVec3::new(700.0, 150.0, 400.0),
                yaw_deg: -90.0,
                ..AgentSpawn::default()
            },
            AgentSpawn {
                position: DVec3::new(-2500.0, -100.0, 0.0),
                yaw_deg: 90.0,
                ..AgentSpawn::default()
            },
        ],
        obstacles: vec![ObstacleSpawn {
            position: DVec3::new(0.0, 0.0, 900.0),
            radius: 60.0,
        }],
        ..ScenarioConfig::default()
    }
}

fn log_event(t: f64, event: &SimEvent) {
    match event {
        SimEvent::CombatStateChanged { scanner, in_combat } => {
            info!(t, scanner = scanner.0, in_combat, "combat state changed");
        }
        SimEvent::BehaviorChanged { agent, from, to } => {
            let from = from.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
            info!(t, agent = agent.0, %from, %to, "behavior changed");
        }
        SimEvent::MarkerCreated {
            owner,
            kind,
            position,
        } => {
            info!(t, owner = owner.0, ?kind, ?position, "marker created");
        }
        SimEvent::MarkerReleased { owner, kind } => {
            info!(t, owner = owner.0, ?kind, "marker released");
        }
        SimEvent::TargetDestroyed { entity, hit_point } => {
            info!(t, entity = entity.0, ?hit_point, "target destroyed");
        }
        SimEvent::AgentDeactivated { agent } => {
            info!(t, agent = agent.0, "agent deactivated");
        }
    }
}

fn report(snapshot: &SimSnapshot) {
    let t = snapshot.time.elapsed_secs;
    for agent in &snapshot.agents {
        let state = agent
            .state
            .map(|s| s.to_string())
            .unwrap_or_else(|| "inactive".to_string());
        info!(
            t,
            agent = agent.agent.0,
            %state,
            target = ?agent.target.map(|id| id.0),
            distance = ?agent.target_distance,
            bearing = ?agent.bearing_deg,
            health = agent.health_ratio,
            vertical = ?agent.vertical_avoidance,
            horizontal = ?agent.horizontal_avoidance,
            yaw = agent.steering.yaw,
            pitch = agent.steering.pitch,
            roll = agent.steering.roll,
            thrust = agent.steering.thrust,
            fire_primary = agent.fire.primary,
            fire_secondary = agent.fire.secondary,
            aim = ?agent.aim_point,
            in_combat = agent.in_combat,
            "agent"
        );
    }
    if let Some(player) = &snapshot.player {
        match &player.lock {
            Some(lock) => info!(
                t,
                in_range = player.targets_in_range.len(),
                lock = lock.target.0,
                distance = lock.distance,
                lead = ?lock.lead_point,
                "player radar"
            ),
            None => info!(t, in_range = player.targets_in_range.len(), "player radar"),
        }
    }
}
