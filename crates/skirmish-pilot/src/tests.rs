use glam::{DQuat, DVec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::config::*;
use skirmish_core::constants::*;
use skirmish_core::enums::*;
use skirmish_core::types::*;

use crate::acquisition::{CombatTransition, TargetAcquisition};
use crate::avoidance::{AvoidanceSignal, CollisionAvoidanceSensor};
use crate::behavior::{
    too_close, BehaviorContext, BehaviorEvent, BehaviorStateMachine, FlightTarget,
};
use crate::sensing::{root_entity, PhysicsQuery, RayHit, SceneGraph};
use crate::weapons::{AiWeaponControls, WeaponAim};

// ---- Test doubles ---------------------------------------------------------

#[derive(Clone)]
struct Body {
    id: EntityId,
    pose: Pose,
    velocity: DVec3,
    radius: f64,
    layer: Layer,
    parent: Option<EntityId>,
    active: bool,
}

/// Sphere world answering queries geometrically.
#[derive(Default)]
struct SphereWorld {
    bodies: Vec<Body>,
}

impl SphereWorld {
    fn add(&mut self, id: u64, position: DVec3, radius: f64, layer: Layer) -> EntityId {
        let id = EntityId(id);
        self.bodies.push(Body {
            id,
            pose: Pose::at(position),
            velocity: DVec3::ZERO,
            radius,
            layer,
            parent: None,
            active: true,
        });
        id
    }

    fn body_mut(&mut self, id: EntityId) -> &mut Body {
        self.bodies.iter_mut().find(|b| b.id == id).unwrap()
    }

    fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    fn sweep(
        &self,
        origin: DVec3,
        inflate: f64,
        direction: DVec3,
        max_distance: f64,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        self.bodies
            .iter()
            .filter(|b| b.active && mask.contains(b.layer))
            .filter_map(|b| {
                let radius = b.radius + inflate;
                let oc = origin - b.pose.position;
                let half_b = oc.dot(dir);
                let c = oc.length_squared() - radius * radius;
                if c <= 0.0 {
                    return None;
                }
                let disc = half_b * half_b - c;
                if disc < 0.0 {
                    return None;
                }
                let t = -half_b - disc.sqrt();
                (t >= 0.0 && t <= max_distance).then(|| RayHit {
                    entity: b.id,
                    point: origin + dir * t,
                    distance: t,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl PhysicsQuery for SphereWorld {
    fn ray_cast(&self, origin: DVec3, direction: DVec3, max: f64, mask: LayerMask) -> Option<RayHit> {
        self.sweep(origin, 0.0, direction, max, mask)
    }

    fn sphere_cast(
        &self,
        origin: DVec3,
        radius: f64,
        direction: DVec3,
        max: f64,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.sweep(origin, radius, direction, max, mask)
    }

    fn overlap_sphere(
        &self,
        center: DVec3,
        radius: f64,
        mask: LayerMask,
        max_results: usize,
        results: &mut Vec<EntityId>,
    ) -> usize {
        let before = results.len();
        for b in &self.bodies {
            if results.len() - before >= max_results {
                break;
            }
            if b.active
                && mask.contains(b.layer)
                && b.pose.position.distance(center) <= radius + b.radius
            {
                results.push(b.id);
            }
        }
        results.len() - before
    }
}

impl SceneGraph for SphereWorld {
    fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.body(entity).and_then(|b| b.parent)
    }

    fn layer(&self, entity: EntityId) -> Option<Layer> {
        self.body(entity).map(|b| b.layer)
    }

    fn is_active(&self, entity: EntityId) -> bool {
        self.body(entity).is_some_and(|b| b.active)
    }

    fn pose(&self, entity: EntityId) -> Option<Pose> {
        self.body(entity).map(|b| b.pose)
    }

    fn velocity(&self, entity: EntityId) -> Option<DVec3> {
        self.body(entity).map(|b| b.velocity)
    }
}

/// Reports a hit for any cast whose direction matches one of the scripted ones.
#[derive(Default)]
struct ScriptedCasts {
    hit_directions: Vec<DVec3>,
    sphere_casts: std::cell::Cell<usize>,
    ray_casts: std::cell::Cell<usize>,
}

impl ScriptedCasts {
    fn hit(&self, direction: DVec3) -> Option<RayHit> {
        let dir = direction.normalize();
        self.hit_directions
            .iter()
            .any(|d| d.normalize().distance(dir) < 1e-9)
            .then(|| RayHit {
                entity: EntityId(99),
                point: dir * 10.0,
                distance: 10.0,
            })
    }
}

impl PhysicsQuery for ScriptedCasts {
    fn ray_cast(&self, _: DVec3, direction: DVec3, _: f64, _: LayerMask) -> Option<RayHit> {
        self.ray_casts.set(self.ray_casts.get() + 1);
        self.hit(direction)
    }

    fn sphere_cast(&self, _: DVec3, _: f64, direction: DVec3, _: f64, _: LayerMask) -> Option<RayHit> {
        self.sphere_casts.set(self.sphere_casts.get() + 1);
        self.hit(direction)
    }

    fn overlap_sphere(&self, _: DVec3, _: f64, _: LayerMask, _: usize, _: &mut Vec<EntityId>) -> usize {
        0
    }
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

// ---- Collision avoidance -----------------------------------------------------

fn sensor() -> CollisionAvoidanceSensor {
    CollisionAvoidanceSensor::new(AvoidanceConfig::default()).unwrap()
}

fn probe_direction(name: &str) -> DVec3 {
    let config = AvoidanceConfig::default();
    std::iter::once(&config.up_probe)
        .chain(std::iter::once(&config.down_probe))
        .chain(&config.left_probes)
        .chain(&config.right_probes)
        .find(|p| p.name == name)
        .map(|p| p.direction)
        .unwrap()
}

#[test]
fn test_avoidance_none_when_all_probes_miss() {
    let mut sensor = sensor();
    let physics = ScriptedCasts::default();
    let signal = sensor.sense(&Pose::default(), &physics);
    assert_eq!(signal, AvoidanceSignal::NONE);
    assert!(!signal.is_active());
    // Vertical probes sweep spheres, horizontal probes cast rays.
    assert_eq!(physics.sphere_casts.get(), 2);
    assert_eq!(physics.ray_casts.get(), 4);
}

#[test]
fn test_up_probe_hit_avoids_downward_regardless_of_horizontal() {
    let mut sensor = sensor();
    let only_up = ScriptedCasts {
        hit_directions: vec![probe_direction("top")],
        ..ScriptedCasts::default()
    };
    let signal = sensor.sense(&Pose::default(), &only_up);
    assert_eq!(signal.vertical, VerticalAvoidance::Down);
    assert_eq!(signal.horizontal, HorizontalAvoidance::None);

    let everything = ScriptedCasts {
        hit_directions: vec![
            probe_direction("top"),
            probe_direction("bottom"),
            probe_direction("left_front"),
            probe_direction("right_front"),
        ],
        ..ScriptedCasts::default()
    };
    let signal = sensor.sense(&Pose::default(), &everything);
    assert_eq!(signal.vertical, VerticalAvoidance::Down, "up probe has priority");
    assert_eq!(signal.horizontal, HorizontalAvoidance::Right, "left probes have priority");
}

#[test]
fn test_down_probe_hit_avoids_upward() {
    let mut sensor = sensor();
    let physics = ScriptedCasts {
        hit_directions: vec![probe_direction("bottom")],
        ..ScriptedCasts::default()
    };
    assert_eq!(sensor.sense(&Pose::default(), &physics).vertical, VerticalAvoidance::Up);
    assert_eq!(sensor.last_vertical_detection().unwrap().probe, "bottom");
}

#[test]
fn test_horizontal_first_probe_in_order_wins() {
    let mut sensor = sensor();
    let physics = ScriptedCasts {
        hit_directions: vec![probe_direction("left_wide"), probe_direction("left_front")],
        ..ScriptedCasts::default()
    };
    let signal = sensor.sense(&Pose::default(), &physics);
    assert_eq!(signal.horizontal, HorizontalAvoidance::Right);
    assert_eq!(sensor.last_horizontal_detection().unwrap().probe, "left_front");

    let physics = ScriptedCasts {
        hit_directions: vec![probe_direction("right_wide")],
        ..ScriptedCasts::default()
    };
    let signal = sensor.sense(&Pose::default(), &physics);
    assert_eq!(signal.horizontal, HorizontalAvoidance::Left);
    assert_eq!(sensor.last_horizontal_detection().unwrap().probe, "right_wide");
}

#[test]
fn test_signal_recomputed_every_tick() {
    let mut sensor = sensor();
    let blocked = ScriptedCasts {
        hit_directions: vec![probe_direction("top"), probe_direction("left_front")],
        ..ScriptedCasts::default()
    };
    assert!(sensor.sense(&Pose::default(), &blocked).is_active());
    let clear = ScriptedCasts::default();
    assert_eq!(sensor.sense(&Pose::default(), &clear), AvoidanceSignal::NONE);
    // Diagnostics keep the last detection.
    assert!(sensor.last_vertical_detection().is_some());
}

#[test]
fn test_probes_follow_ship_orientation() {
    let mut world = SphereWorld::default();
    // Wall ahead and to the left of a ship turned to face +X.
    world.add(1, DVec3::new(60.0, 0.0, 25.0), 12.0, OBSTACLE_LAYER);
    let pose = Pose::with_yaw(DVec3::ZERO, 90.0);
    let mut sensor = sensor();
    let signal = sensor.sense(&pose, &world);
    assert_eq!(signal.horizontal, HorizontalAvoidance::Right);
    assert_eq!(signal.vertical, VerticalAvoidance::None);
}

#[test]
fn test_avoidance_ignores_other_layers() {
    let mut world = SphereWorld::default();
    world.add(1, DVec3::new(0.0, 10.0, 40.0), 20.0, AGENT_LAYER);
    let mut sensor = sensor();
    assert_eq!(sensor.sense(&Pose::default(), &world), AvoidanceSignal::NONE);
}

#[test]
fn test_empty_probe_list_rejected() {
    let config = AvoidanceConfig {
        right_probes: Vec::new(),
        ..AvoidanceConfig::default()
    };
    assert!(CollisionAvoidanceSensor::new(config).is_err());
}

// ---- Target acquisition ------------------------------------------------------

fn acquisition() -> TargetAcquisition {
    TargetAcquisition::new(AcquisitionConfig::default()).unwrap()
}

#[test]
fn test_best_lock_is_nearest_in_cone() {
    let mut world = SphereWorld::default();
    world.add(1, DVec3::new(2.0, 0.0, 50.0), 5.0, AGENT_LAYER);
    world.add(2, DVec3::new(-1.0, 1.0, 30.0), 5.0, AGENT_LAYER);
    world.add(3, DVec3::new(0.0, -3.0, 80.0), 5.0, AGENT_LAYER);

    let mut acq = acquisition();
    acq.scan(&Pose::default(), &world, &world);
    assert_eq!(acq.in_range().len(), 3);
    let lock = acq.best_lock().expect("lock candidate");
    assert_eq!(lock.target, EntityId(2));
    assert!((lock.distance - DVec3::new(-1.0, 1.0, 30.0).length()).abs() < 1e-9);
}

#[test]
fn test_lock_requires_cone_and_lock_range() {
    let mut world = SphereWorld::default();
    // Close but well off boresight.
    world.add(1, DVec3::new(40.0, 0.0, 10.0), 5.0, AGENT_LAYER);
    // In cone but beyond lock range.
    world.add(2, DVec3::new(0.0, 0.0, 450.0), 5.0, AGENT_LAYER);

    let mut acq = acquisition();
    acq.scan(&Pose::default(), &world, &world);
    assert_eq!(acq.in_range().len(), 2, "both in scan radius");
    assert!(acq.best_lock().is_none());
}

#[test]
fn test_equal_distance_keeps_first_found() {
    let mut world = SphereWorld::default();
    world.add(1, DVec3::new(3.0, 0.0, 40.0), 5.0, AGENT_LAYER);
    world.add(2, DVec3::new(-3.0, 0.0, 40.0), 5.0, AGENT_LAYER);
    let mut acq = acquisition();
    acq.scan(&Pose::default(), &world, &world);
    assert_eq!(acq.best_lock().unwrap().target, EntityId(1));
}

#[test]
fn test_compound_colliders_count_once() {
    let mut world = SphereWorld::default();
    let hull = world.add(1, DVec3::new(0.0, 0.0, 100.0), 5.0, AGENT_LAYER);
    let wing = world.add(2, DVec3::new(4.0, 0.0, 100.0), 2.0, AGENT_LAYER);
    let pod = world.add(3, DVec3::new(-4.0, 0.0, 100.0), 2.0, AGENT_LAYER);
    world.body_mut(wing).parent = Some(hull);
    world.body_mut(pod).parent = Some(wing);
    // A child on another layer is its own root.
    let flare = world.add(4, DVec3::new(0.0, 4.0, 100.0), 1.0, OBSTACLE_LAYER);
    world.body_mut(flare).parent = Some(hull);

    assert_eq!(root_entity(&world, pod), hull);
    assert_eq!(root_entity(&world, flare), flare);

    let mut acq = acquisition();
    acq.scan(&Pose::default(), &world, &world);
    assert_eq!(acq.in_range(), &[hull]);
}

#[test]
fn test_inactive_and_owner_excluded() {
    let mut world = SphereWorld::default();
    let me = world.add(1, DVec3::ZERO, 5.0, AGENT_LAYER);
    let gone = world.add(2, DVec3::new(0.0, 0.0, 60.0), 5.0, AGENT_LAYER);
    world.body_mut(gone).active = false;

    let mut acq = acquisition().with_owner(me);
    assert_eq!(acq.scan(&Pose::default(), &world, &world), None);
    assert!(acq.in_range().is_empty());
    assert!(acq.best_lock().is_none());
}

#[test]
fn test_scan_bounded_by_max_targets() {
    let mut world = SphereWorld::default();
    for i in 0..10 {
        world.add(i + 1, DVec3::new(i as f64 * 10.0, 0.0, 50.0), 1.0, AGENT_LAYER);
    }
    let mut acq = TargetAcquisition::new(AcquisitionConfig {
        max_targets: 4,
        ..AcquisitionConfig::default()
    })
    .unwrap();
    acq.scan(&Pose::default(), &world, &world);
    assert_eq!(acq.in_range().len(), 4);
}

#[test]
fn test_combat_transition_is_edge_triggered() {
    let mut world = SphereWorld::default();
    let target = world.add(1, DVec3::new(0.0, 0.0, 100.0), 5.0, AGENT_LAYER);
    let mut acq = acquisition();
    let pose = Pose::default();

    assert_eq!(acq.scan(&pose, &world, &world), Some(CombatTransition::Entered));
    assert_eq!(acq.scan(&pose, &world, &world), None, "still in combat");
    assert!(acq.in_combat());

    world.body_mut(target).active = false;
    assert_eq!(acq.scan(&pose, &world, &world), Some(CombatTransition::Left));
    assert_eq!(acq.scan(&pose, &world, &world), None);
    assert!(!acq.in_combat());
}

#[test]
fn test_scans_only_when_timer_fires() {
    let mut world = SphereWorld::default();
    world.add(1, DVec3::new(0.0, 0.0, 100.0), 5.0, AGENT_LAYER);
    let pose = Pose::default();
    let mut acq = acquisition();

    // Not started: no scans.
    assert_eq!(acq.tick(1.0, &pose, &world, &world), None);
    assert!(acq.in_range().is_empty());

    acq.start();
    assert_eq!(acq.tick(0.016, &pose, &world, &world), Some(CombatTransition::Entered));

    // Target leaves; not noticed until the next scan 0.25s later.
    world.bodies.clear();
    let mut transitions = Vec::new();
    for _ in 0..10 {
        transitions.push(acq.tick(0.05, &pose, &world, &world));
    }
    let fired: Vec<_> = transitions.iter().flatten().collect();
    assert_eq!(fired, vec![&CombatTransition::Left]);
    assert!(transitions[0].is_none() && transitions[3].is_none());
}

#[test]
fn test_stop_cancels_scanning() {
    let mut world = SphereWorld::default();
    let pose = Pose::default();
    let mut acq = acquisition();
    acq.start();
    acq.tick(0.016, &pose, &world, &world);
    acq.stop();
    assert!(!acq.is_running());

    world.add(1, DVec3::new(0.0, 0.0, 100.0), 5.0, AGENT_LAYER);
    for _ in 0..100 {
        assert_eq!(acq.tick(0.1, &pose, &world, &world), None);
    }
    assert!(acq.in_range().is_empty());
}

// ---- Behavior state machine --------------------------------------------------

const PLAYER: EntityId = EntityId(1);

fn machine() -> BehaviorStateMachine {
    let mut m = BehaviorStateMachine::new(BehaviorConfig::default()).unwrap();
    m.set_player(Some(PLAYER));
    m
}

fn context(position: DVec3, player: DVec3) -> BehaviorContext {
    BehaviorContext {
        pose: Pose::at(position),
        health: MAX_HEALTH,
        max_health: MAX_HEALTH,
        player_position: Some(player),
        too_close: false,
        player_sighted: false,
    }
}

#[test]
fn test_inert_until_activated() {
    let mut m = machine();
    let mut rng = rng();
    let update = m.update(&context(DVec3::ZERO, DVec3::new(0.0, 0.0, 10.0)), &mut rng);
    assert_eq!(update.state, None);
    assert!(!update.changed);
    assert!(update.events.is_empty());
}

#[test]
fn test_activate_enters_patrol_with_waypoint() {
    let mut m = machine();
    let mut rng = rng();
    let update = m.activate(&context(DVec3::ZERO, DVec3::new(0.0, 0.0, 9000.0)), &mut rng);
    assert_eq!(update.state, Some(BehaviorState::Patrol));
    assert!(update.changed);

    let marker = m.marker().expect("patrol waypoint");
    assert_eq!(marker.kind, MarkerKind::PatrolWaypoint);
    assert!(marker.position.length() <= PATROL_RANGE);
    assert_eq!(m.flight_target(), Some(FlightTarget::Point(marker.position)));
    assert!(update.events.contains(&BehaviorEvent::MarkerCreated {
        kind: MarkerKind::PatrolWaypoint,
        position: marker.position,
    }));

    // Second activation is a no-op.
    let again = m.activate(&context(DVec3::ZERO, DVec3::new(0.0, 0.0, 9000.0)), &mut rng);
    assert!(!again.changed);
    assert_eq!(m.marker(), Some(marker));
}

#[test]
fn test_patrol_picks_new_waypoint_on_arrival() {
    let mut m = machine();
    let mut rng = rng();
    let far_player = DVec3::new(0.0, 0.0, 90_000.0);
    m.activate(&context(DVec3::ZERO, far_player), &mut rng);
    let first = m.marker().unwrap().position;

    let update = m.update(&context(first, far_player), &mut rng);
    assert!(!update.changed);
    assert_eq!(update.state, Some(BehaviorState::Patrol));
    let second = m.marker().unwrap().position;
    assert_ne!(first, second);
    assert_eq!(update.events, vec![BehaviorEvent::MarkerMoved { position: second }]);
    assert_eq!(m.flight_target(), Some(FlightTarget::Point(second)));
}

#[test]
fn test_health_drop_retreats_and_never_leaves() {
    let mut m = machine();
    let mut rng = rng();
    let player = DVec3::new(0.0, 0.0, 5000.0);
    m.activate(&context(DVec3::ZERO, player), &mut rng);

    let hurt = BehaviorContext {
        health: MAX_HEALTH * 0.2,
        ..context(DVec3::ZERO, player)
    };
    let update = m.update(&hurt, &mut rng);
    assert!(update.changed);
    assert_eq!(update.state, Some(BehaviorState::Retreat));

    // Retreat point lies away from the player.
    let marker = m.marker().unwrap();
    assert_eq!(marker.kind, MarkerKind::RetreatPoint);
    assert!((marker.position - DVec3::new(0.0, 0.0, -RETREAT_DISTANCE)).length() < 1e-6);
    assert!(update.events.contains(&BehaviorEvent::MarkerReleased {
        kind: MarkerKind::PatrolWaypoint
    }));

    let inputs = [
        context(DVec3::ZERO, DVec3::new(0.0, 0.0, 10.0)),
        BehaviorContext {
            too_close: true,
            ..context(marker.position, player)
        },
        BehaviorContext {
            player_position: None,
            ..context(DVec3::new(50.0, 0.0, 0.0), player)
        },
    ];
    for ctx in inputs.iter().cycle().take(30) {
        let update = m.update(ctx, &mut rng);
        assert!(!update.changed);
        assert_eq!(update.state, Some(BehaviorState::Retreat));
        assert!(update.events.is_empty());
    }
}

#[test]
fn test_attack_reposition_attack_cycle() {
    let mut m = machine();
    let mut rng = rng();
    let player = DVec3::new(0.0, 0.0, 600.0);
    m.activate(&context(DVec3::ZERO, player), &mut rng);

    let update = m.update(&context(DVec3::ZERO, player), &mut rng);
    assert_eq!(update.state, Some(BehaviorState::Attack));
    assert!(m.marker().is_none(), "attack releases the waypoint");
    assert_eq!(m.flight_target(), Some(FlightTarget::Entity(PLAYER)));
    let aim = m.weapon_aim().expect("weapons armed");
    assert_eq!(aim.target, PLAYER);
    assert_eq!(aim.attack_range, ATTACK_RANGE);
    assert!(update.events.contains(&BehaviorEvent::WeaponsArmed(aim)));

    // Stays in Attack while nothing is too close.
    let update = m.update(&context(DVec3::ZERO, player), &mut rng);
    assert!(!update.changed);

    let close = BehaviorContext {
        too_close: true,
        ..context(DVec3::ZERO, player)
    };
    let update = m.update(&close, &mut rng);
    assert_eq!(update.state, Some(BehaviorState::Reposition));
    assert!(m.weapon_aim().is_none());
    assert!(update.events.contains(&BehaviorEvent::WeaponsDisarmed));
    let point = m.marker().unwrap();
    assert_eq!(point.kind, MarkerKind::RepositionPoint);
    // Perpendicular to the nose at the reposition distance.
    assert!((point.position.length() - REPOSITION_DISTANCE).abs() < 1e-9);
    assert!(point.position.z.abs() < 1e-9);

    // Still far from the point.
    let update = m.update(&context(DVec3::ZERO, player), &mut rng);
    assert_eq!(update.state, Some(BehaviorState::Reposition));

    let near_point = point.position * 0.7;
    let update = m.update(&context(near_point, player), &mut rng);
    assert_eq!(update.state, Some(BehaviorState::Attack));
    assert!(m.marker().is_none());
    assert!(m.weapon_aim().is_some());
}

#[test]
fn test_reposition_uses_all_four_offsets() {
    let player = DVec3::new(0.0, 0.0, 600.0);
    let mut rng = rng();
    let mut seen = Vec::new();
    for _ in 0..64 {
        let mut m = machine();
        m.activate(&context(DVec3::ZERO, player), &mut rng);
        m.update(&context(DVec3::ZERO, player), &mut rng);
        let close = BehaviorContext {
            too_close: true,
            ..context(DVec3::ZERO, player)
        };
        m.update(&close, &mut rng);
        let dir = m.marker().unwrap().position.normalize().round();
        if !seen.contains(&dir) {
            seen.push(dir);
        }
    }
    assert_eq!(seen.len(), 4, "offsets seen: {seen:?}");
}

#[test]
fn test_unresolved_player_never_attacks() {
    let mut m = BehaviorStateMachine::new(BehaviorConfig::default()).unwrap();
    let mut rng = rng();
    let ctx = BehaviorContext {
        player_position: None,
        ..context(DVec3::ZERO, DVec3::ZERO)
    };
    m.activate(&ctx, &mut rng);
    for _ in 0..10 {
        assert_eq!(m.update(&ctx, &mut rng).state, Some(BehaviorState::Patrol));
    }

    // Known position but no player identity wired.
    let ctx = context(DVec3::ZERO, DVec3::new(0.0, 0.0, 10.0));
    assert_eq!(m.update(&ctx, &mut rng).state, Some(BehaviorState::Patrol));

    // A sighting is ignored without a player to attack.
    let sighted = BehaviorContext {
        player_sighted: true,
        ..ctx
    };
    assert_eq!(m.update(&sighted, &mut rng).state, Some(BehaviorState::Patrol));
}

#[test]
fn test_retreat_without_player_flies_backward() {
    let mut m = BehaviorStateMachine::new(BehaviorConfig::default()).unwrap();
    let mut rng = rng();
    let pose = Pose::with_yaw(DVec3::new(10.0, 0.0, 0.0), 90.0);
    let ctx = BehaviorContext {
        pose,
        health: 100.0,
        max_health: MAX_HEALTH,
        player_position: None,
        too_close: false,
        player_sighted: false,
    };
    m.activate(&ctx, &mut rng);
    m.update(&ctx, &mut rng);
    let marker = m.marker().unwrap();
    let expected = pose.position - pose.forward() * RETREAT_DISTANCE;
    assert!((marker.position - expected).length() < 1e-6);
}

#[test]
fn test_deactivate_releases_marker_and_disarms() {
    let mut m = machine();
    let mut rng = rng();
    let player = DVec3::new(0.0, 0.0, 600.0);
    m.activate(&context(DVec3::ZERO, player), &mut rng);
    let events = m.deactivate();
    assert_eq!(
        events,
        vec![BehaviorEvent::MarkerReleased {
            kind: MarkerKind::PatrolWaypoint
        }]
    );
    assert_eq!(m.state(), None);
    assert!(m.marker().is_none());
    assert!(m.flight_target().is_none());

    // Reactivate, attack, then deactivate with weapons armed.
    m.activate(&context(DVec3::ZERO, player), &mut rng);
    m.update(&context(DVec3::ZERO, player), &mut rng);
    let events = m.deactivate();
    assert_eq!(events, vec![BehaviorEvent::WeaponsDisarmed]);
    assert!(m.update(&context(DVec3::ZERO, player), &mut rng).events.is_empty());
}

#[test]
fn test_too_close_sweeps_forward_for_player() {
    let config = BehaviorConfig::default();
    let mut world = SphereWorld::default();
    world.add(1, DVec3::new(2.0, 0.0, 80.0), 1.0, PLAYER_LAYER);
    assert!(too_close(&world, &Pose::default(), &config));

    let facing_away = Pose::with_yaw(DVec3::ZERO, 180.0);
    assert!(!too_close(&world, &facing_away, &config));

    let mut far = SphereWorld::default();
    far.add(1, DVec3::new(0.0, 0.0, 150.0), 1.0, PLAYER_LAYER);
    assert!(!too_close(&far, &Pose::default(), &config));
}

// ---- Weapons -----------------------------------------------------------------

fn armed_weapons() -> AiWeaponControls {
    let mut weapons = AiWeaponControls::new(WeaponConfig::default()).unwrap();
    weapons.arm(WeaponAim {
        target: PLAYER,
        attack_range: ATTACK_RANGE,
        mask: LayerMask::NONE.with(PLAYER_LAYER),
    });
    weapons
}

#[test]
fn test_primary_fires_within_half_range() {
    let mut world = SphereWorld::default();
    world.add(PLAYER.0, DVec3::new(0.0, 0.0, 400.0), 5.0, PLAYER_LAYER);
    let mut weapons = armed_weapons();
    let fire = weapons.update(&Pose::default(), &world, &world);
    assert!(fire.primary);

    world.body_mut(PLAYER).pose.position = DVec3::new(0.0, 0.0, 700.0);
    let fire = weapons.update(&Pose::default(), &world, &world);
    assert!(!fire.primary, "beyond half the attack range");
}

#[test]
fn test_secondary_needs_alignment() {
    let mut world = SphereWorld::default();
    world.add(PLAYER.0, DVec3::new(2.0, 0.0, 800.0), 5.0, PLAYER_LAYER);
    let mut weapons = armed_weapons();

    // Same heading as the shooter.
    let fire = weapons.update(&Pose::default(), &world, &world);
    assert!(fire.secondary);
    assert!(!fire.primary);

    // Head-on: forward vectors differ by 2.
    world.body_mut(PLAYER).pose.rotation = DQuat::from_rotation_y(std::f64::consts::PI);
    let fire = weapons.update(&Pose::default(), &world, &world);
    assert!(!fire.secondary);
}

#[test]
fn test_disarmed_never_fires() {
    let mut world = SphereWorld::default();
    world.add(PLAYER.0, DVec3::new(0.0, 0.0, 100.0), 5.0, PLAYER_LAYER);
    let mut weapons = armed_weapons();
    assert!(weapons.update(&Pose::default(), &world, &world).primary);

    weapons.disarm();
    let fire = weapons.update(&Pose::default(), &world, &world);
    assert!(!fire.primary && !fire.secondary);
    assert!(weapons.aim_point().is_none());
}

#[test]
fn test_unresolved_target_holds_fire() {
    let mut world = SphereWorld::default();
    world.add(PLAYER.0, DVec3::new(0.0, 0.0, 100.0), 5.0, PLAYER_LAYER);
    world.body_mut(PLAYER).active = false;
    let mut weapons = armed_weapons();
    let fire = weapons.update(&Pose::default(), &world, &world);
    assert!(!fire.primary && !fire.secondary);

    let empty = SphereWorld::default();
    let fire = weapons.update(&Pose::default(), &empty, &empty);
    assert!(!fire.primary && !fire.secondary);
}

#[test]
fn test_aim_point_leads_moving_target() {
    let mut world = SphereWorld::default();
    world.add(PLAYER.0, DVec3::new(0.0, 0.0, 800.0), 5.0, PLAYER_LAYER);
    world.body_mut(PLAYER).velocity = DVec3::new(100.0, 0.0, 0.0);
    let mut weapons = armed_weapons();
    weapons.update(&Pose::default(), &world, &world);
    let aim = weapons.aim_point().unwrap();
    assert!(aim.x > 0.0, "aim leads along the target's motion");
}
