//! Tests for the simulation engine, the tick pipeline, and the scenario
//! behaviors of drones and sentries.

use glam::DVec3;

use dronewar_core::commands::SimCommand;
use dronewar_core::components::{Armament, Drone, Obstacle, Sentry, Tactics, Vitals};
use dronewar_core::config::SimConfig;
use dronewar_core::constants::*;
use dronewar_core::enums::{SimPhase, TacticalState};
use dronewar_core::events::SimEvent;
use dronewar_core::state::SimSnapshot;
use dronewar_core::types::{Position, Velocity};
use dronewar_geometry::collision::{overlaps_box, overlaps_footprint};

use crate::engine::SimulationEngine;
use crate::systems::missiles::MissileOutcome;
use crate::world_setup;

/// An engine with no agents and no obstacles, for hand-built scenarios.
fn empty_engine(config: SimConfig) -> SimulationEngine {
    SimulationEngine::new(SimConfig {
        drone_count: 0,
        enemy_count: 0,
        obstacle_count: 0,
        ..config
    })
}

fn quiet_config() -> SimConfig {
    SimConfig {
        auto_fire_missiles: false,
        ..SimConfig::default()
    }
}

fn add_drone(engine: &mut SimulationEngine, id: u32, position: DVec3) {
    let config = engine.config().clone();
    world_setup::spawn_drone(engine.world_mut(), id, position, &config);
}

/// Sentries in hand-built scenarios barely move unless told otherwise.
const CREEP_SPEED: f64 = 0.001;

fn add_sentry(engine: &mut SimulationEngine, id: u32, position: DVec3, interval_ms: f64) {
    world_setup::spawn_sentry(
        engine.world_mut(),
        id,
        position,
        CREEP_SPEED,
        position,
        interval_ms,
        0.0,
    );
}

fn run_ticks(engine: &mut SimulationEngine, from_tick: u64, count: u64) -> Vec<SimSnapshot> {
    (from_tick..from_tick + count)
        .map(|i| engine.tick(i as f64 * TICK_MS))
        .collect()
}

fn sentry_state(engine: &SimulationEngine, id: u32) -> TacticalState {
    let mut query = engine.world().query::<(&Sentry, &Tactics)>();
    query
        .iter()
        .find(|(_, (s, _))| s.id == id)
        .map(|(_, (_, t))| t.state)
        .expect("sentry exists")
}

fn count_events(snapshots: &[SimSnapshot], pred: impl Fn(&SimEvent) -> bool) -> usize {
    snapshots
        .iter()
        .flat_map(|s| s.events.iter())
        .filter(|e| pred(e))
        .count()
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    let mut engine_b = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    engine_a.queue_command(SimCommand::Start);
    engine_b.queue_command(SimCommand::Start);

    for i in 0..600 {
        let now = i as f64 * TICK_MS;
        let json_a = serde_json::to_string(&engine_a.tick(now)).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick(now)).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed at tick {i}");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let a = SimulationEngine::new(SimConfig {
        seed: 111,
        ..Default::default()
    });
    let b = SimulationEngine::new(SimConfig {
        seed: 222,
        ..Default::default()
    });
    assert_ne!(a.obstacles(), b.obstacles(), "Different seeds should give different maps");
}

// ---- Phase gating ----

#[test]
fn test_idle_until_started() {
    let mut engine = SimulationEngine::new(quiet_config());
    let before = engine.tick(0.0);
    let after = engine.tick(1000.0);
    assert_eq!(after.phase, SimPhase::Idle);
    assert_eq!(after.time.tick, 0);
    assert_eq!(
        serde_json::to_string(&before.drones).unwrap(),
        serde_json::to_string(&after.drones).unwrap()
    );

    engine.queue_command(SimCommand::Start);
    let running = engine.tick(1016.0);
    assert_eq!(running.phase, SimPhase::Running);
    assert_eq!(running.time.tick, 1);
}

#[test]
fn test_pause_stops_simulation() {
    let mut engine = SimulationEngine::new(quiet_config());
    engine.queue_command(SimCommand::Start);
    run_ticks(&mut engine, 0, 10);

    engine.queue_command(SimCommand::Pause);
    let paused = engine.tick(10.0 * TICK_MS);
    assert_eq!(paused.phase, SimPhase::Paused);
    let frozen = run_ticks(&mut engine, 11, 30);
    let last = frozen.last().unwrap();
    assert_eq!(last.time.tick, paused.time.tick);
    assert_eq!(
        serde_json::to_string(&last.drones).unwrap(),
        serde_json::to_string(&paused.drones).unwrap(),
        "Drones must not move while paused"
    );

    engine.queue_command(SimCommand::Resume);
    let resumed = engine.tick(41.0 * TICK_MS);
    assert_eq!(resumed.phase, SimPhase::Running);
    assert_eq!(resumed.time.tick, paused.time.tick + 1);
}

#[test]
fn test_clock_never_runs_backwards() {
    let mut engine = SimulationEngine::new(quiet_config());
    engine.queue_command(SimCommand::Start);
    engine.tick(500.0);
    let snap = engine.tick(100.0);
    assert_eq!(snap.time.now_ms, 500.0);
}

// ---- Reset and live edits ----

#[test]
fn test_reset_restores_fresh_agents() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(SimCommand::Start);
    run_ticks(&mut engine, 0, 600);

    engine.queue_command(SimCommand::Reset);
    let snap = engine.tick(600.0 * TICK_MS);
    assert_eq!(snap.phase, SimPhase::Idle);
    assert_eq!(snap.time.tick, 0);
    assert_eq!(snap.known_enemy_count, 0);
    assert_eq!(snap.outcome, Default::default());
    assert_eq!(snap.drones.len(), engine.config().drone_count as usize);
    assert!(snap.drones.iter().all(|d| d.alive && d.missile_loaded));
    assert!(snap.drones.iter().all(|d| d.health == engine.config().drone_max_health));
    assert!(snap.enemies.iter().all(|e| !e.destroyed));
}

#[test]
fn test_structural_edit_resets_but_keeps_phase() {
    let mut engine = SimulationEngine::new(quiet_config());
    engine.queue_command(SimCommand::Start);
    run_ticks(&mut engine, 0, 5);

    engine.queue_command(SimCommand::SetDroneCount { count: 4 });
    engine.queue_command(SimCommand::SetEnemyCount { count: 2 });
    let snap = engine.tick(5.0 * TICK_MS);
    assert_eq!(snap.phase, SimPhase::Running);
    assert_eq!(snap.drones.len(), 4);
    assert_eq!(snap.enemies.len(), 2);
    assert_eq!(snap.time.tick, 1, "Reset restarts the tick counter");
}

#[test]
fn test_edit_rebuilds_world_exactly_when_command_forces_reset() {
    let edits = [
        SimCommand::SetMapSize { size: 180.0 },
        SimCommand::SetDroneCount { count: 4 },
        SimCommand::SetEnemyCount { count: 2 },
        SimCommand::SetObstacleCount { count: 5 },
        SimCommand::SetDroneAltitude { altitude: 25.0 },
        SimCommand::SetDetectionRange { range: 30.0 },
        SimCommand::SetBehaviorWeights {
            cohesion: 0.5,
            separation: 1.0,
            avoidance: 1.0,
            search: 2.0,
        },
        SimCommand::SetShootingEnabled { enabled: false },
    ];
    for edit in edits {
        let mut engine = SimulationEngine::new(quiet_config());
        engine.queue_command(SimCommand::Start);
        run_ticks(&mut engine, 1, 5);

        let structural = edit.forces_reset();
        engine.queue_command(edit.clone());
        let snap = engine.tick(6.0 * TICK_MS);
        let rebuilt = snap.time.tick == 1;
        assert_eq!(rebuilt, structural, "{edit:?}: rebuilt={rebuilt}");
        assert_eq!(snap.phase, SimPhase::Running);
    }
}

#[test]
fn test_live_edit_keeps_agent_identities() {
    let mut engine = SimulationEngine::new(quiet_config());
    engine.queue_command(SimCommand::Start);
    let before = run_ticks(&mut engine, 0, 5).pop().unwrap();

    engine.queue_command(SimCommand::SetBehaviorWeights {
        cohesion: 0.5,
        separation: 3.0,
        avoidance: 1.0,
        search: 2.0,
    });
    engine.queue_command(SimCommand::SetDetectionRange { range: 55.0 });
    engine.queue_command(SimCommand::SetShootingEnabled { enabled: false });
    let after = engine.tick(5.0 * TICK_MS);

    assert_eq!(after.time.tick, before.time.tick + 1);
    assert_eq!(after.obstacles, before.obstacles);
    let ids = |s: &SimSnapshot| s.drones.iter().map(|d| d.id).collect::<Vec<_>>();
    assert_eq!(ids(&after), ids(&before));
    assert_eq!(engine.config().separation_weight, 3.0);
    assert_eq!(engine.config().detection_range, 55.0);
    assert!(!engine.config().shooting_enabled);
}

#[test]
fn test_invalid_edit_is_rejected() {
    let mut engine = SimulationEngine::new(quiet_config());
    let obstacles = engine.obstacles().to_vec();
    engine.queue_command(SimCommand::SetMapSize { size: -5.0 });
    engine.queue_command(SimCommand::SetDetectionRange { range: f64::NAN });
    engine.tick(0.0);
    assert_eq!(engine.config().map_size, SimConfig::default().map_size);
    assert_eq!(engine.config().detection_range, SimConfig::default().detection_range);
    assert_eq!(engine.obstacles(), obstacles.as_slice(), "Rejected edit must not reset");
}

#[test]
fn test_try_new_rejects_invalid_config() {
    let config = SimConfig {
        drone_max_speed: 0.0,
        ..SimConfig::default()
    };
    assert!(SimulationEngine::try_new(config).is_err());
    assert!(SimulationEngine::try_new(SimConfig::default()).is_ok());
}

// ---- Invariants over a full run ----

#[test]
fn test_run_invariants_hold() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(SimCommand::Start);
    let obstacles = engine.obstacles().to_vec();
    let mut destroyed_at: Vec<Option<DVec3>> = vec![None; engine.config().enemy_count as usize];

    for i in 0..1200u64 {
        let now = i as f64 * TICK_MS;
        let snap = engine.tick(now);

        {
            let mut query = engine.world().query::<(&Drone, &Velocity)>();
            for (_, (drone, vel)) in query.iter() {
                assert!(
                    vel.length() <= drone.max_speed + 1e-9,
                    "drone {} speed {} exceeds {}",
                    drone.id,
                    vel.length(),
                    drone.max_speed
                );
            }
        }

        for drone in &snap.drones {
            assert!(drone.health >= 0.0, "drone {} health {}", drone.id, drone.health);
            assert!(drone.health <= engine.config().drone_max_health);
        }

        // Sentries destroyed on an earlier tick must stay silent.
        for event in &snap.events {
            if let SimEvent::LaserFired { enemy_id, .. } = event {
                assert!(destroyed_at[*enemy_id as usize].is_none(), "destroyed sentry fired");
            }
        }

        for enemy in &snap.enemies {
            for obstacle in &obstacles {
                assert!(
                    !overlaps_footprint(enemy.position, obstacle, SENTRY_RADIUS - 1e-6),
                    "sentry {} ended tick {i} inside geometry",
                    enemy.id
                );
            }
            let slot = &mut destroyed_at[enemy.id as usize];
            match slot {
                Some(frozen) => {
                    assert!(enemy.destroyed);
                    assert_eq!(enemy.position, *frozen, "destroyed sentry moved");
                    assert_eq!(enemy.state, TacticalState::Destroyed);
                }
                None if enemy.destroyed => *slot = Some(enemy.position),
                None => {}
            }
        }

        for (_, entry) in engine.knowledge().iter() {
            assert!(now - entry.timestamp_ms <= KNOWLEDGE_RETENTION_MS);
        }
    }
}

#[test]
fn test_dead_drone_drifts_and_stays_in_world() {
    let mut engine = empty_engine(quiet_config());
    add_drone(&mut engine, 0, DVec3::new(0.0, 30.0, 0.0));
    for (_, vitals) in engine.world_mut().query_mut::<&mut Vitals>() {
        vitals.apply_damage(1_000.0);
    }
    engine.queue_command(SimCommand::Start);
    let snaps = run_ticks(&mut engine, 0, 600);
    let last = snaps.last().unwrap();
    assert_eq!(last.drones.len(), 1);
    assert!(!last.drones[0].alive);
    assert_eq!(last.drones[0].position.y, 0.0, "wreck should reach the ground");
    assert!(last.outcome.all_drones_lost);
}

// ---- Scenario A: lone searcher ----

#[test]
fn test_lone_searcher_moves_and_stays_in_bounds() {
    let mut engine = empty_engine(SimConfig {
        cohesion_weight: 0.0,
        search_weight: 1.0,
        ..quiet_config()
    });
    let start = DVec3::new(0.0, 30.0, 0.0);
    add_drone(&mut engine, 0, start);
    engine.queue_command(SimCommand::Start);

    let half = engine.config().half_extent();
    let snaps = run_ticks(&mut engine, 0, 100);
    for snap in &snaps {
        let p = snap.drones[0].position;
        assert!(p.x.abs() <= half && p.z.abs() <= half, "left the map: {p}");
        assert!(p.y >= 0.0 && p.y <= half, "left the airspace: {p}");
    }
    let end = snaps.last().unwrap().drones[0].position;
    assert!(end.distance(start) > 1.0, "drone should search, moved to {end}");
}

// ---- Scenario B: embedded drone ----

#[test]
fn test_embedded_drone_is_pushed_out_and_damaged() {
    let mut engine = empty_engine(quiet_config());
    let block = Obstacle::grounded(0.0, 0.0, 20.0, 40.0, 20.0);
    engine.set_obstacles(vec![block]);
    add_drone(&mut engine, 0, DVec3::new(8.0, 20.0, 0.0));
    engine.queue_command(SimCommand::Start);

    let snap = engine.tick(TICK_MS);
    let drone = &snap.drones[0];
    let radius = engine.config().drone_size / 2.0;
    assert!(
        !overlaps_box(drone.position, &block, radius),
        "drone still inside at {}",
        drone.position
    );
    assert!(drone.health < engine.config().drone_max_health);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::CollisionBurst { drone_id: 0, .. })));
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::DamageFlash { drone_id: 0, amount } if *amount > 0.0)));
}

#[test]
fn test_collision_damage_respects_cooldown() {
    let mut engine = empty_engine(quiet_config());
    let block = Obstacle::grounded(0.0, 0.0, 20.0, 40.0, 20.0);
    engine.set_obstacles(vec![block]);
    add_drone(&mut engine, 0, DVec3::new(8.0, 20.0, 0.0));
    engine.queue_command(SimCommand::Start);
    let first = engine.tick(TICK_MS).drones[0].health;

    // Shove it back in before the cooldown has elapsed.
    for (_, pos) in engine.world_mut().query_mut::<&mut Position>() {
        pos.0 = DVec3::new(8.0, 20.0, 0.0);
    }
    let second = engine.tick(2.0 * TICK_MS);
    assert_eq!(second.drones[0].health, first, "no damage inside cooldown");
    assert!(!overlaps_box(second.drones[0].position, &block, 0.5));

    for (_, pos) in engine.world_mut().query_mut::<&mut Position>() {
        pos.0 = DVec3::new(8.0, 20.0, 0.0);
    }
    let later = engine.tick(TICK_MS + engine.config().collision_cooldown_ms);
    assert!(later.drones[0].health < first, "damage resumes after cooldown");
}

#[test]
fn test_drone_between_overlapping_boxes_ends_tick_clear() {
    let mut engine = empty_engine(quiet_config());
    let left = Obstacle::grounded(0.0, 0.0, 10.0, 40.0, 10.0);
    let right = Obstacle::grounded(7.0, 0.0, 10.0, 40.0, 10.0);
    engine.set_obstacles(vec![left, right]);
    add_drone(&mut engine, 0, DVec3::new(4.0, 20.0, 0.0));
    engine.queue_command(SimCommand::Start);

    let radius = engine.config().drone_size / 2.0;
    for snap in run_ticks(&mut engine, 1, 30) {
        let position = snap.drones[0].position;
        for (name, block) in [("left", &left), ("right", &right)] {
            assert!(
                !overlaps_box(position, block, radius),
                "tick {}: drone inside {name} box at {position}",
                snap.time.tick
            );
        }
    }
}

// ---- Scenario C: hide vs patrol ----

#[test]
fn test_double_detected_sentry_hides_undetected_patrols() {
    let mut engine = empty_engine(SimConfig {
        cohesion_weight: 0.0,
        separation_weight: 0.0,
        avoidance_weight: 0.0,
        search_weight: 0.0,
        detection_range: 60.0,
        ..quiet_config()
    });
    add_drone(&mut engine, 0, DVec3::new(0.0, 30.0, 5.0));
    add_drone(&mut engine, 1, DVec3::new(0.0, 30.0, -5.0));
    add_sentry(&mut engine, 0, DVec3::new(0.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);
    add_sentry(&mut engine, 1, DVec3::new(90.0, SENTRY_HEIGHT, 90.0), EVALUATION_INTERVAL_MIN_MS);
    engine.queue_command(SimCommand::Start);

    let ticks = (EVALUATION_INTERVAL_MIN_MS / TICK_MS).ceil() as u64 + 2;
    let snaps = run_ticks(&mut engine, 1, ticks);
    let last = snaps.last().unwrap();

    assert!(last.enemies[0].visible);
    assert!(!last.enemies[1].visible);
    assert_eq!(sentry_state(&engine, 0), TacticalState::Hiding);
    assert_eq!(sentry_state(&engine, 1), TacticalState::Patrolling);
}

#[test]
fn test_single_detector_triggers_pursuit_and_fire() {
    let mut engine = empty_engine(SimConfig {
        cohesion_weight: 0.0,
        separation_weight: 0.0,
        avoidance_weight: 0.0,
        search_weight: 0.0,
        ..quiet_config()
    });
    add_drone(&mut engine, 0, DVec3::new(0.0, 12.0, 0.0));
    add_sentry(&mut engine, 0, DVec3::new(5.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);
    engine.queue_command(SimCommand::Start);

    let ticks = (EVALUATION_INTERVAL_MIN_MS / TICK_MS).ceil() as u64 + 2;
    let snaps = run_ticks(&mut engine, 1, ticks);
    assert_eq!(sentry_state(&engine, 0), TacticalState::Pursuing);

    let lasers = count_events(&snaps, |e| {
        matches!(e, SimEvent::LaserFired { enemy_id: 0, hit_obstacle: false, .. })
    });
    assert_eq!(lasers, 1, "exactly one shot in the first fire window");
    let health = snaps.last().unwrap().drones[0].health;
    assert_eq!(health, engine.config().drone_max_health - engine.config().shooting_damage);
}

#[test]
fn test_blocked_laser_deals_no_damage() {
    let mut engine = empty_engine(SimConfig {
        cohesion_weight: 0.0,
        separation_weight: 0.0,
        avoidance_weight: 0.0,
        search_weight: 0.0,
        ..quiet_config()
    });
    // Drone hovering beside a tall wall; sentry on the other side.
    engine.set_obstacles(vec![Obstacle::grounded(0.0, 0.0, 2.0, 60.0, 40.0)]);
    add_drone(&mut engine, 0, DVec3::new(-6.0, 20.0, 0.0));
    add_sentry(&mut engine, 0, DVec3::new(6.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);
    engine.queue_command(SimCommand::Start);

    let ticks = (EVALUATION_INTERVAL_MIN_MS / TICK_MS).ceil() as u64 + 2;
    let snaps = run_ticks(&mut engine, 1, ticks);
    let blocked = count_events(&snaps, |e| {
        matches!(e, SimEvent::LaserFired { hit_obstacle: true, .. })
    });
    assert!(blocked >= 1, "sentry should have fired into the wall");
    let last = snaps.last().unwrap();
    assert_eq!(last.drones[0].health, engine.config().drone_max_health);
}

// ---- Scenario D: missiles ----

#[test]
fn test_missile_with_line_of_sight_destroys_sentry() {
    let mut engine = empty_engine(quiet_config());
    add_drone(&mut engine, 0, DVec3::new(0.0, 30.0, 0.0));
    add_sentry(&mut engine, 0, DVec3::new(10.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);

    assert_eq!(engine.fire_missile(0, 0), Some(MissileOutcome::Hit));
    assert_eq!(sentry_state(&engine, 0), TacticalState::Destroyed);

    let snap = engine.tick(0.0);
    assert!(snap.enemies[0].destroyed);
    assert!(!snap.drones[0].missile_loaded);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::EnemyDestroyed { enemy_id: 0 })));
}

#[test]
fn test_missile_without_line_of_sight_stops_at_obstacle() {
    let mut engine = empty_engine(SimConfig {
        detection_range: 60.0,
        ..quiet_config()
    });
    let wall = Obstacle::grounded(0.0, 0.0, 6.0, 30.0, 6.0);
    engine.set_obstacles(vec![wall]);
    add_drone(&mut engine, 0, DVec3::new(-20.0, 10.0, 0.0));
    add_sentry(&mut engine, 0, DVec3::new(20.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);

    match engine.fire_missile(0, 0) {
        Some(MissileOutcome::Blocked(p)) => {
            assert!((p.x - wall.min().x).abs() < 1e-6, "missile should end on the wall face: {p}");
        }
        other => panic!("expected a blocked missile, got {other:?}"),
    }
    assert_ne!(sentry_state(&engine, 0), TacticalState::Destroyed);

    // Ammo is spent either way.
    assert_eq!(engine.fire_missile(0, 0), None);
    let mut query = engine.world().query::<&Armament>();
    assert!(query.iter().all(|(_, a)| !a.missile_loaded));
}

#[test]
fn test_missile_requires_detection_and_live_target() {
    let mut engine = empty_engine(quiet_config());
    add_drone(&mut engine, 0, DVec3::new(0.0, 30.0, 0.0));
    add_sentry(&mut engine, 0, DVec3::new(90.0, SENTRY_HEIGHT, 90.0), EVALUATION_INTERVAL_MIN_MS);
    assert_eq!(engine.fire_missile(0, 0), None, "out of detection range");
    assert_eq!(engine.fire_missile(0, 7), None, "no such sentry");
    assert_eq!(engine.fire_missile(3, 0), None, "no such drone");
    let mut query = engine.world().query::<&Armament>();
    assert!(query.iter().all(|(_, a)| a.missile_loaded), "refused launches keep ammo");
}

#[test]
fn test_fire_missile_command_and_auto_fire() {
    let mut engine = empty_engine(quiet_config());
    add_drone(&mut engine, 0, DVec3::new(0.0, 30.0, 0.0));
    add_sentry(&mut engine, 0, DVec3::new(10.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);
    engine.queue_command(SimCommand::Start);
    engine.queue_command(SimCommand::FireMissile {
        drone_id: 0,
        enemy_id: 0,
    });
    let snap = engine.tick(TICK_MS);
    assert!(snap.enemies[0].destroyed);

    let mut auto = empty_engine(SimConfig::default());
    add_drone(&mut auto, 0, DVec3::new(0.0, 30.0, 0.0));
    add_sentry(&mut auto, 0, DVec3::new(10.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);
    auto.queue_command(SimCommand::Start);
    let snap = auto.tick(TICK_MS);
    assert!(snap.enemies[0].destroyed, "auto-fire should take the clear shot");
    assert!(snap.outcome.all_drones_out_of_ammo);
}

// ---- Scenario E: outcome latch ----

#[test]
fn test_all_enemies_neutralized_fires_once_per_run() {
    let mut engine = SimulationEngine::new(SimConfig {
        drone_count: 1,
        enemy_count: 2,
        obstacle_count: 0,
        ..quiet_config()
    });
    engine.queue_command(SimCommand::Start);
    engine.tick(0.0);

    for (_, tactics) in engine.world_mut().query_mut::<&mut Tactics>() {
        tactics.state = TacticalState::Destroyed;
    }
    let snaps = run_ticks(&mut engine, 1, 60);
    assert_eq!(
        count_events(&snaps, |e| matches!(e, SimEvent::AllEnemiesNeutralized)),
        1
    );
    assert!(snaps.last().unwrap().outcome.all_enemies_neutralized);

    engine.queue_command(SimCommand::Reset);
    engine.queue_command(SimCommand::Start);
    let fresh = engine.tick(61.0 * TICK_MS);
    assert!(!fresh.outcome.all_enemies_neutralized);

    for (_, tactics) in engine.world_mut().query_mut::<&mut Tactics>() {
        tactics.state = TacticalState::Destroyed;
    }
    let snaps = run_ticks(&mut engine, 62, 30);
    assert_eq!(
        count_events(&snaps, |e| matches!(e, SimEvent::AllEnemiesNeutralized)),
        1,
        "latch re-arms after reset"
    );
}

#[test]
fn test_wiped_out_swarm_is_lost_not_out_of_ammo() {
    let mut engine = SimulationEngine::new(SimConfig {
        drone_count: 2,
        enemy_count: 1,
        obstacle_count: 0,
        ..quiet_config()
    });
    engine.queue_command(SimCommand::Start);
    engine.tick(0.0);

    for (_, vitals) in engine.world_mut().query_mut::<&mut Vitals>() {
        vitals.apply_damage(f64::MAX);
    }
    let snaps = run_ticks(&mut engine, 1, 10);
    assert_eq!(count_events(&snaps, |e| matches!(e, SimEvent::AllDronesLost)), 1);
    assert_eq!(
        count_events(&snaps, |e| matches!(e, SimEvent::AllDronesOutOfAmmo)),
        0,
        "dead drones are not out of ammo"
    );
    let outcome = snaps.last().unwrap().outcome;
    assert!(outcome.all_drones_lost);
    assert!(!outcome.all_drones_out_of_ammo);
}

#[test]
fn test_living_drones_without_missiles_are_out_of_ammo() {
    let mut engine = SimulationEngine::new(SimConfig {
        drone_count: 2,
        enemy_count: 1,
        obstacle_count: 0,
        ..quiet_config()
    });
    engine.queue_command(SimCommand::Start);
    engine.tick(0.0);

    for (_, armament) in engine.world_mut().query_mut::<&mut Armament>() {
        armament.missile_loaded = false;
    }
    let snaps = run_ticks(&mut engine, 1, 10);
    assert_eq!(
        count_events(&snaps, |e| matches!(e, SimEvent::AllDronesOutOfAmmo)),
        1
    );
    assert!(!snaps.last().unwrap().outcome.all_drones_lost);
}

#[test]
fn test_no_sentries_is_not_a_win() {
    let mut engine = SimulationEngine::new(SimConfig {
        enemy_count: 0,
        ..quiet_config()
    });
    engine.queue_command(SimCommand::Start);
    let snaps = run_ticks(&mut engine, 0, 10);
    assert!(!snaps.last().unwrap().outcome.all_enemies_neutralized);
}

// ---- Knowledge propagation ----

#[test]
fn test_sighting_reaches_the_whole_swarm_same_tick() {
    let mut engine = empty_engine(quiet_config());
    add_drone(&mut engine, 0, DVec3::new(0.0, 30.0, 0.0));
    add_drone(&mut engine, 1, DVec3::new(-90.0, 30.0, -90.0));
    add_sentry(&mut engine, 0, DVec3::new(10.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);
    engine.queue_command(SimCommand::Start);
    let snap = engine.tick(TICK_MS);
    assert_eq!(snap.known_enemy_count, 1);
    assert_eq!(engine.knowledge().get(0).map(|e| e.detected_by), Some(0));

    let mut query = engine
        .world()
        .query::<(&Drone, &dronewar_core::components::DroneMind)>();
    for (_, (drone, mind)) in query.iter() {
        assert!(
            mind.known_enemies.contains_key(&0),
            "drone {} missed the broadcast",
            drone.id
        );
    }
}

#[test]
fn test_knowledge_expires_after_retention_window() {
    let mut engine = empty_engine(quiet_config());
    add_drone(&mut engine, 0, DVec3::new(0.0, 30.0, 0.0));
    add_sentry(&mut engine, 0, DVec3::new(10.0, SENTRY_HEIGHT, 0.0), EVALUATION_INTERVAL_MIN_MS);
    engine.queue_command(SimCommand::Start);
    engine.tick(TICK_MS);
    assert_eq!(engine.knowledge().len(), 1);

    // Teleport the drone far away so the sighting is never refreshed.
    for (_, (_, pos)) in engine.world_mut().query_mut::<(&Drone, &mut Position)>() {
        pos.0 = DVec3::new(-90.0, 30.0, -90.0);
    }
    engine.tick(2.0 * TICK_MS);
    engine.tick(TICK_MS + KNOWLEDGE_RETENTION_MS + 1.0);
    assert!(engine.knowledge().is_empty());
}

#[test]
fn test_snapshot_serializes_to_json() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(SimCommand::Start);
    let snap = engine.tick(TICK_MS);
    let json = serde_json::to_string(&snap).unwrap();
    let back: SimSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back.phase, SimPhase::Running);
    assert_eq!(back.drones.len(), snap.drones.len());
    assert_eq!(back.enemies.len(), snap.enemies.len());
    assert_eq!(back.obstacles.len(), snap.obstacles.len());
}
