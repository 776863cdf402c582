//! Entity spawn factories for setting up the simulation world.
//!
//! Obstacles are plain data generated once per reset. Drones and sentries
//! are hecs entities placed through the best-effort spawn search.

use std::collections::BTreeMap;

use glam::DVec3;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use dronewar_core::components::*;
use dronewar_core::config::SimConfig;
use dronewar_core::constants::*;
use dronewar_core::enums::SearchPattern;
use dronewar_core::types::{Acceleration, Heading, Position, Velocity};

use dronewar_ai::search::{formation_anchor, quadrant_for, search_phase_for, ReconParams};
use dronewar_ai::sentry::random_evaluation_interval;
use dronewar_ai::sentry_motion::random_patrol_point;
use dronewar_geometry::{find_clear_spawn_position, SpawnClearance};

/// Random grounded boxes scattered over the map.
pub fn generate_obstacles(config: &SimConfig, rng: &mut ChaCha8Rng) -> Vec<Obstacle> {
    let half = config.half_extent();
    (0..config.obstacle_count)
        .map(|_| {
            let width = rng.gen_range(OBSTACLE_MIN_FOOTPRINT..=OBSTACLE_MAX_FOOTPRINT);
            let depth = rng.gen_range(OBSTACLE_MIN_FOOTPRINT..=OBSTACLE_MAX_FOOTPRINT);
            let height = rng.gen_range(OBSTACLE_MIN_HEIGHT..=OBSTACLE_MAX_HEIGHT);
            let reach_x = (half - width / 2.0).max(0.0);
            let reach_z = (half - depth / 2.0).max(0.0);
            let x = if reach_x > 0.0 { rng.gen_range(-reach_x..reach_x) } else { 0.0 };
            let z = if reach_z > 0.0 { rng.gen_range(-reach_z..reach_z) } else { 0.0 };
            Obstacle::grounded(x, z, width, height, depth)
        })
        .collect()
}

/// Spawn one drone at an explicit position.
pub fn spawn_drone(world: &mut World, id: u32, position: DVec3, config: &SimConfig) -> hecs::Entity {
    let recon = ReconParams::from_config(config);
    let quadrant = quadrant_for(id);
    let mind = DroneMind {
        known_enemies: BTreeMap::new(),
        pattern: SearchPattern::for_drone(id),
        quadrant,
        search_phase: search_phase_for(id),
        formation_target: formation_anchor(id, quadrant, &recon),
        formation_updated_ms: None,
        waypoint: None,
        last_collision_ms: None,
    };

    world.spawn((
        Drone {
            id,
            max_speed: config.drone_max_speed,
        },
        Position(position),
        Velocity::default(),
        Acceleration::default(),
        Heading::default(),
        Vitals::new(config.drone_max_health),
        Armament {
            missile_loaded: true,
        },
        mind,
    ))
}

/// Spawn the swarm at cruise altitude, clear of obstacles where possible.
pub fn spawn_drones(world: &mut World, config: &SimConfig, obstacles: &[Obstacle], rng: &mut ChaCha8Rng) {
    let reach = config.half_extent() * 0.9;
    let altitude = config.drone_altitude.max(config.min_altitude);
    let clearance = SpawnClearance::Air {
        radius: config.drone_size / 2.0,
    };

    for id in 0..config.drone_count {
        let placement = find_clear_spawn_position(
            || {
                DVec3::new(
                    rng.gen_range(-reach..=reach),
                    altitude,
                    rng.gen_range(-reach..=reach),
                )
            },
            obstacles,
            clearance,
            SPAWN_MAX_ATTEMPTS,
        );
        let mut position = placement.position();
        if placement.is_degraded() {
            position.y += DEGRADED_SPAWN_LIFT;
            warn!(drone = id, altitude = position.y, "drone spawned above obstacles");
        }
        spawn_drone(world, id, position, config);
    }
    debug!(count = config.drone_count, "drones spawned");
}

/// Spawn one sentry at an explicit ground position.
pub fn spawn_sentry(
    world: &mut World,
    id: u32,
    position: DVec3,
    max_speed: f64,
    patrol_point: DVec3,
    evaluation_interval_ms: f64,
    now_ms: f64,
) -> hecs::Entity {
    world.spawn((
        Sentry { id, max_speed },
        Position(position.with_y(SENTRY_HEIGHT)),
        Velocity::default(),
        Tactics::new(now_ms, evaluation_interval_ms, patrol_point),
        Gunnery {
            can_shoot: true,
            last_shot_ms: None,
            aim: DVec3::Z,
        },
    ))
}

/// Spawn the sentries on open ground with randomized speeds and cadences.
pub fn spawn_sentries(
    world: &mut World,
    config: &SimConfig,
    obstacles: &[Obstacle],
    rng: &mut ChaCha8Rng,
    now_ms: f64,
) {
    let half = config.half_extent();
    let reach = (half - SENTRY_RADIUS).max(0.0);
    let clearance = SpawnClearance::Ground {
        radius: SENTRY_RADIUS,
    };

    for id in 0..config.enemy_count {
        let placement = find_clear_spawn_position(
            || {
                DVec3::new(
                    rng.gen_range(-reach..=reach),
                    SENTRY_HEIGHT,
                    rng.gen_range(-reach..=reach),
                )
            },
            obstacles,
            clearance,
            SPAWN_MAX_ATTEMPTS,
        );
        let speed_band = config.enemy_max_speed - config.enemy_min_speed;
        let max_speed = config.enemy_min_speed + rng.gen::<f64>() * speed_band;
        let interval = random_evaluation_interval(rng);
        let patrol_point = random_patrol_point(obstacles, half, rng);
        spawn_sentry(
            world,
            id,
            placement.position(),
            max_speed,
            patrol_point,
            interval,
            now_ms,
        );
    }
    debug!(count = config.enemy_count, "sentries spawned");
}
