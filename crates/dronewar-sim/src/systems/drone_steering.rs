//! Drone steering system: pick a goal, sum forces, integrate motion.
//!
//! Runs after the broadcast so every drone acts on this tick's knowledge.
//! Dead drones only drift down.

use glam::DVec3;
use hecs::World;
use rand_chacha::ChaCha8Rng;

use dronewar_core::components::{Drone, DroneMind, Obstacle, Vitals};
use dronewar_core::config::SimConfig;
use dronewar_core::types::{Acceleration, Heading, Position, Velocity};

use dronewar_ai::search::{
    formation_due, legacy_direction, recon_direction, refreshed_anchor, ReconParams,
};
use dronewar_ai::steering::{
    combined_force, facing, integrate, wreck_drift, Neighbor, SteeringInput, SteeringParams,
};
use dronewar_geometry::line_of_sight;

pub fn run(
    world: &mut World,
    obstacles: &[Obstacle],
    config: &SimConfig,
    rng: &mut ChaCha8Rng,
    now_ms: f64,
) {
    let params = SteeringParams::from_config(config);
    let recon = ReconParams::from_config(config);

    let neighbors: Vec<Neighbor> = world
        .query::<(&Drone, &Position, &Vitals)>()
        .iter()
        .filter(|(_, (_, _, vitals))| vitals.alive)
        .map(|(_, (drone, pos, _))| Neighbor {
            id: drone.id,
            position: pos.0,
        })
        .collect();

    for (_entity, (drone, pos, vel, acc, heading, vitals, mind)) in world.query_mut::<(
        &Drone,
        &mut Position,
        &mut Velocity,
        &mut Acceleration,
        &mut Heading,
        &Vitals,
        &mut DroneMind,
    )>() {
        if !vitals.alive {
            let (p, v) = wreck_drift(pos.0, vel.0, drone.max_speed);
            pos.0 = p;
            vel.0 = v;
            acc.0 = DVec3::ZERO;
            continue;
        }

        let target = nearest_known(pos.0, mind);
        let target_visible = target
            .map(|t| line_of_sight(pos.0, t, obstacles))
            .unwrap_or(false);

        let search_direction = match target {
            Some(_) => DVec3::ZERO,
            None => search_direction(drone.id, pos.0, mind, &recon, config, rng, now_ms),
        };

        let input = SteeringInput {
            id: drone.id,
            position: pos.0,
            target,
            target_visible,
            search_direction,
            neighbors: &neighbors,
            obstacles,
        };
        acc.0 += combined_force(&input, &params, rng);

        let (p, v) = integrate(pos.0, vel.0, acc.0, drone.max_speed);
        pos.0 = p;
        vel.0 = v;
        acc.0 = DVec3::ZERO;
        heading.0 = facing(v, heading.0);
    }
}

/// Nearest locally known enemy position.
fn nearest_known(position: DVec3, mind: &DroneMind) -> Option<DVec3> {
    mind.known_enemies
        .values()
        .map(|known| known.position)
        .min_by(|a, b| position.distance(*a).total_cmp(&position.distance(*b)))
}

fn search_direction(
    id: u32,
    position: DVec3,
    mind: &mut DroneMind,
    recon: &ReconParams,
    config: &SimConfig,
    rng: &mut ChaCha8Rng,
    now_ms: f64,
) -> DVec3 {
    if !config.recon_formation {
        return legacy_direction(
            mind.pattern,
            id,
            position,
            now_ms,
            &mut mind.waypoint,
            recon,
            rng,
        );
    }

    if formation_due(
        mind.formation_updated_ms,
        now_ms,
        position,
        mind.formation_target,
        recon,
    ) {
        mind.formation_target = refreshed_anchor(id, mind.quadrant, recon, rng);
        mind.formation_updated_ms = Some(now_ms);
    }
    recon_direction(
        position,
        mind.formation_target,
        mind.search_phase,
        now_ms,
        recon,
        rng,
    )
}
