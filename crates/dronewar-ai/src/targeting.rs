//! Pursuit target selection.

use glam::DVec3;

use dronewar_core::constants::*;

/// What a sentry knows about one drone when choosing a target.
#[derive(Debug, Clone, Copy)]
pub struct DroneSighting {
    pub id: u32,
    pub position: DVec3,
    pub alive: bool,
    pub damage_fraction: f64,
}

/// `3 - min(allies, 3)`, counting other living drones within `ally_radius`.
pub fn isolation_score(candidate: &DroneSighting, drones: &[DroneSighting], ally_radius: f64) -> f64 {
    let allies = drones
        .iter()
        .filter(|d| d.alive && d.id != candidate.id)
        .filter(|d| d.position.distance(candidate.position) <= ally_radius)
        .count();
    (ISOLATION_ALLY_CAP - allies.min(ISOLATION_ALLY_CAP)) as f64
}

pub fn vulnerability_score(candidate: &DroneSighting, drones: &[DroneSighting], ally_radius: f64) -> f64 {
    VULNERABILITY_ISOLATION_WEIGHT * isolation_score(candidate, drones, ally_radius)
        + VULNERABILITY_DAMAGE_WEIGHT * candidate.damage_fraction
}

/// Pick the most vulnerable living drone within twice the shooting range.
///
/// Allies are counted within half the communication range. Ties go to the
/// first drone in `drones` order.
pub fn most_vulnerable(
    sentry_position: DVec3,
    drones: &[DroneSighting],
    shooting_range: f64,
    communication_range: f64,
) -> Option<u32> {
    let reach = shooting_range * 2.0;
    let ally_radius = communication_range / 2.0;

    let mut best: Option<(u32, f64)> = None;
    for drone in drones.iter().filter(|d| d.alive) {
        if drone.position.distance(sentry_position) > reach {
            continue;
        }
        let score = vulnerability_score(drone, drones, ally_radius);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((drone.id, score)),
        }
    }
    best.map(|(id, _)| id)
}

/// Resolve a weak target reference. Returns the drone's current position only
/// if it is still present and alive.
pub fn revalidate_target(target: Option<u32>, drones: &[DroneSighting]) -> Option<DVec3> {
    let id = target?;
    drones
        .iter()
        .find(|d| d.id == id && d.alive)
        .map(|d| d.position)
}
