//! Drone steering forces and motion integration.
//!
//! Each tick a drone sums one goal force (pursuit of known enemies, or
//! search), separation from the swarm, obstacle avoidance, and boundary
//! correction into a single acceleration.

use glam::DVec3;
use rand::Rng;

use dronewar_core::components::Obstacle;
use dronewar_core::config::SimConfig;
use dronewar_core::constants::*;
use dronewar_core::types::flatten;
use dronewar_geometry::collision::overlaps_box;
use dronewar_geometry::direction_or_random;

/// Behavior parameters, copied out of the live config each tick.
#[derive(Debug, Clone, Copy)]
pub struct SteeringParams {
    pub cohesion_weight: f64,
    pub separation_weight: f64,
    pub avoidance_weight: f64,
    pub search_weight: f64,
    pub drone_size: f64,
    pub half_extent: f64,
    pub min_altitude: f64,
}

impl SteeringParams {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            cohesion_weight: config.cohesion_weight,
            separation_weight: config.separation_weight,
            avoidance_weight: config.avoidance_weight,
            search_weight: config.search_weight,
            drone_size: config.drone_size,
            half_extent: config.half_extent(),
            min_altitude: config.min_altitude,
        }
    }

    pub fn drone_radius(&self) -> f64 {
        self.drone_size / 2.0
    }

    pub fn separation_radius(&self) -> f64 {
        self.drone_size * SEPARATION_RADIUS_FACTOR * (1.0 + self.separation_weight / 2.0)
    }
}

/// Another living drone, as seen by the one being steered.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub id: u32,
    pub position: DVec3,
}

/// Everything one drone needs to pick its force for this tick.
pub struct SteeringInput<'a> {
    pub id: u32,
    pub position: DVec3,
    /// Nearest known enemy position, if any.
    pub target: Option<DVec3>,
    /// Whether `target` is in direct line of sight.
    pub target_visible: bool,
    /// Unit direction from the search pattern generator.
    pub search_direction: DVec3,
    pub neighbors: &'a [Neighbor],
    pub obstacles: &'a [Obstacle],
}

/// Attraction toward a known enemy. Attenuated when an obstacle is in the way.
pub fn pursuit_force<R: Rng + ?Sized>(
    position: DVec3,
    target: DVec3,
    target_visible: bool,
    params: &SteeringParams,
    rng: &mut R,
) -> DVec3 {
    let scale = if target_visible {
        BASE_STEERING_FORCE
    } else {
        BASE_STEERING_FORCE * BLOCKED_SEEK_FACTOR
    };
    direction_or_random(target - position, rng) * params.cohesion_weight * scale
}

pub fn search_force(direction: DVec3, params: &SteeringParams) -> DVec3 {
    direction * params.search_weight * BASE_STEERING_FORCE
}

/// Repulsion from every other drone inside the separation radius. Summed, not averaged.
pub fn separation_force<R: Rng + ?Sized>(
    id: u32,
    position: DVec3,
    neighbors: &[Neighbor],
    params: &SteeringParams,
    rng: &mut R,
) -> DVec3 {
    let radius = params.separation_radius();
    let mut force = DVec3::ZERO;
    for neighbor in neighbors.iter().filter(|n| n.id != id) {
        let offset = position - neighbor.position;
        let distance = offset.length();
        if distance >= radius {
            continue;
        }
        let away = direction_or_random(offset, rng);
        let strength = params.separation_weight / distance.max(SEPARATION_MIN_DISTANCE);
        force += away * strength * BASE_STEERING_FORCE;
    }
    force
}

/// True if the drone body currently overlaps any obstacle box.
///
/// This is the box-exact form of the `box_collision` footprint test: it also
/// catches box corners outside the footprint circle and ignores drones above
/// the roof. It is the same overlap the collision response pushes out of, so
/// avoidance is skipped exactly on the ticks push-out takes over.
pub fn in_hard_collision(position: DVec3, obstacles: &[Obstacle], radius: f64) -> bool {
    obstacles
        .iter()
        .any(|obstacle| overlaps_box(position, obstacle, radius))
}

/// Horizontal repulsion from obstacles inside the avoidance margin.
///
/// `routing_around` boosts the weight when the drone has a target it cannot
/// see and has to find a way past the obstacle.
pub fn avoidance_force(
    position: DVec3,
    obstacles: &[Obstacle],
    params: &SteeringParams,
    routing_around: bool,
) -> DVec3 {
    let weight = if routing_around {
        (params.avoidance_weight * ROUTING_AVOIDANCE_BOOST).max(ROUTING_AVOIDANCE_FLOOR)
    } else {
        params.avoidance_weight
    };
    let radius = params.drone_radius();

    let mut force = DVec3::ZERO;
    for obstacle in obstacles {
        // Well above the roof: nothing to avoid.
        if position.y > obstacle.top() + DRONE_AVOIDANCE_MARGIN {
            continue;
        }
        let away = flatten(position - obstacle.center);
        let distance = away.length();
        let body = obstacle.footprint_radius() + radius;
        if distance >= body + DRONE_AVOIDANCE_MARGIN {
            continue;
        }
        let Some(direction) = away.try_normalize() else {
            continue;
        };
        let gap = (distance - body).max(AVOIDANCE_MIN_GAP);
        force += direction * weight * BASE_STEERING_FORCE / gap;
    }
    force
}

/// Constant correction back inside the map. Altitude has double priority.
pub fn boundary_force(position: DVec3, params: &SteeringParams) -> DVec3 {
    let half = params.half_extent;
    let mut force = DVec3::ZERO;

    if position.x > half {
        force.x -= BOUNDARY_FORCE;
    } else if position.x < -half {
        force.x += BOUNDARY_FORCE;
    }
    if position.z > half {
        force.z -= BOUNDARY_FORCE;
    } else if position.z < -half {
        force.z += BOUNDARY_FORCE;
    }
    if position.y > half {
        force.y -= BOUNDARY_FORCE;
    } else if position.y < params.min_altitude {
        force.y += BOUNDARY_FORCE * 2.0;
    }

    force
}

/// The single combined steering force for one drone this tick.
pub fn combined_force<R: Rng + ?Sized>(
    input: &SteeringInput<'_>,
    params: &SteeringParams,
    rng: &mut R,
) -> DVec3 {
    let mut force = match input.target {
        Some(target) => pursuit_force(input.position, target, input.target_visible, params, rng),
        None => search_force(input.search_direction, params),
    };

    force += separation_force(input.id, input.position, input.neighbors, params, rng);

    // Overlapping geometry is handled by collision response; adding
    // avoidance on top would fight the push-out.
    if !in_hard_collision(input.position, input.obstacles, params.drone_radius()) {
        let routing_around = input.target.is_some() && !input.target_visible;
        force += avoidance_force(input.position, input.obstacles, params, routing_around);
    }

    force += boundary_force(input.position, params);
    force
}

/// Integrate one tick with unit mass. Returns `(position, velocity)`.
/// The returned velocity never exceeds `max_speed`.
pub fn integrate(
    position: DVec3,
    velocity: DVec3,
    acceleration: DVec3,
    max_speed: f64,
) -> (DVec3, DVec3) {
    let velocity = (velocity + acceleration).clamp_length_max(max_speed);
    (position + velocity, velocity)
}

/// Face the velocity when moving, otherwise keep the current heading.
pub fn facing(velocity: DVec3, current: DVec3) -> DVec3 {
    if velocity.length() > HEADING_EPSILON {
        velocity.normalize()
    } else {
        current
    }
}

/// Passive fall of a destroyed drone. Returns `(position, velocity)`.
pub fn wreck_drift(position: DVec3, velocity: DVec3, max_speed: f64) -> (DVec3, DVec3) {
    let mut velocity = DVec3::new(
        velocity.x * WRECK_DAMPING,
        velocity.y - WRECK_GRAVITY,
        velocity.z * WRECK_DAMPING,
    )
    .clamp_length_max(max_speed);

    let mut position = position + velocity;
    if position.y <= 0.0 {
        position.y = 0.0;
        velocity = DVec3::ZERO;
    }
    (position, velocity)
}
