//! Sentry movement execution and weapon readiness.

use glam::DVec3;
use rand::Rng;

use dronewar_core::components::{Gunnery, Obstacle};
use dronewar_core::constants::*;
use dronewar_core::enums::TacticalState;
use dronewar_core::types::flatten;
use dronewar_geometry::{horizontal_direction_or_random, overlaps_footprint, push_out_horizontal};

use crate::hiding::{is_standable, settle_on_ground};

/// Cruise speed for a tactical state.
pub fn state_speed(state: TacticalState, max_speed: f64) -> f64 {
    match state {
        TacticalState::Patrolling => max_speed * PATROL_SPEED_FACTOR,
        TacticalState::Hiding => max_speed * HIDING_SPEED_FACTOR,
        TacticalState::Pursuing => max_speed,
        TacticalState::Destroyed => 0.0,
    }
}

pub struct MotionInput<'a> {
    pub state: TacticalState,
    pub position: DVec3,
    pub velocity: DVec3,
    pub target: DVec3,
    pub max_speed: f64,
    pub shooting_range: f64,
    pub obstacles: &'a [Obstacle],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentryMotion {
    pub velocity: DVec3,
    /// Within the state's arrival distance of the target.
    pub arrived: bool,
}

/// Horizontal repulsion from nearby obstacle footprints, scaled by inverse
/// proximity.
pub fn avoidance<R: Rng + ?Sized>(position: DVec3, obstacles: &[Obstacle], rng: &mut R) -> DVec3 {
    let mut force = DVec3::ZERO;
    for obstacle in obstacles {
        let min = obstacle.min();
        let max = obstacle.max();
        let nearest = DVec3::new(
            position.x.clamp(min.x, max.x),
            position.y,
            position.z.clamp(min.z, max.z),
        );
        let offset = position - nearest;
        let gap = offset.length() - SENTRY_RADIUS;
        if gap >= SENTRY_AVOIDANCE_MARGIN {
            continue;
        }
        let away = if offset == DVec3::ZERO {
            horizontal_direction_or_random(position - obstacle.center, rng)
        } else {
            horizontal_direction_or_random(offset, rng)
        };
        force += away / gap.max(0.5);
    }
    force
}

/// Compute this tick's velocity toward `target`.
pub fn steer<R: Rng + ?Sized>(input: &MotionInput<'_>, rng: &mut R) -> SentryMotion {
    if input.state.is_destroyed() {
        return SentryMotion {
            velocity: DVec3::ZERO,
            arrived: false,
        };
    }

    let to_target = flatten(input.target - input.position);
    let distance = to_target.length();
    let arrival = match input.state {
        TacticalState::Hiding => HIDING_ARRIVAL_DISTANCE,
        TacticalState::Patrolling => PATROL_ARRIVAL_DISTANCE,
        _ => 0.0,
    };
    let arrived = distance < arrival;

    // Hiding sentries stop dead once in cover.
    if arrived && input.state == TacticalState::Hiding {
        return SentryMotion {
            velocity: DVec3::ZERO,
            arrived,
        };
    }

    let mut speed = state_speed(input.state, input.max_speed);
    if input.state == TacticalState::Pursuing
        && distance < input.shooting_range * PURSUIT_BOOST_RANGE_FRACTION
    {
        speed *= PURSUIT_BOOST;
    }

    let desired = match to_target.try_normalize() {
        Some(dir) if !arrived => dir * speed,
        _ => DVec3::ZERO,
    };
    let avoid = avoidance(input.position, input.obstacles, rng) * speed;

    let velocity = flatten(input.velocity + (desired + avoid - input.velocity) * SENTRY_STEERING_GAIN)
        .clamp_length_max(speed.max(f64::EPSILON));

    SentryMotion { velocity, arrived }
}

/// Advance a sentry one tick along the ground, staying inside the map.
pub fn advance(position: DVec3, velocity: DVec3, half_extent: f64) -> DVec3 {
    let limit = (half_extent - SENTRY_RADIUS).max(0.0);
    let next = position + velocity;
    DVec3::new(
        next.x.clamp(-limit, limit),
        SENTRY_HEIGHT,
        next.z.clamp(-limit, limit),
    )
}

/// Push a sentry out of any obstacle it ended the tick inside, cancelling
/// the velocity component that carried it in. A sentry wedged between boxes
/// that push-out cannot separate is moved to the nearest open ground.
pub fn correct_penetration(
    mut position: DVec3,
    mut velocity: DVec3,
    obstacles: &[Obstacle],
    half_extent: f64,
) -> (DVec3, DVec3) {
    for _ in 0..SENTRY_CORRECTION_PASSES {
        let mut moved = false;
        for obstacle in obstacles {
            if let Some(contact) = push_out_horizontal(position, obstacle, SENTRY_RADIUS) {
                position = contact.position;
                let inward = velocity.dot(contact.normal);
                if inward < 0.0 {
                    velocity -= contact.normal * inward;
                }
                moved = true;
            }
        }
        if !moved {
            return (position, velocity);
        }
    }

    if obstacles
        .iter()
        .any(|o| overlaps_footprint(position, o, SENTRY_RADIUS))
    {
        return (settle_on_ground(position, obstacles, half_extent), DVec3::ZERO);
    }
    (position, velocity)
}

/// Random collision-validated patrol point.
pub fn random_patrol_point<R: Rng + ?Sized>(
    obstacles: &[Obstacle],
    half_extent: f64,
    rng: &mut R,
) -> DVec3 {
    let limit = (half_extent - SENTRY_RADIUS).max(f64::EPSILON);
    let mut candidate = DVec3::new(0.0, SENTRY_HEIGHT, 0.0);
    for _ in 0..SPAWN_MAX_ATTEMPTS {
        candidate = DVec3::new(
            rng.gen_range(-limit..limit),
            SENTRY_HEIGHT,
            rng.gen_range(-limit..limit),
        );
        if is_standable(candidate, obstacles, half_extent) {
            return candidate;
        }
    }
    settle_on_ground(candidate, obstacles, half_extent)
}

/// Whether the weapon has cycled since the last shot.
pub fn can_fire(gunnery: &Gunnery, shooting_enabled: bool, now_ms: f64, shooting_rate_ms: f64) -> bool {
    gunnery.can_shoot
        && shooting_enabled
        && gunnery
            .last_shot_ms
            .map(|t| now_ms - t >= shooting_rate_ms)
            .unwrap_or(true)
}
