//! Hiding-spot selection.
//!
//! Every obstacle is scored by how well it sits between the sentry and the
//! threat, how close it is, and how big it is. The winner's far side (away
//! from the threat) becomes the hiding position. A position that lands in
//! other geometry is perturbed and retried; if that keeps failing the
//! sentry retreats across open ground instead.

use std::f64::consts::FRAC_PI_4;

use glam::DVec3;
use rand::Rng;
use tracing::warn;

use dronewar_core::components::Obstacle;
use dronewar_core::constants::*;
use dronewar_core::types::horizontal_distance;
use dronewar_geometry::collision::overlaps_footprint;
use dronewar_geometry::direction::random_unit_horizontal;
use dronewar_geometry::{horizontal_direction_or_random, push_out_horizontal};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HidingSpot {
    pub position: DVec3,
    /// Index of the obstacle providing cover, if one was used.
    pub obstacle: Option<usize>,
}

/// Score one obstacle as cover. Higher is better; roughly `0..=1`.
pub fn score_obstacle(
    sentry: DVec3,
    threat_origin: DVec3,
    obstacle: &Obstacle,
    largest_footprint: f64,
) -> f64 {
    let to_obstacle = (obstacle.center - sentry).with_y(0.0);
    let threat_to_obstacle = (obstacle.center - threat_origin).with_y(0.0);

    // Cover between sentry and threat: the two approach vectors oppose.
    let opposition = match (to_obstacle.try_normalize(), threat_to_obstacle.try_normalize()) {
        (Some(a), Some(b)) => (1.0 - a.dot(b)) / 2.0,
        _ => 0.5,
    };

    let distance = horizontal_distance(sentry, obstacle.center) - obstacle.footprint_radius();
    let proximity = 1.0
        / (1.0 + (distance - HIDING_PREFERRED_DISTANCE).abs() / HIDING_PREFERRED_DISTANCE);

    let size = if largest_footprint > 0.0 {
        obstacle.footprint_radius() / largest_footprint
    } else {
        0.0
    };

    HIDING_OPPOSITION_WEIGHT * opposition
        + HIDING_PROXIMITY_WEIGHT * proximity
        + HIDING_SIZE_WEIGHT * size
}

/// True if a sentry standing at `position` would be clear of all geometry
/// and inside the map.
pub fn is_standable(position: DVec3, obstacles: &[Obstacle], half_extent: f64) -> bool {
    let limit = half_extent - SENTRY_RADIUS;
    position.x.abs() <= limit
        && position.z.abs() <= limit
        && !obstacles
            .iter()
            .any(|o| overlaps_footprint(position, o, SENTRY_RADIUS))
}

/// Clamp a ground point into the map and move it out of any geometry.
///
/// Push-out can bounce between two boxes that are closer together than a
/// sentry is wide; if it has not settled after a few passes, search outward
/// in rings for open ground.
pub fn settle_on_ground(position: DVec3, obstacles: &[Obstacle], half_extent: f64) -> DVec3 {
    let limit = (half_extent - SENTRY_RADIUS).max(0.0);
    let clamp = |p: DVec3| DVec3::new(p.x.clamp(-limit, limit), SENTRY_HEIGHT, p.z.clamp(-limit, limit));

    let mut settled = clamp(position);
    for _ in 0..SENTRY_CORRECTION_PASSES {
        let mut moved = false;
        for obstacle in obstacles {
            if let Some(contact) = push_out_horizontal(settled, obstacle, SENTRY_RADIUS) {
                settled = clamp(contact.position);
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
    if is_standable(settled, obstacles, half_extent) {
        return settled;
    }

    let rings = (2.0 * half_extent / SENTRY_RADIUS).ceil() as u32;
    for ring in 1..=rings {
        let radius = ring as f64 * SENTRY_RADIUS;
        for k in 0..8 {
            let angle = k as f64 * FRAC_PI_4;
            let candidate = clamp(settled + DVec3::new(angle.cos(), 0.0, angle.sin()) * radius);
            if is_standable(candidate, obstacles, half_extent) {
                return candidate;
            }
        }
    }

    warn!(x = settled.x, z = settled.z, "no open ground near sentry position");
    settled
}

/// Choose where a sentry should hide from `threat_origin`.
pub fn choose_hiding_spot<R: Rng + ?Sized>(
    sentry: DVec3,
    threat_origin: DVec3,
    obstacles: &[Obstacle],
    half_extent: f64,
    rng: &mut R,
) -> HidingSpot {
    let largest = obstacles
        .iter()
        .map(Obstacle::footprint_radius)
        .fold(0.0, f64::max);

    let mut best: Option<(usize, f64)> = None;
    for (index, obstacle) in obstacles.iter().enumerate() {
        let score = score_obstacle(sentry, threat_origin, obstacle, largest);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }

    if let Some((index, _)) = best {
        let obstacle = &obstacles[index];
        let away = horizontal_direction_or_random(obstacle.center - threat_origin, rng);
        let standoff = obstacle.footprint_radius() + SENTRY_RADIUS + HIDING_CLEARANCE;
        let base = obstacle.center.with_y(SENTRY_HEIGHT) + away * standoff;

        let jitter = DVec3::new(
            rng.gen_range(-HIDING_JITTER..=HIDING_JITTER),
            0.0,
            rng.gen_range(-HIDING_JITTER..=HIDING_JITTER),
        );
        let candidate = base + jitter;
        if is_standable(candidate, obstacles, half_extent) {
            return HidingSpot {
                position: candidate,
                obstacle: Some(index),
            };
        }

        for attempt in 1..=HIDING_RETRY_LIMIT {
            let spread = HIDING_JITTER * 2.0 * attempt as f64;
            let candidate = base + random_unit_horizontal(rng) * rng.gen_range(0.0..=spread);
            if is_standable(candidate, obstacles, half_extent) {
                return HidingSpot {
                    position: candidate,
                    obstacle: Some(index),
                };
            }
        }

        warn!(
            obstacle = index,
            attempts = HIDING_RETRY_LIMIT,
            "no clear hiding position; retreating instead"
        );
    }

    let retreat = horizontal_direction_or_random(sentry - threat_origin, rng);
    let fallback = sentry.with_y(SENTRY_HEIGHT) + retreat * OPEN_GROUND_RETREAT;
    HidingSpot {
        position: settle_on_ground(fallback, obstacles, half_extent),
        obstacle: None,
    }
}
