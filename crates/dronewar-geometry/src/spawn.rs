//! Best-effort spawn placement.

use glam::DVec3;
use tracing::warn;

use dronewar_core::components::Obstacle;
use dronewar_core::constants::SPAWN_VERTICAL_CLEARANCE;

use crate::collision::box_collision;

/// What a spawn position must be clear of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnClearance {
    /// Ground agent: footprint must not overlap any obstacle.
    Ground { radius: f64 },
    /// Airborne agent: may sit above an obstacle, but not inside or just on top of it.
    Air { radius: f64 },
}

/// Outcome of a placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnPlacement {
    /// A candidate cleared every obstacle.
    Clear(DVec3),
    /// The attempt budget ran out; this is the last candidate tried.
    Degraded(DVec3),
}

impl SpawnPlacement {
    pub fn position(&self) -> DVec3 {
        match *self {
            SpawnPlacement::Clear(p) | SpawnPlacement::Degraded(p) => p,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SpawnPlacement::Degraded(_))
    }
}

/// Whether `position` is a valid spawn point. Pure: same inputs, same answer.
pub fn is_spawn_clear(position: DVec3, obstacles: &[Obstacle], clearance: SpawnClearance) -> bool {
    match clearance {
        SpawnClearance::Ground { radius } => obstacles
            .iter()
            .all(|obstacle| !box_collision(position, obstacle, radius)),
        SpawnClearance::Air { radius } => obstacles.iter().all(|obstacle| {
            !box_collision(position, obstacle, radius)
                || position.y > obstacle.top() + radius + SPAWN_VERTICAL_CLEARANCE
        }),
    }
}

/// Sample candidates until one is clear or `max_attempts` is exhausted.
///
/// Exhaustion is not an error: the last candidate is returned as
/// [`SpawnPlacement::Degraded`] and runtime avoidance is left to sort it out.
pub fn find_clear_spawn_position(
    mut generate: impl FnMut() -> DVec3,
    obstacles: &[Obstacle],
    clearance: SpawnClearance,
    max_attempts: u32,
) -> SpawnPlacement {
    let attempts = max_attempts.max(1);
    let mut candidate = generate();
    for attempt in 1..=attempts {
        if is_spawn_clear(candidate, obstacles, clearance) {
            return SpawnPlacement::Clear(candidate);
        }
        if attempt < attempts {
            candidate = generate();
        }
    }

    warn!(
        attempts,
        x = candidate.x,
        y = candidate.y,
        z = candidate.z,
        "No clear spawn position found; using degraded placement"
    );
    SpawnPlacement::Degraded(candidate)
}
