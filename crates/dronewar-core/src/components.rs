//! ECS components for hecs entities.
//!
//! Components are plain data structs. Decision logic lives in
//! `dronewar-ai`, and the systems in `dronewar-sim` apply it.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Marks an entity as a swarm drone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Drone {
    /// Stable id in `0..drone_count`.
    pub id: u32,
    pub max_speed: f64,
}

/// Drone hull state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f64,
    pub max_health: f64,
    pub alive: bool,
}

impl Vitals {
    pub fn new(max_health: f64) -> Self {
        Self {
            health: max_health,
            max_health,
            alive: true,
        }
    }

    /// Fraction of health lost, in `0..=1`.
    pub fn damage_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 1.0;
        }
        (1.0 - self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Apply damage. Returns true if this hit destroyed the drone.
    /// Dead drones ignore further damage.
    pub fn apply_damage(&mut self, amount: f64) -> bool {
        if !self.alive {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.alive = false;
            return true;
        }
        false
    }
}

/// One-shot missile ammo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Armament {
    pub missile_loaded: bool,
}

/// A locally cached sighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnownEnemy {
    pub position: DVec3,
    pub timestamp_ms: f64,
}

/// Drone cognition: knowledge cache and search bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneMind {
    /// Enemy id to last known sighting.
    pub known_enemies: BTreeMap<u32, KnownEnemy>,
    pub pattern: SearchPattern,
    /// Recon quadrant in `0..4`.
    pub quadrant: u8,
    /// Angular offset of this drone's search orbit (radians).
    pub search_phase: f64,
    /// Current recon anchor point.
    pub formation_target: DVec3,
    /// When the anchor was last recomputed. `None` forces a recompute.
    pub formation_updated_ms: Option<f64>,
    /// Current legacy waypoint, if the waypoint pattern is in use.
    pub waypoint: Option<DVec3>,
    /// Time of the last collision that dealt damage.
    pub last_collision_ms: Option<f64>,
}

/// Marks an entity as a ground sentry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sentry {
    pub id: u32,
    /// Randomized per instance within the configured band.
    pub max_speed: f64,
}

/// Sentry tactical memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tactics {
    pub state: TacticalState,
    pub threat_level: f64,
    /// Drones within detection range, recomputed every tick.
    pub detected_by: BTreeSet<u32>,
    pub last_detection_ms: Option<f64>,
    /// Average detector position at the most recent detection.
    pub last_threat_origin: Option<DVec3>,
    pub last_evaluation_ms: f64,
    /// Randomized re-evaluation cadence for this sentry.
    pub evaluation_interval_ms: f64,
    pub target_position: DVec3,
    /// Weak reference by drone id; revalidated on every use.
    pub target_drone: Option<u32>,
    /// Index into the obstacle list used for the current hiding spot.
    pub preferred_obstacle: Option<usize>,
}

impl Tactics {
    /// Fresh patrolling sentry, first evaluation due `evaluation_interval_ms`
    /// after `now_ms`.
    pub fn new(now_ms: f64, evaluation_interval_ms: f64, patrol_point: DVec3) -> Self {
        Self {
            state: TacticalState::Patrolling,
            threat_level: 0.0,
            detected_by: BTreeSet::new(),
            last_detection_ms: None,
            last_threat_origin: None,
            last_evaluation_ms: now_ms,
            evaluation_interval_ms,
            target_position: patrol_point,
            target_drone: None,
            preferred_obstacle: None,
        }
    }

    pub fn is_detected(&self) -> bool {
        !self.detected_by.is_empty()
    }
}

/// Sentry weapon state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Gunnery {
    pub can_shoot: bool,
    pub last_shot_ms: Option<f64>,
    /// Unit vector toward the current target, for presentation.
    pub aim: DVec3,
}

/// Static axis-aligned box obstacle. Not an ECS entity: the obstacle list is
/// read-only after setup and shared by every query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: DVec3,
    /// Full extents: x = width, y = height, z = depth.
    pub size: DVec3,
}

impl Obstacle {
    pub fn new(center: DVec3, size: DVec3) -> Self {
        Self { center, size }
    }

    /// Box resting on the ground plane with the given footprint center.
    pub fn grounded(x: f64, z: f64, width: f64, height: f64, depth: f64) -> Self {
        Self {
            center: DVec3::new(x, height / 2.0, z),
            size: DVec3::new(width, height, depth),
        }
    }

    pub fn half_extents(&self) -> DVec3 {
        self.size * 0.5
    }

    pub fn min(&self) -> DVec3 {
        self.center - self.half_extents()
    }

    pub fn max(&self) -> DVec3 {
        self.center + self.half_extents()
    }

    /// Horizontal bounding radius used by the circular footprint tests.
    pub fn footprint_radius(&self) -> f64 {
        self.size.x.max(self.size.z) / 2.0
    }

    pub fn top(&self) -> f64 {
        self.max().y
    }
}
