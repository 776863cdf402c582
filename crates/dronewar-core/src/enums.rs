//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Legacy search pattern, permanently assigned by `id mod 4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchPattern {
    #[default]
    Sine,
    Spiral,
    Zigzag,
    Waypoint,
}

impl SearchPattern {
    pub fn for_drone(id: u32) -> Self {
        match id % 4 {
            0 => SearchPattern::Sine,
            1 => SearchPattern::Spiral,
            2 => SearchPattern::Zigzag,
            _ => SearchPattern::Waypoint,
        }
    }
}

/// Sentry tactical state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TacticalState {
    /// Wandering between random ground points.
    #[default]
    Patrolling,
    /// Moving to, or holding, cover behind an obstacle.
    Hiding,
    /// Closing on a drone to shoot it.
    Pursuing,
    /// Killed by a missile. Absorbing.
    Destroyed,
}

impl TacticalState {
    pub fn is_destroyed(self) -> bool {
        matches!(self, TacticalState::Destroyed)
    }
}

/// Run phase of the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Agents spawned, clock not advancing.
    #[default]
    Idle,
    Running,
    Paused,
}
