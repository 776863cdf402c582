//! Commands sent from the host to the simulation.
//!
//! Commands are queued and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    // --- Run control ---
    /// Begin advancing from the idle state.
    Start,
    Pause,
    Resume,
    /// Discard every agent and the knowledge store, then respawn.
    Reset,

    // --- Structural edits (force a reset) ---
    SetMapSize { size: f64 },
    SetDroneCount { count: u32 },
    SetEnemyCount { count: u32 },
    SetObstacleCount { count: u32 },
    SetDroneAltitude { altitude: f64 },

    // --- Live edits ---
    SetDetectionRange { range: f64 },
    SetBehaviorWeights {
        cohesion: f64,
        separation: f64,
        avoidance: f64,
        search: f64,
    },
    SetShootingEnabled { enabled: bool },

    // --- Combat ---
    /// Launch a drone's missile at a sentry it currently detects.
    FireMissile { drone_id: u32, enemy_id: u32 },
}

impl SimCommand {
    /// Whether applying this command rebuilds the world.
    pub fn forces_reset(&self) -> bool {
        matches!(
            self,
            SimCommand::Reset
                | SimCommand::SetMapSize { .. }
                | SimCommand::SetDroneCount { .. }
                | SimCommand::SetEnemyCount { .. }
                | SimCommand::SetObstacleCount { .. }
                | SimCommand::SetDroneAltitude { .. }
        )
    }
}
