//! Value events emitted by the simulation for presentation effects and
//! win/loss reporting. The core never renders anything.

use glam::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A drone struck an obstacle.
    CollisionBurst { drone_id: u32, position: DVec3 },
    /// A drone took damage.
    DamageFlash { drone_id: u32, amount: f64 },
    /// A sentry fired. `hit_obstacle` is true when the shot was blocked and
    /// `end` is the obstacle intersection point.
    LaserFired {
        enemy_id: u32,
        start: DVec3,
        end: DVec3,
        hit_obstacle: bool,
    },
    /// A drone launched its missile. `end` is the impact point.
    MissileFired {
        drone_id: u32,
        enemy_id: u32,
        start: DVec3,
        end: DVec3,
        hit: bool,
    },
    Explosion { position: DVec3 },
    DroneDestroyed { drone_id: u32 },
    EnemyDestroyed { enemy_id: u32 },
    /// Every sentry destroyed. Emitted once per run.
    AllEnemiesNeutralized,
    /// Every drone destroyed. Emitted once per run.
    AllDronesLost,
    /// No living drone has a missile left. Emitted once per run.
    AllDronesOutOfAmmo,
}
