//! Simulation snapshot: the complete visible state handed to the host after each tick.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::components::Obstacle;
use crate::enums::*;
use crate::events::SimEvent;
use crate::types::SimTime;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub phase: SimPhase,
    pub drones: Vec<DroneView>,
    pub enemies: Vec<EnemyView>,
    pub obstacles: Vec<Obstacle>,
    /// Entries currently held in the shared knowledge store.
    pub known_enemy_count: u32,
    pub events: Vec<SimEvent>,
    pub outcome: OutcomeView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneView {
    pub id: u32,
    pub position: DVec3,
    /// Unit facing direction.
    pub orientation: DVec3,
    pub alive: bool,
    pub health: f64,
    pub missile_loaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub position: DVec3,
    /// Currently detected by at least one drone.
    pub visible: bool,
    pub destroyed: bool,
    pub state: TacticalState,
    pub threat_level: f64,
    pub aim: DVec3,
}

/// Which run-ending conditions have been reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeView {
    pub all_enemies_neutralized: bool,
    pub all_drones_lost: bool,
    pub all_drones_out_of_ammo: bool,
}
