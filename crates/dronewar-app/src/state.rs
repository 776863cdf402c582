//! State shared between the host thread and the game loop thread.

use serde::Serialize;

use dronewar_core::commands::SimCommand;
use dronewar_core::enums::SimPhase;
use dronewar_core::events::SimEvent;
use dronewar_core::state::{OutcomeView, SimSnapshot};

/// Commands sent from the host to the game loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// A simulation command to forward to the engine.
    Sim(SimCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Running tally of a simulation run, fed one snapshot at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub sim_time_ms: f64,
    pub phase: SimPhase,
    pub drones_total: usize,
    pub drones_alive: usize,
    pub missiles_remaining: usize,
    pub enemies_total: usize,
    pub enemies_destroyed: usize,
    pub known_enemies: u32,
    pub lasers_fired: u32,
    pub lasers_blocked: u32,
    pub missiles_fired: u32,
    pub missile_hits: u32,
    pub collisions: u32,
    pub outcome: OutcomeView,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick's snapshot into the tally.
    pub fn observe(&mut self, snapshot: &SimSnapshot) {
        self.ticks = snapshot.time.tick;
        self.sim_time_ms = snapshot.time.now_ms;
        self.phase = snapshot.phase;
        self.drones_total = snapshot.drones.len();
        self.drones_alive = snapshot.drones.iter().filter(|d| d.alive).count();
        self.missiles_remaining = snapshot
            .drones
            .iter()
            .filter(|d| d.alive && d.missile_loaded)
            .count();
        self.enemies_total = snapshot.enemies.len();
        self.enemies_destroyed = snapshot.enemies.iter().filter(|e| e.destroyed).count();
        self.known_enemies = snapshot.known_enemy_count;
        self.outcome = snapshot.outcome;

        for event in &snapshot.events {
            match event {
                SimEvent::LaserFired { hit_obstacle, .. } => {
                    self.lasers_fired += 1;
                    if *hit_obstacle {
                        self.lasers_blocked += 1;
                    }
                }
                SimEvent::MissileFired { hit, .. } => {
                    self.missiles_fired += 1;
                    if *hit {
                        self.missile_hits += 1;
                    }
                }
                SimEvent::CollisionBurst { .. } => self.collisions += 1,
                _ => {}
            }
        }
    }

    /// Whether any run-ending condition has been reached.
    pub fn finished(&self) -> bool {
        self.outcome.all_enemies_neutralized
            || self.outcome.all_drones_lost
            || self.outcome.all_drones_out_of_ammo
    }
}
