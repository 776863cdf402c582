//! Snapshot system: queries the ECS world and builds a complete `SimSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use dronewar_core::components::*;
use dronewar_core::enums::SimPhase;
use dronewar_core::events::SimEvent;
use dronewar_core::state::*;
use dronewar_core::types::{Heading, Position, SimTime};

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: SimPhase,
    obstacles: &[Obstacle],
    known_enemy_count: usize,
    events: Vec<SimEvent>,
    outcome: OutcomeView,
) -> SimSnapshot {
    SimSnapshot {
        time: *time,
        phase,
        drones: build_drones(world),
        enemies: build_enemies(world),
        obstacles: obstacles.to_vec(),
        known_enemy_count: known_enemy_count as u32,
        events,
        outcome,
    }
}

fn build_drones(world: &World) -> Vec<DroneView> {
    let mut drones: Vec<DroneView> = world
        .query::<(&Drone, &Position, &Heading, &Vitals, &Armament)>()
        .iter()
        .map(|(_, (drone, pos, heading, vitals, armament))| DroneView {
            id: drone.id,
            position: pos.0,
            orientation: heading.0,
            alive: vitals.alive,
            health: vitals.health,
            missile_loaded: armament.missile_loaded,
        })
        .collect();
    drones.sort_by_key(|d| d.id);
    drones
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<EnemyView> = world
        .query::<(&Sentry, &Position, &Tactics, &Gunnery)>()
        .iter()
        .map(|(_, (sentry, pos, tactics, gunnery))| EnemyView {
            id: sentry.id,
            position: pos.0,
            visible: tactics.is_detected(),
            destroyed: tactics.state.is_destroyed(),
            state: tactics.state,
            threat_level: tactics.threat_level,
            aim: gunnery.aim,
        })
        .collect();
    enemies.sort_by_key(|e| e.id);
    enemies
}
