//! Sentry AI system: awareness every tick, tactical evaluation on each
//! sentry's own cadence, then movement and penetration correction.
//!
//! Calls the state machine in `dronewar-ai` and writes the result back into
//! the sentry's components.

use glam::DVec3;
use hecs::World;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use dronewar_core::components::{Drone, Gunnery, Obstacle, Sentry, Tactics, Vitals};
use dronewar_core::config::SimConfig;
use dronewar_core::enums::TacticalState;
use dronewar_core::types::{Position, Velocity};

use dronewar_ai::hiding::choose_hiding_spot;
use dronewar_ai::sentry::{evaluate, evaluation_due, update_awareness, SentryContext, TacticalDecision};
use dronewar_ai::sentry_motion::{advance, correct_penetration, random_patrol_point, steer, MotionInput};
use dronewar_ai::targeting::{most_vulnerable, revalidate_target, DroneSighting};

use super::detection::DetectionMap;

/// Every drone as a sentry sees it, sorted by id.
pub fn drone_sightings(world: &World) -> Vec<DroneSighting> {
    let mut sightings: Vec<DroneSighting> = world
        .query::<(&Drone, &Position, &Vitals)>()
        .iter()
        .map(|(_, (drone, pos, vitals))| DroneSighting {
            id: drone.id,
            position: pos.0,
            alive: vitals.alive,
            damage_fraction: vitals.damage_fraction(),
        })
        .collect();
    sightings.sort_by_key(|s| s.id);
    sightings
}

pub fn run(
    world: &mut World,
    obstacles: &[Obstacle],
    config: &SimConfig,
    detections: &DetectionMap,
    rng: &mut ChaCha8Rng,
    now_ms: f64,
) {
    let drones = drone_sightings(world);
    let half = config.half_extent();

    for (_entity, (sentry, pos, vel, tactics, gunnery)) in world.query_mut::<(
        &Sentry,
        &mut Position,
        &mut Velocity,
        &mut Tactics,
        &mut Gunnery,
    )>() {
        if tactics.state.is_destroyed() {
            continue;
        }

        let detection = detections.get(&sentry.id).cloned().unwrap_or_default();
        update_awareness(tactics, detection.drones, detection.centroid, now_ms);

        if evaluation_due(tactics, now_ms) {
            let vulnerable = if tactics.is_detected() {
                most_vulnerable(
                    pos.0,
                    &drones,
                    config.shooting_range,
                    config.communication_range,
                )
            } else {
                None
            };
            let ctx = SentryContext {
                state: tactics.state,
                threat_level: tactics.threat_level,
                detector_count: tactics.detected_by.len(),
                last_detection_ms: tactics.last_detection_ms,
                now_ms,
                vulnerable_target: vulnerable,
            };
            let update = evaluate(&ctx);
            tactics.threat_level = update.threat_level;
            tactics.last_evaluation_ms = now_ms;
            apply_decision(sentry.id, pos.0, tactics, update.decision, obstacles, half, rng);
            if update.state_changed {
                debug!(
                    sentry = sentry.id,
                    from = ?ctx.state,
                    to = ?update.new_state,
                    threat = update.threat_level,
                    "sentry state change"
                );
            }
        }

        // The target drone is a weak reference; resolve it fresh every tick.
        if tactics.state == TacticalState::Pursuing {
            match revalidate_target(tactics.target_drone, &drones) {
                Some(target) => tactics.target_position = target,
                None => retarget(sentry.id, pos.0, tactics, &drones, config, obstacles, rng),
            }
        }

        gunnery.aim = match revalidate_target(tactics.target_drone, &drones) {
            Some(target) if tactics.state == TacticalState::Pursuing => {
                (target - pos.0).try_normalize().unwrap_or(gunnery.aim)
            }
            _ => vel.0.try_normalize().unwrap_or(gunnery.aim),
        };

        let motion = steer(
            &MotionInput {
                state: tactics.state,
                position: pos.0,
                velocity: vel.0,
                target: tactics.target_position,
                max_speed: sentry.max_speed,
                shooting_range: config.shooting_range,
                obstacles,
            },
            rng,
        );
        let moved = advance(pos.0, motion.velocity, half);
        let (corrected, velocity) = correct_penetration(moved, motion.velocity, obstacles, half);
        pos.0 = corrected;
        vel.0 = velocity;

        if motion.arrived && tactics.state == TacticalState::Patrolling {
            tactics.target_position = random_patrol_point(obstacles, half, rng);
        }
    }
}

fn apply_decision(
    id: u32,
    position: DVec3,
    tactics: &mut Tactics,
    decision: TacticalDecision,
    obstacles: &[Obstacle],
    half_extent: f64,
    rng: &mut ChaCha8Rng,
) {
    tactics.state = decision.resulting_state(tactics.state);
    match decision {
        TacticalDecision::Hold => {}
        TacticalDecision::Patrol => {
            tactics.target_drone = None;
            tactics.preferred_obstacle = None;
            tactics.target_position = random_patrol_point(obstacles, half_extent, rng);
        }
        TacticalDecision::Hide => {
            tactics.target_drone = None;
            // No recorded origin means nothing has seen us; hide from where we stand.
            let origin = tactics.last_threat_origin.unwrap_or(position);
            let spot = choose_hiding_spot(position, origin, obstacles, half_extent, rng);
            tactics.target_position = spot.position;
            tactics.preferred_obstacle = spot.obstacle;
            debug!(sentry = id, obstacle = ?spot.obstacle, "hiding spot chosen");
        }
        TacticalDecision::Pursue(drone_id) => {
            tactics.target_drone = Some(drone_id);
            tactics.preferred_obstacle = None;
        }
    }
}

/// The pursued drone is gone. Pick another one, or resume patrol.
fn retarget(
    id: u32,
    position: DVec3,
    tactics: &mut Tactics,
    drones: &[DroneSighting],
    config: &SimConfig,
    obstacles: &[Obstacle],
    rng: &mut ChaCha8Rng,
) {
    let next = most_vulnerable(
        position,
        drones,
        config.shooting_range,
        config.communication_range,
    );
    match next.and_then(|drone_id| revalidate_target(Some(drone_id), drones).map(|p| (drone_id, p))) {
        Some((drone_id, target)) => {
            debug!(sentry = id, drone = drone_id, "pursuit target replaced");
            tactics.target_drone = Some(drone_id);
            tactics.target_position = target;
        }
        None => {
            debug!(sentry = id, "pursuit target lost; resuming patrol");
            tactics.state = TacticalState::Patrolling;
            tactics.target_drone = None;
            tactics.target_position = random_patrol_point(obstacles, config.half_extent(), rng);
        }
    }
}
