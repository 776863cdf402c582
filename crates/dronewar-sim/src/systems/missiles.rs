//! Missile resolution.
//!
//! Each drone carries one missile. A shot with clear line of sight destroys
//! the sentry outright; a blocked shot ends at the obstacle it hit. Either
//! way the missile is spent.

use glam::DVec3;
use hecs::World;
use tracing::{debug, info};

use dronewar_core::components::{Armament, Drone, Gunnery, Obstacle, Sentry, Tactics, Vitals};
use dronewar_core::enums::TacticalState;
use dronewar_core::events::SimEvent;
use dronewar_core::types::{Position, Velocity};
use dronewar_geometry::{first_obstacle_hit, line_of_sight};

/// A launch order: explicit from a command, or chosen by auto-fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissileRequest {
    pub drone_id: u32,
    pub enemy_id: u32,
}

/// How a launch turned out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissileOutcome {
    /// The sentry was destroyed.
    Hit,
    /// Line of sight was blocked; the missile ended at this point.
    Blocked(DVec3),
}

/// For every armed living drone, the nearest detected live sentry it has a
/// clear shot at.
pub fn auto_fire_requests(
    world: &World,
    obstacles: &[Obstacle],
    detection_range: f64,
) -> Vec<MissileRequest> {
    let sentries: Vec<(u32, DVec3)> = live_sentries(world);
    let mut requests = Vec::new();

    let mut query = world.query::<(&Drone, &Position, &Vitals, &Armament)>();
    for (_entity, (drone, pos, vitals, armament)) in query.iter() {
        if !vitals.alive || !armament.missile_loaded {
            continue;
        }
        let nearest = sentries
            .iter()
            .filter(|(_, p)| pos.distance(*p) <= detection_range)
            .filter(|(_, p)| line_of_sight(pos.0, *p, obstacles))
            .min_by(|a, b| pos.distance(a.1).total_cmp(&pos.distance(b.1)));
        if let Some(&(enemy_id, _)) = nearest {
            requests.push(MissileRequest {
                drone_id: drone.id,
                enemy_id,
            });
        }
    }
    requests.sort_by_key(|r| r.drone_id);
    requests
}

fn live_sentries(world: &World) -> Vec<(u32, DVec3)> {
    let mut sentries: Vec<(u32, DVec3)> = world
        .query::<(&Sentry, &Position, &Tactics)>()
        .iter()
        .filter(|(_, (_, _, tactics))| !tactics.state.is_destroyed())
        .map(|(_, (sentry, pos, _))| (sentry.id, pos.0))
        .collect();
    sentries.sort_by_key(|(id, _)| *id);
    sentries
}

/// Launch one missile. Returns `None` if the launch is not possible: the
/// drone is dead or unarmed, or the sentry is destroyed or not detected.
pub fn resolve(
    world: &mut World,
    obstacles: &[Obstacle],
    request: MissileRequest,
    detection_range: f64,
    events: &mut Vec<SimEvent>,
) -> Option<MissileOutcome> {
    let enemy_position = live_sentries(world)
        .into_iter()
        .find(|(id, _)| *id == request.enemy_id)
        .map(|(_, p)| p)?;

    let launch = world
        .query_mut::<(&Drone, &Position, &Vitals, &mut Armament)>()
        .into_iter()
        .find(|(_, (drone, _, _, _))| drone.id == request.drone_id)
        .and_then(|(_, (_, pos, vitals, armament))| {
            let ready = vitals.alive
                && armament.missile_loaded
                && pos.distance(enemy_position) <= detection_range;
            if ready {
                armament.missile_loaded = false;
            }
            ready.then_some(pos.0)
        });
    let Some(start) = launch else {
        debug!(
            drone = request.drone_id,
            enemy = request.enemy_id,
            "missile launch refused"
        );
        return None;
    };

    let outcome = match first_obstacle_hit(start, enemy_position, obstacles) {
        Some(blocked_at) => MissileOutcome::Blocked(blocked_at),
        None => MissileOutcome::Hit,
    };
    let end = match outcome {
        MissileOutcome::Hit => enemy_position,
        MissileOutcome::Blocked(p) => p,
    };

    events.push(SimEvent::MissileFired {
        drone_id: request.drone_id,
        enemy_id: request.enemy_id,
        start,
        end,
        hit: outcome == MissileOutcome::Hit,
    });
    events.push(SimEvent::Explosion { position: end });

    if outcome == MissileOutcome::Hit {
        destroy_sentry(world, request.enemy_id);
        events.push(SimEvent::EnemyDestroyed {
            enemy_id: request.enemy_id,
        });
        info!(
            drone = request.drone_id,
            enemy = request.enemy_id,
            "missile hit; sentry destroyed"
        );
    } else {
        info!(
            drone = request.drone_id,
            enemy = request.enemy_id,
            "missile blocked by obstacle"
        );
    }
    Some(outcome)
}

/// Move a sentry into the absorbing destroyed state.
fn destroy_sentry(world: &mut World, enemy_id: u32) {
    for (_entity, (sentry, vel, tactics, gunnery)) in
        world.query_mut::<(&Sentry, &mut Velocity, &mut Tactics, &mut Gunnery)>()
    {
        if sentry.id != enemy_id {
            continue;
        }
        tactics.state = TacticalState::Destroyed;
        tactics.detected_by.clear();
        tactics.target_drone = None;
        tactics.preferred_obstacle = None;
        gunnery.can_shoot = false;
        vel.0 = DVec3::ZERO;
    }
}
