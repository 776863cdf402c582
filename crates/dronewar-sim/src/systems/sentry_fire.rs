//! Sentry fire system.
//!
//! A pursuing sentry fires at its target drone when the drone is alive and
//! in range, shooting is enabled, and the weapon has cycled. A blocked shot
//! still fires but stops at the obstacle and deals no damage.

use glam::DVec3;
use hecs::World;
use tracing::info;

use dronewar_core::components::{Drone, Gunnery, Obstacle, Sentry, Tactics, Vitals};
use dronewar_core::config::SimConfig;
use dronewar_core::enums::TacticalState;
use dronewar_core::events::SimEvent;
use dronewar_core::types::Position;

use dronewar_ai::sentry_motion::can_fire;
use dronewar_ai::targeting::revalidate_target;
use dronewar_geometry::first_obstacle_hit;

use super::sentry_ai::drone_sightings;

pub fn run(
    world: &mut World,
    obstacles: &[Obstacle],
    config: &SimConfig,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    let drones = drone_sightings(world);
    // Drones hit this tick, applied after the sentry pass.
    let mut hits: Vec<u32> = Vec::new();

    for (_entity, (sentry, pos, tactics, gunnery)) in
        world.query_mut::<(&Sentry, &Position, &Tactics, &mut Gunnery)>()
    {
        if tactics.state != TacticalState::Pursuing {
            continue;
        }
        let Some(drone_id) = tactics.target_drone else {
            continue;
        };
        let Some(target) = revalidate_target(Some(drone_id), &drones) else {
            continue;
        };
        if pos.distance(target) > config.shooting_range
            || !can_fire(gunnery, config.shooting_enabled, now_ms, config.shooting_rate_ms)
        {
            continue;
        }

        gunnery.last_shot_ms = Some(now_ms);
        let muzzle: DVec3 = pos.0;
        match first_obstacle_hit(muzzle, target, obstacles) {
            Some(blocked_at) => events.push(SimEvent::LaserFired {
                enemy_id: sentry.id,
                start: muzzle,
                end: blocked_at,
                hit_obstacle: true,
            }),
            None => {
                events.push(SimEvent::LaserFired {
                    enemy_id: sentry.id,
                    start: muzzle,
                    end: target,
                    hit_obstacle: false,
                });
                hits.push(drone_id);
            }
        }
    }

    for drone_id in hits {
        for (_entity, (drone, vitals)) in world.query_mut::<(&Drone, &mut Vitals)>() {
            if drone.id != drone_id || !vitals.alive {
                continue;
            }
            let destroyed = vitals.apply_damage(config.shooting_damage);
            events.push(SimEvent::DamageFlash {
                drone_id: drone.id,
                amount: config.shooting_damage,
            });
            if destroyed {
                info!(drone = drone.id, "drone shot down");
                events.push(SimEvent::DroneDestroyed { drone_id: drone.id });
            }
        }
    }
}
