//! Drone-obstacle collision response.
//!
//! A drone overlapping a box is pushed out through the nearest surface,
//! bounces at half speed, and takes speed-scaled damage unless it was hit
//! within the cooldown window. Overlapping boxes can trade a drone back and
//! forth; if it is still inside one after a few passes it is lifted over
//! the top.

use glam::DVec3;
use hecs::World;
use tracing::{debug, info};

use dronewar_core::components::{Drone, DroneMind, Obstacle, Vitals};
use dronewar_core::config::SimConfig;
use dronewar_core::constants::*;
use dronewar_core::events::SimEvent;
use dronewar_core::types::{Position, Velocity};
use dronewar_geometry::{overlaps_box, push_out};

/// Damage for an impact at `speed`, relative to nominal drone speed.
pub fn collision_damage(config: &SimConfig, speed: f64) -> f64 {
    let ratio = if config.drone_max_speed > 0.0 {
        speed / config.drone_max_speed
    } else {
        COLLISION_SPEED_CAP
    };
    config.collision_damage * ratio.clamp(COLLISION_SPEED_FLOOR, COLLISION_SPEED_CAP)
}

pub fn run(
    world: &mut World,
    obstacles: &[Obstacle],
    config: &SimConfig,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    let radius = config.drone_size / 2.0;

    for (_entity, (drone, pos, vel, vitals, mind)) in world.query_mut::<(
        &Drone,
        &mut Position,
        &mut Velocity,
        &mut Vitals,
        &mut DroneMind,
    )>() {
        if !vitals.alive {
            continue;
        }

        let impact_speed = vel.length();
        let Some((position, velocity)) = resolve_contacts(pos.0, vel.0, obstacles, radius) else {
            continue;
        };
        pos.0 = position;
        vel.0 = velocity;

        events.push(SimEvent::CollisionBurst {
            drone_id: drone.id,
            position: pos.0,
        });

        let cooled_down = mind
            .last_collision_ms
            .map(|t| now_ms - t >= config.collision_cooldown_ms)
            .unwrap_or(true);
        if !cooled_down {
            continue;
        }

        let amount = collision_damage(config, impact_speed);
        mind.last_collision_ms = Some(now_ms);
        let destroyed = vitals.apply_damage(amount);
        events.push(SimEvent::DamageFlash {
            drone_id: drone.id,
            amount,
        });
        if destroyed {
            info!(drone = drone.id, "drone destroyed by collision");
            events.push(SimEvent::DroneDestroyed { drone_id: drone.id });
        }
    }
}

/// Push a drone clear of every obstacle, bouncing off each contact.
///
/// Returns `None` if the drone touched nothing.
pub fn resolve_contacts(
    mut position: DVec3,
    mut velocity: DVec3,
    obstacles: &[Obstacle],
    radius: f64,
) -> Option<(DVec3, DVec3)> {
    let mut collided = false;
    for _ in 0..DRONE_PUSH_OUT_PASSES {
        let mut moved = false;
        for obstacle in obstacles {
            let Some(contact) = push_out(position, obstacle, radius) else {
                continue;
            };
            position = contact.position;
            let into = velocity.dot(contact.normal);
            if into < 0.0 {
                velocity -= contact.normal * (2.0 * into);
            }
            velocity *= COLLISION_RESTITUTION;
            moved = true;
        }
        if !moved {
            return collided.then_some((position, velocity));
        }
        collided = true;
    }

    // Each lift clears one box for good since altitude only grows, so this
    // ends after at most one lift per obstacle.
    let mut lifted = false;
    while let Some(obstacle) = obstacles.iter().find(|o| overlaps_box(position, o, radius)) {
        position.y = obstacle.max().y + radius + COLLISION_SEPARATION;
        lifted = true;
    }
    if lifted {
        debug!(x = position.x, y = position.y, z = position.z, "drone lifted out of overlapping obstacles");
        velocity.y = velocity.y.max(0.0);
    }
    Some((position, velocity))
}
