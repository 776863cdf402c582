//! Search and recon pattern generation.
//!
//! Each drone gets a quadrant of the map by `id mod 4`, and co-quadrant
//! drones are spread over distinct angular bands at reproducible radii. A
//! drone far from its anchor flies straight back to it; near the anchor it
//! orbits with a little jitter. The legacy sine / spiral / zigzag /
//! waypoint patterns stay available when formations are switched off.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;
use rand::Rng;

use dronewar_core::config::SimConfig;
use dronewar_core::constants::*;
use dronewar_core::enums::SearchPattern;
use dronewar_core::types::flatten;
use dronewar_geometry::direction::random_unit_horizontal;
use dronewar_geometry::direction_or_random;

/// Golden angle, used to stagger orbit phases between drones.
const GOLDEN_ANGLE: f64 = PI * (3.0 - 2.236_067_977_499_79);

#[derive(Debug, Clone, Copy)]
pub struct ReconParams {
    pub map_size: f64,
    pub drone_count: u32,
    pub altitude: f64,
    pub formation_spread: f64,
    pub aggressiveness: f64,
    pub pattern_change_ms: f64,
}

impl ReconParams {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            map_size: config.map_size,
            drone_count: config.drone_count,
            altitude: config.drone_altitude,
            formation_spread: config.recon_formation_spread,
            aggressiveness: config.search_aggressiveness,
            pattern_change_ms: config.recon_pattern_change_ms,
        }
    }

    fn half_extent(&self) -> f64 {
        self.map_size / 2.0
    }
}

pub fn quadrant_for(id: u32) -> u8 {
    (id % 4) as u8
}

/// Per-drone orbit phase offset.
pub fn search_phase_for(id: u32) -> f64 {
    (id as f64 * GOLDEN_ANGLE).rem_euclid(std::f64::consts::TAU)
}

/// Deterministic recon anchor for a drone.
///
/// Angle: the quadrant's base angle plus a sub-quadrant band chosen by
/// `floor(id / 4) mod drones_per_quadrant`. Radius: 30-100% of the quadrant
/// radius, phased by `sin(id * 0.7)`.
pub fn formation_anchor(id: u32, quadrant: u8, params: &ReconParams) -> DVec3 {
    let per_quadrant = params.drone_count.div_ceil(4).max(1);
    let slot = (id / 4) % per_quadrant;
    let band = FRAC_PI_2 / per_quadrant as f64;
    let angle = quadrant as f64 * FRAC_PI_2 + band * (slot as f64 + 0.5);

    let quadrant_radius = params.half_extent() * RECON_QUADRANT_RADIUS_FRACTION;
    let phase = (id as f64 * 0.7).sin() * 0.5 + 0.5;
    let radius = quadrant_radius * (0.3 + 0.7 * phase);

    DVec3::new(angle.cos() * radius, params.altitude, angle.sin() * radius)
}

/// Anchor with a small random horizontal offset, so periodic refreshes move
/// the search area around without leaving the assigned band.
pub fn refreshed_anchor<R: Rng + ?Sized>(
    id: u32,
    quadrant: u8,
    params: &ReconParams,
    rng: &mut R,
) -> DVec3 {
    let anchor = formation_anchor(id, quadrant, params);
    if params.formation_spread <= 0.0 {
        return anchor;
    }
    let offset = random_unit_horizontal(rng) * rng.gen_range(0.0..params.formation_spread);
    anchor + offset
}

/// Whether the anchor should be recomputed now: on the refresh interval,
/// or immediately if the drone has strayed too far from it.
pub fn formation_due(
    updated_ms: Option<f64>,
    now_ms: f64,
    position: DVec3,
    anchor: DVec3,
    params: &ReconParams,
) -> bool {
    match updated_ms {
        None => true,
        Some(t) if now_ms - t >= params.pattern_change_ms => true,
        Some(_) => position.distance(anchor) > params.map_size * RECON_STRAY_FRACTION,
    }
}

/// Unit search direction in formation mode.
pub fn recon_direction<R: Rng + ?Sized>(
    position: DVec3,
    anchor: DVec3,
    search_phase: f64,
    now_ms: f64,
    params: &ReconParams,
    rng: &mut R,
) -> DVec3 {
    let to_anchor = anchor - position;
    if to_anchor.length() > params.map_size * RECON_DIRECT_FRACTION {
        return direction_or_random(to_anchor, rng);
    }

    let orbit_radius = params.formation_spread * 2.0 * params.aggressiveness.clamp(0.1, 1.0);
    let angle = search_phase + now_ms * RECON_ORBIT_RATE * params.aggressiveness.max(0.1);
    let jitter = DVec3::new(
        rng.gen_range(-RECON_JITTER..RECON_JITTER),
        rng.gen_range(-RECON_JITTER..RECON_JITTER) * 0.5,
        rng.gen_range(-RECON_JITTER..RECON_JITTER),
    );
    let orbit_point =
        anchor + DVec3::new(angle.cos() * orbit_radius, 0.0, angle.sin() * orbit_radius) + jitter;

    direction_or_random(orbit_point - position, rng)
}

/// Gentle vertical component that pulls a legacy pattern back to cruise altitude.
fn altitude_hold(position: DVec3, altitude: f64) -> f64 {
    ((altitude - position.y) / 10.0).clamp(-0.5, 0.5)
}

/// Unit search direction for the legacy non-formation patterns.
pub fn legacy_direction<R: Rng + ?Sized>(
    pattern: SearchPattern,
    id: u32,
    position: DVec3,
    now_ms: f64,
    waypoint: &mut Option<DVec3>,
    params: &ReconParams,
    rng: &mut R,
) -> DVec3 {
    let t = now_ms / 1000.0;
    let heading = id as f64 * FRAC_PI_2 + search_phase_for(id);
    let forward = DVec3::new(heading.cos(), 0.0, heading.sin());
    let side = DVec3::new(-forward.z, 0.0, forward.x);
    let climb = DVec3::Y * altitude_hold(position, params.altitude);

    let raw = match pattern {
        SearchPattern::Sine => forward + side * (t * 1.5).sin() + climb,
        SearchPattern::Spiral => {
            let radial = flatten(position);
            match radial.try_normalize() {
                Some(out) => {
                    let tangent = DVec3::new(-out.z, 0.0, out.x);
                    tangent + out * (t * 0.2).cos() * 0.5 + climb
                }
                None => random_unit_horizontal(rng) + climb,
            }
        }
        SearchPattern::Zigzag => {
            let leg = (now_ms / ZIGZAG_PERIOD_MS).floor() as i64;
            let sign = if leg.rem_euclid(2) == 0 { 1.0 } else { -1.0 };
            forward + side * sign + climb
        }
        SearchPattern::Waypoint => {
            let reached = waypoint
                .map(|w| position.distance(w) < WAYPOINT_REACHED_DISTANCE)
                .unwrap_or(true);
            if reached {
                let range = params.half_extent() * RECON_QUADRANT_RADIUS_FRACTION;
                *waypoint = Some(DVec3::new(
                    rng.gen_range(-range..range),
                    params.altitude,
                    rng.gen_range(-range..range),
                ));
            }
            waypoint.map(|w| w - position).unwrap_or(forward)
        }
    };

    direction_or_random(raw, rng)
}
