//! Unit-direction helpers with a randomized fallback for degenerate vectors.
//!
//! Two agents at the same point have no defined direction between them;
//! instead of failing, pick a random one.

use std::f64::consts::TAU;

use glam::DVec3;
use rand::Rng;

/// Uniformly distributed unit vector on the sphere.
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let y: f64 = rng.gen_range(-1.0..1.0);
    let theta: f64 = rng.gen_range(0.0..TAU);
    let r = (1.0 - y * y).sqrt();
    DVec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Uniformly distributed unit vector in the ground plane.
pub fn random_unit_horizontal<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let theta: f64 = rng.gen_range(0.0..TAU);
    DVec3::new(theta.cos(), 0.0, theta.sin())
}

/// Normalize `v`, or return a random unit vector if `v` has no direction.
pub fn direction_or_random<R: Rng + ?Sized>(v: DVec3, rng: &mut R) -> DVec3 {
    v.try_normalize().unwrap_or_else(|| random_unit(rng))
}

/// Normalize the ground-plane part of `v`, or return a random ground direction.
pub fn horizontal_direction_or_random<R: Rng + ?Sized>(v: DVec3, rng: &mut R) -> DVec3 {
    DVec3::new(v.x, 0.0, v.z)
        .try_normalize()
        .unwrap_or_else(|| random_unit_horizontal(rng))
}
