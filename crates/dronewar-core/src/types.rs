//! Fundamental geometric and simulation types.
//!
//! Axis convention: y is up (altitude), x and z span the ground plane.

use std::ops::{Deref, DerefMut};

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// World position in simulation units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec3);

/// Velocity in simulation units per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec3);

/// Steering force accumulator. Mass is 1, so force equals acceleration.
/// Reset to zero after every integration step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Acceleration(pub DVec3);

/// Unit facing direction, updated when the agent is actually moving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heading(pub DVec3);

impl Default for Heading {
    fn default() -> Self {
        Self(DVec3::Z)
    }
}

macro_rules! vector_newtype {
    ($name:ident) => {
        impl $name {
            pub fn new(x: f64, y: f64, z: f64) -> Self {
                Self(DVec3::new(x, y, z))
            }
        }

        impl Deref for $name {
            type Target = DVec3;

            fn deref(&self) -> &DVec3 {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut DVec3 {
                &mut self.0
            }
        }

        impl From<DVec3> for $name {
            fn from(v: DVec3) -> Self {
                Self(v)
            }
        }
    };
}

vector_newtype!(Position);
vector_newtype!(Velocity);
vector_newtype!(Acceleration);
vector_newtype!(Heading);

/// Distance in the ground plane, ignoring altitude.
pub fn horizontal_distance(a: DVec3, b: DVec3) -> f64 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Project a vector onto the ground plane.
pub fn flatten(v: DVec3) -> DVec3 {
    DVec3::new(v.x, 0.0, v.z)
}

/// Simulation time tracking.
///
/// Timers are driven by the host's monotonic clock, not by tick count, so
/// behavior is frame-rate independent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of ticks the simulation has advanced.
    pub tick: u64,
    /// Monotonic timestamp of the latest tick in milliseconds.
    pub now_ms: f64,
}

impl SimTime {
    /// Advance by one tick to the given timestamp. Timestamps never run backwards.
    pub fn advance(&mut self, now_ms: f64) {
        self.tick += 1;
        self.now_ms = self.now_ms.max(now_ms);
    }
}
