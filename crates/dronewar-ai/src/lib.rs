//! Agent decision logic for DRONEWAR.
//!
//! Drone steering and search patterns, and the sentry tactical state
//! machine with its targeting, hiding, and movement rules. Everything here
//! is a plain function over plain data; the ECS lives in `dronewar-sim`.

pub mod hiding;
pub mod search;
pub mod sentry;
pub mod sentry_motion;
pub mod steering;
pub mod targeting;

pub use dronewar_core as core;
