//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` when
//! read-only). Cross-tick state lives in components or in the engine.

pub mod collisions;
pub mod detection;
pub mod drone_steering;
pub mod knowledge;
pub mod missiles;
pub mod outcome;
pub mod sentry_ai;
pub mod sentry_fire;
pub mod snapshot;
