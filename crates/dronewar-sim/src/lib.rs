//! Simulation engine for DRONEWAR.
//!
//! Owns the hecs ECS world, the obstacle list, and the shared knowledge
//! store; runs the per-tick system pipeline and produces `SimSnapshot`s for
//! the host.

pub mod engine;
pub mod knowledge;
pub mod systems;
pub mod world_setup;

pub use dronewar_core as core;
pub use engine::SimulationEngine;
pub use knowledge::KnowledgeStore;

#[cfg(test)]
mod tests;
