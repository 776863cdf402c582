//! DRONEWAR headless host.
//!
//! Wires the simulation engine to a fixed-rate game loop thread, a command
//! channel, and run summaries for the command-line binary.

pub mod error;
pub mod game_loop;
pub mod state;

pub use dronewar_core as core;
