//! Spatial queries for DRONEWAR.
//!
//! Obstacle collision, ray line-of-sight, nearest-surface push-back,
//! spawn validation, and degenerate-direction fallbacks. All queries are
//! total over well-formed obstacles.

pub use dronewar_core as core;

pub mod collision;
pub mod direction;
pub mod los;
pub mod spawn;

// Re-export key functions for convenience.
pub use collision::{
    box_collision, collides_with_any, nearest_surface_point, overlaps_box, overlaps_footprint,
    push_out, push_out_horizontal, Contact,
};
pub use direction::{direction_or_random, horizontal_direction_or_random};
pub use los::{first_obstacle_hit, line_of_sight};
pub use spawn::{find_clear_spawn_position, is_spawn_clear, SpawnClearance, SpawnPlacement};
