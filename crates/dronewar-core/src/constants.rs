//! Simulation constants and fixed tuning parameters.
//!
//! User-editable parameters live in [`crate::config::SimConfig`]; the values
//! here are fixed for the lifetime of the build.

/// Nominal host tick rate (Hz). The engine itself is clock-driven.
pub const TICK_RATE: u32 = 60;

/// Nominal milliseconds per tick at [`TICK_RATE`].
pub const TICK_MS: f64 = 1000.0 / TICK_RATE as f64;

// --- Knowledge ---

/// Shared and local knowledge entries older than this are forgotten (ms).
pub const KNOWLEDGE_RETENTION_MS: f64 = 10_000.0;

// --- Steering ---

/// Base steering force magnitude per tick.
pub const BASE_STEERING_FORCE: f64 = 0.05;

/// Seek force attenuation when the target is behind an obstacle.
pub const BLOCKED_SEEK_FACTOR: f64 = 0.3;

/// Separation neighborhood is `drone_size * SEPARATION_RADIUS_FACTOR * (1 + weight / 2)`.
pub const SEPARATION_RADIUS_FACTOR: f64 = 10.0;

/// Minimum distance used when scaling separation repulsion.
pub const SEPARATION_MIN_DISTANCE: f64 = 0.1;

/// Clearance around obstacles inside which drones feel avoidance.
pub const DRONE_AVOIDANCE_MARGIN: f64 = 8.0;

/// Gap below which obstacle repulsion stops growing.
pub const AVOIDANCE_MIN_GAP: f64 = 1.0;

/// Avoidance multiplier while routing around an obstacle to a hidden target.
pub const ROUTING_AVOIDANCE_BOOST: f64 = 2.5;

/// Floor on the boosted avoidance weight.
pub const ROUTING_AVOIDANCE_FLOOR: f64 = 2.0;

/// Lateral boundary correction force. Altitude correction is twice this.
pub const BOUNDARY_FORCE: f64 = 0.05;

/// Minimum speed for the heading to follow the velocity.
pub const HEADING_EPSILON: f64 = 0.01;

/// Downward drift applied to destroyed drones per tick.
pub const WRECK_GRAVITY: f64 = 0.02;

/// Horizontal velocity damping applied to destroyed drones per tick.
pub const WRECK_DAMPING: f64 = 0.95;

// --- Recon formation ---

/// Quadrant radius as a fraction of the map half-extent.
pub const RECON_QUADRANT_RADIUS_FRACTION: f64 = 0.8;

/// Formation is recomputed when the drone strays past this fraction of map size.
pub const RECON_STRAY_FRACTION: f64 = 0.7;

/// Beyond this fraction of map size the drone flies straight to its anchor.
pub const RECON_DIRECT_FRACTION: f64 = 0.3;

/// Orbit angular speed around the formation anchor (radians per ms).
pub const RECON_ORBIT_RATE: f64 = 0.0005;

/// Per-tick random jitter added to the orbit point.
pub const RECON_JITTER: f64 = 0.5;

/// Random waypoints are replaced inside this distance.
pub const WAYPOINT_REACHED_DISTANCE: f64 = 5.0;

/// Zigzag legs flip direction at this period (ms).
pub const ZIGZAG_PERIOD_MS: f64 = 3_000.0;

// --- Sentries ---

/// Sentries ride this far above the ground plane.
pub const SENTRY_HEIGHT: f64 = 1.0;

/// Collision radius of a sentry.
pub const SENTRY_RADIUS: f64 = 1.0;

/// Threat added on an undetected-to-detected transition.
pub const THREAT_DETECTION_INCREMENT: f64 = 0.5;

/// Threat removed per re-evaluation once undetected long enough.
pub const THREAT_DECAY: f64 = 0.5;

/// Threat above which a detected sentry hides.
pub const THREAT_HIDE_THRESHOLD: f64 = 1.5;

/// Simultaneous detectors at or above which a sentry hides.
pub const HIDE_DETECTOR_COUNT: usize = 2;

/// Lower bound of the per-sentry re-evaluation interval (ms).
pub const EVALUATION_INTERVAL_MIN_MS: f64 = 3_000.0;

/// Upper bound of the per-sentry re-evaluation interval (ms).
pub const EVALUATION_INTERVAL_MAX_MS: f64 = 5_000.0;

/// Undetected longer than this, the sentry keeps re-seeking cover (ms).
pub const RECENT_DETECTION_MS: f64 = 10_000.0;

/// Undetected longer than this, the sentry goes back to patrolling (ms).
pub const PATROL_RESUME_MS: f64 = 20_000.0;

/// Weight of the isolation term in the vulnerability score.
pub const VULNERABILITY_ISOLATION_WEIGHT: f64 = 0.6;

/// Weight of the damage term in the vulnerability score.
pub const VULNERABILITY_DAMAGE_WEIGHT: f64 = 0.4;

/// Ally count at which a drone stops counting as isolated.
pub const ISOLATION_ALLY_CAP: usize = 3;

/// Hiding spots score best at this distance from the sentry.
pub const HIDING_PREFERRED_DISTANCE: f64 = 5.0;

/// Hiding-spot score weights: directional opposition, proximity, size.
pub const HIDING_OPPOSITION_WEIGHT: f64 = 0.4;
pub const HIDING_PROXIMITY_WEIGHT: f64 = 0.4;
pub const HIDING_SIZE_WEIGHT: f64 = 0.2;

/// Distance a sentry flees when there is no obstacle to hide behind.
pub const OPEN_GROUND_RETREAT: f64 = 15.0;

/// Clearance kept between a hiding position and its obstacle.
pub const HIDING_CLEARANCE: f64 = 1.5;

/// Random jitter applied to hiding positions.
pub const HIDING_JITTER: f64 = 0.5;

/// Perturbation attempts before falling back to a farther point.
pub const HIDING_RETRY_LIMIT: u32 = 8;

/// Hiding movement stops inside this distance.
pub const HIDING_ARRIVAL_DISTANCE: f64 = 0.5;

/// Patrol points are replaced inside this distance.
pub const PATROL_ARRIVAL_DISTANCE: f64 = 1.0;

/// Patrol speed as a fraction of max speed.
pub const PATROL_SPEED_FACTOR: f64 = 0.5;

/// Hiding speed as a fraction of max speed.
pub const HIDING_SPEED_FACTOR: f64 = 0.8;

/// Pursuit speed boost applied inside [`PURSUIT_BOOST_RANGE_FRACTION`] of shooting range.
pub const PURSUIT_BOOST: f64 = 1.3;

/// Fraction of shooting range inside which pursuit is boosted.
pub const PURSUIT_BOOST_RANGE_FRACTION: f64 = 0.7;

/// Steering responsiveness of sentries (fraction of velocity error per tick).
pub const SENTRY_STEERING_GAIN: f64 = 0.1;

/// Clearance around obstacles inside which sentries feel avoidance.
pub const SENTRY_AVOIDANCE_MARGIN: f64 = 3.0;

/// Push-out passes applied when a sentry ends a tick inside geometry.
pub const SENTRY_CORRECTION_PASSES: u32 = 4;

/// Push-out passes over all obstacles before a drone still inside
/// overlapping boxes is lifted clear of them.
pub const DRONE_PUSH_OUT_PASSES: u32 = 4;

// --- Geometry ---

/// Ray origin inset to avoid self-intersection.
pub const LOS_INSET: f64 = 0.1;

/// Attempt budget for spawn placement.
pub const SPAWN_MAX_ATTEMPTS: u32 = 50;

/// Extra clearance above an obstacle top for a drone spawn to be valid.
pub const SPAWN_VERTICAL_CLEARANCE: f64 = 2.0;

/// Altitude added to a drone spawn that could not be cleared.
pub const DEGRADED_SPAWN_LIFT: f64 = 20.0;

// --- Combat ---

/// Collision damage multiplier cap relative to nominal speed.
pub const COLLISION_SPEED_CAP: f64 = 2.0;

/// Collision damage multiplier floor, so sustained contact still hurts.
pub const COLLISION_SPEED_FLOOR: f64 = 0.25;

/// Fraction of speed kept after bouncing off an obstacle.
pub const COLLISION_RESTITUTION: f64 = 0.5;

/// Clearance placed between a drone and the surface it was pushed out of.
pub const COLLISION_SEPARATION: f64 = 0.01;

// --- Obstacles ---

/// Obstacle footprint range (full width/depth).
pub const OBSTACLE_MIN_FOOTPRINT: f64 = 4.0;
pub const OBSTACLE_MAX_FOOTPRINT: f64 = 16.0;

/// Obstacle height range.
pub const OBSTACLE_MIN_HEIGHT: f64 = 5.0;
pub const OBSTACLE_MAX_HEIGHT: f64 = 30.0;
