//! Detection system: drones sense sentries within detection range.
//!
//! Sensing is symmetric, so the same pass also tells each sentry which
//! drones can see it.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;
use hecs::World;
use tracing::trace;

use dronewar_core::components::{Drone, DroneMind, KnownEnemy, Sentry, Tactics, Vitals};
use dronewar_core::types::Position;

use crate::knowledge::KnowledgeStore;

/// Drones that see one sentry this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub drones: BTreeSet<u32>,
    /// Average detector position, if any drone sees the sentry.
    pub centroid: Option<DVec3>,
}

/// Sentry id to this tick's detectors.
pub type DetectionMap = BTreeMap<u32, Detection>;

/// Run detection for every living drone against every live sentry.
/// Sightings go to the shared store and the drone's local cache.
pub fn run(
    world: &mut World,
    store: &mut KnowledgeStore,
    detection_range: f64,
    now_ms: f64,
) -> DetectionMap {
    let sentries: Vec<(u32, DVec3)> = world
        .query::<(&Sentry, &Position, &Tactics)>()
        .iter()
        .filter(|(_, (_, _, tactics))| !tactics.state.is_destroyed())
        .map(|(_, (sentry, pos, _))| (sentry.id, pos.0))
        .collect();

    let mut sums: BTreeMap<u32, (BTreeSet<u32>, DVec3)> = sentries
        .iter()
        .map(|&(id, _)| (id, (BTreeSet::new(), DVec3::ZERO)))
        .collect();

    for (_entity, (drone, pos, vitals, mind)) in
        world.query_mut::<(&Drone, &Position, &Vitals, &mut DroneMind)>()
    {
        if !vitals.alive {
            continue;
        }
        for &(sentry_id, sentry_pos) in &sentries {
            if pos.distance(sentry_pos) > detection_range {
                continue;
            }
            store.record(sentry_id, sentry_pos, now_ms, drone.id);
            mind.known_enemies.insert(
                sentry_id,
                KnownEnemy {
                    position: sentry_pos,
                    timestamp_ms: now_ms,
                },
            );
            if let Some((drones, sum)) = sums.get_mut(&sentry_id) {
                drones.insert(drone.id);
                *sum += pos.0;
            }
        }
    }

    let detections: DetectionMap = sums
        .into_iter()
        .map(|(id, (drones, sum))| {
            let centroid = (!drones.is_empty()).then(|| sum / drones.len() as f64);
            (id, Detection { drones, centroid })
        })
        .collect();

    trace!(
        visible = detections.values().filter(|d| !d.drones.is_empty()).count(),
        "detection pass"
    );
    detections
}
