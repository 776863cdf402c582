//! Swarm knowledge store: the shared, time-decayed map of last-known enemy
//! positions.
//!
//! Any drone that detects an enemy overwrites its entry (last detector
//! wins). Once per tick the store is pruned and broadcast: every living
//! drone's local cache is replaced with the store's live entries.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;

use dronewar_core::components::{DroneMind, KnownEnemy};
use dronewar_core::constants::KNOWLEDGE_RETENTION_MS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnowledgeEntry {
    pub position: DVec3,
    pub timestamp_ms: f64,
    /// Drone that made the most recent sighting.
    pub detected_by: u32,
}

impl KnowledgeEntry {
    fn is_fresh(&self, now_ms: f64) -> bool {
        now_ms - self.timestamp_ms <= KNOWLEDGE_RETENTION_MS
    }
}

/// Shared enemy knowledge, keyed by enemy id.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    entries: BTreeMap<u32, KnowledgeEntry>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting, replacing any previous entry for the enemy.
    pub fn record(&mut self, enemy_id: u32, position: DVec3, timestamp_ms: f64, drone_id: u32) {
        self.entries.insert(
            enemy_id,
            KnowledgeEntry {
                position,
                timestamp_ms,
                detected_by: drone_id,
            },
        );
    }

    /// Drop entries for destroyed enemies and entries older than the
    /// retention window. Returns the number of entries removed.
    pub fn prune(&mut self, now_ms: f64, destroyed: &BTreeSet<u32>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|id, entry| !destroyed.contains(id) && entry.is_fresh(now_ms));
        before - self.entries.len()
    }

    /// Replace a drone's local cache with every live entry in the store.
    pub fn broadcast_into(&self, mind: &mut DroneMind, now_ms: f64, destroyed: &BTreeSet<u32>) {
        mind.known_enemies.clear();
        for (&id, entry) in &self.entries {
            if destroyed.contains(&id) || !entry.is_fresh(now_ms) {
                continue;
            }
            mind.known_enemies.insert(
                id,
                KnownEnemy {
                    position: entry.position,
                    timestamp_ms: entry.timestamp_ms,
                },
            );
        }
    }

    pub fn get(&self, enemy_id: u32) -> Option<&KnowledgeEntry> {
        self.entries.get(&enemy_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &KnowledgeEntry)> {
        self.entries.iter().map(|(&id, entry)| (id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Forget locally cached sightings that have aged out or whose enemy is gone,
/// independently of the shared store.
pub fn forget_stale(mind: &mut DroneMind, now_ms: f64, destroyed: &BTreeSet<u32>) {
    mind.known_enemies.retain(|id, known| {
        !destroyed.contains(id) && now_ms - known.timestamp_ms <= KNOWLEDGE_RETENTION_MS
    });
}
