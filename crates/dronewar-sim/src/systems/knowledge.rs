//! Knowledge maintenance: prune the shared store, age out local caches, and
//! broadcast the store back to the swarm.

use std::collections::BTreeSet;

use hecs::World;

use dronewar_core::components::{Drone, DroneMind, Sentry, Tactics, Vitals};

use crate::knowledge::{forget_stale, KnowledgeStore};

/// Ids of every destroyed sentry.
pub fn destroyed_sentries(world: &World) -> BTreeSet<u32> {
    world
        .query::<(&Sentry, &Tactics)>()
        .iter()
        .filter(|(_, (_, tactics))| tactics.state.is_destroyed())
        .map(|(_, (sentry, _))| sentry.id)
        .collect()
}

/// Prune the store and every drone's local cache.
pub fn prune(world: &mut World, store: &mut KnowledgeStore, now_ms: f64) {
    let destroyed = destroyed_sentries(world);
    store.prune(now_ms, &destroyed);
    for (_entity, (_drone, mind)) in world.query_mut::<(&Drone, &mut DroneMind)>() {
        forget_stale(mind, now_ms, &destroyed);
    }
}

/// Replace every living drone's cache with the store's live entries.
pub fn broadcast(world: &mut World, store: &KnowledgeStore, now_ms: f64) {
    let destroyed = destroyed_sentries(world);
    for (_entity, (_drone, vitals, mind)) in
        world.query_mut::<(&Drone, &Vitals, &mut DroneMind)>()
    {
        if vitals.alive {
            store.broadcast_into(mind, now_ms, &destroyed);
        }
    }
}
