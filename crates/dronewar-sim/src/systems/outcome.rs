//! Win/loss detection. Each outcome is reported once per run.

use hecs::World;
use tracing::info;

use dronewar_core::components::{Armament, Drone, Sentry, Tactics, Vitals};
use dronewar_core::events::SimEvent;
use dronewar_core::state::OutcomeView;

/// Check run-ending conditions and emit any newly reached ones.
///
/// Empty populations never trigger an outcome: zero sentries is not a win.
/// Running out of ammo is about the survivors, so a wiped-out swarm is
/// lost, not out of ammo.
pub fn run(world: &World, latch: &mut OutcomeView, events: &mut Vec<SimEvent>) {
    let (drones, alive, armed) = world
        .query::<(&Drone, &Vitals, &Armament)>()
        .iter()
        .fold((0u32, 0u32, 0u32), |(n, alive, armed), (_, (_, vitals, armament))| {
            (
                n + 1,
                alive + vitals.alive as u32,
                armed + (vitals.alive && armament.missile_loaded) as u32,
            )
        });
    let (sentries, destroyed) = world
        .query::<(&Sentry, &Tactics)>()
        .iter()
        .fold((0u32, 0u32), |(n, destroyed), (_, (_, tactics))| {
            (n + 1, destroyed + tactics.state.is_destroyed() as u32)
        });

    if sentries > 0 && destroyed == sentries && !latch.all_enemies_neutralized {
        latch.all_enemies_neutralized = true;
        info!(sentries, "all enemies neutralized");
        events.push(SimEvent::AllEnemiesNeutralized);
    }
    if drones > 0 && alive == 0 && !latch.all_drones_lost {
        latch.all_drones_lost = true;
        info!(drones, "all drones lost");
        events.push(SimEvent::AllDronesLost);
    }
    if alive > 0 && armed == 0 && !latch.all_drones_out_of_ammo {
        latch.all_drones_out_of_ammo = true;
        info!(drones, "all drones out of ammo");
        events.push(SimEvent::AllDronesOutOfAmmo);
    }
}
