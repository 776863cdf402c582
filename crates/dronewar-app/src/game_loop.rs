//! Game loop thread: runs the simulation engine at 60Hz and hands snapshots to a sink.
//!
//! The engine is created inside the loop thread so it never crosses threads.
//! Commands arrive via an `mpsc` channel and are drained before every tick.
//! Each tick is stamped with milliseconds elapsed on a monotonic `Instant`.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use dronewar_core::commands::SimCommand;
use dronewar_core::config::SimConfig;
use dronewar_core::constants::{TICK_MS, TICK_RATE};
use dronewar_core::state::SimSnapshot;
use dronewar_sim::SimulationEngine;

use crate::error::Result;
use crate::state::{LoopCommand, RunSummary};

/// Nominal duration of one tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Spawns the game loop in a new thread.
///
/// The config is validated before the thread starts. Returns the command
/// sender and the thread handle; the loop exits on `Shutdown` or when every
/// sender is dropped.
pub fn spawn_game_loop<F>(
    config: SimConfig,
    sink: F,
) -> Result<(mpsc::Sender<LoopCommand>, JoinHandle<()>)>
where
    F: FnMut(SimSnapshot) + Send + 'static,
{
    config.validate()?;
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();

    let handle = std::thread::Builder::new()
        .name("dronewar-game-loop".into())
        .spawn(move || run_game_loop(config, cmd_rx, sink))?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown or channel disconnect.
fn run_game_loop<F>(config: SimConfig, cmd_rx: mpsc::Receiver<LoopCommand>, mut sink: F)
where
    F: FnMut(SimSnapshot),
{
    let mut engine = SimulationEngine::new(config);
    let epoch = Instant::now();
    let mut next_tick_time = epoch;
    info!(rate = TICK_RATE, "game loop started");

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Sim(cmd)) => engine.queue_command(cmd),
                Ok(LoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    info!(tick = engine.time().tick, "game loop stopped");
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Advance one tick on the monotonic clock
        let now_ms = epoch.elapsed().as_secs_f64() * 1000.0;
        sink(engine.tick(now_ms));

        // 3. Sleep until the next tick
        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind; skip ahead instead of bursting to catch up
            debug!(behind_ms = (now - next_tick_time).as_millis() as u64, "tick overrun");
            next_tick_time = now;
        }
    }
}

/// Runs `ticks` ticks as fast as possible on a synthetic clock.
///
/// Stops early once a run-ending outcome is reached.
pub fn run_batch(config: SimConfig, ticks: u64) -> Result<RunSummary> {
    let mut engine = SimulationEngine::try_new(config)?;
    engine.queue_command(SimCommand::Start);

    let mut summary = RunSummary::new();
    for i in 1..=ticks {
        let snapshot = engine.tick(i as f64 * TICK_MS);
        summary.observe(&snapshot);
        if summary.finished() {
            info!(tick = i, "run ended");
            break;
        }
    }
    Ok(summary)
}
