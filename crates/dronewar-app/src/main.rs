//! DRONEWAR headless runner.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dronewar_app::game_loop::{run_batch, spawn_game_loop};
use dronewar_app::state::{LoopCommand, RunSummary};
use dronewar_core::commands::SimCommand;
use dronewar_core::config::SimConfig;

#[derive(Parser)]
#[command(name = "dronewar")]
#[command(about = "Headless drone swarm versus ground sentry simulation")]
struct Cli {
    /// JSON config file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Batch mode: number of ticks to run on a synthetic clock
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Real-time mode: run the 60Hz game loop for this many seconds
    #[arg(long, conflicts_with = "ticks")]
    realtime: Option<f64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let result = match cli.realtime {
        Some(secs) => run_realtime(config, secs),
        None => {
            info!(ticks = cli.ticks, seed = config.seed, "batch run");
            run_batch(config, cli.ticks)
        }
    };

    match result {
        Ok(summary) => {
            print_summary(&summary, cli.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_realtime(config: SimConfig, secs: f64) -> dronewar_app::error::Result<RunSummary> {
    info!(secs, seed = config.seed, "real-time run");
    let summary = Arc::new(Mutex::new(RunSummary::new()));
    let sink_summary = Arc::clone(&summary);

    let (tx, handle) = spawn_game_loop(config, move |snapshot| {
        if let Ok(mut summary) = sink_summary.lock() {
            summary.observe(&snapshot);
        }
    })?;

    // A closed channel means the loop already exited; join reports that below.
    let _ = tx.send(LoopCommand::Sim(SimCommand::Start));
    std::thread::sleep(Duration::from_secs_f64(secs.max(0.0)));
    let _ = tx.send(LoopCommand::Shutdown);
    if handle.join().is_err() {
        error!("game loop thread panicked");
    }

    let summary = summary.lock().map(|s| s.clone()).unwrap_or_default();
    Ok(summary)
}

fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(text) => println!("{text}"),
            Err(e) => error!("Failed to serialize summary: {e}"),
        }
        return;
    }

    println!("ticks:            {} ({:.1}s simulated)", summary.ticks, summary.sim_time_ms / 1000.0);
    println!("drones alive:     {}/{}", summary.drones_alive, summary.drones_total);
    println!("missiles left:    {}", summary.missiles_remaining);
    println!("sentries down:    {}/{}", summary.enemies_destroyed, summary.enemies_total);
    println!("known sentries:   {}", summary.known_enemies);
    println!(
        "lasers:           {} fired, {} blocked",
        summary.lasers_fired, summary.lasers_blocked
    );
    println!(
        "missiles:         {} fired, {} hits",
        summary.missiles_fired, summary.missile_hits
    );
    println!("collisions:       {}", summary.collisions);
    let outcome = &summary.outcome;
    if outcome.all_enemies_neutralized {
        println!("outcome:          all sentries neutralized");
    } else if outcome.all_drones_lost {
        println!("outcome:          all drones lost");
    } else if outcome.all_drones_out_of_ammo {
        println!("outcome:          all drones out of ammo");
    } else {
        println!("outcome:          undecided");
    }
}
