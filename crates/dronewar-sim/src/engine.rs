//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, the obstacle list, and the
//! knowledge store; processes host commands; runs all systems in a fixed
//! order; and produces `SimSnapshot`s. Completely headless, so a fixed seed
//! and a fixed clock give a deterministic run.

use std::collections::VecDeque;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use dronewar_core::commands::SimCommand;
use dronewar_core::components::Obstacle;
use dronewar_core::config::SimConfig;
use dronewar_core::enums::SimPhase;
use dronewar_core::error::Result;
use dronewar_core::events::SimEvent;
use dronewar_core::state::{OutcomeView, SimSnapshot};
use dronewar_core::types::SimTime;

use crate::knowledge::KnowledgeStore;
use crate::systems;
use crate::systems::missiles::{MissileOutcome, MissileRequest};
use crate::world_setup;

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    config: SimConfig,
    obstacles: Vec<Obstacle>,
    knowledge: KnowledgeStore,
    time: SimTime,
    phase: SimPhase,
    rng: ChaCha8Rng,
    command_queue: VecDeque<SimCommand>,
    missile_queue: Vec<MissileRequest>,
    events: Vec<SimEvent>,
    outcome: OutcomeView,
}

impl SimulationEngine {
    /// Create an engine with agents spawned and the clock idle at zero.
    pub fn new(config: SimConfig) -> Self {
        let mut engine = Self {
            world: World::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            obstacles: Vec::new(),
            knowledge: KnowledgeStore::new(),
            time: SimTime::default(),
            phase: SimPhase::default(),
            command_queue: VecDeque::new(),
            missile_queue: Vec::new(),
            events: Vec::new(),
            outcome: OutcomeView::default(),
        };
        engine.reset();
        engine
    }

    /// Like [`SimulationEngine::new`], but rejects an invalid config.
    pub fn try_new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Apply queued commands, advance one tick if running, and return the
    /// resulting snapshot. `now_ms` is a monotonic timestamp; it never moves
    /// the clock backwards.
    pub fn tick(&mut self, now_ms: f64) -> SimSnapshot {
        self.process_commands();

        if self.phase == SimPhase::Running {
            self.time.advance(now_ms);
            self.run_systems();
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.obstacles,
            self.knowledge.len(),
            events,
            self.outcome,
        )
    }

    /// Discard every agent, the obstacle layout, the knowledge store, and
    /// the outcome latch, then respawn. The run phase is left alone.
    pub fn reset(&mut self) {
        self.world.clear();
        self.knowledge.clear();
        self.missile_queue.clear();
        self.events.clear();
        self.outcome = OutcomeView::default();
        self.time.tick = 0;

        let now_ms = self.time.now_ms;
        self.obstacles = world_setup::generate_obstacles(&self.config, &mut self.rng);
        world_setup::spawn_drones(&mut self.world, &self.config, &self.obstacles, &mut self.rng);
        world_setup::spawn_sentries(
            &mut self.world,
            &self.config,
            &self.obstacles,
            &mut self.rng,
            now_ms,
        );
        info!(
            obstacles = self.obstacles.len(),
            drones = self.config.drone_count,
            sentries = self.config.enemy_count,
            "simulation reset"
        );
    }

    /// Launch a missile immediately, outside the tick pipeline.
    pub fn fire_missile(&mut self, drone_id: u32, enemy_id: u32) -> Option<MissileOutcome> {
        systems::missiles::resolve(
            &mut self.world,
            &self.obstacles,
            MissileRequest { drone_id, enemy_id },
            self.config.detection_range,
            &mut self.events,
        )
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn outcome(&self) -> OutcomeView {
        self.outcome
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for arranging test scenarios.
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Replace the obstacle layout (for tests needing exact geometry).
    #[cfg(test)]
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: SimCommand) {
        let structural = command.forces_reset();
        match command {
            SimCommand::Start => {
                if self.phase == SimPhase::Idle {
                    self.phase = SimPhase::Running;
                    info!("simulation started");
                }
            }
            SimCommand::Pause => {
                if self.phase == SimPhase::Running {
                    self.phase = SimPhase::Paused;
                    info!("simulation paused");
                }
            }
            SimCommand::Resume => {
                if self.phase == SimPhase::Paused {
                    self.phase = SimPhase::Running;
                    info!("simulation resumed");
                }
            }
            SimCommand::Reset => {
                self.reset();
                self.phase = SimPhase::Idle;
            }
            SimCommand::SetMapSize { size } => {
                self.edit_config(|c| c.map_size = size, structural);
            }
            SimCommand::SetDroneCount { count } => {
                self.edit_config(|c| c.drone_count = count, structural);
            }
            SimCommand::SetEnemyCount { count } => {
                self.edit_config(|c| c.enemy_count = count, structural);
            }
            SimCommand::SetObstacleCount { count } => {
                self.edit_config(|c| c.obstacle_count = count, structural);
            }
            SimCommand::SetDroneAltitude { altitude } => {
                self.edit_config(|c| c.drone_altitude = altitude, structural);
            }
            SimCommand::SetDetectionRange { range } => {
                self.edit_config(|c| c.detection_range = range, structural);
            }
            SimCommand::SetBehaviorWeights {
                cohesion,
                separation,
                avoidance,
                search,
            } => {
                self.edit_config(
                    |c| {
                        c.cohesion_weight = cohesion;
                        c.separation_weight = separation;
                        c.avoidance_weight = avoidance;
                        c.search_weight = search;
                    },
                    structural,
                );
            }
            SimCommand::SetShootingEnabled { enabled } => {
                self.edit_config(|c| c.shooting_enabled = enabled, structural);
            }
            SimCommand::FireMissile { drone_id, enemy_id } => {
                self.missile_queue.push(MissileRequest { drone_id, enemy_id });
            }
        }
    }

    /// Apply an edit to a copy of the config and keep it only if it
    /// validates. Structural edits rebuild the world.
    fn edit_config(&mut self, edit: impl FnOnce(&mut SimConfig), structural: bool) {
        let mut candidate = self.config.clone();
        edit(&mut candidate);
        if let Err(err) = candidate.validate() {
            warn!(%err, "config edit rejected");
            return;
        }
        self.config = candidate;
        debug!(structural, "config edited");
        if structural {
            self.reset();
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let now_ms = self.time.now_ms;

        // 1. Forget destroyed and expired sightings
        systems::knowledge::prune(&mut self.world, &mut self.knowledge, now_ms);
        // 2. Detection (drones sense sentries; sentries learn who sees them)
        let detections = systems::detection::run(
            &mut self.world,
            &mut self.knowledge,
            self.config.detection_range,
            now_ms,
        );
        // 3. Broadcast shared knowledge before anyone steers
        systems::knowledge::broadcast(&mut self.world, &self.knowledge, now_ms);
        // 4. Drone steering and integration
        systems::drone_steering::run(
            &mut self.world,
            &self.obstacles,
            &self.config,
            &mut self.rng,
            now_ms,
        );
        // 5. Sentry awareness, tactics, movement
        systems::sentry_ai::run(
            &mut self.world,
            &self.obstacles,
            &self.config,
            &detections,
            &mut self.rng,
            now_ms,
        );
        // 6. Drone-obstacle collisions
        systems::collisions::run(
            &mut self.world,
            &self.obstacles,
            &self.config,
            now_ms,
            &mut self.events,
        );
        // 7. Sentry fire
        systems::sentry_fire::run(
            &mut self.world,
            &self.obstacles,
            &self.config,
            now_ms,
            &mut self.events,
        );
        // 8. Missiles: explicit orders first, then auto-fire
        let mut requests = std::mem::take(&mut self.missile_queue);
        if self.config.auto_fire_missiles {
            requests.extend(systems::missiles::auto_fire_requests(
                &self.world,
                &self.obstacles,
                self.config.detection_range,
            ));
        }
        for request in requests {
            systems::missiles::resolve(
                &mut self.world,
                &self.obstacles,
                request,
                self.config.detection_range,
                &mut self.events,
            );
        }
        // 9. Outcome latch
        systems::outcome::run(&self.world, &mut self.outcome, &mut self.events);

        trace!(
            tick = self.time.tick,
            known = self.knowledge.len(),
            events = self.events.len(),
            "tick complete"
        );
    }
}
