#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owning context that wires the world and the pure systems into one
//! deterministic simulation.
//!
//! Every call to [`Simulation::step`] splits the elapsed time into fixed
//! movement steps, advances the variable-rate clock once and then pumps
//! events through the systems until the world stops producing new ones.
//! Hostiles therefore always move before targeting re-evaluates.

use std::{mem, time::Duration};

use rampart_core::{
    BeamView, Command, EconomySink, Event, GameStateSink, HostileView, PathProvider,
    ProjectileView, RestoreError, SimSnapshot, SimulationConfig, TowerTarget, TowerView,
    WaveRecord, WaveStatus, SNAPSHOT_VERSION,
};
use rampart_system_pathing::Pathing;
use rampart_system_tower_combat::TowerCombat;
use rampart_system_tower_targeting::TowerTargeting;
use rampart_system_wave_scheduler::WaveScheduler;
use rampart_world::{self as world, query, restore, World};

/// Simulation context owning the world, the systems and the path provider.
#[derive(Debug)]
pub struct Simulation<P> {
    config: SimulationConfig,
    provider: P,
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
    pathing: Pathing,
    waves: WaveScheduler,
    targets: Vec<TowerTarget>,
    accumulator: Duration,
    queued: Vec<Command>,
    queued_events: Vec<Event>,
}

impl<P: PathProvider> Simulation<P> {
    /// Creates an idle simulation with an empty field.
    #[must_use]
    pub fn new(config: SimulationConfig, provider: P) -> Self {
        Self {
            world: World::new(config.world.clone()),
            targeting: TowerTargeting::new(config.targeting_refresh()),
            combat: TowerCombat::new(config.world.towers.clone()),
            pathing: Pathing::new(config.pathing),
            waves: WaveScheduler::new(config.waves.clone()),
            targets: Vec::new(),
            accumulator: Duration::ZERO,
            queued: Vec::new(),
            queued_events: Vec::new(),
            provider,
            config,
        }
    }

    /// Rebuilds a simulation from a snapshot.
    ///
    /// Walking hostiles resume their recorded path. Hostiles that were still
    /// waiting take the path the provider publishes for their kind, or
    /// request one on the first step when none is published.
    pub fn restore(
        config: SimulationConfig,
        provider: P,
        snapshot: &SimSnapshot,
    ) -> Result<Self, RestoreError> {
        snapshot.check_version()?;
        let mut simulation = Self::new(config, provider);

        for tower in &snapshot.towers {
            restore::restore_tower(&mut simulation.world, tower);
        }

        let mut current_wave = 0;
        for record in &snapshot.hostiles {
            let waypoints = if record.waypoints.is_empty() {
                simulation.provider.path_for(record.kind)
            } else {
                None
            };
            let restored = restore::restore_hostile(
                &mut simulation.world,
                record,
                waypoints,
                &mut simulation.queued_events,
            )?;
            if restored.is_some() && record.wave == snapshot.wave.index {
                current_wave += 1;
            }
        }

        let per_wave = simulation.config.waves.enemies_per_wave;
        let spawned = snapshot.wave.spawned.min(per_wave);
        simulation.waves.restore(WaveRecord {
            index: snapshot.wave.index,
            spawned,
            remaining: per_wave - spawned + current_wave,
        })?;

        tracing::info!(
            wave = snapshot.wave.index,
            towers = snapshot.towers.len(),
            hostiles = query::active_hostiles(&simulation.world),
            "simulation restored"
        );
        Ok(simulation)
    }

    /// Advances the simulation by `dt`, reporting to the provided sinks.
    pub fn step(
        &mut self,
        dt: Duration,
        economy: &mut dyn EconomySink,
        game: &mut dyn GameStateSink,
    ) {
        let mut commands = mem::take(&mut self.queued);

        let fixed = self.config.fixed_timestep();
        if fixed.is_zero() {
            commands.push(Command::FixedStep { dt });
        } else {
            self.accumulator = self.accumulator.saturating_add(dt);
            while self.accumulator >= fixed {
                self.accumulator -= fixed;
                commands.push(Command::FixedStep { dt: fixed });
            }
        }
        commands.push(Command::Tick { dt });

        self.pump(commands, economy, game);
    }

    /// Queues a command for the next step.
    pub fn submit(&mut self, command: Command) {
        self.queued.push(command);
    }

    /// Starts the next wave now; its spawns enter the field on the next step.
    ///
    /// Returns `false` while a wave is in progress or after the final wave.
    pub fn start_next_wave(&mut self) -> bool {
        self.waves
            .start_next_wave(&mut self.queued, &mut self.queued_events)
    }

    /// Discards the field and every pending timer, returning to an idle state.
    pub fn reset(&mut self) {
        self.world = World::new(self.config.world.clone());
        self.targeting = TowerTargeting::new(self.config.targeting_refresh());
        self.combat = TowerCombat::new(self.config.world.towers.clone());
        self.pathing = Pathing::new(self.config.pathing);
        self.waves = WaveScheduler::new(self.config.waves.clone());
        self.targets.clear();
        self.accumulator = Duration::ZERO;
        self.queued.clear();
        self.queued_events.clear();
        tracing::info!("simulation reset");
    }

    /// Captures the resumable state of the simulation.
    #[must_use]
    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            version: SNAPSHOT_VERSION,
            wave: self.waves.record(),
            towers: query::tower_records(&self.world),
            hostiles: query::hostile_records(&self.world),
        }
    }

    /// Hostiles currently walking their path.
    #[must_use]
    pub fn hostile_view(&self) -> HostileView {
        query::hostile_view(&self.world)
    }

    /// Placed towers with their level-resolved stats.
    #[must_use]
    pub fn tower_view(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Laser beams and their endpoints.
    #[must_use]
    pub fn beam_view(&self) -> BeamView {
        query::beam_view(&self.world)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectile_view(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Wave scheduler summary.
    #[must_use]
    pub fn wave_status(&self) -> WaveStatus {
        self.waves.status()
    }

    /// Current target assignments.
    #[must_use]
    pub fn targets(&self) -> &[TowerTarget] {
        &self.targets
    }

    /// Read access to the underlying world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Tuning the simulation runs with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Mutable access to the path provider, e.g. to publish late paths.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    fn pump(
        &mut self,
        mut commands: Vec<Command>,
        economy: &mut dyn EconomySink,
        game: &mut dyn GameStateSink,
    ) {
        let mut events = mem::take(&mut self.queued_events);
        let mut published = Vec::new();

        loop {
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            if events.is_empty() {
                break;
            }

            notify(&events, economy, game);

            let towers = query::tower_view(&self.world);
            let hostiles = query::hostile_view(&self.world);
            self.targeting
                .handle(&events, &towers, &hostiles, &mut self.targets);
            self.combat
                .handle(&events, &towers, &self.targets, &hostiles, &mut commands);
            self.waves.handle(&events, &mut commands, &mut published);
            self.pathing
                .handle(&events, &mut self.provider, &mut commands);

            notify(&published, economy, game);
            published.clear();
            events.clear();
        }
    }
}

fn notify(events: &[Event], economy: &mut dyn EconomySink, game: &mut dyn GameStateSink) {
    for event in events {
        match *event {
            Event::HostileDefeated { score, gold, .. } => economy.hostile_defeated(score, gold),
            Event::HostileReachedEnd { damage, .. } => economy.hostile_reached_end(damage),
            Event::WaveStarted { wave, .. } => game.wave_started(wave),
            Event::WaveCompleted { wave } => game.wave_completed(wave),
            Event::AllWavesComplete { .. } => game.victory(),
            _ => {}
        }
    }
}
