#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed wave scheduler that introduces hostiles in escalating batches.
//!
//! The scheduler is a pure system: it consumes world events, emits
//! `SpawnHostile` commands and publishes wave lifecycle events. Hostiles that
//! are defeated, leak or are rejected by the pool all free a slot of the wave
//! that owns them; a wave completes once every spawn was issued and no slot
//! remains occupied.

use std::time::Duration;

use rampart_core::{
    Command, Event, RestoreError, WaveConfig, WavePhase, WaveRecord, WaveStatus,
};

/// Wave state machine driving hostile introduction.
#[derive(Debug)]
pub struct WaveScheduler {
    config: WaveConfig,
    phase: WavePhase,
    wave: u32,
    spawned: u32,
    remaining: u32,
    spawn_accumulator: Duration,
    countdown: Duration,
}

impl WaveScheduler {
    /// Creates an idle scheduler using the provided pacing.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config,
            phase: WavePhase::Idle,
            wave: 0,
            spawned: 0,
            remaining: 0,
            spawn_accumulator: Duration::ZERO,
            countdown: Duration::ZERO,
        }
    }

    /// Consumes world events, emitting spawn commands and wave events.
    pub fn handle(
        &mut self,
        events: &[Event],
        commands: &mut Vec<Command>,
        published: &mut Vec<Event>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match *event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(dt),
                Event::HostileDefeated { wave, .. }
                | Event::HostileReachedEnd { wave, .. }
                | Event::HostileSpawnRejected { wave, .. } => self.release_slot(wave),
                _ => {}
            }
        }

        match self.phase {
            WavePhase::InProgress => {
                self.spawn_accumulator = self.spawn_accumulator.saturating_add(elapsed);
                self.spawn_due(commands);
                self.check_completion(published);
            }
            WavePhase::Countdown => {
                self.countdown = self.countdown.saturating_sub(elapsed);
                if self.countdown.is_zero() && self.config.auto_start {
                    let _ = self.start_next_wave(commands, published);
                }
            }
            WavePhase::Idle | WavePhase::AllComplete => {}
        }
    }

    /// Starts the next wave immediately when idle or counting down.
    ///
    /// Returns `false` while a wave is in progress or after the final wave.
    pub fn start_next_wave(
        &mut self,
        commands: &mut Vec<Command>,
        published: &mut Vec<Event>,
    ) -> bool {
        if !matches!(self.phase, WavePhase::Idle | WavePhase::Countdown) {
            tracing::debug!(phase = ?self.phase, "next wave requested while busy");
            return false;
        }
        if self.wave >= self.config.total_waves {
            return false;
        }

        self.wave += 1;
        self.phase = WavePhase::InProgress;
        self.spawned = 0;
        self.remaining = self.config.enemies_per_wave;
        self.countdown = Duration::ZERO;
        // The first hostile of a wave enters without waiting.
        self.spawn_accumulator = self.config.spawn_interval();

        tracing::info!(wave = self.wave, hostiles = self.remaining, "wave started");
        published.push(Event::WaveStarted {
            wave: self.wave,
            hostiles: self.remaining,
        });

        self.spawn_due(commands);
        self.check_completion(published);
        true
    }

    /// Returns to `Idle` with wave index zero, dropping pending timers.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Presentation summary of the current state.
    #[must_use]
    pub fn status(&self) -> WaveStatus {
        WaveStatus {
            phase: self.phase,
            wave: self.wave,
            total_waves: self.config.total_waves,
            spawned: self.spawned,
            remaining: self.remaining,
            countdown: (self.phase == WavePhase::Countdown).then_some(self.countdown),
        }
    }

    /// Captures the persisted progress of the scheduler.
    #[must_use]
    pub fn record(&self) -> WaveRecord {
        WaveRecord {
            index: self.wave,
            spawned: self.spawned,
            remaining: self.remaining,
        }
    }

    /// Resumes from persisted progress.
    ///
    /// A wave whose hostiles were all spawned and cleared resumes in the
    /// inter-wave countdown with the full delay.
    pub fn restore(&mut self, record: WaveRecord) -> Result<(), RestoreError> {
        if record.index > self.config.total_waves {
            return Err(RestoreError::WaveOutOfRange {
                wave: record.index,
                total_waves: self.config.total_waves,
            });
        }

        self.reset();
        if record.index == 0 {
            return Ok(());
        }

        let per_wave = self.config.enemies_per_wave;
        self.wave = record.index;
        self.spawned = record.spawned.min(per_wave);
        self.remaining = record.remaining.max(per_wave - self.spawned);

        if self.spawned == per_wave && self.remaining == 0 {
            if self.wave == self.config.total_waves {
                self.phase = WavePhase::AllComplete;
            } else {
                self.phase = WavePhase::Countdown;
                self.countdown = self.config.inter_wave_delay();
            }
        } else {
            self.phase = WavePhase::InProgress;
        }
        Ok(())
    }

    fn release_slot(&mut self, wave: u32) {
        if self.phase != WavePhase::InProgress || wave != self.wave {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
    }

    fn spawn_due(&mut self, commands: &mut Vec<Command>) {
        let interval = self.config.spawn_interval();
        while self.spawned < self.config.enemies_per_wave {
            if !interval.is_zero() {
                if self.spawn_accumulator < interval {
                    break;
                }
                self.spawn_accumulator -= interval;
            }
            commands.push(self.next_spawn());
        }
        if self.spawned == self.config.enemies_per_wave {
            self.spawn_accumulator = Duration::ZERO;
        }
    }

    fn next_spawn(&mut self) -> Command {
        let index = self.spawned;
        self.spawned += 1;

        let kind = self.config.kind_for(index);
        let last = self.spawned == self.config.enemies_per_wave;
        let elite = last && self.config.is_elite_wave(self.wave);
        let mut health_multiplier = self.config.health_multiplier(self.wave);
        if elite {
            health_multiplier += self.config.elite_bonus;
        }

        tracing::debug!(wave = self.wave, index, ?kind, elite, "spawning hostile");
        Command::SpawnHostile {
            kind,
            wave: self.wave,
            health_multiplier,
            elite,
        }
    }

    fn check_completion(&mut self, published: &mut Vec<Event>) {
        if self.phase != WavePhase::InProgress
            || self.spawned < self.config.enemies_per_wave
            || self.remaining > 0
        {
            return;
        }

        tracing::info!(wave = self.wave, "wave completed");
        published.push(Event::WaveCompleted { wave: self.wave });

        if self.wave >= self.config.total_waves {
            self.phase = WavePhase::AllComplete;
            tracing::info!(waves = self.wave, "all waves complete");
            published.push(Event::AllWavesComplete { waves: self.wave });
        } else {
            self.phase = WavePhase::Countdown;
            self.countdown = self.config.inter_wave_delay();
        }
    }
}
