#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Rampart scenario headless and prints a
//! summary of the outcome.

mod config;
mod snapshot_transfer;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rampart_core::{Command, EconomySink, GameStateSink, StaticPaths, WavePhase};
use rampart_runtime::Simulation;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

/// Runs a tower-defense scenario without rendering.
#[derive(Debug, Parser)]
#[command(name = "rampart", about = "Headless tower-defense combat simulation")]
struct Args {
    /// Scenario TOML; the bundled scenario is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run before stopping.
    #[arg(long, default_value_t = 300.0)]
    seconds: f32,

    /// Simulation steps per simulated second.
    #[arg(long, default_value_t = 60)]
    tick_hz: u32,

    /// Writes a resumable snapshot string to this file when the run ends.
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Resumes from a snapshot string written by --snapshot-out.
    #[arg(long)]
    restore: Option<PathBuf>,

    /// Skips inter-wave countdowns by starting each wave explicitly.
    #[arg(long)]
    manual_waves: bool,
}

#[derive(Debug, Default)]
struct Treasury {
    score: u32,
    gold: u32,
    kills: u32,
    leaks: u32,
    damage_taken: u32,
}

impl EconomySink for Treasury {
    fn hostile_defeated(&mut self, score: u32, gold: u32) {
        self.kills += 1;
        self.score += score;
        self.gold += gold;
    }

    fn hostile_reached_end(&mut self, damage: u32) {
        self.leaks += 1;
        self.damage_taken += damage;
    }
}

#[derive(Debug, Default)]
struct Campaign {
    waves_cleared: u32,
    victory: bool,
}

impl GameStateSink for Campaign {
    fn victory(&mut self) {
        self.victory = true;
    }

    fn wave_started(&mut self, wave: u32) {
        tracing::debug!(wave, "wave announced");
    }

    fn wave_completed(&mut self, _wave: u32) {
        self.waves_cleared += 1;
    }
}

/// Entry point for the Rampart command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    ensure!(args.tick_hz > 0, "--tick-hz must be positive");
    ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "--seconds must be a non-negative number"
    );

    let mut scenario = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    if args.manual_waves {
        scenario.simulation.waves.auto_start = false;
    }

    let provider = if scenario.path.is_empty() {
        StaticPaths::unpublished()
    } else {
        StaticPaths::shared(scenario.path.clone())
    };

    let mut simulation = match &args.restore {
        Some(path) => {
            let encoded = fs::read_to_string(path)
                .with_context(|| format!("failed to read snapshot at {}", path.display()))?;
            let snapshot = snapshot_transfer::decode(&encoded)
                .with_context(|| format!("failed to decode snapshot at {}", path.display()))?;
            Simulation::restore(scenario.simulation.clone(), provider, &snapshot)
                .context("failed to restore snapshot")?
        }
        None => {
            let mut simulation = Simulation::new(scenario.simulation.clone(), provider);
            for tower in &scenario.towers {
                simulation.submit(Command::PlaceTower {
                    kind: tower.kind,
                    position: tower.position,
                    level: tower.level,
                });
            }
            simulation
        }
    };
    if simulation.wave_status().phase == WavePhase::Idle {
        let _ = simulation.start_next_wave();
    }

    let dt = Duration::from_secs(1) / args.tick_hz;
    let steps = (args.seconds * args.tick_hz as f32).ceil() as u64;
    let mut treasury = Treasury::default();
    let mut campaign = Campaign::default();
    let mut elapsed = Duration::ZERO;

    for _ in 0..steps {
        simulation.step(dt, &mut treasury, &mut campaign);
        elapsed += dt;

        if campaign.victory || treasury.damage_taken >= scenario.defender_health {
            break;
        }
        if args.manual_waves && simulation.wave_status().phase == WavePhase::Countdown {
            let _ = simulation.start_next_wave();
        }
    }

    let status = simulation.wave_status();
    let defender_health = scenario
        .defender_health
        .saturating_sub(treasury.damage_taken);
    let outcome = if campaign.victory {
        "victory"
    } else if defender_health == 0 {
        "defeat"
    } else {
        "in progress"
    };
    tracing::info!(outcome, elapsed_secs = elapsed.as_secs_f32(), "run finished");

    println!("outcome:         {outcome}");
    println!("simulated:       {:.1}s", elapsed.as_secs_f32());
    println!(
        "wave:            {}/{} ({} cleared this run)",
        status.wave, status.total_waves, campaign.waves_cleared
    );
    println!("kills:           {}", treasury.kills);
    println!("leaks:           {}", treasury.leaks);
    println!("score:           {}", treasury.score);
    println!("gold:            {}", treasury.gold);
    println!(
        "defender health: {defender_health}/{}",
        scenario.defender_health
    );

    if let Some(path) = &args.snapshot_out {
        let encoded = snapshot_transfer::encode(&simulation.snapshot())
            .context("failed to encode snapshot")?;
        fs::write(path, format!("{encoded}\n"))
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        println!("snapshot:        {}", path.display());
    }

    Ok(())
}
