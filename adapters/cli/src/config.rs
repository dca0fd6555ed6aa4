use std::{fs, path::Path};

use anyhow::{Context, Result};
use rampart_core::{SimulationConfig, TowerKind, Vec2};
use serde::{Deserialize, Serialize};

/// Scenario loaded from TOML: simulation tuning, the lane and the defences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Tuning forwarded to the simulation.
    pub(crate) simulation: SimulationConfig,
    /// Waypoints every hostile walks; empty leaves paths unpublished.
    pub(crate) path: Vec<Vec2>,
    /// Towers placed before the first wave.
    pub(crate) towers: Vec<TowerPlacement>,
    /// Health of the defended point.
    pub(crate) defender_health: u32,
}

/// Tower placed by the scenario.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TowerPlacement {
    pub(crate) kind: TowerKind,
    pub(crate) position: Vec2,
    #[serde(default = "first_level")]
    pub(crate) level: u8,
}

fn first_level() -> u8 {
    1
}

impl CliConfig {
    /// Reads and parses a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            path: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(8.0, 0.0),
                Vec2::new(8.0, 6.0),
                Vec2::new(16.0, 6.0),
                Vec2::new(16.0, 0.0),
                Vec2::new(24.0, 0.0),
            ],
            towers: vec![
                TowerPlacement {
                    kind: TowerKind::Arrow,
                    position: Vec2::new(4.0, 1.5),
                    level: 1,
                },
                TowerPlacement {
                    kind: TowerKind::Cannon,
                    position: Vec2::new(10.0, 3.0),
                    level: 1,
                },
                TowerPlacement {
                    kind: TowerKind::Laser,
                    position: Vec2::new(12.0, 4.5),
                    level: 2,
                },
                TowerPlacement {
                    kind: TowerKind::Magic,
                    position: Vec2::new(18.0, 3.0),
                    level: 3,
                },
            ],
            defender_health: 20,
        }
    }
}
