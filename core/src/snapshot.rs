//! Serializable records capturing enough state to resume a simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{HostileKind, PoolError, TargetPriority, TowerId, TowerKind, Vec2};

/// Version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 2;

/// Complete resumable state of a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Format version, see [`SNAPSHOT_VERSION`].
    pub version: u32,
    /// Wave scheduler progress.
    pub wave: WaveRecord,
    /// Placed towers.
    pub towers: Vec<TowerRecord>,
    /// Hostiles on the field.
    pub hostiles: Vec<HostileRecord>,
}

/// Wave scheduler progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRecord {
    /// One-based index of the current wave, zero before the first.
    pub index: u32,
    /// Hostiles spawned in the current wave.
    pub spawned: u32,
    /// Hostiles of the current wave still on the field or unspawned.
    pub remaining: u32,
}

/// Persisted tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerRecord {
    /// Identifier of the tower.
    pub id: TowerId,
    /// Archetype.
    pub kind: TowerKind,
    /// Position on the play plane.
    pub position: Vec2,
    /// Level.
    pub level: u8,
    /// Target priority.
    pub priority: TargetPriority,
}

/// Persisted hostile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileRecord {
    /// Movement profile.
    pub kind: HostileKind,
    /// Wave that owns the hostile.
    pub wave: u32,
    /// Current health.
    pub health: f32,
    /// Maximum health after wave scaling.
    pub max_health: f32,
    /// Wave health multiplier (elite bonus included).
    pub health_multiplier: f32,
    /// Whether the hostile is an elite.
    pub elite: bool,
    /// Path the hostile walks; empty while it waits for a path.
    pub waypoints: Vec<Vec2>,
    /// Index of the waypoint the hostile walks toward.
    pub waypoint_index: usize,
    /// Distance already travelled along the path.
    pub progress: f32,
    /// Position on the play plane.
    pub position: Vec2,
}

/// Failures raised while restoring a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RestoreError {
    /// The snapshot was written by an incompatible version.
    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Version understood by this build.
        expected: u32,
    },
    /// The wave index lies beyond the configured number of waves.
    #[error("wave {wave} exceeds the configured {total_waves} waves")]
    WaveOutOfRange {
        /// Wave index found in the snapshot.
        wave: u32,
        /// Configured number of waves.
        total_waves: u32,
    },
    /// A hostile could not be reacquired from its pool.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl SimSnapshot {
    /// Checks the version header.
    pub fn check_version(&self) -> Result<(), RestoreError> {
        if self.version == SNAPSHOT_VERSION {
            Ok(())
        } else {
            Err(RestoreError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            })
        }
    }
}
