#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rampart combat simulation.
//!
//! This crate defines the message surface that connects the authoritative
//! world, the pure combat systems, and the adapters driving them. Systems
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values for systems to react to deterministically. Systems consume event
//! streams, query immutable views, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use glam::Vec2;

pub mod config;
pub mod hooks;
pub mod snapshot;
pub mod views;

pub use config::{
    AttackProfile, ChainSpec, FallbackPath, HostileProfile, HostileProfiles, LevelCurve,
    MultiShot, PathingConfig, SimulationConfig, SlowEffect, TowerProfile, TowerProfiles,
    TowerStats, Unlock, WaveConfig, WorldConfig,
};
pub use hooks::{EconomySink, GameStateSink, PathProvider, StaticPaths};
pub use snapshot::{
    HostileRecord, RestoreError, SimSnapshot, TowerRecord, WaveRecord, SNAPSHOT_VERSION,
};
pub use views::{
    BeamSnapshot, BeamView, HostileSnapshot, HostileView, ProjectileSnapshot, ProjectileView,
    TowerSnapshot, TowerTarget, TowerView, WavePhase, WaveStatus,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances hostile and projectile movement by one fixed timestep.
    FixedStep {
        /// Duration of the fixed timestep.
        dt: Duration,
    },
    /// Advances the simulation clock, deferred tasks, and tower cooldowns.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a hostile be acquired from the pool and introduced.
    SpawnHostile {
        /// Movement profile of the hostile.
        kind: HostileKind,
        /// Wave that owns the hostile for completion accounting.
        wave: u32,
        /// Multiplier applied to the profile's maximum health.
        health_multiplier: f32,
        /// Marks the hostile as an elite spawn.
        elite: bool,
    },
    /// Assigns an ordered waypoint path to a hostile awaiting one.
    AssignPath {
        /// Hostile receiving the path.
        hostile: HostileId,
        /// Waypoints to follow, starting at the spawn point.
        waypoints: Vec<Vec2>,
    },
    /// Schedules another path request for a hostile after a delay.
    RetryPath {
        /// Hostile still waiting for a path.
        hostile: HostileId,
        /// Number of retries performed once this one fires.
        attempt: u8,
        /// Delay before the request is repeated.
        delay: Duration,
    },
    /// Applies damage to a hostile.
    DamageHostile {
        /// Hostile receiving the damage.
        hostile: HostileId,
        /// Amount of health to remove.
        amount: f32,
    },
    /// Applies (or refreshes) a movement slow on a hostile.
    ApplySlow {
        /// Hostile receiving the status.
        hostile: HostileId,
        /// Magnitude and duration of the slow.
        slow: SlowEffect,
    },
    /// Requests placement of a tower on behalf of the external build service.
    PlaceTower {
        /// Archetype of the tower.
        kind: TowerKind,
        /// Position of the tower on the play plane.
        position: Vec2,
        /// Initial level, clamped to the archetype's ladder.
        level: u8,
    },
    /// Raises a tower's level by one step.
    UpgradeTower {
        /// Tower being upgraded.
        tower: TowerId,
    },
    /// Removes a tower (sold or despawned).
    RemoveTower {
        /// Tower being removed.
        tower: TowerId,
    },
    /// Changes the target priority rule used by a tower.
    SetTowerPriority {
        /// Tower being reconfigured.
        tower: TowerId,
        /// Priority rule to adopt.
        priority: TargetPriority,
    },
    /// Marks a tower as having fired, resetting its cooldown.
    TriggerAttack {
        /// Tower that fired.
        tower: TowerId,
    },
    /// Launches a projectile from a tower toward a fixed aim point.
    LaunchProjectile {
        /// Tower that owns the projectile.
        tower: TowerId,
        /// Pool prototype of the projectile.
        kind: ProjectileKind,
        /// Hostile the projectile was fired at.
        target: HostileId,
        /// Launch position.
        origin: Vec2,
        /// Point the projectile travels to.
        aim: Vec2,
        /// Travel speed in world units per second; `None` resolves on launch.
        speed: Option<f32>,
        /// Payload resolved on impact.
        effect: ImpactEffect,
    },
    /// Updates the set of hostiles illuminated by a tower's beam.
    SetBeam {
        /// Tower that owns the beam.
        tower: TowerId,
        /// Illuminated hostiles; empty disables the beam.
        targets: Vec<HostileId>,
    },
    /// Schedules a delayed chain hop.
    ScheduleChainHop {
        /// Hop to resolve once its delay elapses.
        hop: ChainHop,
    },
}

/// Events broadcast by the world (and the wave scheduler) after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a hostile was acquired from the pool.
    HostileSpawned {
        /// Handle of the hostile.
        hostile: HostileId,
        /// Movement profile of the hostile.
        kind: HostileKind,
        /// Wave that owns the hostile.
        wave: u32,
        /// Whether the hostile carries the elite bonus.
        elite: bool,
    },
    /// Reports that a spawn request could not be satisfied.
    HostileSpawnRejected {
        /// Movement profile that was requested.
        kind: HostileKind,
        /// Wave that requested the spawn.
        wave: u32,
        /// Reason the pool refused the acquisition.
        reason: PoolError,
    },
    /// Requests that a path be resolved for a hostile.
    PathRequested {
        /// Hostile awaiting a path.
        hostile: HostileId,
        /// Movement profile used to select the path.
        kind: HostileKind,
        /// Number of retries already performed.
        attempt: u8,
    },
    /// Reports that a hostile's health reached zero.
    HostileDefeated {
        /// Handle of the defeated hostile (already released).
        hostile: HostileId,
        /// Movement profile of the hostile.
        kind: HostileKind,
        /// Wave that owned the hostile.
        wave: u32,
        /// Score awarded for the kill.
        score: u32,
        /// Currency awarded for the kill.
        gold: u32,
    },
    /// Reports that a hostile completed its path.
    HostileReachedEnd {
        /// Handle of the hostile (already released).
        hostile: HostileId,
        /// Movement profile of the hostile.
        kind: HostileKind,
        /// Wave that owned the hostile.
        wave: u32,
        /// Damage dealt to the defended point.
        damage: u32,
    },
    /// Reports that a status effect lapsed on a live hostile.
    StatusExpired {
        /// Hostile whose status lapsed.
        hostile: HostileId,
        /// Kind of status that lapsed.
        kind: StatusKind,
    },
    /// Reports that a projectile reached its aim point.
    ProjectileImpact {
        /// Projectile that landed; `None` for projectiles resolved on launch.
        projectile: Option<ProjectileId>,
        /// Tower that fired the projectile.
        tower: TowerId,
        /// Hostile the projectile was fired at.
        target: HostileId,
        /// Impact position.
        point: Vec2,
        /// Payload to resolve.
        effect: ImpactEffect,
    },
    /// Reports that a delayed chain hop is ready to resolve.
    ChainHopDue {
        /// Hop to resolve.
        hop: ChainHop,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Archetype of the tower.
        kind: TowerKind,
        /// Position of the tower.
        position: Vec2,
        /// Level after clamping.
        level: u8,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level after the upgrade.
        level: u8,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Tower targeted by the request.
        tower: TowerId,
        /// Reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was removed from the world.
    TowerRemoved {
        /// Tower that was removed.
        tower: TowerId,
    },
    /// Reports that a removal request referenced an unknown tower.
    TowerRemovalRejected {
        /// Tower targeted by the request.
        tower: TowerId,
    },
    /// Announces that a wave began spawning.
    WaveStarted {
        /// One-based wave index.
        wave: u32,
        /// Number of hostiles the wave will spawn.
        hostiles: u32,
    },
    /// Announces that every hostile of a wave left the field.
    WaveCompleted {
        /// One-based wave index.
        wave: u32,
    },
    /// Announces that the final wave was completed.
    AllWavesComplete {
        /// Number of waves that were cleared.
        waves: u32,
    },
}

/// Handle to a pooled hostile: slot index plus generation.
///
/// A handle is valid only between acquire and release; releasing bumps the
/// slot generation so stale handles never alias a recycled hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostileId {
    index: u32,
    generation: u32,
}

impl HostileId {
    /// Creates a hostile handle from its slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the owning pool.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Handle to a pooled projectile: slot index plus generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId {
    index: u32,
    generation: u32,
}

impl ProjectileId {
    /// Creates a projectile handle from its slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the owning pool.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Movement profiles available to hostiles. Doubles as the pool prototype key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostileKind {
    /// Baseline walker.
    Slime,
    /// Fast, fragile walker.
    Runner,
    /// Slow, durable walker.
    Brute,
}

impl HostileKind {
    /// Every hostile kind in declaration order.
    pub const ALL: [HostileKind; 3] = [Self::Slime, Self::Runner, Self::Brute];
}

/// Pool prototypes for projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Single-target arrow.
    Arrow,
    /// Explosive shell.
    Cannonball,
    /// Magic bolt that can slow and chain.
    ArcaneBolt,
}

/// Tower archetypes understood by the attack resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Single-target projectile tower with a multi-shot upgrade.
    Arrow,
    /// Area damage tower with linear falloff.
    Cannon,
    /// Continuous beam tower that slows and penetrates.
    Laser,
    /// Multi-point tower that slows and chains.
    Magic,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; 4] = [Self::Arrow, Self::Cannon, Self::Laser, Self::Magic];

    /// Projectile prototype fired by the tower, if it fires projectiles at all.
    #[must_use]
    pub const fn projectile_kind(self) -> Option<ProjectileKind> {
        match self {
            Self::Arrow => Some(ProjectileKind::Arrow),
            Self::Cannon => Some(ProjectileKind::Cannonball),
            Self::Laser => None,
            Self::Magic => Some(ProjectileKind::ArcaneBolt),
        }
    }
}

/// Rule used to rank hostiles within a tower's range.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetPriority {
    /// Furthest along its path.
    #[default]
    First,
    /// Least progressed along its path.
    Last,
    /// Highest current health.
    Strongest,
    /// Lowest current health.
    Weakest,
    /// Nearest to the tower.
    Closest,
    /// Furthest from the tower while still in range.
    Furthest,
}

/// Status effects that can be attached to hostiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    /// Multiplicative movement-speed reduction.
    Slow,
}

/// Lifecycle of a hostile entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HostileState {
    /// Freshly acquired, not yet configured.
    #[default]
    Uninitialized,
    /// Waiting for the path provider.
    PathAssignmentPending,
    /// Following its waypoints.
    Moving,
    /// Health reached zero.
    Dead,
    /// Completed its path.
    ReachedEnd,
}

impl HostileState {
    /// Reports whether the hostile still occupies the field.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        !matches!(self, Self::Dead | Self::ReachedEnd)
    }
}

/// Payload carried by a projectile and resolved on impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImpactEffect {
    /// Full damage against the intended target.
    Direct {
        /// Damage applied to the target.
        damage: f32,
    },
    /// Area damage with linear falloff around the impact point.
    Explosive {
        /// Nominal damage at the impact point.
        damage: f32,
        /// Radius of the explosion.
        radius: f32,
    },
    /// Magic damage that may slow the target and start a chain.
    Arcane {
        /// Damage applied to the target.
        damage: f32,
        /// Slow applied to the target when unlocked.
        slow: Option<SlowEffect>,
        /// Chain behaviour when unlocked.
        chain: Option<ChainSpec>,
    },
}

/// Pending secondary hit travelling from one hostile to the next.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainHop {
    /// Tower that started the chain.
    pub tower: TowerId,
    /// Position the hop searches from once the last struck hostile is gone.
    pub origin: Vec2,
    /// Damage applied by the hop.
    pub damage: f32,
    /// Hops left including this one.
    pub remaining: u8,
    /// Search radius around the origin.
    pub radius: f32,
    /// Delay between successive hops.
    pub delay: Duration,
    /// Hostiles already struck by this chain.
    pub visited: Vec<HostileId>,
}

/// Typed failure returned by entity pools.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PoolError {
    /// A capped sub-pool has no inactive slot left.
    #[error("pool for prototype `{key}` is exhausted at {capacity} slots")]
    Exhausted {
        /// Prototype key whose sub-pool is full.
        key: String,
        /// Configured per-key capacity.
        capacity: usize,
    },
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// The tower already sits at its maximum level.
    MaxLevel,
    /// No tower with the provided identifier exists.
    MissingTower,
}

#[cfg(test)]
mod tests {
    use super::{HostileId, HostileState, PoolError, TargetPriority, TowerId, TowerKind};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn hostile_ids_order_by_index_then_generation() {
        let older = HostileId::new(3, 0);
        let newer = HostileId::new(3, 1);
        let other = HostileId::new(4, 0);
        assert!(older < newer);
        assert!(newer < other);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn pool_error_round_trips_through_bincode() {
        assert_round_trip(&PoolError::Exhausted {
            key: "Slime".to_owned(),
            capacity: 8,
        });
    }

    #[test]
    fn only_laser_fires_without_projectiles() {
        let projectile_less: Vec<_> = TowerKind::ALL
            .iter()
            .filter(|kind| kind.projectile_kind().is_none())
            .collect();
        assert_eq!(projectile_less, vec![&TowerKind::Laser]);
    }

    #[test]
    fn terminal_states_are_not_alive() {
        assert!(HostileState::Moving.is_alive());
        assert!(HostileState::PathAssignmentPending.is_alive());
        assert!(!HostileState::Dead.is_alive());
        assert!(!HostileState::ReachedEnd.is_alive());
    }

    #[test]
    fn default_priority_is_first() {
        assert_eq!(TargetPriority::default(), TargetPriority::First);
    }
}
