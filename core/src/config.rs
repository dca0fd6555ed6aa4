//! Data-driven tuning for hostiles, towers, waves and the simulation loop.
//!
//! Every type derives serde with `#[serde(default)]`, so partial TOML files
//! only override the fields they mention.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{HostileKind, TargetPriority, TowerKind, Vec2};

/// Converts a configured number of seconds into a duration.
///
/// Negative, non-finite or out-of-range values collapse to zero.
#[must_use]
pub fn seconds(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.max(0.0)).unwrap_or_default()
}

/// Linear per-level stat: `base + per_level × (level − 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelCurve {
    /// Value at level one.
    pub base: f32,
    /// Increment per level; negative increments are treated as zero.
    pub per_level: f32,
}

impl LevelCurve {
    /// Creates a curve from its base value and per-level increment.
    #[must_use]
    pub const fn new(base: f32, per_level: f32) -> Self {
        Self { base, per_level }
    }

    /// Evaluates the curve at the provided one-based level.
    #[must_use]
    pub fn at(&self, level: u8) -> f32 {
        let steps = f32::from(level.saturating_sub(1));
        self.base + self.per_level.max(0.0) * steps
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

/// Qualitative upgrade that becomes available at a given level and stays on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unlock<T> {
    /// First level at which the value applies.
    pub level: u8,
    /// Unlocked value.
    pub value: T,
}

impl<T> Unlock<T> {
    /// Creates an unlock that activates at `level`.
    #[must_use]
    pub const fn new(level: u8, value: T) -> Self {
        Self { level, value }
    }

    /// Returns the value when `level` has reached the unlock level.
    #[must_use]
    pub fn at(&self, level: u8) -> Option<&T> {
        (level >= self.level).then_some(&self.value)
    }
}

fn unlocked<T>(unlock: &Option<Unlock<T>>, level: u8) -> Option<&T> {
    unlock.as_ref().and_then(|unlock| unlock.at(level))
}

/// Fan of simultaneous shots fired by a single-target tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiShot {
    /// Number of shots per attack.
    pub shots: u8,
    /// Total angle covered by the fan.
    pub spread_degrees: f32,
}

/// Multiplicative movement slow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Speed multiplier in `[0, 1]`.
    pub factor: f32,
    /// Lifetime of the slow in seconds.
    pub duration_secs: f32,
}

impl SlowEffect {
    /// Speed multiplier clamped to `[0, 1]`.
    #[must_use]
    pub fn clamped_factor(&self) -> f32 {
        if self.factor.is_nan() {
            1.0
        } else {
            self.factor.clamp(0.0, 1.0)
        }
    }

    /// Lifetime of the slow.
    #[must_use]
    pub fn duration(&self) -> Duration {
        seconds(self.duration_secs)
    }
}

/// Secondary hops travelling from a struck hostile to its neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    /// Number of hops after the primary hit.
    pub hops: u8,
    /// Search radius around the previous hit.
    pub radius: f32,
    /// Fraction of the original damage applied by every hop.
    pub damage_fraction: f32,
    /// Delay between hops in seconds.
    pub delay_secs: f32,
}

/// Archetype-specific attack behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum AttackProfile {
    /// Single-target projectiles with an optional multi-shot unlock.
    Projectile {
        /// Multi-shot fan unlocked by upgrades.
        #[serde(default)]
        multishot: Option<Unlock<MultiShot>>,
    },
    /// Area damage with linear falloff.
    Explosive {
        /// Radius of the explosion.
        explosion_radius: f32,
    },
    /// Continuous beam.
    Beam {
        /// Slow reapplied while the beam is on a target.
        #[serde(default)]
        slow: Option<Unlock<SlowEffect>>,
        /// Number of simultaneously illuminated hostiles.
        #[serde(default)]
        penetration: Option<Unlock<u8>>,
    },
    /// Multi-point projectiles with slow and chain unlocks.
    Chained {
        /// Number of emission points, each aimed at a distinct hostile.
        emission_points: u8,
        /// Slow applied on impact.
        #[serde(default)]
        slow: Option<Unlock<SlowEffect>>,
        /// Chain triggered on impact.
        #[serde(default)]
        chain: Option<Unlock<ChainSpec>>,
    },
}

/// Tuning for one tower archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerProfile {
    /// Highest reachable level.
    pub max_level: u8,
    /// Damage per attack (per second for beams).
    pub damage: LevelCurve,
    /// Targeting range.
    pub range: LevelCurve,
    /// Attacks per second.
    pub attack_rate: LevelCurve,
    /// Projectile travel speed; `None` resolves hits on launch.
    pub projectile_speed: Option<f32>,
    /// Priority assigned to freshly placed towers.
    pub default_priority: TargetPriority,
    /// Attack behaviour.
    pub attack: AttackProfile,
}

/// Level-resolved stats of a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Damage per attack (per second for beams).
    pub damage: f32,
    /// Targeting range.
    pub range: f32,
    /// Attacks per second.
    pub attack_rate: f32,
    /// Number of hostiles the tower engages at once.
    pub max_targets: usize,
}

impl TowerStats {
    /// Time between attacks; zero when the attack rate is not positive.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        if self.attack_rate > 0.0 {
            seconds(self.attack_rate.recip())
        } else {
            Duration::ZERO
        }
    }
}

impl TowerProfile {
    /// Clamps a requested level into `1..=max_level`.
    #[must_use]
    pub fn clamp_level(&self, level: u8) -> u8 {
        level.clamp(1, self.max_level.max(1))
    }

    /// Resolves the stats at the provided level.
    #[must_use]
    pub fn stats(&self, level: u8) -> TowerStats {
        let level = self.clamp_level(level);
        TowerStats {
            damage: self.damage.at(level),
            range: self.range.at(level),
            attack_rate: self.attack_rate.at(level),
            max_targets: self.max_targets(level),
        }
    }

    /// Number of hostiles engaged at once at the provided level.
    #[must_use]
    pub fn max_targets(&self, level: u8) -> usize {
        match &self.attack {
            AttackProfile::Projectile { .. } | AttackProfile::Explosive { .. } => 1,
            AttackProfile::Beam { penetration, .. } => {
                usize::from(unlocked(penetration, level).copied().unwrap_or(1).max(1))
            }
            AttackProfile::Chained {
                emission_points, ..
            } => usize::from((*emission_points).max(1)),
        }
    }

    /// Multi-shot fan active at the provided level.
    #[must_use]
    pub fn multishot(&self, level: u8) -> Option<MultiShot> {
        match &self.attack {
            AttackProfile::Projectile { multishot } => unlocked(multishot, level).copied(),
            _ => None,
        }
    }

    /// Slow applied by the tower at the provided level.
    #[must_use]
    pub fn slow(&self, level: u8) -> Option<SlowEffect> {
        match &self.attack {
            AttackProfile::Beam { slow, .. } | AttackProfile::Chained { slow, .. } => {
                unlocked(slow, level).copied()
            }
            _ => None,
        }
    }

    /// Chain behaviour active at the provided level.
    #[must_use]
    pub fn chain(&self, level: u8) -> Option<ChainSpec> {
        match &self.attack {
            AttackProfile::Chained { chain, .. } => unlocked(chain, level).copied(),
            _ => None,
        }
    }

    /// Stock arrow tower.
    #[must_use]
    pub fn arrow() -> Self {
        Self {
            max_level: 3,
            damage: LevelCurve::new(10.0, 5.0),
            range: LevelCurve::new(5.0, 0.5),
            attack_rate: LevelCurve::new(1.0, 0.25),
            projectile_speed: Some(20.0),
            default_priority: TargetPriority::First,
            attack: AttackProfile::Projectile {
                multishot: Some(Unlock::new(
                    3,
                    MultiShot {
                        shots: 3,
                        spread_degrees: 20.0,
                    },
                )),
            },
        }
    }

    /// Stock cannon tower.
    #[must_use]
    pub fn cannon() -> Self {
        Self {
            max_level: 3,
            damage: LevelCurve::new(25.0, 10.0),
            range: LevelCurve::new(4.0, 0.5),
            attack_rate: LevelCurve::new(0.5, 0.1),
            projectile_speed: Some(12.0),
            default_priority: TargetPriority::First,
            attack: AttackProfile::Explosive {
                explosion_radius: 2.0,
            },
        }
    }

    /// Stock laser tower.
    #[must_use]
    pub fn laser() -> Self {
        Self {
            max_level: 3,
            damage: LevelCurve::new(15.0, 5.0),
            range: LevelCurve::new(4.5, 0.5),
            attack_rate: LevelCurve::new(1.0, 0.0),
            projectile_speed: None,
            default_priority: TargetPriority::Closest,
            attack: AttackProfile::Beam {
                slow: Some(Unlock::new(
                    2,
                    SlowEffect {
                        factor: 0.7,
                        duration_secs: 1.0,
                    },
                )),
                penetration: Some(Unlock::new(3, 3)),
            },
        }
    }

    /// Stock magic tower.
    #[must_use]
    pub fn magic() -> Self {
        Self {
            max_level: 3,
            damage: LevelCurve::new(12.0, 4.0),
            range: LevelCurve::new(5.0, 0.5),
            attack_rate: LevelCurve::new(0.8, 0.1),
            projectile_speed: Some(15.0),
            default_priority: TargetPriority::First,
            attack: AttackProfile::Chained {
                emission_points: 2,
                slow: Some(Unlock::new(
                    2,
                    SlowEffect {
                        factor: 0.5,
                        duration_secs: 2.0,
                    },
                )),
                chain: Some(Unlock::new(
                    3,
                    ChainSpec {
                        hops: 3,
                        radius: 3.0,
                        damage_fraction: 0.5,
                        delay_secs: 0.1,
                    },
                )),
            },
        }
    }
}

impl Default for TowerProfile {
    fn default() -> Self {
        Self::arrow()
    }
}

fn default_arrow() -> TowerProfile {
    TowerProfile::arrow()
}

fn default_cannon() -> TowerProfile {
    TowerProfile::cannon()
}

fn default_laser() -> TowerProfile {
    TowerProfile::laser()
}

fn default_magic() -> TowerProfile {
    TowerProfile::magic()
}

/// Profiles for every tower archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerProfiles {
    /// Arrow tower tuning.
    #[serde(default = "default_arrow")]
    pub arrow: TowerProfile,
    /// Cannon tower tuning.
    #[serde(default = "default_cannon")]
    pub cannon: TowerProfile,
    /// Laser tower tuning.
    #[serde(default = "default_laser")]
    pub laser: TowerProfile,
    /// Magic tower tuning.
    #[serde(default = "default_magic")]
    pub magic: TowerProfile,
}

impl TowerProfiles {
    /// Profile for the provided archetype.
    #[must_use]
    pub fn get(&self, kind: TowerKind) -> &TowerProfile {
        match kind {
            TowerKind::Arrow => &self.arrow,
            TowerKind::Cannon => &self.cannon,
            TowerKind::Laser => &self.laser,
            TowerKind::Magic => &self.magic,
        }
    }
}

impl Default for TowerProfiles {
    fn default() -> Self {
        Self {
            arrow: TowerProfile::arrow(),
            cannon: TowerProfile::cannon(),
            laser: TowerProfile::laser(),
            magic: TowerProfile::magic(),
        }
    }
}

/// Tuning for one hostile movement profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileProfile {
    /// Health before the wave multiplier.
    pub max_health: f32,
    /// Base movement speed in world units per second.
    pub speed: f32,
    /// Heading smoothing rate per second.
    pub turn_rate: f32,
    /// Score awarded on defeat.
    pub score: u32,
    /// Currency awarded on defeat.
    pub gold: u32,
    /// Damage dealt to the defended point on leak.
    pub leak_damage: u32,
}

impl Default for HostileProfile {
    fn default() -> Self {
        Self::slime()
    }
}

impl HostileProfile {
    /// Stock baseline walker.
    #[must_use]
    pub const fn slime() -> Self {
        Self {
            max_health: 60.0,
            speed: 1.5,
            turn_rate: 8.0,
            score: 10,
            gold: 5,
            leak_damage: 1,
        }
    }

    /// Stock fast walker.
    #[must_use]
    pub const fn runner() -> Self {
        Self {
            max_health: 35.0,
            speed: 2.6,
            turn_rate: 12.0,
            score: 12,
            gold: 6,
            leak_damage: 1,
        }
    }

    /// Stock durable walker.
    #[must_use]
    pub const fn brute() -> Self {
        Self {
            max_health: 160.0,
            speed: 0.9,
            turn_rate: 4.0,
            score: 25,
            gold: 12,
            leak_damage: 3,
        }
    }
}

fn default_slime() -> HostileProfile {
    HostileProfile::slime()
}

fn default_runner() -> HostileProfile {
    HostileProfile::runner()
}

fn default_brute() -> HostileProfile {
    HostileProfile::brute()
}

/// Profiles for every hostile kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileProfiles {
    /// Slime tuning.
    #[serde(default = "default_slime")]
    pub slime: HostileProfile,
    /// Runner tuning.
    #[serde(default = "default_runner")]
    pub runner: HostileProfile,
    /// Brute tuning.
    #[serde(default = "default_brute")]
    pub brute: HostileProfile,
}

impl HostileProfiles {
    /// Profile for the provided kind.
    #[must_use]
    pub const fn get(&self, kind: HostileKind) -> &HostileProfile {
        match kind {
            HostileKind::Slime => &self.slime,
            HostileKind::Runner => &self.runner,
            HostileKind::Brute => &self.brute,
        }
    }
}

impl Default for HostileProfiles {
    fn default() -> Self {
        Self {
            slime: HostileProfile::slime(),
            runner: HostileProfile::runner(),
            brute: HostileProfile::brute(),
        }
    }
}

/// Wave pacing and difficulty escalation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Number of waves before victory.
    pub total_waves: u32,
    /// Hostiles spawned per wave.
    pub enemies_per_wave: u32,
    /// Delay between spawns inside a wave.
    pub spawn_interval_secs: f32,
    /// Countdown between a completed wave and the next.
    pub inter_wave_delay_secs: f32,
    /// Health multiplier increase per wave.
    pub health_increase_per_wave: f32,
    /// Every n-th wave ends with an elite; zero disables elites.
    pub elite_cadence: u32,
    /// Extra health multiplier carried by the elite.
    pub elite_bonus: f32,
    /// Start the next wave when the countdown ends.
    pub auto_start: bool,
    /// Hostile kinds cycled through while spawning.
    pub roster: Vec<HostileKind>,
}

impl WaveConfig {
    /// Health multiplier of the provided one-based wave.
    #[must_use]
    pub fn health_multiplier(&self, wave: u32) -> f32 {
        1.0 + self.health_increase_per_wave * wave.saturating_sub(1) as f32
    }

    /// Reports whether the provided wave ends with an elite.
    #[must_use]
    pub fn is_elite_wave(&self, wave: u32) -> bool {
        self.elite_cadence != 0 && wave != 0 && wave % self.elite_cadence == 0
    }

    /// Kind of the n-th spawn (zero-based) inside a wave.
    #[must_use]
    pub fn kind_for(&self, spawn_index: u32) -> HostileKind {
        if self.roster.is_empty() {
            return HostileKind::Slime;
        }
        let slot = spawn_index as usize % self.roster.len();
        self.roster[slot]
    }

    /// Delay between spawns.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        seconds(self.spawn_interval_secs)
    }

    /// Countdown between waves.
    #[must_use]
    pub fn inter_wave_delay(&self) -> Duration {
        seconds(self.inter_wave_delay_secs)
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            total_waves: 10,
            enemies_per_wave: 5,
            spawn_interval_secs: 1.0,
            inter_wave_delay_secs: 5.0,
            health_increase_per_wave: 0.2,
            elite_cadence: 5,
            elite_bonus: 1.0,
            auto_start: true,
            roster: vec![HostileKind::Slime, HostileKind::Runner, HostileKind::Brute],
        }
    }
}

/// Shape of the zig-zag path used when no real path is published.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPath {
    /// First waypoint.
    pub origin: Vec2,
    /// Number of segments after the origin.
    pub segments: u32,
    /// Distance travelled along +x per segment.
    pub segment_length: f32,
    /// Lateral offset alternating between segments.
    pub amplitude: f32,
}

impl Default for FallbackPath {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            segments: 6,
            segment_length: 4.0,
            amplitude: 2.0,
        }
    }
}

/// Retry policy for path assignment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    /// Retries before the fallback path is used.
    pub max_retries: u8,
    /// Delay between retries.
    pub retry_delay_secs: f32,
    /// Fallback path shape.
    pub fallback: FallbackPath,
}

impl PathingConfig {
    /// Delay between retries.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        seconds(self.retry_delay_secs)
    }
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_secs: 0.5,
            fallback: FallbackPath::default(),
        }
    }
}

/// Tuning owned by the authoritative world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Distance at which a hostile snaps onto its waypoint.
    pub arrival_threshold: f32,
    /// Optional per-key cap for every entity pool.
    pub pool_capacity: Option<usize>,
    /// Hostile tuning.
    pub hostiles: HostileProfiles,
    /// Tower tuning.
    pub towers: TowerProfiles,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: 0.05,
            pool_capacity: None,
            hostiles: HostileProfiles::default(),
            towers: TowerProfiles::default(),
        }
    }
}

/// Complete simulation tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Length of one movement step.
    pub fixed_timestep_secs: f32,
    /// Interval between full target re-evaluations.
    pub targeting_refresh_secs: f32,
    /// World tuning.
    pub world: WorldConfig,
    /// Path retry policy.
    pub pathing: PathingConfig,
    /// Wave pacing.
    pub waves: WaveConfig,
}

impl SimulationConfig {
    /// Length of one movement step.
    #[must_use]
    pub fn fixed_timestep(&self) -> Duration {
        seconds(self.fixed_timestep_secs)
    }

    /// Interval between full target re-evaluations.
    #[must_use]
    pub fn targeting_refresh(&self) -> Duration {
        seconds(self.targeting_refresh_secs)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_timestep_secs: 0.02,
            targeting_refresh_secs: 0.2,
            world: WorldConfig::default(),
            pathing: PathingConfig::default(),
            waves: WaveConfig::default(),
        }
    }
}
