//! Read-only views that systems and presentation layers query from the world.

use std::time::Duration;

use crate::{
    HostileId, HostileKind, ProjectileId, ProjectileKind, TargetPriority, TowerId, TowerKind, Vec2,
};

/// Immutable description of a live hostile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostileSnapshot {
    /// Handle of the hostile.
    pub id: HostileId,
    /// Movement profile.
    pub kind: HostileKind,
    /// Position on the play plane.
    pub position: Vec2,
    /// Smoothed facing direction (unit length once moving).
    pub heading: Vec2,
    /// Current health.
    pub health: f32,
    /// Maximum health after wave scaling.
    pub max_health: f32,
    /// Distance travelled along the path.
    pub progress: f32,
    /// Effective speed after status effects.
    pub speed: f32,
    /// Whether the hostile is an elite.
    pub elite: bool,
    /// Wave that owns the hostile.
    pub wave: u32,
}

impl HostileSnapshot {
    /// Current health as a fraction of maximum health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Targetable hostiles ordered by handle.
#[derive(Clone, Debug, Default)]
pub struct HostileView {
    snapshots: Vec<HostileSnapshot>,
}

impl HostileView {
    /// Builds a view, sorting the snapshots by handle.
    #[must_use]
    pub fn new(mut snapshots: Vec<HostileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the snapshots in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &HostileSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a hostile.
    #[must_use]
    pub fn get(&self, id: HostileId) -> Option<&HostileSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of hostiles in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no hostile is targetable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable description of a placed tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier of the tower.
    pub id: TowerId,
    /// Archetype.
    pub kind: TowerKind,
    /// Position on the play plane.
    pub position: Vec2,
    /// Current level.
    pub level: u8,
    /// Active target priority.
    pub priority: TargetPriority,
    /// Damage per attack (per second for beams).
    pub damage: f32,
    /// Targeting range.
    pub range: f32,
    /// Attacks per second.
    pub attack_rate: f32,
    /// Time until the next attack is allowed.
    pub cooldown_remaining: Duration,
    /// Number of hostiles engaged at once.
    pub max_targets: usize,
    /// Projectile speed, `None` for instant resolution.
    pub projectile_speed: Option<f32>,
    /// Whether the tower's beam is currently enabled.
    pub beam_active: bool,
}

impl TowerSnapshot {
    /// Remaining cooldown as a fraction of the full cooldown.
    #[must_use]
    pub fn cooldown_fraction(&self) -> f32 {
        if self.attack_rate <= 0.0 {
            return 0.0;
        }
        (self.cooldown_remaining.as_secs_f32() * self.attack_rate).clamp(0.0, 1.0)
    }

    /// Reports whether the tower may attack.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining.is_zero()
    }
}

/// Placed towers ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Builds a view, sorting the snapshots by identifier.
    #[must_use]
    pub fn new(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a tower.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }
}

/// Hostiles currently engaged by a tower, best-scored first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that engages the hostiles.
    pub tower: TowerId,
    /// Engaged hostiles in descending score order.
    pub hostiles: Vec<HostileId>,
}

/// Presentation state of a laser beam.
#[derive(Clone, Debug, PartialEq)]
pub struct BeamSnapshot {
    /// Tower emitting the beam.
    pub tower: TowerId,
    /// Beam origin.
    pub origin: Vec2,
    /// Positions of the illuminated hostiles.
    pub endpoints: Vec<Vec2>,
    /// Whether the beam is drawn.
    pub enabled: bool,
}

/// Beams of every laser tower ordered by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct BeamView {
    beams: Vec<BeamSnapshot>,
}

impl BeamView {
    /// Builds a view, sorting the beams by tower.
    #[must_use]
    pub fn new(mut beams: Vec<BeamSnapshot>) -> Self {
        beams.sort_by_key(|beam| beam.tower);
        Self { beams }
    }

    /// Iterator over the beams.
    pub fn iter(&self) -> impl Iterator<Item = &BeamSnapshot> {
        self.beams.iter()
    }
}

/// Presentation state of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Handle of the projectile.
    pub id: ProjectileId,
    /// Pool prototype.
    pub kind: ProjectileKind,
    /// Tower that fired it.
    pub tower: TowerId,
    /// Current position.
    pub position: Vec2,
    /// Point it travels to.
    pub aim: Vec2,
}

/// Projectiles in flight ordered by handle.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Builds a view, sorting the snapshots by handle.
    #[must_use]
    pub fn new(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Phase of the wave state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// No wave started yet.
    #[default]
    Idle,
    /// Hostiles of the current wave are spawning or alive.
    InProgress,
    /// Waiting for the next wave.
    Countdown,
    /// The final wave was cleared.
    AllComplete,
}

/// Presentation summary of the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStatus {
    /// Current phase.
    pub phase: WavePhase,
    /// One-based index of the current wave, zero before the first.
    pub wave: u32,
    /// Number of waves before victory.
    pub total_waves: u32,
    /// Hostiles spawned in the current wave.
    pub spawned: u32,
    /// Hostiles of the current wave not yet defeated or leaked.
    pub remaining: u32,
    /// Time left before the next wave, when counting down.
    pub countdown: Option<Duration>,
}
