//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use rampart_core::{HostileId, TargetPriority, TowerId, TowerKind, TowerRecord, UpgradeError, Vec2};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Position of the tower on the play plane.
    pub(crate) position: Vec2,
    /// Current level, always inside the archetype's ladder.
    pub(crate) level: u8,
    /// Rule used to rank hostiles in range.
    pub(crate) priority: TargetPriority,
    /// Time until the tower may attack again.
    pub(crate) cooldown: Duration,
    /// Hostiles illuminated by the beam; empty while disabled.
    pub(crate) beam: Vec<HostileId>,
}

impl TowerState {
    pub(crate) fn record(&self) -> TowerRecord {
        TowerRecord {
            id: self.id,
            kind: self.kind,
            position: self.position,
            level: self.level,
            priority: self.priority,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and allocates its identifier.
    pub(crate) fn place(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        level: u8,
        priority: TargetPriority,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                position,
                level,
                priority,
                cooldown: Duration::ZERO,
                beam: Vec::new(),
            },
        );
        id
    }

    /// Reinserts a persisted tower under its original identifier.
    pub(crate) fn restore(&mut self, record: &TowerRecord, level: u8) {
        let _ = self.entries.insert(
            record.id,
            TowerState {
                id: record.id,
                kind: record.kind,
                position: record.position,
                level,
                priority: record.priority,
                cooldown: Duration::ZERO,
                beam: Vec::new(),
            },
        );
        if record.id >= self.next_tower_id {
            self.next_tower_id = TowerId::new(record.id.get().wrapping_add(1));
        }
    }

    /// Raises the tower level by one unless it is already at `max_level`.
    pub(crate) fn upgrade(&mut self, id: TowerId, max_level: u8) -> Result<u8, UpgradeError> {
        let tower = self
            .entries
            .get_mut(&id)
            .ok_or(UpgradeError::MissingTower)?;
        if tower.level >= max_level {
            return Err(UpgradeError::MaxLevel);
        }
        tower.level += 1;
        Ok(tower.level)
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Counts every cooldown down by `dt`, saturating at zero.
    pub(crate) fn tick(&mut self, dt: Duration) {
        for tower in self.entries.values_mut() {
            tower.cooldown = tower.cooldown.saturating_sub(dt);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }
}
