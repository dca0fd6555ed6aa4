//! Collaborator traits the simulation reports to or pulls from.

use std::collections::BTreeMap;

use crate::{HostileKind, Vec2};

/// Source of waypoint paths for freshly spawned hostiles.
pub trait PathProvider {
    /// Returns the waypoints for the kind, or `None` while none is published.
    fn path_for(&mut self, kind: HostileKind) -> Option<Vec<Vec2>>;
}

/// Receives currency and defender-damage notifications.
pub trait EconomySink {
    /// Called once per defeated hostile.
    fn hostile_defeated(&mut self, score: u32, gold: u32);

    /// Called once per hostile that reached the end of its path.
    fn hostile_reached_end(&mut self, damage: u32);
}

/// Receives wave progress notifications.
pub trait GameStateSink {
    /// Called once when the final wave is cleared.
    fn victory(&mut self);

    /// Called when a wave starts spawning.
    fn wave_started(&mut self, _wave: u32) {}

    /// Called when a wave is cleared.
    fn wave_completed(&mut self, _wave: u32) {}
}

impl EconomySink for () {
    fn hostile_defeated(&mut self, _score: u32, _gold: u32) {}

    fn hostile_reached_end(&mut self, _damage: u32) {}
}

impl GameStateSink for () {
    fn victory(&mut self) {}
}

/// Path provider backed by a fixed table of waypoints per kind.
///
/// Kinds without their own entry use the shared default path.
#[derive(Clone, Debug, Default)]
pub struct StaticPaths {
    default: Option<Vec<Vec2>>,
    per_kind: BTreeMap<HostileKind, Vec<Vec2>>,
}

impl StaticPaths {
    /// Creates a provider that hands every kind the same path.
    #[must_use]
    pub fn shared(waypoints: Vec<Vec2>) -> Self {
        Self {
            default: Some(waypoints),
            per_kind: BTreeMap::new(),
        }
    }

    /// Creates a provider that has not published any path yet.
    #[must_use]
    pub fn unpublished() -> Self {
        Self::default()
    }

    /// Publishes (or replaces) the path used by one kind.
    pub fn publish(&mut self, kind: HostileKind, waypoints: Vec<Vec2>) {
        let _ = self.per_kind.insert(kind, waypoints);
    }
}

impl PathProvider for StaticPaths {
    fn path_for(&mut self, kind: HostileKind) -> Option<Vec<Vec2>> {
        self.per_kind
            .get(&kind)
            .or(self.default.as_ref())
            .filter(|waypoints| !waypoints.is_empty())
            .cloned()
    }
}
