//! Per-hostile status effects with last-write-wins refresh semantics.

use std::{collections::BTreeMap, time::Duration};

use rampart_core::StatusKind;

/// Token identifying one application of a status.
///
/// Reversions carry the token they were scheduled with; a refresh issues a
/// new token so earlier reversions no longer match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusToken(u64);

/// Active status entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveStatus {
    /// Effect magnitude; a speed multiplier for slows.
    pub magnitude: f32,
    /// Simulation time at which the status lapses.
    pub expires_at: Duration,
    /// Token of the application that produced the entry.
    pub token: StatusToken,
}

/// Status effects attached to a single hostile.
#[derive(Clone, Debug, Default)]
pub struct StatusTable {
    entries: BTreeMap<StatusKind, ActiveStatus>,
    next_token: u64,
}

impl StatusTable {
    /// Applies a status, overwriting any previous entry of the same kind.
    pub fn apply(&mut self, kind: StatusKind, magnitude: f32, expires_at: Duration) -> StatusToken {
        let token = StatusToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        let _ = self.entries.insert(
            kind,
            ActiveStatus {
                magnitude,
                expires_at,
                token,
            },
        );
        token
    }

    /// Removes the entry when it still belongs to `token`.
    pub fn revert(&mut self, kind: StatusKind, token: StatusToken) -> bool {
        match self.entries.get(&kind) {
            Some(entry) if entry.token == token => {
                let _ = self.entries.remove(&kind);
                true
            }
            _ => false,
        }
    }

    /// Active entry for a kind.
    #[must_use]
    pub fn get(&self, kind: StatusKind) -> Option<&ActiveStatus> {
        self.entries.get(&kind)
    }

    /// Product of every active speed multiplier.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.entries
            .iter()
            .map(|(kind, entry)| match kind {
                StatusKind::Slow => entry.magnitude,
            })
            .product()
    }

    /// Drops every entry; issued tokens stay unique.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reports whether no status is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_overwrites_magnitude_and_expiry() {
        let mut table = StatusTable::default();
        let first = table.apply(StatusKind::Slow, 0.5, Duration::from_secs(2));
        let second = table.apply(StatusKind::Slow, 0.3, Duration::from_millis(1500));

        assert_eq!(table.speed_multiplier(), 0.3);
        assert_eq!(
            table.get(StatusKind::Slow).map(|entry| entry.expires_at),
            Some(Duration::from_millis(1500))
        );
        assert!(!table.revert(StatusKind::Slow, first));
        assert_eq!(table.speed_multiplier(), 0.3);
        assert!(table.revert(StatusKind::Slow, second));
        assert_eq!(table.speed_multiplier(), 1.0);
    }

    #[test]
    fn tokens_survive_clear() {
        let mut table = StatusTable::default();
        let before = table.apply(StatusKind::Slow, 0.5, Duration::from_secs(1));
        table.clear();
        assert!(table.is_empty());
        let after = table.apply(StatusKind::Slow, 0.5, Duration::from_secs(1));
        assert_ne!(before, after);
        assert!(!table.revert(StatusKind::Slow, before));
    }
}
