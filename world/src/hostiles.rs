//! Hostile movement, health and lifecycle.

use std::time::Duration;

use rampart_core::{
    HostileId, HostileKind, HostileProfile, HostileRecord, HostileSnapshot, HostileState,
    SlowEffect, StatusKind, Vec2,
};

use crate::{
    pool::Poolable,
    status::{StatusTable, StatusToken},
};

/// Result of advancing a hostile by one fixed step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    Moving,
    ReachedEnd,
}

/// Result of applying damage to a hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Ignored,
    Wounded,
    Killed,
}

#[derive(Clone, Debug)]
pub(crate) struct Hostile {
    pub(crate) kind: HostileKind,
    pub(crate) state: HostileState,
    pub(crate) wave: u32,
    pub(crate) elite: bool,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) health_multiplier: f32,
    base_speed: f32,
    turn_rate: f32,
    waypoints: Vec<Vec2>,
    pub(crate) waypoint_index: usize,
    pub(crate) position: Vec2,
    heading: Vec2,
    travelled: f32,
    statuses: StatusTable,
}

impl Poolable for Hostile {
    type Key = HostileKind;

    fn create(kind: HostileKind) -> Self {
        Self {
            kind,
            state: HostileState::Uninitialized,
            wave: 0,
            elite: false,
            health: 0.0,
            max_health: 0.0,
            health_multiplier: 1.0,
            base_speed: 0.0,
            turn_rate: 0.0,
            waypoints: Vec::new(),
            waypoint_index: 0,
            position: Vec2::ZERO,
            heading: Vec2::X,
            travelled: 0.0,
            statuses: StatusTable::default(),
        }
    }

    fn on_spawn(&mut self) {
        self.state = HostileState::Uninitialized;
        self.health = self.max_health;
        self.waypoints.clear();
        self.waypoint_index = 0;
        self.position = Vec2::ZERO;
        self.heading = Vec2::X;
        self.travelled = 0.0;
        self.statuses.clear();
    }

    fn on_despawn(&mut self) {
        self.waypoints.clear();
        self.statuses.clear();
    }
}

impl Hostile {
    /// Applies the profile and wave scaling, then waits for a path.
    pub(crate) fn configure(
        &mut self,
        profile: &HostileProfile,
        wave: u32,
        health_multiplier: f32,
        elite: bool,
    ) {
        self.wave = wave;
        self.elite = elite;
        self.health_multiplier = health_multiplier;
        self.max_health = (profile.max_health * health_multiplier).max(0.0);
        self.health = self.max_health;
        self.base_speed = profile.speed.max(0.0);
        self.turn_rate = profile.turn_rate.max(0.0);
        self.state = HostileState::PathAssignmentPending;
    }

    /// Starts walking `waypoints` from the first entry.
    pub(crate) fn assign_path(&mut self, waypoints: Vec<Vec2>) -> bool {
        let Some(start) = waypoints.first().copied() else {
            return false;
        };
        self.resume_path(waypoints, 1, start)
    }

    /// Continues walking `waypoints` toward `waypoint_index` from `position`.
    pub(crate) fn resume_path(
        &mut self,
        waypoints: Vec<Vec2>,
        waypoint_index: usize,
        position: Vec2,
    ) -> bool {
        if self.state != HostileState::PathAssignmentPending || waypoints.is_empty() {
            return false;
        }
        self.waypoint_index = waypoint_index.min(waypoints.len());
        self.position = position;
        self.heading = waypoints
            .get(self.waypoint_index)
            .map(|next| (*next - position).normalize_or_zero())
            .filter(|direction| *direction != Vec2::ZERO)
            .unwrap_or(Vec2::X);
        self.waypoints = waypoints;
        self.state = HostileState::Moving;
        true
    }

    /// Moves toward the current waypoint, snapping onto waypoints within `threshold`.
    pub(crate) fn advance(&mut self, dt: Duration, threshold: f32) -> Advance {
        if self.state != HostileState::Moving {
            return Advance::Moving;
        }

        let dt = dt.as_secs_f32();
        let mut budget = self.effective_speed() * dt;
        let mut turned = false;
        loop {
            let Some(target) = self.waypoints.get(self.waypoint_index).copied() else {
                self.state = HostileState::ReachedEnd;
                return Advance::ReachedEnd;
            };

            let offset = target - self.position;
            let distance = offset.length();
            if distance <= threshold {
                self.travelled += distance;
                self.position = target;
                self.waypoint_index += 1;
                continue;
            }
            if budget <= 0.0 {
                return Advance::Moving;
            }

            let direction = offset / distance;
            if !turned {
                self.turn_towards(direction, dt);
                turned = true;
            }

            let step = budget.min(distance);
            self.position += direction * step;
            self.travelled += step;
            budget -= step;
            if step < distance {
                return Advance::Moving;
            }
        }
    }

    fn turn_towards(&mut self, direction: Vec2, dt: f32) {
        let blend = 1.0 - (-self.turn_rate * dt).exp();
        let heading = self.heading + (direction - self.heading) * blend;
        self.heading = heading.try_normalize().unwrap_or(direction);
    }

    /// Subtracts health; only the first lethal hit reports `Killed`.
    pub(crate) fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.state.is_alive() || amount.is_nan() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.state = HostileState::Dead;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    pub(crate) fn apply_slow(&mut self, slow: &SlowEffect, now: Duration) -> (StatusToken, Duration) {
        let expires_at = now.saturating_add(slow.duration());
        let token = self
            .statuses
            .apply(StatusKind::Slow, slow.clamped_factor(), expires_at);
        (token, expires_at)
    }

    pub(crate) fn revert_status(&mut self, kind: StatusKind, token: StatusToken) -> bool {
        self.statuses.revert(kind, token)
    }

    /// Restores the distance travelled before a snapshot was taken.
    pub(crate) fn restore_progress(&mut self, progress: f32) {
        self.travelled = progress.max(0.0);
    }

    pub(crate) fn slow_factor(&self) -> f32 {
        self.statuses.speed_multiplier()
    }

    pub(crate) fn effective_speed(&self) -> f32 {
        self.base_speed * self.statuses.speed_multiplier()
    }

    pub(crate) fn snapshot(&self, id: HostileId) -> HostileSnapshot {
        HostileSnapshot {
            id,
            kind: self.kind,
            position: self.position,
            heading: self.heading,
            health: self.health,
            max_health: self.max_health,
            progress: self.travelled,
            speed: self.effective_speed(),
            elite: self.elite,
            wave: self.wave,
        }
    }

    pub(crate) fn record(&self) -> HostileRecord {
        HostileRecord {
            kind: self.kind,
            wave: self.wave,
            health: self.health,
            max_health: self.max_health,
            health_multiplier: self.health_multiplier,
            elite: self.elite,
            waypoints: self.waypoints.clone(),
            waypoint_index: self.waypoint_index,
            progress: self.travelled,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawned(kind: HostileKind) -> Hostile {
        let mut hostile = Hostile::create(kind);
        hostile.on_spawn();
        hostile.configure(&HostileProfile::slime(), 1, 1.0, false);
        hostile
    }

    fn straight_path() -> Vec<Vec2> {
        vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)]
    }

    #[test]
    fn configure_scales_health_by_multiplier() {
        let mut hostile = Hostile::create(HostileKind::Brute);
        hostile.on_spawn();
        hostile.configure(&HostileProfile::brute(), 3, 1.5, true);
        assert_eq!(hostile.max_health, 240.0);
        assert_eq!(hostile.health, 240.0);
        assert_eq!(hostile.state, HostileState::PathAssignmentPending);
    }

    #[test]
    fn damage_clamps_and_kills_once() {
        let mut hostile = spawned(HostileKind::Slime);
        assert_eq!(hostile.take_damage(20.0), DamageOutcome::Wounded);
        assert_eq!(hostile.take_damage(500.0), DamageOutcome::Killed);
        assert_eq!(hostile.health, 0.0);
        assert_eq!(hostile.take_damage(5.0), DamageOutcome::Ignored);
        assert_eq!(hostile.state, HostileState::Dead);
    }

    #[test]
    fn non_positive_damage_is_ignored() {
        let mut hostile = spawned(HostileKind::Slime);
        assert_eq!(hostile.take_damage(0.0), DamageOutcome::Ignored);
        assert_eq!(hostile.take_damage(-4.0), DamageOutcome::Ignored);
        assert_eq!(hostile.take_damage(f32::NAN), DamageOutcome::Ignored);
        assert_eq!(hostile.health, hostile.max_health);
    }

    #[test]
    fn movement_never_overshoots_and_reaches_end() {
        let mut hostile = spawned(HostileKind::Slime);
        assert!(hostile.assign_path(straight_path()));

        let mut last_index = hostile.waypoint_index;
        let mut outcome = Advance::Moving;
        for _ in 0..200 {
            outcome = hostile.advance(Duration::from_millis(20), 0.01);
            assert!(hostile.waypoint_index >= last_index);
            assert!(hostile.position.x <= 1.0 + f32::EPSILON);
            last_index = hostile.waypoint_index;
            if outcome == Advance::ReachedEnd {
                break;
            }
        }
        assert_eq!(outcome, Advance::ReachedEnd);
        assert_eq!(hostile.state, HostileState::ReachedEnd);
        assert!((hostile.travelled - 2.0).abs() < 1e-3);
    }

    #[test]
    fn slow_reduces_speed_until_reverted() {
        let mut hostile = spawned(HostileKind::Slime);
        let slow = SlowEffect {
            factor: 0.5,
            duration_secs: 2.0,
        };
        let (token, expires_at) = hostile.apply_slow(&slow, Duration::from_secs(1));
        assert_eq!(expires_at, Duration::from_secs(3));
        assert_eq!(hostile.effective_speed(), HostileProfile::slime().speed * 0.5);
        assert!(hostile.revert_status(StatusKind::Slow, token));
        assert_eq!(hostile.effective_speed(), HostileProfile::slime().speed);
    }

    #[test]
    fn respawn_resets_transient_state() {
        let mut hostile = spawned(HostileKind::Slime);
        assert!(hostile.assign_path(straight_path()));
        let _ = hostile.advance(Duration::from_millis(300), 0.01);
        let _ = hostile.take_damage(10.0);
        let _ = hostile.apply_slow(
            &SlowEffect {
                factor: 0.5,
                duration_secs: 1.0,
            },
            Duration::ZERO,
        );
        hostile.on_despawn();
        hostile.on_spawn();

        assert_eq!(hostile.health, hostile.max_health);
        assert_eq!(hostile.waypoint_index, 0);
        assert_eq!(hostile.slow_factor(), 1.0);
        assert_eq!(hostile.state, HostileState::Uninitialized);
    }

    #[test]
    fn heading_turns_gradually() {
        let mut hostile = spawned(HostileKind::Slime);
        assert!(hostile.assign_path(vec![Vec2::ZERO, Vec2::new(0.0, 5.0)]));
        hostile.heading = Vec2::X;
        let _ = hostile.advance(Duration::from_millis(20), 0.01);
        assert!(hostile.heading.y > 0.0);
        assert!(hostile.heading.x > 0.0);
    }
}
