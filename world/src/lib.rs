#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Rampart simulation.
//!
//! The world owns every pooled hostile and projectile, the tower registry and
//! the deferred task queue. It changes only through [`apply`] and is read
//! through the [`query`] module.

use std::time::Duration;

use rampart_core::{
    ChainHop, Command, Event, HostileId, HostileKind, HostileState, ImpactEffect, ProjectileId,
    ProjectileKind, SlowEffect, StatusKind, TowerId, TowerKind, Vec2, WorldConfig,
};

mod hostiles;
pub mod pool;
mod projectiles;
pub mod restore;
pub mod status;
mod tasks;
mod towers;

use hostiles::{Advance, DamageOutcome, Hostile};
use pool::EntityPool;
use projectiles::Projectile;
use tasks::{Deferred, TaskQueue};
use towers::TowerRegistry;

/// Represents the authoritative Rampart world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    now: Duration,
    hostiles: EntityPool<HostileId, Hostile>,
    projectiles: EntityPool<ProjectileId, Projectile>,
    towers: TowerRegistry,
    tasks: TaskQueue,
}

impl World {
    /// Creates an empty world using the provided tuning.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            hostiles: EntityPool::new(config.pool_capacity),
            projectiles: EntityPool::new(config.pool_capacity),
            towers: TowerRegistry::new(),
            tasks: TaskQueue::default(),
            now: Duration::ZERO,
            config,
        }
    }

    /// Cancels the hostile's deferred work and returns it to the pool.
    fn release_hostile(&mut self, hostile: HostileId) {
        let _ = self.tasks.cancel_owned_by(hostile);
        let _ = self.hostiles.release(hostile);
    }

    fn advance_hostiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let threshold = self.config.arrival_threshold;
        for id in self.hostiles.handles() {
            let Some(hostile) = self.hostiles.get_mut(id) else {
                continue;
            };
            if hostile.advance(dt, threshold) != Advance::ReachedEnd {
                continue;
            }

            let kind = hostile.kind;
            let wave = hostile.wave;
            let damage = self.config.hostiles.get(kind).leak_damage;
            tracing::debug!(?id, ?kind, wave, damage, "hostile reached the end of its path");
            out_events.push(Event::HostileReachedEnd {
                hostile: id,
                kind,
                wave,
                damage,
            });
            self.release_hostile(id);
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for id in self.projectiles.handles() {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            if !projectile.advance(dt) {
                continue;
            }

            out_events.push(Event::ProjectileImpact {
                projectile: Some(id),
                tower: projectile.tower,
                target: projectile.target,
                point: projectile.aim,
                effect: projectile.effect,
            });
            let _ = self.projectiles.release(id);
        }
    }

    fn run_due_tasks(&mut self, out_events: &mut Vec<Event>) {
        for task in self.tasks.drain_due(self.now) {
            match task {
                Deferred::RevertStatus {
                    hostile,
                    kind,
                    token,
                } => {
                    let reverted = self
                        .hostiles
                        .get_mut(hostile)
                        .is_some_and(|entry| entry.revert_status(kind, token));
                    if reverted {
                        out_events.push(Event::StatusExpired { hostile, kind });
                    }
                }
                Deferred::RetryPath { hostile, attempt } => {
                    let Some(entry) = self.hostiles.get(hostile) else {
                        continue;
                    };
                    if entry.state == HostileState::PathAssignmentPending {
                        out_events.push(Event::PathRequested {
                            hostile,
                            kind: entry.kind,
                            attempt,
                        });
                    }
                }
                Deferred::ChainHop { hop } => out_events.push(Event::ChainHopDue { hop }),
            }
        }
    }

    fn spawn_hostile(
        &mut self,
        kind: HostileKind,
        wave: u32,
        health_multiplier: f32,
        elite: bool,
        out_events: &mut Vec<Event>,
    ) {
        let hostile = match self.hostiles.acquire(kind) {
            Ok(hostile) => hostile,
            Err(reason) => {
                tracing::warn!(?kind, wave, %reason, "hostile spawn rejected");
                out_events.push(Event::HostileSpawnRejected { kind, wave, reason });
                return;
            }
        };

        let profile = *self.config.hostiles.get(kind);
        if let Some(entry) = self.hostiles.get_mut(hostile) {
            entry.configure(&profile, wave, health_multiplier, elite);
        }
        tracing::debug!(?hostile, ?kind, wave, elite, "hostile spawned");
        out_events.push(Event::HostileSpawned {
            hostile,
            kind,
            wave,
            elite,
        });
        out_events.push(Event::PathRequested {
            hostile,
            kind,
            attempt: 0,
        });
    }

    fn damage_hostile(&mut self, hostile: HostileId, amount: f32, out_events: &mut Vec<Event>) {
        let Some(entry) = self.hostiles.get_mut(hostile) else {
            return;
        };
        if entry.take_damage(amount) != DamageOutcome::Killed {
            return;
        }

        let kind = entry.kind;
        let wave = entry.wave;
        let profile = self.config.hostiles.get(kind);
        tracing::debug!(?hostile, ?kind, wave, "hostile defeated");
        out_events.push(Event::HostileDefeated {
            hostile,
            kind,
            wave,
            score: profile.score,
            gold: profile.gold,
        });
        self.release_hostile(hostile);
    }

    fn apply_slow(&mut self, hostile: HostileId, slow: &SlowEffect) {
        let now = self.now;
        let Some(entry) = self.hostiles.get_mut(hostile) else {
            return;
        };
        if !entry.state.is_alive() {
            return;
        }
        let (token, expires_at) = entry.apply_slow(slow, now);
        self.tasks.schedule(
            expires_at,
            Some(hostile),
            Deferred::RevertStatus {
                hostile,
                kind: StatusKind::Slow,
                token,
            },
        );
    }

    fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        level: u8,
        out_events: &mut Vec<Event>,
    ) {
        let profile = self.config.towers.get(kind);
        let level = profile.clamp_level(level);
        let tower = self
            .towers
            .place(kind, position, level, profile.default_priority);
        tracing::debug!(?tower, ?kind, level, "tower placed");
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            position,
            level,
        });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let max_level = self
            .towers
            .get(tower)
            .map_or(0, |state| self.config.towers.get(state.kind).max_level);
        match self.towers.upgrade(tower, max_level) {
            Ok(level) => out_events.push(Event::TowerUpgraded { tower, level }),
            Err(reason) => out_events.push(Event::TowerUpgradeRejected { tower, reason }),
        }
    }

    fn reset_cooldown(&mut self, tower: TowerId) {
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        let stats = self.config.towers.get(state.kind).stats(state.level);
        state.cooldown = stats.cooldown();
    }

    #[allow(clippy::too_many_arguments)]
    fn launch_projectile(
        &mut self,
        tower: TowerId,
        kind: ProjectileKind,
        target: HostileId,
        origin: Vec2,
        aim: Vec2,
        speed: Option<f32>,
        effect: ImpactEffect,
        out_events: &mut Vec<Event>,
    ) {
        let immediate = Event::ProjectileImpact {
            projectile: None,
            tower,
            target,
            point: aim,
            effect,
        };
        let Some(speed) = speed.filter(|speed| *speed > 0.0) else {
            out_events.push(immediate);
            return;
        };

        let projectile = match self.projectiles.acquire(kind) {
            Ok(projectile) => projectile,
            Err(reason) => {
                tracing::warn!(?kind, %reason, "projectile pool exhausted, resolving on launch");
                out_events.push(immediate);
                return;
            }
        };
        if let Some(entry) = self.projectiles.get_mut(projectile) {
            entry.launch(tower, target, origin, aim, speed, effect);
        }
    }

    fn schedule_chain_hop(&mut self, hop: ChainHop) {
        let due = self.now.saturating_add(hop.delay);
        self.tasks.schedule(due, None, Deferred::ChainHop { hop });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::FixedStep { dt } => {
            world.advance_hostiles(dt, out_events);
            world.advance_projectiles(dt, out_events);
        }
        Command::Tick { dt } => {
            world.now = world.now.saturating_add(dt);
            world.towers.tick(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.run_due_tasks(out_events);
        }
        Command::SpawnHostile {
            kind,
            wave,
            health_multiplier,
            elite,
        } => world.spawn_hostile(kind, wave, health_multiplier, elite, out_events),
        Command::AssignPath { hostile, waypoints } => {
            let Some(entry) = world.hostiles.get_mut(hostile) else {
                return;
            };
            if !entry.assign_path(waypoints) {
                tracing::warn!(?hostile, "path assignment ignored");
            }
        }
        Command::RetryPath {
            hostile,
            attempt,
            delay,
        } => {
            if world.hostiles.get(hostile).is_some() {
                let due = world.now.saturating_add(delay);
                world.tasks.schedule(
                    due,
                    Some(hostile),
                    Deferred::RetryPath { hostile, attempt },
                );
            }
        }
        Command::DamageHostile { hostile, amount } => {
            world.damage_hostile(hostile, amount, out_events);
        }
        Command::ApplySlow { hostile, slow } => world.apply_slow(hostile, &slow),
        Command::PlaceTower {
            kind,
            position,
            level,
        } => world.place_tower(kind, position, level, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::RemoveTower { tower } => {
            if world.towers.remove(tower).is_some() {
                tracing::debug!(?tower, "tower removed");
                out_events.push(Event::TowerRemoved { tower });
            } else {
                out_events.push(Event::TowerRemovalRejected { tower });
            }
        }
        Command::SetTowerPriority { tower, priority } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.priority = priority;
            }
        }
        Command::TriggerAttack { tower } => world.reset_cooldown(tower),
        Command::LaunchProjectile {
            tower,
            kind,
            target,
            origin,
            aim,
            speed,
            effect,
        } => world.launch_projectile(tower, kind, target, origin, aim, speed, effect, out_events),
        Command::SetBeam { tower, targets } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.beam = targets;
            }
        }
        Command::ScheduleChainHop { hop } => world.schedule_chain_hop(hop),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use rampart_core::{
        BeamSnapshot, BeamView, HostileId, HostileKind, HostileRecord, HostileSnapshot,
        HostileState, HostileView, ProjectileView, TowerKind, TowerRecord, TowerSnapshot,
        TowerView, WorldConfig,
    };

    use super::World;

    /// Current simulation time.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Tuning the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Captures the hostiles that are walking their path and may be targeted.
    #[must_use]
    pub fn hostile_view(world: &World) -> HostileView {
        HostileView::new(
            world
                .hostiles
                .iter()
                .filter(|(_, hostile)| hostile.state == HostileState::Moving)
                .map(|(id, hostile)| hostile.snapshot(id))
                .collect(),
        )
    }

    /// Looks up any live hostile, including those still waiting for a path.
    #[must_use]
    pub fn hostile(world: &World, id: HostileId) -> Option<HostileSnapshot> {
        world.hostiles.get(id).map(|hostile| hostile.snapshot(id))
    }

    /// Lifecycle state of a live hostile.
    #[must_use]
    pub fn hostile_state(world: &World, id: HostileId) -> Option<HostileState> {
        world.hostiles.get(id).map(|hostile| hostile.state)
    }

    /// Product of the speed multipliers currently applied to a hostile.
    #[must_use]
    pub fn slow_factor(world: &World, id: HostileId) -> Option<f32> {
        world.hostiles.get(id).map(|hostile| hostile.slow_factor())
    }

    /// Number of hostiles on the field.
    #[must_use]
    pub fn active_hostiles(world: &World) -> usize {
        world.hostiles.active_count()
    }

    /// Number of pooled hostile slots ever created for a kind.
    #[must_use]
    pub fn hostile_pool_size(world: &World, kind: HostileKind) -> usize {
        world.hostiles.size_of(kind)
    }

    /// Number of deferred tasks waiting for their due time.
    #[must_use]
    pub fn pending_tasks(world: &World) -> usize {
        world.tasks.len()
    }

    /// Captures every placed tower with its level-resolved stats.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::new(
            world
                .towers
                .iter()
                .map(|tower| {
                    let profile = world.config.towers.get(tower.kind);
                    let stats = profile.stats(tower.level);
                    TowerSnapshot {
                        id: tower.id,
                        kind: tower.kind,
                        position: tower.position,
                        level: tower.level,
                        priority: tower.priority,
                        damage: stats.damage,
                        range: stats.range,
                        attack_rate: stats.attack_rate,
                        cooldown_remaining: tower.cooldown,
                        max_targets: stats.max_targets,
                        projectile_speed: profile.projectile_speed,
                        beam_active: !tower.beam.is_empty(),
                    }
                })
                .collect(),
        )
    }

    /// Captures the beam of every laser tower, endpoints at live hostiles.
    #[must_use]
    pub fn beam_view(world: &World) -> BeamView {
        BeamView::new(
            world
                .towers
                .iter()
                .filter(|tower| tower.kind == TowerKind::Laser)
                .map(|tower| {
                    let endpoints: Vec<_> = tower
                        .beam
                        .iter()
                        .filter_map(|id| world.hostiles.get(*id))
                        .map(|hostile| hostile.position)
                        .collect();
                    BeamSnapshot {
                        tower: tower.id,
                        origin: tower.position,
                        enabled: !endpoints.is_empty(),
                        endpoints,
                    }
                })
                .collect(),
        )
    }

    /// Captures every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::new(
            world
                .projectiles
                .iter()
                .map(|(id, projectile)| projectile.snapshot(id))
                .collect(),
        )
    }

    /// Persistable records of every placed tower.
    #[must_use]
    pub fn tower_records(world: &World) -> Vec<TowerRecord> {
        world.towers.iter().map(|tower| tower.record()).collect()
    }

    /// Persistable records of every hostile still on the field.
    #[must_use]
    pub fn hostile_records(world: &World) -> Vec<HostileRecord> {
        world
            .hostiles
            .iter()
            .filter(|(_, hostile)| hostile.state.is_alive())
            .map(|(_, hostile)| hostile.record())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::{HostileProfile, PoolError, TargetPriority};

    fn world() -> World {
        World::new(WorldConfig::default())
    }

    fn spawn(world: &mut World, events: &mut Vec<Event>) -> HostileId {
        apply(
            world,
            Command::SpawnHostile {
                kind: HostileKind::Slime,
                wave: 1,
                health_multiplier: 1.0,
                elite: false,
            },
            events,
        );
        events
            .iter()
            .find_map(|event| match event {
                Event::HostileSpawned { hostile, .. } => Some(*hostile),
                _ => None,
            })
            .expect("hostile spawned")
    }

    fn walking(world: &mut World) -> HostileId {
        let mut events = Vec::new();
        let hostile = spawn(world, &mut events);
        apply(
            world,
            Command::AssignPath {
                hostile,
                waypoints: vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
            },
            &mut events,
        );
        hostile
    }

    #[test]
    fn spawning_requests_a_path() {
        let mut world = world();
        let mut events = Vec::new();
        let hostile = spawn(&mut world, &mut events);

        assert_eq!(
            events,
            vec![
                Event::HostileSpawned {
                    hostile,
                    kind: HostileKind::Slime,
                    wave: 1,
                    elite: false,
                },
                Event::PathRequested {
                    hostile,
                    kind: HostileKind::Slime,
                    attempt: 0,
                },
            ]
        );
        assert_eq!(
            query::hostile_state(&world, hostile),
            Some(HostileState::PathAssignmentPending)
        );
        assert!(query::hostile_view(&world).is_empty());
    }

    #[test]
    fn lethal_damage_rewards_once_and_releases() {
        let mut world = world();
        let hostile = walking(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamageHostile {
                hostile,
                amount: 1_000.0,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DamageHostile {
                hostile,
                amount: 1_000.0,
            },
            &mut events,
        );

        let profile = HostileProfile::slime();
        assert_eq!(
            events,
            vec![Event::HostileDefeated {
                hostile,
                kind: HostileKind::Slime,
                wave: 1,
                score: profile.score,
                gold: profile.gold,
            }]
        );
        assert_eq!(query::active_hostiles(&world), 0);
        assert!(query::hostile(&world, hostile).is_none());
    }

    #[test]
    fn slow_refresh_keeps_latest_factor_and_expiry() {
        let mut world = world();
        let hostile = walking(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ApplySlow {
                hostile,
                slow: SlowEffect {
                    factor: 0.5,
                    duration_secs: 2.0,
                },
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ApplySlow {
                hostile,
                slow: SlowEffect {
                    factor: 0.3,
                    duration_secs: 1.0,
                },
            },
            &mut events,
        );
        assert_eq!(query::slow_factor(&world, hostile), Some(0.3));

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(900),
            },
            &mut events,
        );
        assert_eq!(query::slow_factor(&world, hostile), Some(0.3));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::StatusExpired { .. })));

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        assert_eq!(query::slow_factor(&world, hostile), Some(1.0));
        assert!(events.contains(&Event::StatusExpired {
            hostile,
            kind: StatusKind::Slow,
        }));

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(events, vec![Event::TimeAdvanced { dt: Duration::from_secs(1) }]);
    }

    #[test]
    fn releasing_a_hostile_cancels_its_tasks() {
        let mut world = world();
        let hostile = walking(&mut world);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ApplySlow {
                hostile,
                slow: SlowEffect {
                    factor: 0.5,
                    duration_secs: 5.0,
                },
            },
            &mut events,
        );
        assert_eq!(query::pending_tasks(&world), 1);

        apply(
            &mut world,
            Command::DamageHostile {
                hostile,
                amount: 10_000.0,
            },
            &mut events,
        );
        assert_eq!(query::pending_tasks(&world), 0);
    }

    #[test]
    fn hostile_reaching_the_end_leaks_and_releases() {
        let mut world = world();
        let hostile = walking(&mut world);
        let mut events = Vec::new();

        for _ in 0..500 {
            apply(
                &mut world,
                Command::FixedStep {
                    dt: Duration::from_millis(20),
                },
                &mut events,
            );
        }

        assert_eq!(
            events,
            vec![Event::HostileReachedEnd {
                hostile,
                kind: HostileKind::Slime,
                wave: 1,
                damage: HostileProfile::slime().leak_damage,
            }]
        );
        assert_eq!(query::active_hostiles(&world), 0);
    }

    #[test]
    fn capped_pool_rejects_spawns() {
        let mut world = World::new(WorldConfig {
            pool_capacity: Some(1),
            ..WorldConfig::default()
        });
        let mut events = Vec::new();
        let _ = spawn(&mut world, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::SpawnHostile {
                kind: HostileKind::Slime,
                wave: 2,
                health_multiplier: 1.0,
                elite: false,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::HostileSpawnRejected {
                kind: HostileKind::Slime,
                wave: 2,
                reason: PoolError::Exhausted {
                    key: "Slime".to_owned(),
                    capacity: 1,
                },
            }]
        );
        assert_eq!(query::hostile_pool_size(&world, HostileKind::Slime), 1);
    }

    #[test]
    fn projectiles_fly_then_impact() {
        let mut world = world();
        let target = walking(&mut world);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LaunchProjectile {
                tower: TowerId::new(0),
                kind: ProjectileKind::Arrow,
                target,
                origin: Vec2::new(0.0, 4.0),
                aim: Vec2::ZERO,
                speed: Some(100.0),
                effect: ImpactEffect::Direct { damage: 3.0 },
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::projectile_view(&world).len(), 1);

        apply(
            &mut world,
            Command::FixedStep {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ProjectileImpact {
                projectile: Some(_),
                point,
                ..
            } if *point == Vec2::ZERO
        )));
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn instant_projectiles_impact_on_launch() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LaunchProjectile {
                tower: TowerId::new(0),
                kind: ProjectileKind::Arrow,
                target: HostileId::new(0, 0),
                origin: Vec2::ZERO,
                aim: Vec2::ONE,
                speed: None,
                effect: ImpactEffect::Direct { damage: 3.0 },
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ProjectileImpact {
                projectile: None,
                tower: TowerId::new(0),
                target: HostileId::new(0, 0),
                point: Vec2::ONE,
                effect: ImpactEffect::Direct { damage: 3.0 },
            }]
        );
    }

    #[test]
    fn towers_upgrade_until_max_level_then_reject() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Arrow,
                position: Vec2::ZERO,
                level: 9,
            },
            &mut events,
        );
        let tower = TowerId::new(0);
        assert_eq!(
            events,
            vec![Event::TowerPlaced {
                tower,
                kind: TowerKind::Arrow,
                position: Vec2::ZERO,
                level: 3,
            }]
        );

        events.clear();
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        apply(
            &mut world,
            Command::SetTowerPriority {
                tower,
                priority: TargetPriority::Weakest,
            },
            &mut events,
        );
        apply(&mut world, Command::RemoveTower { tower }, &mut events);
        apply(&mut world, Command::RemoveTower { tower }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::TowerUpgradeRejected {
                    tower,
                    reason: rampart_core::UpgradeError::MaxLevel,
                },
                Event::TowerRemoved { tower },
                Event::TowerRemovalRejected { tower },
            ]
        );
    }

    #[test]
    fn trigger_attack_resets_cooldown() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Cannon,
                position: Vec2::ZERO,
                level: 1,
            },
            &mut events,
        );
        let tower = TowerId::new(0);
        apply(&mut world, Command::TriggerAttack { tower }, &mut events);
        let snapshot = *query::tower_view(&world).get(tower).expect("tower");
        assert_eq!(snapshot.cooldown_remaining, Duration::from_secs(2));
        assert!(!snapshot.is_ready());

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );
        assert!(query::tower_view(&world).get(tower).expect("tower").is_ready());
    }
}
