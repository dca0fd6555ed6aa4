#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns tower targets and impact events into damage commands.
//!
//! Projectile impacts and chain hops are resolved on every call. Towers only
//! act when the batch contains a `TimeAdvanced` event.

use std::time::Duration;

use rampart_core::{
    config::seconds, AttackProfile, ChainHop, Command, Event, HostileId, HostileView,
    ImpactEffect, TowerId, TowerKind, TowerProfiles, TowerSnapshot, TowerTarget, TowerView, Vec2,
};

/// Tower combat system that queues attack commands for ready towers.
#[derive(Debug)]
pub struct TowerCombat {
    profiles: TowerProfiles,
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a combat system using the provided tower tuning.
    #[must_use]
    pub fn new(profiles: TowerProfiles) -> Self {
        Self {
            profiles,
            scratch: Vec::new(),
        }
    }

    /// Emits damage, status, projectile and beam commands for one batch of events.
    pub fn handle(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        targets: &[TowerTarget],
        hostiles: &HostileView,
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        let mut elapsed = Duration::ZERO;
        let mut ticked = false;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    elapsed = elapsed.saturating_add(*dt);
                    ticked = true;
                }
                Event::ProjectileImpact {
                    tower,
                    target,
                    point,
                    effect,
                    ..
                } => self.resolve_impact(*tower, *target, *point, effect, hostiles),
                Event::ChainHopDue { hop } => self.resolve_chain_hop(hop, hostiles),
                _ => {}
            }
        }

        if ticked {
            for tower in towers.iter() {
                let engaged = targets
                    .iter()
                    .find(|target| target.tower == tower.id)
                    .map_or(&[][..], |target| target.hostiles.as_slice());
                if tower.kind == TowerKind::Laser {
                    self.sweep_beam(tower, engaged, elapsed);
                } else if tower.is_ready() && !engaged.is_empty() {
                    self.fire(tower, engaged, hostiles);
                }
            }
        }

        out.append(&mut self.scratch);
    }

    fn resolve_impact(
        &mut self,
        tower: TowerId,
        target: HostileId,
        point: Vec2,
        effect: &ImpactEffect,
        hostiles: &HostileView,
    ) {
        match *effect {
            ImpactEffect::Direct { damage } => self.scratch.push(Command::DamageHostile {
                hostile: target,
                amount: damage,
            }),
            ImpactEffect::Explosive { damage, radius } => {
                for hostile in hostiles.iter() {
                    let amount = falloff_damage(damage, point.distance(hostile.position), radius);
                    if amount > 0.0 {
                        self.scratch.push(Command::DamageHostile {
                            hostile: hostile.id,
                            amount,
                        });
                    }
                }
            }
            ImpactEffect::Arcane {
                damage,
                slow,
                chain,
            } => {
                self.scratch.push(Command::DamageHostile {
                    hostile: target,
                    amount: damage,
                });
                if let Some(slow) = slow {
                    self.scratch.push(Command::ApplySlow {
                        hostile: target,
                        slow,
                    });
                }
                if let Some(chain) = chain.filter(|chain| chain.hops > 0) {
                    let origin = hostiles.get(target).map_or(point, |hostile| hostile.position);
                    self.scratch.push(Command::ScheduleChainHop {
                        hop: ChainHop {
                            tower,
                            origin,
                            damage: damage * chain.damage_fraction,
                            remaining: chain.hops,
                            radius: chain.radius,
                            delay: seconds(chain.delay_secs),
                            visited: vec![target],
                        },
                    });
                }
            }
        }
    }

    fn resolve_chain_hop(&mut self, hop: &ChainHop, hostiles: &HostileView) {
        let Some(next) = chain_target(hop, hostiles) else {
            return;
        };
        let (id, position) = next;
        self.scratch.push(Command::DamageHostile {
            hostile: id,
            amount: hop.damage,
        });
        if hop.remaining > 1 {
            let mut visited = hop.visited.clone();
            visited.push(id);
            self.scratch.push(Command::ScheduleChainHop {
                hop: ChainHop {
                    origin: position,
                    remaining: hop.remaining - 1,
                    visited,
                    ..hop.clone()
                },
            });
        }
    }

    fn sweep_beam(&mut self, tower: &TowerSnapshot, engaged: &[HostileId], elapsed: Duration) {
        if engaged.is_empty() {
            if tower.beam_active {
                self.scratch.push(Command::SetBeam {
                    tower: tower.id,
                    targets: Vec::new(),
                });
            }
            return;
        }

        let amount = tower.damage * elapsed.as_secs_f32();
        let slow = self.profiles.get(tower.kind).slow(tower.level);
        for hostile in engaged {
            if amount > 0.0 {
                self.scratch.push(Command::DamageHostile {
                    hostile: *hostile,
                    amount,
                });
            }
            if let Some(slow) = slow {
                self.scratch.push(Command::ApplySlow {
                    hostile: *hostile,
                    slow,
                });
            }
        }
        self.scratch.push(Command::SetBeam {
            tower: tower.id,
            targets: engaged.to_vec(),
        });
    }

    fn fire(&mut self, tower: &TowerSnapshot, engaged: &[HostileId], hostiles: &HostileView) {
        let Some(kind) = tower.kind.projectile_kind() else {
            return;
        };
        let profile = self.profiles.get(tower.kind);
        let origin = tower.position;

        let mut volley = Vec::new();
        match tower.kind {
            TowerKind::Arrow => {
                if let Some((target, aim)) = first_live(engaged, hostiles) {
                    let offsets = profile.multishot(tower.level).map_or_else(
                        || vec![0.0],
                        |multishot| fan_offsets(multishot.shots, multishot.spread_degrees),
                    );
                    for offset in offsets {
                        let aim = origin + Vec2::from_angle(offset).rotate(aim - origin);
                        volley.push((target, aim, ImpactEffect::Direct {
                            damage: tower.damage,
                        }));
                    }
                }
            }
            TowerKind::Cannon => {
                if let Some((target, aim)) = first_live(engaged, hostiles) {
                    let radius = match profile.attack {
                        AttackProfile::Explosive { explosion_radius } => {
                            explosion_radius
                        }
                        _ => 0.0,
                    };
                    volley.push((target, aim, ImpactEffect::Explosive {
                        damage: tower.damage,
                        radius,
                    }));
                }
            }
            TowerKind::Magic => {
                let effect = ImpactEffect::Arcane {
                    damage: tower.damage,
                    slow: profile.slow(tower.level),
                    chain: profile.chain(tower.level),
                };
                for target in engaged.iter().take(tower.max_targets) {
                    if let Some(hostile) = hostiles.get(*target) {
                        volley.push((*target, hostile.position, effect));
                    }
                }
            }
            TowerKind::Laser => {}
        }

        if volley.is_empty() {
            return;
        }
        self.scratch.push(Command::TriggerAttack { tower: tower.id });
        for (target, aim, effect) in volley {
            self.scratch.push(Command::LaunchProjectile {
                tower: tower.id,
                kind,
                target,
                origin,
                aim,
                speed: tower.projectile_speed,
                effect,
            });
        }
    }
}

/// Area damage at `distance` from the impact: `damage × max(0.5, 1 − distance/radius)`
/// inside the radius, zero outside.
#[must_use]
pub fn falloff_damage(damage: f32, distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return if distance <= 0.0 { damage } else { 0.0 };
    }
    if distance > radius {
        return 0.0;
    }
    damage * (1.0 - distance / radius).max(0.5)
}

/// Angular offsets in radians of `shots` projectiles spread evenly across
/// `spread_degrees`, centred on the aim direction.
#[must_use]
pub fn fan_offsets(shots: u8, spread_degrees: f32) -> Vec<f32> {
    let shots = shots.max(1);
    if shots == 1 {
        return vec![0.0];
    }
    let spread = spread_degrees.to_radians();
    let step = spread / f32::from(shots - 1);
    (0..shots)
        .map(|index| -spread / 2.0 + step * f32::from(index))
        .collect()
}

fn first_live(engaged: &[HostileId], hostiles: &HostileView) -> Option<(HostileId, Vec2)> {
    engaged
        .iter()
        .find_map(|id| hostiles.get(*id).map(|hostile| (*id, hostile.position)))
}

/// Nearest unvisited hostile within the hop radius; ties go to the lower handle.
///
/// The search starts from the current position of the last hostile struck,
/// or from the recorded origin once that hostile is gone.
fn chain_target(hop: &ChainHop, hostiles: &HostileView) -> Option<(HostileId, Vec2)> {
    let origin = hop
        .visited
        .last()
        .and_then(|id| hostiles.get(*id))
        .map_or(hop.origin, |hostile| hostile.position);
    let radius_sq = hop.radius * hop.radius;
    hostiles
        .iter()
        .filter(|hostile| !hop.visited.contains(&hostile.id))
        .map(|hostile| (origin.distance_squared(hostile.position), hostile))
        .filter(|(distance_sq, _)| *distance_sq <= radius_sq)
        .min_by(|(a, left), (b, right)| a.total_cmp(b).then_with(|| left.id.cmp(&right.id)))
        .map(|(_, hostile)| (hostile.id, hostile.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::{
        HostileKind, HostileSnapshot, ProjectileKind, SlowEffect, TargetPriority, TowerProfile,
    };

    fn hostile(index: u32, position: Vec2) -> HostileSnapshot {
        HostileSnapshot {
            id: HostileId::new(index, 0),
            kind: HostileKind::Slime,
            position,
            heading: Vec2::X,
            health: 50.0,
            max_health: 50.0,
            progress: 0.0,
            speed: 1.0,
            elite: false,
            wave: 1,
        }
    }

    fn tower(kind: TowerKind, level: u8) -> TowerSnapshot {
        let profile = TowerProfiles::default().get(kind).clone();
        let stats = profile.stats(level);
        TowerSnapshot {
            id: TowerId::new(1),
            kind,
            position: Vec2::ZERO,
            level,
            priority: TargetPriority::First,
            damage: stats.damage,
            range: stats.range,
            attack_rate: stats.attack_rate,
            cooldown_remaining: Duration::ZERO,
            max_targets: stats.max_targets,
            projectile_speed: profile.projectile_speed,
            beam_active: false,
        }
    }

    fn engaged(tower: TowerId, hostiles: &[u32]) -> Vec<TowerTarget> {
        vec![TowerTarget {
            tower,
            hostiles: hostiles.iter().map(|index| HostileId::new(*index, 0)).collect(),
        }]
    }

    fn tick(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn falloff_matches_linear_profile() {
        assert_eq!(falloff_damage(100.0, 0.0, 10.0), 100.0);
        assert_eq!(falloff_damage(100.0, 2.5, 10.0), 75.0);
        assert_eq!(falloff_damage(100.0, 10.0, 10.0), 50.0);
        assert_eq!(falloff_damage(100.0, 20.0, 10.0), 0.0);
    }

    #[test]
    fn fan_offsets_are_symmetric() {
        assert_eq!(fan_offsets(1, 30.0), vec![0.0]);
        let offsets = fan_offsets(3, 20.0);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[0] + offsets[2]).abs() < 1e-6);
        assert!(offsets[1].abs() < 1e-6);
        assert!((offsets[2] - 10.0_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn towers_stay_silent_without_time_advancing() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let towers = TowerView::new(vec![tower(TowerKind::Arrow, 1)]);
        let hostiles = HostileView::new(vec![hostile(0, Vec2::X)]);
        let mut out = Vec::new();
        system.handle(&[], &towers, &engaged(TowerId::new(1), &[0]), &hostiles, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn ready_arrow_tower_fires_one_projectile() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let arrow = tower(TowerKind::Arrow, 1);
        let towers = TowerView::new(vec![arrow]);
        let hostiles = HostileView::new(vec![hostile(0, Vec2::new(2.0, 0.0))]);
        let mut out = Vec::new();
        system.handle(
            &tick(Duration::from_millis(16)),
            &towers,
            &engaged(arrow.id, &[0]),
            &hostiles,
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::TriggerAttack { tower: arrow.id },
                Command::LaunchProjectile {
                    tower: arrow.id,
                    kind: ProjectileKind::Arrow,
                    target: HostileId::new(0, 0),
                    origin: Vec2::ZERO,
                    aim: Vec2::new(2.0, 0.0),
                    speed: arrow.projectile_speed,
                    effect: ImpactEffect::Direct {
                        damage: arrow.damage,
                    },
                },
            ]
        );
    }

    #[test]
    fn cooling_down_towers_hold_fire() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let mut cannon = tower(TowerKind::Cannon, 1);
        cannon.cooldown_remaining = Duration::from_millis(100);
        let towers = TowerView::new(vec![cannon]);
        let hostiles = HostileView::new(vec![hostile(0, Vec2::X)]);
        let mut out = Vec::new();
        system.handle(
            &tick(Duration::from_millis(16)),
            &towers,
            &engaged(cannon.id, &[0]),
            &hostiles,
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn multishot_fans_projectiles_at_one_target() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let arrow = tower(TowerKind::Arrow, 3);
        let towers = TowerView::new(vec![arrow]);
        let hostiles = HostileView::new(vec![hostile(0, Vec2::new(3.0, 0.0))]);
        let mut out = Vec::new();
        system.handle(
            &tick(Duration::from_millis(16)),
            &towers,
            &engaged(arrow.id, &[0]),
            &hostiles,
            &mut out,
        );

        let launches: Vec<_> = out
            .iter()
            .filter_map(|command| match command {
                Command::LaunchProjectile { target, aim, .. } => Some((*target, *aim)),
                _ => None,
            })
            .collect();
        assert_eq!(launches.len(), 3);
        assert!(launches
            .iter()
            .all(|(target, _)| *target == HostileId::new(0, 0)));
        assert!(launches[0].1.y < 0.0);
        assert!(launches[1].1.y.abs() < 1e-5);
        assert!(launches[2].1.y > 0.0);
    }

    #[test]
    fn explosion_applies_falloff_to_every_hostile_in_radius() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let hostiles = HostileView::new(vec![
            hostile(0, Vec2::new(10.0, 0.0)),
            hostile(1, Vec2::new(10.0, 1.0)),
            hostile(2, Vec2::new(10.0, 9.0)),
        ]);
        let impact = Event::ProjectileImpact {
            projectile: None,
            tower: TowerId::new(1),
            target: HostileId::new(0, 0),
            point: Vec2::new(10.0, 0.0),
            effect: ImpactEffect::Explosive {
                damage: 40.0,
                radius: 2.0,
            },
        };
        let mut out = Vec::new();
        system.handle(&[impact], &TowerView::default(), &[], &hostiles, &mut out);

        assert_eq!(
            out,
            vec![
                Command::DamageHostile {
                    hostile: HostileId::new(0, 0),
                    amount: 40.0,
                },
                Command::DamageHostile {
                    hostile: HostileId::new(1, 0),
                    amount: 20.0,
                },
            ]
        );
    }

    #[test]
    fn laser_damage_scales_with_elapsed_time_and_slows() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let laser = tower(TowerKind::Laser, 2);
        let towers = TowerView::new(vec![laser]);
        let hostiles = HostileView::new(vec![hostile(0, Vec2::X)]);
        let mut out = Vec::new();
        system.handle(
            &tick(Duration::from_millis(500)),
            &towers,
            &engaged(laser.id, &[0]),
            &hostiles,
            &mut out,
        );

        let slow = TowerProfile::laser().slow(2).expect("slow unlocked");
        assert_eq!(
            out,
            vec![
                Command::DamageHostile {
                    hostile: HostileId::new(0, 0),
                    amount: laser.damage * 0.5,
                },
                Command::ApplySlow {
                    hostile: HostileId::new(0, 0),
                    slow,
                },
                Command::SetBeam {
                    tower: laser.id,
                    targets: vec![HostileId::new(0, 0)],
                },
            ]
        );
    }

    #[test]
    fn idle_laser_disables_its_beam_once() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let mut laser = tower(TowerKind::Laser, 1);
        laser.beam_active = true;
        let mut out = Vec::new();
        system.handle(
            &tick(Duration::from_millis(16)),
            &TowerView::new(vec![laser]),
            &[],
            &HostileView::default(),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::SetBeam {
                tower: laser.id,
                targets: Vec::new(),
            }]
        );

        laser.beam_active = false;
        out.clear();
        system.handle(
            &tick(Duration::from_millis(16)),
            &TowerView::new(vec![laser]),
            &[],
            &HostileView::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn magic_fires_one_bolt_per_emission_point() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let magic = tower(TowerKind::Magic, 1);
        let hostiles = HostileView::new(vec![hostile(0, Vec2::X), hostile(1, Vec2::Y)]);
        let mut out = Vec::new();
        system.handle(
            &tick(Duration::from_millis(16)),
            &TowerView::new(vec![magic]),
            &engaged(magic.id, &[1, 0]),
            &hostiles,
            &mut out,
        );
        let targets: Vec<_> = out
            .iter()
            .filter_map(|command| match command {
                Command::LaunchProjectile { target, .. } => Some(target.index()),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec![1, 0]);
    }

    #[test]
    fn arcane_impact_slows_and_starts_chain() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let chain = TowerProfile::magic().chain(3).expect("chain unlocked");
        let slow = SlowEffect {
            factor: 0.5,
            duration_secs: 2.0,
        };
        let impact = Event::ProjectileImpact {
            projectile: None,
            tower: TowerId::new(1),
            target: HostileId::new(0, 0),
            point: Vec2::ZERO,
            effect: ImpactEffect::Arcane {
                damage: 20.0,
                slow: Some(slow),
                chain: Some(chain),
            },
        };
        let hostiles = HostileView::new(vec![hostile(0, Vec2::new(1.0, 1.0))]);
        let mut out = Vec::new();
        system.handle(&[impact], &TowerView::default(), &[], &hostiles, &mut out);

        assert_eq!(
            out,
            vec![
                Command::DamageHostile {
                    hostile: HostileId::new(0, 0),
                    amount: 20.0,
                },
                Command::ApplySlow {
                    hostile: HostileId::new(0, 0),
                    slow,
                },
                Command::ScheduleChainHop {
                    hop: ChainHop {
                        tower: TowerId::new(1),
                        origin: Vec2::new(1.0, 1.0),
                        damage: 20.0 * chain.damage_fraction,
                        remaining: chain.hops,
                        radius: chain.radius,
                        delay: seconds(chain.delay_secs),
                        visited: vec![HostileId::new(0, 0)],
                    },
                },
            ]
        );
    }

    #[test]
    fn chain_hop_strikes_nearest_unvisited_hostile() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let hostiles = HostileView::new(vec![
            hostile(0, Vec2::ZERO),
            hostile(1, Vec2::new(2.0, 0.0)),
            hostile(2, Vec2::new(1.0, 0.0)),
            hostile(3, Vec2::new(9.0, 0.0)),
        ]);
        let hop = ChainHop {
            tower: TowerId::new(1),
            origin: Vec2::ZERO,
            damage: 6.0,
            remaining: 2,
            radius: 3.0,
            delay: Duration::from_millis(100),
            visited: vec![HostileId::new(0, 0)],
        };
        let mut out = Vec::new();
        system.handle(
            &[Event::ChainHopDue { hop: hop.clone() }],
            &TowerView::default(),
            &[],
            &hostiles,
            &mut out,
        );

        assert_eq!(
            out,
            vec![
                Command::DamageHostile {
                    hostile: HostileId::new(2, 0),
                    amount: 6.0,
                },
                Command::ScheduleChainHop {
                    hop: ChainHop {
                        origin: Vec2::new(1.0, 0.0),
                        remaining: 1,
                        visited: vec![HostileId::new(0, 0), HostileId::new(2, 0)],
                        ..hop
                    },
                },
            ]
        );
    }

    #[test]
    fn chain_hop_searches_from_where_the_last_victim_walked() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let hostiles = HostileView::new(vec![
            hostile(0, Vec2::new(8.0, 0.0)),
            hostile(1, Vec2::new(1.0, 0.0)),
            hostile(2, Vec2::new(9.0, 0.0)),
        ]);
        let hop = ChainHop {
            tower: TowerId::new(1),
            origin: Vec2::ZERO,
            damage: 6.0,
            remaining: 1,
            radius: 3.0,
            delay: Duration::from_millis(100),
            visited: vec![HostileId::new(0, 0)],
        };
        let mut out = Vec::new();
        system.handle(
            &[Event::ChainHopDue { hop: hop.clone() }],
            &TowerView::default(),
            &[],
            &hostiles,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::DamageHostile {
                hostile: HostileId::new(2, 0),
                amount: 6.0,
            }]
        );

        let departed = HostileView::new(vec![
            hostile(1, Vec2::new(1.0, 0.0)),
            hostile(2, Vec2::new(9.0, 0.0)),
        ]);
        out.clear();
        system.handle(
            &[Event::ChainHopDue { hop }],
            &TowerView::default(),
            &[],
            &departed,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::DamageHostile {
                hostile: HostileId::new(1, 0),
                amount: 6.0,
            }]
        );
    }

    #[test]
    fn final_hop_does_not_reschedule() {
        let mut system = TowerCombat::new(TowerProfiles::default());
        let hostiles = HostileView::new(vec![hostile(1, Vec2::X)]);
        let hop = ChainHop {
            tower: TowerId::new(1),
            origin: Vec2::ZERO,
            damage: 6.0,
            remaining: 1,
            radius: 3.0,
            delay: Duration::ZERO,
            visited: Vec::new(),
        };
        let mut out = Vec::new();
        system.handle(
            &[Event::ChainHopDue { hop }],
            &TowerView::default(),
            &[],
            &hostiles,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::DamageHostile {
                hostile: HostileId::new(1, 0),
                amount: 6.0,
            }]
        );
    }
}
