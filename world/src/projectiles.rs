//! Pooled projectiles flying in a straight line toward a fixed aim point.

use std::time::Duration;

use rampart_core::{
    HostileId, ImpactEffect, ProjectileId, ProjectileKind, ProjectileSnapshot, TowerId, Vec2,
};

use crate::pool::Poolable;

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) kind: ProjectileKind,
    pub(crate) tower: TowerId,
    pub(crate) target: HostileId,
    pub(crate) position: Vec2,
    pub(crate) aim: Vec2,
    speed: f32,
    pub(crate) effect: ImpactEffect,
}

impl Poolable for Projectile {
    type Key = ProjectileKind;

    fn create(kind: ProjectileKind) -> Self {
        Self {
            kind,
            tower: TowerId::new(0),
            target: HostileId::new(0, 0),
            position: Vec2::ZERO,
            aim: Vec2::ZERO,
            speed: 0.0,
            effect: ImpactEffect::Direct { damage: 0.0 },
        }
    }

    fn on_spawn(&mut self) {
        self.position = Vec2::ZERO;
        self.aim = Vec2::ZERO;
        self.speed = 0.0;
    }

    fn on_despawn(&mut self) {
        self.speed = 0.0;
    }
}

impl Projectile {
    pub(crate) fn launch(
        &mut self,
        tower: TowerId,
        target: HostileId,
        origin: Vec2,
        aim: Vec2,
        speed: f32,
        effect: ImpactEffect,
    ) {
        self.tower = tower;
        self.target = target;
        self.position = origin;
        self.aim = aim;
        self.speed = speed;
        self.effect = effect;
    }

    /// Moves toward the aim point; returns `true` once it arrives.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        let offset = self.aim - self.position;
        let distance = offset.length();
        let step = self.speed * dt.as_secs_f32();
        if step >= distance {
            self.position = self.aim;
            return true;
        }
        self.position += offset / distance * step;
        false
    }

    pub(crate) fn snapshot(&self, id: ProjectileId) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id,
            kind: self.kind,
            tower: self.tower,
            position: self.position,
            aim: self.aim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projectile_lands_exactly_on_aim_point() {
        let mut projectile = Projectile::create(ProjectileKind::Arrow);
        projectile.on_spawn();
        projectile.launch(
            TowerId::new(1),
            HostileId::new(0, 0),
            Vec2::ZERO,
            Vec2::new(3.0, 4.0),
            10.0,
            ImpactEffect::Direct { damage: 5.0 },
        );

        assert!(!projectile.advance(Duration::from_millis(250)));
        assert!((projectile.position - Vec2::new(1.5, 2.0)).length() < 1e-4);
        assert!(projectile.advance(Duration::from_millis(300)));
        assert_eq!(projectile.position, Vec2::new(3.0, 4.0));
    }
}
