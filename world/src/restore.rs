//! Reinserts persisted towers and hostiles into a fresh world.

use rampart_core::{Event, HostileId, HostileRecord, PoolError, TowerRecord, Vec2};

use crate::World;

/// Reinserts a tower under its original identifier, clamping its level.
pub fn restore_tower(world: &mut World, record: &TowerRecord) {
    let level = world.config.towers.get(record.kind).clamp_level(record.level);
    world.towers.restore(record, level);
}

/// Reacquires a hostile from its pool and restores its health and progress.
///
/// A hostile recorded mid-walk resumes its own path at the recorded waypoint.
/// A hostile recorded while waiting for a path starts `published` from its
/// first waypoint, or keeps waiting and a `PathRequested` event is pushed.
/// Records without health are skipped and yield `Ok(None)`.
pub fn restore_hostile(
    world: &mut World,
    record: &HostileRecord,
    published: Option<Vec<Vec2>>,
    out_events: &mut Vec<Event>,
) -> Result<Option<HostileId>, PoolError> {
    if record.health.is_nan() || record.health <= 0.0 {
        tracing::warn!(kind = ?record.kind, "skipping hostile record without health");
        return Ok(None);
    }

    let hostile = world.hostiles.acquire(record.kind)?;
    let profile = *world.config.hostiles.get(record.kind);
    let Some(entry) = world.hostiles.get_mut(hostile) else {
        return Ok(None);
    };
    entry.configure(&profile, record.wave, record.health_multiplier, record.elite);
    entry.max_health = record.max_health.max(record.health);
    entry.health = record.health;

    let walking = if record.waypoints.is_empty() {
        published.is_some_and(|waypoints| entry.assign_path(waypoints))
    } else if entry.resume_path(
        record.waypoints.clone(),
        record.waypoint_index,
        record.position,
    ) {
        entry.restore_progress(record.progress);
        true
    } else {
        false
    };
    if !walking {
        out_events.push(Event::PathRequested {
            hostile,
            kind: record.kind,
            attempt: 0,
        });
    }
    Ok(Some(hostile))
}
