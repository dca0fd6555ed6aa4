#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that ranks hostiles in range of each tower by its target priority.
//!
//! Full re-evaluation is throttled to a fixed interval. Between refreshes the
//! cached assignments are pruned of hostiles that died or left range, and a
//! tower left without targets is re-evaluated immediately.

use std::{cmp::Ordering, collections::BTreeMap, time::Duration};

use rampart_core::{
    Event, HostileId, HostileSnapshot, HostileView, TargetPriority, TowerId, TowerSnapshot,
    TowerTarget, TowerView, Vec2,
};

/// Tower targeting system that reuses a scratch buffer between evaluations.
#[derive(Debug)]
pub struct TowerTargeting {
    refresh_interval: Duration,
    since_refresh: Duration,
    primed: bool,
    assignments: BTreeMap<TowerId, Vec<HostileId>>,
    workspace: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a targeting system that fully re-evaluates every `refresh_interval`.
    #[must_use]
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            since_refresh: Duration::ZERO,
            primed: false,
            assignments: BTreeMap::new(),
            workspace: Vec::new(),
        }
    }

    /// Updates the cached assignments and writes them to `out`.
    ///
    /// Elapsed time is taken from the `TimeAdvanced` events in `events`. The
    /// output buffer is cleared before populating it; towers without a target
    /// are omitted.
    pub fn handle(
        &mut self,
        events: &[Event],
        towers: &TowerView,
        hostiles: &HostileView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        let elapsed: Duration = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .sum();
        self.since_refresh = self.since_refresh.saturating_add(elapsed);

        let refresh = !self.primed || self.since_refresh >= self.refresh_interval;
        if refresh {
            self.primed = true;
            self.since_refresh = Duration::ZERO;
        }

        self.assignments
            .retain(|tower, _| towers.get(*tower).is_some());

        for tower in towers.iter() {
            let mut current = self.assignments.remove(&tower.id).unwrap_or_default();
            if !refresh {
                current.retain(|id| {
                    hostiles
                        .get(*id)
                        .is_some_and(|hostile| in_range(tower, hostile))
                });
            }
            if refresh || current.is_empty() {
                rank_into(tower, hostiles, &mut self.workspace);
                current.clear();
                current.extend(
                    self.workspace
                        .iter()
                        .take(tower.max_targets)
                        .map(|candidate| candidate.id),
                );
            }

            if !current.is_empty() {
                out.push(TowerTarget {
                    tower: tower.id,
                    hostiles: current.clone(),
                });
            }
            let _ = self.assignments.insert(tower.id, current);
        }
    }
}

/// Selects the best hostile in range of `tower`, if any.
#[must_use]
pub fn select(tower: &TowerSnapshot, hostiles: &HostileView) -> Option<HostileId> {
    select_many(tower, hostiles, 1).into_iter().next()
}

/// Selects up to `limit` hostiles in range of `tower`, best first.
#[must_use]
pub fn select_many(tower: &TowerSnapshot, hostiles: &HostileView, limit: usize) -> Vec<HostileId> {
    let mut workspace = Vec::new();
    rank_into(tower, hostiles, &mut workspace);
    workspace
        .into_iter()
        .take(limit)
        .map(|candidate| candidate.id)
        .collect()
}

/// Score of a hostile under a priority rule; higher is better.
#[must_use]
pub fn score(priority: TargetPriority, origin: Vec2, hostile: &HostileSnapshot) -> f32 {
    match priority {
        TargetPriority::First => hostile.progress,
        TargetPriority::Last => -hostile.progress,
        TargetPriority::Strongest => hostile.health,
        TargetPriority::Weakest => -hostile.health,
        TargetPriority::Closest => -origin.distance(hostile.position),
        TargetPriority::Furthest => origin.distance(hostile.position),
    }
}

fn in_range(tower: &TowerSnapshot, hostile: &HostileSnapshot) -> bool {
    tower.position.distance_squared(hostile.position) <= tower.range * tower.range
}

fn rank_into(tower: &TowerSnapshot, hostiles: &HostileView, workspace: &mut Vec<Candidate>) {
    workspace.clear();
    workspace.extend(
        hostiles
            .iter()
            .filter(|hostile| in_range(tower, hostile))
            .map(|hostile| Candidate {
                id: hostile.id,
                score: score(tower.priority, tower.position, hostile),
                distance_sq: tower.position.distance_squared(hostile.position),
            }),
    );
    workspace.sort_by(Candidate::precedence);
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: HostileId,
    score: f32,
    distance_sq: f32,
}

impl Candidate {
    /// Best candidates sort first: highest score, then nearest, then lowest handle.
    fn precedence(a: &Self, b: &Self) -> Ordering {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.distance_sq.total_cmp(&b.distance_sq))
            .then_with(|| a.id.cmp(&b.id))
    }
}
