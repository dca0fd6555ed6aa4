//! Deferred work keyed by due time, cancellable per owning hostile.

use std::time::Duration;

use rampart_core::{ChainHop, HostileId, StatusKind};

use crate::status::StatusToken;

/// Work item executed once its due time is reached.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Deferred {
    RevertStatus {
        hostile: HostileId,
        kind: StatusKind,
        token: StatusToken,
    },
    RetryPath {
        hostile: HostileId,
        attempt: u8,
    },
    ChainHop {
        hop: ChainHop,
    },
}

#[derive(Clone, Debug)]
struct Scheduled {
    due: Duration,
    sequence: u64,
    owner: Option<HostileId>,
    task: Deferred,
}

#[derive(Debug, Default)]
pub(crate) struct TaskQueue {
    pending: Vec<Scheduled>,
    next_sequence: u64,
}

impl TaskQueue {
    pub(crate) fn schedule(&mut self, due: Duration, owner: Option<HostileId>, task: Deferred) {
        self.pending.push(Scheduled {
            due,
            sequence: self.next_sequence,
            owner,
            task,
        });
        self.next_sequence = self.next_sequence.wrapping_add(1);
    }

    /// Drops every task owned by the hostile.
    pub(crate) fn cancel_owned_by(&mut self, owner: HostileId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|scheduled| scheduled.owner != Some(owner));
        before - self.pending.len()
    }

    /// Removes the tasks due at `now`, ordered by due time then scheduling order.
    pub(crate) fn drain_due(&mut self, now: Duration) -> Vec<Deferred> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|scheduled| scheduled.due <= now);
        self.pending = pending;
        due.sort_by_key(|scheduled| (scheduled.due, scheduled.sequence));
        due.into_iter().map(|scheduled| scheduled.task).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry(index: u32, attempt: u8) -> Deferred {
        Deferred::RetryPath {
            hostile: HostileId::new(index, 0),
            attempt,
        }
    }

    #[test]
    fn due_tasks_drain_in_time_then_sequence_order() {
        let mut queue = TaskQueue::default();
        queue.schedule(Duration::from_secs(2), None, retry(0, 1));
        queue.schedule(Duration::from_secs(1), None, retry(1, 1));
        queue.schedule(Duration::from_secs(1), None, retry(2, 1));
        queue.schedule(Duration::from_secs(5), None, retry(3, 1));

        let drained = queue.drain_due(Duration::from_secs(2));
        assert_eq!(drained, vec![retry(1, 1), retry(2, 1), retry(0, 1)]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn cancellation_only_touches_owned_tasks() {
        let mut queue = TaskQueue::default();
        let owner = HostileId::new(7, 0);
        queue.schedule(Duration::from_secs(1), Some(owner), retry(7, 1));
        queue.schedule(Duration::from_secs(1), Some(HostileId::new(7, 1)), retry(7, 2));
        queue.schedule(Duration::from_secs(1), None, retry(8, 1));

        assert_eq!(queue.cancel_owned_by(owner), 1);
        assert_eq!(queue.len(), 2);
    }
}
