//! One-shot deferred actions.
//!
//! Every delayed side effect the reconciler produces (appearance swap after a
//! transform effect, the selection grace window, orphan-chat expiry) lives
//! here, so cancelling them when their entity is destroyed is structural
//! rather than a convention each call site must remember.

use meadow_shared::{EntityId, GameDuration, GameInstant};

/// Handle for cancelling a scheduled task.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u32);

/// The deferred work itself, executed by the reconciler's per-frame tick.
#[derive(Clone, Debug, PartialEq)]
pub enum DeferredAction {
    /// Swap in a new appearance once the transform effect has played.
    ApplyAppearance {
        id: EntityId,
        appearance: Vec<u8>,
        crc: Option<u32>,
    },
    /// End the soft-alive grace window of a removed selection.
    ClearSelection { id: EntityId },
    /// Drop the oldest buffered chat line still waiting for its entity.
    ExpireOrphanChat { id: EntityId },
}

struct ScheduledTask {
    handle: TaskHandle,
    due: GameInstant,
    owner: Option<EntityId>,
    action: DeferredAction,
}

/// One-shot timer queue, driven by the frame loop. No threads; `poll` is the
/// only thing that fires tasks.
#[derive(Default)]
pub struct Scheduler {
    next_handle: u32,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to fire `delay` after `now`. Tasks with an owner
    /// die with their entity via [`Scheduler::cancel_owned`].
    pub fn schedule(
        &mut self,
        now: GameInstant,
        delay: GameDuration,
        owner: Option<EntityId>,
        action: DeferredAction,
    ) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.tasks.push(ScheduledTask {
            handle,
            due: now.add(delay),
            owner,
            action,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.handle != handle);
        self.tasks.len() != before
    }

    /// Cancels every task owned by `owner`, returning how many were dropped.
    pub fn cancel_owned(&mut self, owner: EntityId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.owner != Some(owner));
        before - self.tasks.len()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|task| task.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Removes and returns every task due at `now`, earliest first.
    pub fn poll(&mut self, now: GameInstant) -> Vec<DeferredAction> {
        let mut due: Vec<ScheduledTask> = Vec::new();
        let mut remaining = Vec::with_capacity(self.tasks.len());
        for task in self.tasks.drain(..) {
            if now.is_at_or_after(task.due) {
                due.push(task);
            } else {
                remaining.push(task);
            }
        }
        self.tasks = remaining;
        due.sort_by_key(|task| (task.due, task.handle.0));
        due.into_iter().map(|task| task.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: u64) -> GameInstant {
        GameInstant::from_millis(millis)
    }

    #[test]
    fn fires_only_once_due() {
        let mut scheduler = Scheduler::new();
        let id = EntityId::new(1);
        scheduler.schedule(
            at(0),
            GameDuration::from_millis(100),
            None,
            DeferredAction::ClearSelection { id },
        );
        assert!(scheduler.poll(at(50)).is_empty());
        assert_eq!(
            scheduler.poll(at(100)),
            vec![DeferredAction::ClearSelection { id }]
        );
        assert!(scheduler.poll(at(200)).is_empty());
    }

    #[test]
    fn fires_in_due_order() {
        let mut scheduler = Scheduler::new();
        let a = EntityId::new(1);
        let b = EntityId::new(2);
        scheduler.schedule(
            at(0),
            GameDuration::from_millis(200),
            None,
            DeferredAction::ClearSelection { id: b },
        );
        scheduler.schedule(
            at(0),
            GameDuration::from_millis(100),
            None,
            DeferredAction::ClearSelection { id: a },
        );
        assert_eq!(
            scheduler.poll(at(500)),
            vec![
                DeferredAction::ClearSelection { id: a },
                DeferredAction::ClearSelection { id: b },
            ]
        );
    }

    #[test]
    fn cancel_by_handle_and_owner() {
        let mut scheduler = Scheduler::new();
        let owner = EntityId::new(7);
        let handle = scheduler.schedule(
            at(0),
            GameDuration::from_millis(10),
            Some(owner),
            DeferredAction::ClearSelection { id: owner },
        );
        scheduler.schedule(
            at(0),
            GameDuration::from_millis(10),
            Some(owner),
            DeferredAction::ExpireOrphanChat { id: owner },
        );
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.cancel_owned(owner), 1);
        assert!(scheduler.poll(at(100)).is_empty());
    }
}
