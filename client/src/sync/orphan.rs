//! Chat lines that arrived before their entity.
//!
//! Chat is delivered on its own channel and can race the entity stream, so a
//! line addressed to an id the table does not know yet is buffered here. The
//! entity appearing flushes the buffer in arrival order; each line also
//! carries an expiry task so lines for entities that never appear are
//! eventually dropped.

use std::collections::{HashMap, VecDeque};

use meadow_shared::EntityId;

use crate::sync::scheduler::{Scheduler, TaskHandle};

#[derive(Default)]
pub struct OrphanChat {
    pending: HashMap<EntityId, VecDeque<(String, TaskHandle)>>,
}

impl OrphanChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers a line together with its already-scheduled expiry task.
    pub fn push(&mut self, id: EntityId, text: String, expiry: TaskHandle) {
        self.pending
            .entry(id)
            .or_default()
            .push_back((text, expiry));
    }

    /// Releases every buffered line for `id` in arrival order, cancelling
    /// their expiry tasks.
    pub fn flush(&mut self, id: EntityId, scheduler: &mut Scheduler) -> Vec<String> {
        let Some(lines) = self.pending.remove(&id) else {
            return Vec::new();
        };
        lines
            .into_iter()
            .map(|(text, handle)| {
                scheduler.cancel(handle);
                text
            })
            .collect()
    }

    /// Drops the oldest line for `id`. Expiry tasks are scheduled in push
    /// order, so the firing task always corresponds to the front line.
    pub fn expire_oldest(&mut self, id: EntityId) -> Option<String> {
        let lines = self.pending.get_mut(&id)?;
        let (text, _) = lines.pop_front()?;
        if lines.is_empty() {
            self.pending.remove(&id);
        }
        Some(text)
    }

    pub fn pending_count(&self, id: EntityId) -> usize {
        self.pending.get(&id).map(VecDeque::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::scheduler::DeferredAction;
    use meadow_shared::{GameDuration, GameInstant};

    #[test]
    fn flush_returns_lines_in_arrival_order_and_cancels_expiry() {
        let mut orphans = OrphanChat::new();
        let mut scheduler = Scheduler::new();
        let id = EntityId::new(3);
        let now = GameInstant::from_millis(0);
        let delay = GameDuration::from_secs(5);

        for text in ["hi", "hello", "anypony there?"] {
            let handle = scheduler.schedule(
                now,
                delay,
                None,
                DeferredAction::ExpireOrphanChat { id },
            );
            orphans.push(id, text.to_string(), handle);
        }
        assert_eq!(orphans.pending_count(id), 3);

        let lines = orphans.flush(id, &mut scheduler);
        assert_eq!(lines, vec!["hi", "hello", "anypony there?"]);
        assert!(orphans.is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn expiry_drops_the_oldest_line_first() {
        let mut orphans = OrphanChat::new();
        let mut scheduler = Scheduler::new();
        let id = EntityId::new(3);
        let now = GameInstant::from_millis(0);

        for text in ["first", "second"] {
            let handle = scheduler.schedule(
                now,
                GameDuration::from_secs(5),
                None,
                DeferredAction::ExpireOrphanChat { id },
            );
            orphans.push(id, text.to_string(), handle);
        }

        assert_eq!(orphans.expire_oldest(id).as_deref(), Some("first"));
        assert_eq!(orphans.pending_count(id), 1);
        assert_eq!(orphans.expire_oldest(id).as_deref(), Some("second"));
        assert!(orphans.is_empty());
        assert_eq!(orphans.expire_oldest(id), None);
    }
}
