//! Tick-driven delayed events with cancellation
//!
//! Replaces wall-clock timers: a game schedules an event some ticks ahead and
//! collects it from [`Scheduler::advance`]. Every pending event is cancelled on
//! reset so nothing from a previous session fires into the next one.

use serde::{Deserialize, Serialize};

/// Cancellation token returned by the scheduling calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending<E> {
    id: TaskId,
    due: u64,
    event: E,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<E> {
    now: u64,
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            now: 0,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks advanced so far
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Fire `event` after `delay` ticks (a delay of 0 fires on the next advance)
    pub fn schedule_in(&mut self, delay: u64, event: E) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + delay,
            event,
        });
        id
    }

    /// Schedule a chain of `(delay_from_previous, event)` steps.
    /// Returns one token per step.
    pub fn schedule_sequence(&mut self, steps: impl IntoIterator<Item = (u64, E)>) -> Vec<TaskId> {
        let mut offset = 0;
        steps
            .into_iter()
            .map(|(delay, event)| {
                offset += delay;
                self.schedule_in(offset, event)
            })
            .collect()
    }

    /// Cancel one pending event. False if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        before != self.pending.len()
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("cancelling {} scheduled events", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance one tick and drain every event now due, in (due, schedule order)
    pub fn advance(&mut self) -> Vec<E> {
        self.now += 1;
        let now = self.now;
        let mut due: Vec<Pending<E>> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due, p.id.0));
        due.into_iter().map(|p| p.event).collect()
    }
}
