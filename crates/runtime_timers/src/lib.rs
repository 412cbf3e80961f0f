//! Deterministic timer queue for a single-threaded page.
//!
//! Nothing here sleeps. The owner of the event loop asks for due tasks up to
//! some point on a virtual millisecond clock and runs them to completion one
//! at a time. A [`TimerId`] doubles as the cancellation token for its task.

use core_types::{Millis, TimerId};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

struct Entry<T> {
    task: T,
    due: Millis,
    seq: u64,
    period: Option<Millis>,
}

pub struct Timers<T> {
    now: Millis,
    next_id: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<(Millis, u64, TimerId)>>,
    entries: HashMap<TimerId, Entry<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            next_seq: 0,
            queue: BinaryHeap::new(),
            entries: HashMap::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Run `task` once, `delay` ms from now.
    pub fn set_timeout(&mut self, delay: Millis, task: T) -> TimerId {
        self.schedule(delay, None, task)
    }

    /// Run `task` every `period` ms (at least 1) until cleared.
    pub fn set_interval(&mut self, period: Millis, task: T) -> TimerId {
        let period = period.max(1);
        self.schedule(period, Some(period), task)
    }

    /// Cancel a timer. Returns false when it already fired or was cleared.
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Due time of the earliest live timer.
    pub fn next_due(&mut self) -> Option<Millis> {
        self.discard_stale();
        self.queue.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Move the clock forward without running anything. Never moves backwards.
    pub fn advance_to(&mut self, at: Millis) {
        self.now = self.now.max(at);
    }

    fn schedule(&mut self, delay: Millis, period: Option<Millis>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        let seq = self.bump_seq();
        self.queue.push(Reverse((due, seq, id)));
        self.entries.insert(
            id,
            Entry {
                task,
                due,
                seq,
                period,
            },
        );
        log::trace!(target: "runtime.timers", "schedule {id:?} due at {due} (period {period:?})");
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse((due, seq, id))) = self.queue.peek().copied() {
            match self.entries.get(&id) {
                Some(entry) if entry.due == due && entry.seq == seq => return,
                _ => {
                    self.queue.pop();
                }
            }
        }
    }
}

impl<T: Clone> Timers<T> {
    /// Pop the earliest task due at or before `until`, moving the clock to its
    /// due time. Intervals are re-armed before their task is handed out, so a
    /// task may clear its own interval.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TimerId, T)> {
        self.discard_stale();
        let Reverse((due, _, id)) = *self.queue.peek()?;
        if due > until {
            return None;
        }
        self.queue.pop();
        self.now = self.now.max(due);

        let period = self.entries.get(&id)?.period;
        match period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = self.entries.get_mut(&id)?;
                entry.due = due.saturating_add(period);
                entry.seq = seq;
                let next_due = entry.due;
                let task = entry.task.clone();
                self.queue.push(Reverse((next_due, seq, id)));
                Some((id, task))
            }
            None => self.entries.remove(&id).map(|entry| (id, entry.task)),
        }
    }
}
