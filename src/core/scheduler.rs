//! Owned timer table for the single-threaded event loop.
//!
//! Timers never fire on their own: the loop asks for [`Scheduler::next_deadline`],
//! sleeps until then, and drains [`Scheduler::pop_due`]. Cancelling a timer
//! removes its action, so a cancelled step can never run.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct Scheduler<A> {
    next_id: u64,
    queue: BTreeMap<(Instant, TimerId), A>,
    deadlines: HashMap<TimerId, Instant>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Instant, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((at, id), action);
        self.deadlines.insert(id, at);
        id
    }

    /// Returns false when `id` already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(at) => self.queue.remove(&(at, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<Instant> {
        self.deadlines.get(&id).copied()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Removes and returns every timer due at or before `now`, earliest first.
    /// Timers sharing a deadline fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Vec<(TimerId, A)> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            let (at, id) = *entry.key();
            if at > now {
                break;
            }
            let action = entry.remove();
            self.deadlines.remove(&id);
            due.push((id, action));
        }
        due
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Scheduler;
    use std::time::{Duration, Instant};

    #[test]
    fn due_timers_fire_in_deadline_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(start + Duration::from_millis(30), "late");
        scheduler.schedule(start + Duration::from_millis(10), "early");
        scheduler.schedule(start + Duration::from_millis(10), "early-second");

        assert_eq!(scheduler.next_deadline(), Some(start + Duration::from_millis(10)));
        let fired: Vec<_> = scheduler
            .pop_due(start + Duration::from_millis(20))
            .into_iter()
            .map(|(_, action)| action)
            .collect();
        assert_eq!(fired, vec!["early", "early-second"]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(start, 1);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.pop_due(start + Duration::from_secs(1)).is_empty());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn fired_timer_is_no_longer_pending() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(start, ());
        assert!(scheduler.is_pending(id));
        scheduler.pop_due(start);
        assert!(!scheduler.is_pending(id));
        assert!(!scheduler.cancel(id));
    }
}
