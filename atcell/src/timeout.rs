//! Absolute-deadline timeout wheel.
//!
//! The spec leaves the wheel's implementation as an open question; resolved
//! here (see DESIGN.md) in favor of a `BinaryHeap` ordered by deadline
//! rather than a classic fixed-slot wheel, since the engine's timeout count
//! is small (one per in-flight request plus per-connection keep-alives) and
//! a heap needs no tick-size tuning.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

pub type TimeoutId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    deadline: Instant,
    id: TimeoutId,
}

/// A min-heap of pending deadlines. Not thread-safe on its own; the producer
/// thread owns it exclusively.
#[derive(Default)]
pub struct TimeoutWheel {
    heap: BinaryHeap<Reverse<Entry>>,
    next_id: TimeoutId,
}

impl TimeoutWheel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a new deadline `after` from now, returning an id that can
    /// be used to recognize it when it fires (cancellation is implicit:
    /// callers just ignore a popped id they no longer care about).
    pub fn schedule(&mut self, after: Duration) -> TimeoutId {
        let id = self.next_id;
        self.next_id += 1;
        self.heap.push(Reverse(Entry { deadline: Instant::now() + after, id }));
        id
    }

    /// Duration until the next deadline, or `None` if the wheel is empty.
    pub fn next_wait(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(e)| e.deadline.saturating_duration_since(Instant::now()))
    }

    /// Pops every deadline that has already elapsed.
    pub fn pop_expired(&mut self) -> Vec<TimeoutId> {
        let now = Instant::now();
        let mut expired = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.deadline > now {
                break;
            }
            let Reverse(entry) = self.heap.pop().unwrap();
            expired.push(entry.id);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_expired_returns_only_elapsed_entries() {
        let mut wheel = TimeoutWheel::new();
        let soon = wheel.schedule(Duration::from_millis(0));
        let later = wheel.schedule(Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(5));
        let expired = wheel.pop_expired();
        assert_eq!(expired, vec![soon]);
        assert!(wheel.next_wait().is_some());
        let _ = later;
    }

    #[test]
    fn next_wait_is_none_when_empty() {
        let wheel = TimeoutWheel::new();
        assert!(wheel.next_wait().is_none());
    }

    #[test]
    fn entries_pop_in_deadline_order() {
        let mut wheel = TimeoutWheel::new();
        let a = wheel.schedule(Duration::from_millis(5));
        let b = wheel.schedule(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(wheel.pop_expired(), vec![b, a]);
    }
}
