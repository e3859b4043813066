/// Baseline event pool.
///
/// Uses a `BinaryHeap` with a reversed `Ord` wrapper to act as a min-heap
/// keyed by `(at, id)`. Every pending event is its own heap entry, so both
/// insertion and extraction cost O(log n) regardless of how many events
/// share a timestamp.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use super::{EventPool, PoolKind, Window};
use crate::error::PoolError;
use crate::event::Event;
use crate::time::SimTime;

/// Heap entry: smallest `(at, id)` first.
#[derive(Debug)]
struct Entry<P>(Event<P>);

impl<P> PartialEq for Entry<P> {
    fn eq(&self, other: &Self) -> bool {
        self.0.key() == other.0.key()
    }
}

impl<P> Eq for Entry<P> {}

impl<P> Ord for Entry<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other.0.key().cmp(&self.0.key())
    }
}

impl<P> PartialOrd for Entry<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Exact-order pool over a single min-heap.
#[derive(Debug)]
pub struct OrderedPool<P> {
    window: Window,
    queue: BinaryHeap<Entry<P>>,
}

impl<P> OrderedPool<P> {
    /// Create an empty pool over `[start, end]`.
    pub fn new(start: SimTime, end: SimTime) -> Result<Self, PoolError> {
        Ok(OrderedPool {
            window: Window::new(start, end)?,
            queue: BinaryHeap::new(),
        })
    }

    /// Peek at the next event without removing it.
    pub fn peek_next(&self) -> Option<&Event<P>> {
        self.queue.peek().map(|entry| &entry.0)
    }

    /// Drain all pending events in firing order into a `Vec`.
    /// The clock follows the drained events.
    pub fn drain_ordered(&mut self) -> Vec<Event<P>> {
        let mut events = Vec::with_capacity(self.queue.len());
        while let Some(e) = self.next_event() {
            events.push(e);
        }
        events
    }
}

impl<P> EventPool<P> for OrderedPool<P> {
    fn add_event(&mut self, event: Event<P>) -> bool {
        if !self.window.admit(&event) {
            return false;
        }
        self.queue.push(Entry(event));
        true
    }

    fn next_event(&mut self) -> Option<Event<P>> {
        match self.queue.pop() {
            Some(Entry(event)) => {
                self.window.fire(event.at);
                trace!(id = %event.id, at = %event.at, pending = self.queue.len(), "event fired");
                Some(event)
            }
            None => {
                self.window.exhaust();
                None
            }
        }
    }

    fn window(&self) -> &Window {
        &self.window
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn kind(&self) -> PoolKind {
        PoolKind::Ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventIdGen;

    fn pool(end: u64) -> (OrderedPool<&'static str>, EventIdGen) {
        (
            OrderedPool::new(SimTime::ZERO, SimTime::new(end)).unwrap(),
            EventIdGen::new(),
        )
    }

    fn add(
        pool: &mut OrderedPool<&'static str>,
        ids: &mut EventIdGen,
        at: u64,
        p: &'static str,
    ) -> bool {
        pool.add_event(Event::new(ids.next_id(), SimTime::new(at), p))
    }

    #[test]
    fn test_fifo_at_same_time() {
        let (mut pool, mut ids) = pool(100);
        add(&mut pool, &mut ids, 10, "first");
        add(&mut pool, &mut ids, 10, "second");
        add(&mut pool, &mut ids, 10, "third");

        let e1 = pool.next_event().unwrap();
        let e2 = pool.next_event().unwrap();
        let e3 = pool.next_event().unwrap();

        assert!(e1.id < e2.id && e2.id < e3.id);
        assert_eq!(
            [e1.payload, e2.payload, e3.payload],
            ["first", "second", "third"]
        );
    }

    #[test]
    fn test_time_ordering() {
        let (mut pool, mut ids) = pool(100);
        add(&mut pool, &mut ids, 30, "late");
        add(&mut pool, &mut ids, 10, "early");
        add(&mut pool, &mut ids, 20, "mid");

        let times: Vec<u64> = pool.drain_ordered().iter().map(|e| e.at.ticks()).collect();
        assert_eq!(times, vec![10, 20, 30]);
    }

    #[test]
    fn test_mixed_ordering() {
        let (mut pool, mut ids) = pool(100);
        for at in [50, 10, 10, 30, 10] {
            add(&mut pool, &mut ids, at, "");
        }

        let events = pool.drain_ordered();
        for window in events.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            assert!(a.key() < b.key(), "Events out of order: {:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_peek_does_not_advance() {
        let (mut pool, mut ids) = pool(100);
        add(&mut pool, &mut ids, 8, "a");
        assert_eq!(pool.peek_next().map(|e| e.at), Some(SimTime::new(8)));
        assert_eq!(pool.current_time(), SimTime::ZERO);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_window_rejections() {
        let (mut pool, mut ids) = pool(100);
        assert!(!add(&mut pool, &mut ids, 101, "too late"));
        assert!(add(&mut pool, &mut ids, 40, "ok"));
        pool.next_event();
        assert!(!add(&mut pool, &mut ids, 39, "past"));
        assert!(add(&mut pool, &mut ids, 40, "now"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_empty_pool() {
        let (mut pool, _) = pool(50);
        assert!(pool.is_empty());
        assert!(pool.next_event().is_none());
        assert_eq!(pool.current_time(), SimTime::new(50));
        assert!(pool.next_event().is_none());
        assert_eq!(pool.current_time(), SimTime::new(50));
    }

    #[test]
    fn test_determinism_across_runs() {
        fn build() -> Vec<(u64, u64, &'static str)> {
            let (mut pool, mut ids) = pool(100);
            for (at, p) in [(5, "a"), (3, "b"), (5, "c"), (1, "d"), (3, "e")] {
                add(&mut pool, &mut ids, at, p);
            }
            pool.drain_ordered()
                .into_iter()
                .map(|e| (e.id.raw(), e.at.ticks(), e.payload))
                .collect()
        }
        assert_eq!(build(), build());
    }
}
