//! Hashed-bucket event pool.
//!
//! Events are grouped by time slot (`at / quantum`). Each slot owns a FIFO
//! bucket, and a min-heap holds the keys of slots that have a bucket. A
//! burst of events at one timestamp costs one heap push for the whole
//! burst and O(1) per event after that.
//!
//! # Semantics
//!
//! Ordering is exact at **slot** granularity only:
//! - Events in lower slots always fire first.
//! - Inside one slot, events fire in insertion order, even if a later
//!   insertion carries a smaller exact time.
//! - For bit-exact time ordering use `Quantum::EXACT`, pick a quantum
//!   finer than the smallest meaningful time delta, or use
//!   [`OrderedPool`](super::OrderedPool).
//!
//! `current_time` is always the time of the event just handed out. When a
//! slot hands out a smaller exact time after a larger one, the clock moves
//! back to it, and the admission window reopens down to that time. Both
//! stay inside the same slot, so slot order is never violated.
//!
//! # Lazy deletion
//!
//! The active-slot heap is allowed to hold a key whose bucket is gone.
//! `next_event` discards such entries when they reach the head. Keys are
//! pushed only when a bucket is created and popped as soon as it drains,
//! so at most one stale key is ever in flight:
//!
//! ```text
//!   active_slots.len() <= buckets.len() + 1
//! ```
//!
//! The bound is checked with `debug_assert!` on every iteration of the
//! extraction loop, and exposed through [`HashedBucketPool::active_slot_count`]
//! and [`HashedBucketPool::bucket_count`] for tests.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use tracing::{debug, trace};

use super::{EventPool, PoolKind, Window};
use crate::error::PoolError;
use crate::event::Event;
use crate::time::{Quantum, SimTime};

/// Slot-bucketed pool with a lazily cleaned heap of active slots.
#[derive(Debug)]
pub struct HashedBucketPool<P> {
    window: Window,
    quantum: Quantum,
    buckets: HashMap<u64, VecDeque<Event<P>>>,
    active_slots: BinaryHeap<Reverse<u64>>,
    len: usize,
    stale_discards: u64,
}

impl<P> HashedBucketPool<P> {
    /// Create an empty pool over `[start, end]` with one tick per slot.
    pub fn new(start: SimTime, end: SimTime) -> Result<Self, PoolError> {
        Self::with_quantum(start, end, Quantum::EXACT)
    }

    /// Create an empty pool over `[start, end]` with `quantum` ticks per slot.
    pub fn with_quantum(start: SimTime, end: SimTime, quantum: Quantum) -> Result<Self, PoolError> {
        Ok(HashedBucketPool {
            window: Window::new(start, end)?,
            quantum,
            buckets: HashMap::new(),
            active_slots: BinaryHeap::new(),
            len: 0,
            stale_discards: 0,
        })
    }

    #[inline]
    pub fn quantum(&self) -> Quantum {
        self.quantum
    }

    /// Number of slots that currently own a bucket.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of entries in the active-slot heap, stale ones included.
    #[inline]
    pub fn active_slot_count(&self) -> usize {
        self.active_slots.len()
    }

    /// Stale heap entries discarded so far.
    #[inline]
    pub fn stale_discards(&self) -> u64 {
        self.stale_discards
    }

    #[inline]
    fn lazy_bound_holds(&self) -> bool {
        self.active_slots.len() <= self.buckets.len() + 1
    }
}

impl<P> EventPool<P> for HashedBucketPool<P> {
    fn add_event(&mut self, event: Event<P>) -> bool {
        if !self.window.admit(&event) {
            return false;
        }

        let slot = event.at.time_slot(self.quantum);
        let bucket = self.buckets.entry(slot).or_insert_with(|| {
            // New bucket: its key enters the heap exactly once.
            self.active_slots.push(Reverse(slot));
            VecDeque::new()
        });
        bucket.push_back(event);
        self.len += 1;
        true
    }

    fn next_event(&mut self) -> Option<Event<P>> {
        while let Some(&Reverse(slot)) = self.active_slots.peek() {
            debug_assert!(
                self.lazy_bound_holds(),
                "active slots {} exceed buckets {} + 1",
                self.active_slots.len(),
                self.buckets.len()
            );

            let Some(bucket) = self.buckets.get_mut(&slot) else {
                self.active_slots.pop();
                self.stale_discards += 1;
                debug!(slot, "discarded stale active slot");
                continue;
            };
            let Some(event) = bucket.pop_front() else {
                // Empty bucket left behind: treat like a stale key.
                self.buckets.remove(&slot);
                self.active_slots.pop();
                self.stale_discards += 1;
                debug!(slot, "discarded empty bucket");
                continue;
            };

            if bucket.is_empty() {
                self.buckets.remove(&slot);
                self.active_slots.pop();
            }
            self.len -= 1;
            self.window.fire(event.at);
            trace!(id = %event.id, at = %event.at, slot, pending = self.len, "event fired");
            return Some(event);
        }

        self.window.exhaust();
        None
    }

    fn window(&self) -> &Window {
        &self.window
    }

    fn len(&self) -> usize {
        self.len
    }

    fn kind(&self) -> PoolKind {
        PoolKind::HashedBucket
    }
}
