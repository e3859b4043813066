//! Event pools: storage for pending events.
//!
//! A pool admits events whose time falls inside its window and hands them
//! back in time order. Two strategies implement the same [`EventPool`]
//! contract and are interchangeable behind `Box<dyn EventPool<P>>`.
//!
//! # The admission window
//!
//! Every pool tracks three times:
//!
//! - `start` (`ts`): fixed at construction.
//! - `current` (`tc`): the time of the most recently extracted event.
//!   Starts at `start`, is set to each extracted event's time, and jumps
//!   to `end` once the pool runs dry. It only moves backward inside one
//!   slot of a coarse-quantum [`HashedBucketPool`].
//! - `end` (`te`): fixed at construction.
//!
//! `add_event` accepts an event only when `current <= at <= end`. Anything
//! else is refused with `false` and leaves the pool untouched. Callers must
//! check the result.
//!
//! # Ordering
//!
//! Successive `next_event` calls yield non-decreasing keys. Events with
//! equal keys come out in FIFO order. What "equal" means depends on the
//! strategy:
//!
//! - [`OrderedPool`] orders by the exact `(at, id)` pair.
//! - [`HashedBucketPool`] orders by `(slot, insertion order)`, where the
//!   slot is `at` truncated by the pool's [`Quantum`]. With
//!   `Quantum::EXACT` the two strategies produce identical sequences.
//!
//! Pools are single-threaded. Wrap one in a mutex if several threads must
//! drive it.

use tracing::trace;

use crate::error::PoolError;
use crate::event::Event;
use crate::time::{Quantum, SimTime};

pub mod hashed;
pub mod ordered;

pub use hashed::HashedBucketPool;
pub use ordered::OrderedPool;

// ── Window ────────────────────────────────────────────────────────────

/// The `[current, end]` admission window shared by every pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: SimTime,
    current: SimTime,
    end: SimTime,
}

impl Window {
    /// Fails if `start > end`.
    pub fn new(start: SimTime, end: SimTime) -> Result<Self, PoolError> {
        if start > end {
            return Err(PoolError::InvalidWindow { start, end });
        }
        Ok(Window {
            start,
            current: start,
            end,
        })
    }

    #[inline]
    pub fn start(&self) -> SimTime {
        self.start
    }

    #[inline]
    pub fn current(&self) -> SimTime {
        self.current
    }

    #[inline]
    pub fn end(&self) -> SimTime {
        self.end
    }

    /// Whether an event at `at` may be inserted right now.
    #[inline]
    pub fn admits(&self, at: SimTime) -> bool {
        self.current <= at && at <= self.end
    }

    /// Like `admits`, but traces the refusal.
    pub(crate) fn admit<P>(&self, event: &Event<P>) -> bool {
        let ok = self.admits(event.at);
        if !ok {
            trace!(
                id = %event.id,
                at = %event.at,
                now = %self.current,
                end = %self.end,
                "event outside admission window"
            );
        }
        ok
    }

    /// Record that an event at `at` fired: the clock takes its time.
    #[inline]
    pub(crate) fn fire(&mut self, at: SimTime) {
        self.current = at;
    }

    /// The pool ran dry: park the clock at the end of the window.
    #[inline]
    pub(crate) fn exhaust(&mut self) {
        self.current = self.end;
    }
}

// ── Pool kind ─────────────────────────────────────────────────────────

/// Storage strategy, chosen by the driver at construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "snake_case"))]
pub enum PoolKind {
    /// Single binary heap over `(at, id)`.
    Ordered,
    /// Per-slot FIFO buckets plus a heap of active slots.
    #[default]
    HashedBucket,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::Ordered => write!(f, "ordered"),
            PoolKind::HashedBucket => write!(f, "hashed_bucket"),
        }
    }
}

impl std::str::FromStr for PoolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordered" | "heap" => Ok(PoolKind::Ordered),
            "hashed_bucket" | "hashed" | "bucket" => Ok(PoolKind::HashedBucket),
            other => Err(format!("unknown pool kind: {}", other)),
        }
    }
}

// ── Contract ──────────────────────────────────────────────────────────

/// Storage and in-order dispensing of pending events.
pub trait EventPool<P> {
    /// Insert `event` if its time lies in `[current, end]`.
    ///
    /// Returns `false` and stores nothing otherwise.
    fn add_event(&mut self, event: Event<P>) -> bool;

    /// Remove and return the earliest pending event, advancing the clock
    /// to its time.
    ///
    /// Returns `None` once the pool is empty, parking the clock at `end`.
    /// Repeated calls on an empty pool keep returning `None`.
    fn next_event(&mut self) -> Option<Event<P>>;

    /// The admission window and clock.
    fn window(&self) -> &Window;

    /// Number of pending events.
    fn len(&self) -> usize;

    fn kind(&self) -> PoolKind;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `tc`: time of the last extracted event, or `end` once exhausted.
    fn current_time(&self) -> SimTime {
        self.window().current()
    }

    fn start_time(&self) -> SimTime {
        self.window().start()
    }

    fn end_time(&self) -> SimTime {
        self.window().end()
    }
}

/// Build a boxed pool of the requested kind.
///
/// `quantum` only affects [`PoolKind::HashedBucket`].
pub fn build_pool<P: 'static>(
    kind: PoolKind,
    start: SimTime,
    end: SimTime,
    quantum: Quantum,
) -> Result<Box<dyn EventPool<P>>, PoolError> {
    Ok(match kind {
        PoolKind::Ordered => Box::new(OrderedPool::new(start, end)?),
        PoolKind::HashedBucket => Box::new(HashedBucketPool::with_quantum(start, end, quantum)?),
    })
}
