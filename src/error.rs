//! Structured error types for the scheduling core.
//!
//! The pool contract itself never fails at runtime: an out-of-window
//! insertion is a `false` from `add_event` and exhaustion is a `None` from
//! `next_event`. Errors here cover malformed construction and the driver's
//! scheduling API, which turns a rejected insertion into a typed error.

use thiserror::Error;

use crate::time::SimTime;

/// Construction errors for event pools.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The window would admit nothing: the start is after the end.
    #[error("invalid time window: start {start} is after end {end}")]
    InvalidWindow { start: SimTime, end: SimTime },
}

/// Errors surfaced by `Simulation` and `SimulationContext`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The pool refused an event outside its admission window.
    #[error("event at {at} rejected: admission window is [{now}, {end}]")]
    Rejected {
        at: SimTime,
        now: SimTime,
        end: SimTime,
    },

    /// A relative delay overflowed the tick counter.
    #[error("scheduling {delay} ticks after {now} overflows simulated time")]
    TimeOverflow { now: SimTime, delay: u64 },
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;
