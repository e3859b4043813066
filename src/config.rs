//! Simulation configuration.
//!
//! Everything the driver needs to build a pool: the window bounds, the
//! storage strategy and the slot width for bucketed pools. With the
//! `serialize` feature the struct round-trips through serde, and missing
//! fields fall back to [`SimulationConfig::default`].

use crate::pool::PoolKind;
use crate::time::{Accuracy, Quantum, SimTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct SimulationConfig {
    /// `ts`: the clock's initial value.
    pub start: SimTime,
    /// `te`: no event after this time is admitted.
    pub end: SimTime,
    pub pool: PoolKind,
    /// Ticks per slot; ignored by [`PoolKind::Ordered`].
    pub quantum: Quantum,
}

impl SimulationConfig {
    pub fn new(start: SimTime, end: SimTime) -> Self {
        SimulationConfig {
            start,
            end,
            ..Self::default()
        }
    }

    /// Window given in seconds, converted at `accuracy` ticks per second.
    pub fn from_secs(start: f64, end: f64, accuracy: Accuracy) -> Self {
        Self::new(
            SimTime::from_secs_f64(start, accuracy),
            SimTime::from_secs_f64(end, accuracy),
        )
    }

    pub fn with_pool(mut self, pool: PoolKind) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_quantum(mut self, quantum: Quantum) -> Self {
        self.quantum = quantum;
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            start: SimTime::ZERO,
            end: SimTime::MAX,
            pool: PoolKind::default(),
            quantum: Quantum::EXACT,
        }
    }
}
