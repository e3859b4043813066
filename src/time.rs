/// Simulated time for the event-scheduling core.
///
/// A `SimTime` is an integer tick count measured from a fixed origin. It
/// never reads the wall clock; it only moves when a pool hands out an
/// event. Bucketed pools group times by a `Quantum` into integer slots.

use std::num::NonZeroU64;

/// A point in simulated time, in ticks since the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(u64);

impl SimTime {
    /// The origin of simulated time.
    pub const ZERO: SimTime = SimTime(0);

    /// The latest representable time.
    pub const MAX: SimTime = SimTime(u64::MAX);

    /// Create a new `SimTime` from a raw tick value.
    #[inline]
    pub fn new(ticks: u64) -> Self {
        SimTime(ticks)
    }

    /// Return the raw tick value.
    #[inline]
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// Advance time by `delta` ticks.
    /// Returns `None` on overflow.
    #[inline]
    pub fn advance(self, delta: u64) -> Option<SimTime> {
        self.0.checked_add(delta).map(SimTime)
    }

    /// The absolute time `delay` ticks after `self`.
    #[inline]
    pub fn plus(self, delay: u64) -> Option<SimTime> {
        self.advance(delay)
    }

    /// Returns `true` if `self` is strictly before `other`.
    #[inline]
    pub fn is_before(self, other: SimTime) -> bool {
        self.0 < other.0
    }

    /// Ticks elapsed between `other` and `self`.
    /// Returns `None` if `other` is after `self`.
    #[inline]
    pub fn duration_since(self, other: SimTime) -> Option<u64> {
        self.0.checked_sub(other.0)
    }

    /// The slot this time falls into when quantized by `quantum`.
    ///
    /// Truncating division, so `a <= b` implies
    /// `a.time_slot(q) <= b.time_slot(q)` for every `q`.
    #[inline]
    pub fn time_slot(self, quantum: Quantum) -> u64 {
        self.0 / quantum.get()
    }

    /// Convert seconds to ticks at the given accuracy, rounding to the
    /// nearest tick. Negative and NaN inputs clamp to the origin.
    pub fn from_secs_f64(secs: f64, accuracy: Accuracy) -> Self {
        let ticks = (secs * accuracy.ticks_per_sec() as f64).round();
        if ticks.is_nan() || ticks <= 0.0 {
            SimTime::ZERO
        } else if ticks >= u64::MAX as f64 {
            SimTime::MAX
        } else {
            SimTime(ticks as u64)
        }
    }

    /// This time in seconds at the given accuracy.
    pub fn as_secs_f64(self, accuracy: Accuracy) -> f64 {
        self.0 as f64 / accuracy.ticks_per_sec() as f64
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={}", self.0)
    }
}

/// Width of one time slot, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Quantum(NonZeroU64);

impl Quantum {
    /// One tick per slot: slot ordering equals time ordering.
    pub const EXACT: Quantum = Quantum(NonZeroU64::MIN);

    /// Returns `None` for a zero-width quantum.
    #[inline]
    pub fn new(ticks: u64) -> Option<Self> {
        NonZeroU64::new(ticks).map(Quantum)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Default for Quantum {
    fn default() -> Self {
        Quantum::EXACT
    }
}

/// Number of ticks in one simulated second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Accuracy(NonZeroU64);

impl Accuracy {
    /// Microsecond resolution.
    pub const MICROS: Accuracy = Accuracy(match NonZeroU64::new(1_000_000) {
        Some(n) => n,
        None => NonZeroU64::MIN,
    });

    #[inline]
    pub fn new(ticks_per_sec: u64) -> Option<Self> {
        NonZeroU64::new(ticks_per_sec).map(Accuracy)
    }

    #[inline]
    pub fn ticks_per_sec(self) -> u64 {
        self.0.get()
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Accuracy::MICROS
    }
}
