/// Events for the scheduling core.
///
/// An `Event` binds an opaque payload to the simulated time it should fire
/// at. Pools own events between insertion and extraction and never mutate
/// them; the caller of `next_event` gets ownership back.

use std::borrow::Cow;

use crate::time::SimTime;

// ── Event ID ──────────────────────────────────────────────────────────

/// A strictly-increasing event sequence number.
///
/// Breaks ties between events scheduled at the same `SimTime`: the
/// smaller id (earlier creation) fires first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EventId(u64);

impl EventId {
    /// Wrap a raw u64 into an `EventId`.
    #[inline]
    pub fn new(raw: u64) -> Self {
        EventId(raw)
    }

    /// Return the raw value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E#{}", self.0)
    }
}

// ── Event ID Generator ───────────────────────────────────────────────

/// Deterministic, strictly-increasing event-ID generator.
///
/// Each `Simulation` owns exactly one, so independent runs never share a
/// counter.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EventIdGen {
    next: u64,
}

impl EventIdGen {
    /// Create a generator starting at 0.
    pub fn new() -> Self {
        EventIdGen { next: 0 }
    }

    /// Create a generator starting at a specific value.
    pub fn starting_at(start: u64) -> Self {
        EventIdGen { next: start }
    }

    /// Mint the next event ID.
    pub fn next_id(&mut self) -> EventId {
        let id = EventId(self.next);
        self.next += 1;
        id
    }

    /// Peek at the next ID without consuming it.
    pub fn peek(&self) -> EventId {
        EventId(self.next)
    }
}

// ── Event ─────────────────────────────────────────────────────────────

/// A single scheduled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<P> {
    /// Sequence number, used only to break ties at equal `at`.
    pub id: EventId,

    /// The simulated time at which this event fires.
    pub at: SimTime,

    /// Opaque payload handed to the handler.
    pub payload: P,

    name: Option<Cow<'static, str>>,
    canceled: bool,
}

impl<P> Event<P> {
    pub fn new(id: EventId, at: SimTime, payload: P) -> Self {
        Event {
            id,
            at,
            payload,
            name: None,
            canceled: false,
        }
    }

    /// Attach a human-readable label, used only in logs.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Mark the event inert. A canceled event still occupies its place in
    /// the pool; the driver skips its handler when it fires.
    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// Total-order key: `(at, id)`.
    #[inline]
    pub fn key(&self) -> (SimTime, EventId) {
        (self.at, self.id)
    }
}

impl<P> std::fmt::Display for Event<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}({}) @ {}", self.id, name, self.at),
            None => write!(f, "{} @ {}", self.id, self.at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_monotonic() {
        let mut gen = EventIdGen::new();
        let a = gen.next_id();
        let b = gen.next_id();
        let c = gen.next_id();
        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert_eq!(c.raw(), 2);
        assert!(a < b && b < c);
        assert_eq!(gen.peek().raw(), 3);
    }

    #[test]
    fn test_generator_start() {
        let mut gen = EventIdGen::starting_at(100);
        assert_eq!(gen.next_id(), EventId::new(100));
    }

    #[test]
    fn test_key_orders_by_time_then_id() {
        let e1 = Event::new(EventId::new(1), SimTime::new(10), ());
        let e2 = Event::new(EventId::new(0), SimTime::new(20), ());
        let e3 = Event::new(EventId::new(2), SimTime::new(10), ());
        assert!(e1.key() < e2.key());
        assert!(e1.key() < e3.key());
    }

    #[test]
    fn test_cancel() {
        let mut e = Event::new(EventId::new(0), SimTime::new(5), "swap");
        assert!(!e.is_canceled());
        e.cancel();
        assert!(e.is_canceled());
        assert_eq!(e.payload, "swap");
    }

    #[test]
    fn test_event_display() {
        let e = Event::new(EventId::new(42), SimTime::new(100), ());
        assert_eq!(e.to_string(), "E#42 @ T=100");
        let e = e.named("generate");
        assert_eq!(e.name(), Some("generate"));
        assert_eq!(e.to_string(), "E#42(generate) @ T=100");
    }
}
