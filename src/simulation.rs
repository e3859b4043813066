/// Simulation driver.
///
/// Owns an event pool and runs the extract-dispatch loop: pull the next
/// event, hand it to a user-supplied handler, let the handler schedule
/// follow-ups. The loop is synchronous and single-threaded; the pool is
/// the only authority on ordering.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::event::{Event, EventId, EventIdGen};
use crate::pool::{build_pool, EventPool};
use crate::time::SimTime;

// ── Handler trait ─────────────────────────────────────────────────────

/// User-defined event handler.
///
/// The handler receives a `SimulationContext` so it can schedule or
/// cancel follow-up events.
pub trait EventHandler<P> {
    /// Called for every dispatched (non-canceled) event.
    fn handle(&mut self, ctx: &mut SimulationContext<'_, P>, event: &Event<P>);
}

/// A handler backed by a closure.
impl<P, F> EventHandler<P> for F
where
    F: FnMut(&mut SimulationContext<'_, P>, &Event<P>),
{
    fn handle(&mut self, ctx: &mut SimulationContext<'_, P>, event: &Event<P>) {
        (self)(ctx, event);
    }
}

// ── Shared insertion path ─────────────────────────────────────────────

fn insert<P, E: EventPool<P> + ?Sized>(
    pool: &mut E,
    ids: &mut EventIdGen,
    at: SimTime,
    payload: P,
    name: Option<&'static str>,
) -> SimResult<EventId> {
    let window = *pool.window();
    if !window.admits(at) {
        return Err(SimError::Rejected {
            at,
            now: window.current(),
            end: window.end(),
        });
    }

    let id = ids.next_id();
    let mut event = Event::new(id, at, payload);
    if let Some(name) = name {
        event = event.named(name);
    }
    let accepted = pool.add_event(event);
    debug_assert!(accepted, "pool refused an event inside its window");
    Ok(id)
}

/// Remember `id` as canceled. Ids that were never minted cannot be pending
/// and are ignored.
fn mark_canceled(canceled: &mut HashSet<EventId>, ids: &EventIdGen, id: EventId) {
    if id < ids.peek() {
        canceled.insert(id);
    }
}

// ── Simulation Context ───────────────────────────────────────────────

/// Mutable context passed to the handler on every dispatch.
pub struct SimulationContext<'a, P> {
    pool: &'a mut dyn EventPool<P>,
    ids: &'a mut EventIdGen,
    canceled: &'a mut HashSet<EventId>,
    now: SimTime,
}

impl<'a, P> SimulationContext<'a, P> {
    /// Time of the event being dispatched.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Last admissible time.
    #[inline]
    pub fn end(&self) -> SimTime {
        self.pool.end_time()
    }

    /// Schedule an event at an absolute time.
    pub fn schedule_at(&mut self, at: SimTime, payload: P) -> SimResult<EventId> {
        insert(&mut *self.pool, self.ids, at, payload, None)
    }

    /// Schedule an event `delay` ticks after now.
    pub fn schedule_after(&mut self, delay: u64, payload: P) -> SimResult<EventId> {
        let at = self.now.plus(delay).ok_or(SimError::TimeOverflow {
            now: self.now,
            delay,
        })?;
        self.schedule_at(at, payload)
    }

    /// Schedule a labelled event at an absolute time.
    pub fn schedule_named(
        &mut self,
        at: SimTime,
        name: &'static str,
        payload: P,
    ) -> SimResult<EventId> {
        insert(&mut *self.pool, self.ids, at, payload, Some(name))
    }

    /// Make a pending event inert. It still fires in order, but its
    /// handler is not invoked.
    pub fn cancel(&mut self, id: EventId) {
        mark_canceled(self.canceled, self.ids, id);
    }

    /// Number of pending events in the pool.
    pub fn pending_count(&self) -> usize {
        self.pool.len()
    }
}

// ── Simulation ────────────────────────────────────────────────────────

/// Top-level simulation driver.
///
/// Call `run` to execute until the pool is drained, or `step` to
/// advance by exactly one event.
pub struct Simulation<P> {
    pool: Box<dyn EventPool<P>>,
    ids: EventIdGen,
    canceled: HashSet<EventId>,
    events_processed: u64,
    events_skipped: u64,
}

impl<P: 'static> Simulation<P> {
    /// Build the pool described by `config`.
    ///
    /// Fails if `config.start > config.end`.
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        let pool = build_pool(config.pool, config.start, config.end, config.quantum)?;
        debug!(
            pool = %config.pool,
            start = %config.start,
            end = %config.end,
            quantum = config.quantum.get(),
            "simulation created"
        );
        Ok(Simulation {
            pool,
            ids: EventIdGen::new(),
            canceled: HashSet::new(),
            events_processed: 0,
            events_skipped: 0,
        })
    }
}

impl<P> Simulation<P> {
    /// Read-only access to the pool.
    pub fn pool(&self) -> &dyn EventPool<P> {
        self.pool.as_ref()
    }

    /// `tc`: time of the last extracted event, `end` once drained.
    pub fn current_time(&self) -> SimTime {
        self.pool.current_time()
    }

    pub fn start_time(&self) -> SimTime {
        self.pool.start_time()
    }

    pub fn end_time(&self) -> SimTime {
        self.pool.end_time()
    }

    /// Total events dispatched to a handler so far.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Total canceled events extracted without dispatch.
    pub fn events_skipped(&self) -> u64 {
        self.events_skipped
    }

    pub fn pending_count(&self) -> usize {
        self.pool.len()
    }

    /// Schedule an event before or between runs.
    pub fn schedule(&mut self, at: SimTime, payload: P) -> SimResult<EventId> {
        insert(self.pool.as_mut(), &mut self.ids, at, payload, None)
    }

    /// Schedule a labelled event.
    pub fn schedule_named(
        &mut self,
        at: SimTime,
        name: &'static str,
        payload: P,
    ) -> SimResult<EventId> {
        insert(self.pool.as_mut(), &mut self.ids, at, payload, Some(name))
    }

    /// Make a pending event inert.
    ///
    /// Ids that were never scheduled are ignored. An id that already fired
    /// stays recorded until the pool next drains.
    pub fn cancel(&mut self, id: EventId) {
        mark_canceled(&mut self.canceled, &self.ids, id);
    }

    /// Number of canceled ids still waiting to be extracted or dropped.
    pub fn canceled_count(&self) -> usize {
        self.canceled.len()
    }

    /// Execute a single step: extract one event and dispatch it unless it
    /// was canceled.
    ///
    /// Returns the extracted event, or `None` once the pool is drained.
    pub fn step(&mut self, handler: &mut dyn EventHandler<P>) -> Option<Event<P>> {
        let Some(event) = self.pool.next_event() else {
            // Nothing is pending, so no recorded id can fire any more.
            self.canceled.clear();
            return None;
        };

        if event.is_canceled() || self.canceled.remove(&event.id) {
            self.events_skipped += 1;
            debug!(event = %event, "skipped canceled event");
            return Some(event);
        }

        self.events_processed += 1;
        let mut ctx = SimulationContext {
            pool: self.pool.as_mut(),
            ids: &mut self.ids,
            canceled: &mut self.canceled,
            now: event.at,
        };
        handler.handle(&mut ctx, &event);

        Some(event)
    }

    /// Run until the pool is drained.
    ///
    /// Returns the number of events dispatched during this run.
    #[tracing::instrument(skip_all, fields(pool = %self.pool.kind()))]
    pub fn run(&mut self, handler: &mut dyn EventHandler<P>) -> u64 {
        let start = self.events_processed;
        info!(pending = self.pool.len(), now = %self.current_time(), "simulation started");
        while self.step(handler).is_some() {}
        let processed = self.events_processed - start;
        info!(
            processed,
            skipped = self.events_skipped,
            now = %self.current_time(),
            "simulation finished"
        );
        processed
    }

    /// Run until the pool is drained **or** `max_steps` events have been
    /// extracted, whichever comes first.
    ///
    /// Returns the number of events dispatched in this call.
    pub fn run_for(&mut self, max_steps: u64, handler: &mut dyn EventHandler<P>) -> u64 {
        let start = self.events_processed;
        let mut steps = 0u64;
        while steps < max_steps {
            if self.step(handler).is_none() {
                break;
            }
            steps += 1;
        }
        self.events_processed - start
    }

    /// Returns `true` if there are no more events to process.
    pub fn is_finished(&self) -> bool {
        self.pool.is_empty()
    }
}
