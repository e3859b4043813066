//! # qkernel — discrete-event scheduling core
//!
//! Advances a simulated clock and hands scheduled events back in
//! non-decreasing time order. Topology, routing and the meaning of events
//! live outside this crate; they produce events and consume the pool.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │          Simulation           │ ← extract / dispatch / insert loop
//! │  ┌────────────────────────┐  │
//! │  │   dyn EventPool<P>     │  │ ← admission window + ordering
//! │  │  ┌──────────────────┐  │  │
//! │  │  │ OrderedPool      │  │  │ ← one heap over (at, id)
//! │  │  ├──────────────────┤  │  │
//! │  │  │ HashedBucketPool │  │  │ ← slot buckets + active-slot heap
//! │  │  └──────────────────┘  │  │
//! │  └────────────────────────┘  │
//! │  ┌────────────────────────┐  │
//! │  │  Event<P>              │  │ ← (at, id, payload)
//! │  └────────────────────────┘  │
//! │  ┌────────────────────────┐  │
//! │  │  SimTime / Quantum     │  │ ← ticks and time slots
//! │  └────────────────────────┘  │
//! └──────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod pool;
pub mod simulation;
pub mod time;

// Re-exports for convenience.
pub use config::SimulationConfig;
pub use error::{PoolError, SimError, SimResult};
pub use event::{Event, EventId, EventIdGen};
pub use pool::{build_pool, EventPool, HashedBucketPool, OrderedPool, PoolKind, Window};
pub use simulation::{EventHandler, Simulation, SimulationContext};
pub use time::{Accuracy, Quantum, SimTime};
