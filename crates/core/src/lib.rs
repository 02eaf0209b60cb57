//! Core simulation primitives shared by every sirsim engine.
//!
//! - [`SimRng`]: deterministic, splittable random source. One seed (plus an
//!   optional stream id) fully determines every draw of a run.
//! - [`EventQueue`]: min-ordered pending events with a strict total order
//!   `(time, kind, sequence)`, so equal-time events resolve reproducibly.
//!
//! Neither type is shared between runs. Parallel trials each own their own
//! queue and their own RNG stream.

mod event_queue;
mod rng;

pub use event_queue::{Event, EventQueue, EventQueueError};
pub use rng::{exponential, SimRng};
