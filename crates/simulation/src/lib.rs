//! Epidemic propagation on contact graphs.
//!
//! Two continuous-time engines share one event loop:
//!
//! - [`SirSimulator`]: a single valid contact infects.
//! - [`SarSimulator`]: a node activates after a per-node number of exposures.
//!
//! plus the synchronous [`VacSirSimulator`], a discrete-time SIR with
//! reactive vaccination.
//!
//! # Event loop
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  EventQueue  (min-heap on time, kind, sequence)          │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ pop_min
//!                             ▼
//!          time >= horizon? ── yes ──▶ stop
//!                             │ no
//!                             ▼
//!  Transmit(u): S and t == predicted[u]?   Recover(u): I and t == recovery[u]?
//!        │ yes                                   │ yes
//!        ▼                                       ▼
//!  activate u: draw recovery, then           I → R, record sample
//!  find_transmit to each neighbour
//! ```
//!
//! A run owns all of its mutable state; only the [`ContactGraph`] is shared,
//! read-only, so independent runs can execute on different threads.
//!
//! [`ContactGraph`]: sirsim_graph::ContactGraph

mod error;
mod params;
mod propagation;
mod result;
mod sar;
mod sir;
mod vacsir;

pub use error::SimulationError;
pub use params::SpreadParams;
pub use result::{RunStats, Sample, SpreadResult};
pub use sar::{simulate_sar, SarSimulator};
pub use sir::{simulate_sir, SirSimulator};
pub use vacsir::{simulate_vacsir, VacSirConfig, VacSirResult, VacSirSimulator};
