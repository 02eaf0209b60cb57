//! Core types for sirsim epidemic simulations.
//!
//! This crate provides the vocabulary shared by every other crate:
//!
//! - **Identifiers**: `NodeIndex` for addressing nodes of a contact graph
//! - **Compartments**: `Compartment` and `CompartmentCounts` for SIR-family models
//! - **Events**: `EventKind`, whose declaration order is the tie-break rule
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend on
//! any other workspace crates, making it the foundation layer.

mod compartment;
mod identifiers;

pub use compartment::{Compartment, CompartmentCounts, ModelKind};
pub use identifiers::{EventKind, NodeIndex};
