//! Deterministic simulation harness for callslot testing.
//!
//! Virtual-time implementations of the Environment and Driver traits for
//! deterministic, reproducible testing of the call slot, from the bare
//! coordinator up to the full runtime loop.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the call
//! slot invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    CallSnapshot, CallTracker, ElapsedMonotonic, Invariant, InvariantRegistry, InvariantResult,
    SingleEndCommand, SingleSlot, StartedAtIffActive, TimerOnlyWhenActive, Violation,
};
pub use sim_driver::{RenderRecord, SIM_FRAME, SimDriver, SimDriverError, SimProbe, SimStep};
pub use sim_env::SimEnv;
