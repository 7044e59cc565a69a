//! Kairos Core - Deterministic CPU scheduling simulator
//!
//! A discrete-event simulation engine driving a population of processes
//! through the CREATED → READY → RUNNING → BLOCKED/DONE lifecycle under one
//! of six interchangeable scheduling policies. All randomness comes from a
//! file-backed table so that identical inputs produce identical results.
//!
//! Key types:
//! - [`Simulator`] (event loop and accounting)
//! - [`SchedulingPolicy`] trait and the six policies
//! - [`RandomOracle`] (deterministic burst/priority draws)

pub mod des;
pub mod error;
pub mod policies;
pub mod random;
pub mod simulator;
pub mod types;
pub mod workload;

pub use des::{Event, EventQueue};
pub use error::{Result, SimulatorError};
pub use policies::{SchedSpec, SchedulingPolicy};
pub use random::RandomOracle;
pub use simulator::{ProcessStats, SimulationResult, Simulator};
pub use types::{Pid, Process, State};
pub use workload::ProcessSpec;
