//! Error types for the simulator

use thiserror::Error;

/// Simulator result type
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Errors that can occur while setting up a simulation
#[derive(Error, Debug)]
pub enum SimulatorError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Random table file is malformed or truncated
    #[error("invalid random file: {0}")]
    RandomFile(String),

    /// Scheduler specification could not be parsed
    #[error("invalid scheduler specification '{0}': {1}")]
    SchedSpec(String, String),
}

impl SimulatorError {
    /// Create a random-file error
    pub fn random_file(msg: impl Into<String>) -> Self {
        Self::RandomFile(msg.into())
    }

    /// Create a scheduler-spec error
    pub fn sched_spec(spec: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::SchedSpec(spec.into(), msg.into())
    }
}
