//! Error types for the scenario harness.

use thiserror::Error;
use trajview_core::TrajectoryError;

/// Errors that can occur while setting up or running a scenario.
#[derive(Debug, Error)]
pub enum SimError {
    /// Trajectory construction failed
    #[error("Trajectory error: {0}")]
    Trajectory(#[from] TrajectoryError),

    /// Invalid harness configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Export serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Export file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Creates a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
