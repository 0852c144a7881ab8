//! Error types and handling
//!
//! This module contains error types and error handling for the simulation and the
//! schedule optimizer.

use crate::types::{ConfigError, ConfigValidationError};
use thiserror::Error;

/// Errors that can occur during simulation or optimization
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// A probability table or arrival distribution could not be built
    #[error("Invalid distribution: {0}")]
    DistributionError(String),

    /// A staffing schedule is malformed
    #[error("Schedule error: {0}")]
    ScheduleError(String),

    /// A transfer signal was misused
    #[error("Transfer signal error: {0}")]
    SignalError(String),

    /// The optimizer could not produce a result
    #[error("Optimizer error: {0}")]
    OptimizerError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<ConfigError> for SimulationError {
    fn from(error: ConfigError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a distribution error
    pub fn distribution_error(msg: impl Into<String>) -> Self {
        Self::DistributionError(msg.into())
    }

    /// Create a schedule error
    pub fn schedule_error(msg: impl Into<String>) -> Self {
        Self::ScheduleError(msg.into())
    }

    /// Create a transfer signal error
    pub fn signal_error(msg: impl Into<String>) -> Self {
        Self::SignalError(msg.into())
    }

    /// Create an optimizer error
    pub fn optimizer_error(msg: impl Into<String>) -> Self {
        Self::OptimizerError(msg.into())
    }

    /// Check if this is a recoverable error
    ///
    /// Recoverable errors concern a single run or a single output; the remaining
    /// runs of an optimization can still proceed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::DistributionError(_) => false,
            SimulationError::ScheduleError(_) => false,
            SimulationError::SignalError(_) => true,
            SimulationError::OptimizerError(_) => false,
            SimulationError::IoError(_) => true,
            SimulationError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::DistributionError(_) => "Distribution",
            SimulationError::ScheduleError(_) => "Schedule",
            SimulationError::SignalError(_) => "Transfer Signal",
            SimulationError::OptimizerError(_) => "Optimizer",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
