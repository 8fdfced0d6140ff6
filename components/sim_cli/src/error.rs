//! Error types for the CLI

use std::fmt;
use task_scheduler::LoopError;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Requested demo name does not exist
    UnknownDemo(String),

    /// Scheduler loop error
    LoopError(LoopError),

    /// JSON report serialization error
    JsonError(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::UnknownDemo(name) => write!(f, "Unknown demo: {}", name),
            CliError::LoopError(e) => write!(f, "Scheduler error: {}", e),
            CliError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoopError(e) => Some(e),
            CliError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoopError> for CliError {
    fn from(err: LoopError) -> Self {
        CliError::LoopError(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::JsonError(err)
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
