//! Execution error types.
//!
//! This module provides the error taxonomy used for future rejection
//! reasons and callback failures. Errors are plain data: they are cloned
//! into settlement records, aggregated by combinators, and carried through
//! diagnostic registries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The classification of an execution error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A value had the wrong shape for an operation
    TypeError,
    /// A value was outside the allowed range
    RangeError,
    /// Every input of an aggregating operation rejected
    AggregateError,
    /// Internal runtime limit or invariant failure
    InternalError,
    /// Failure reported by host-supplied code
    HostError,
}

/// An execution error: a rejection reason or a callback failure.
///
/// `causes` is populated only for [`ErrorKind::AggregateError`], in input
/// order. An empty `causes` list is valid; aggregating zero inputs produces
/// the empty aggregate.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, ExecError};
///
/// let e = ExecError::new(ErrorKind::RangeError, "delay out of range");
/// assert_eq!(e.to_string(), "RangeError: delay out of range");
///
/// let agg = ExecError::aggregate(vec![e]);
/// assert_eq!(agg.causes.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{kind:?}: {message}")]
pub struct ExecError {
    /// The error classification
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Individual reasons, for aggregate errors
    pub causes: Vec<ExecError>,
}

impl ExecError {
    /// Creates an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Creates an error reported by host-supplied code.
    pub fn host(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HostError, message)
    }

    /// Creates an aggregate error from individual reasons, in input order.
    pub fn aggregate(causes: Vec<ExecError>) -> Self {
        Self {
            kind: ErrorKind::AggregateError,
            message: format!("all {} inputs rejected", causes.len()),
            causes,
        }
    }
}
