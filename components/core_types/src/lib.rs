//! Core value types and error handling for the Cadence scheduling runtime.
//!
//! This crate provides the foundational types shared by every component:
//! the dynamic value representation carried by tasks and futures, and the
//! error taxonomy used for rejection reasons and callback failures.
//!
//! # Overview
//!
//! - [`Value`] - Dynamic value carried through queues and futures
//! - [`ExecError`] - Rejection reasons and callback failures
//! - [`ErrorKind`] - Classification of execution errors
//! - [`SettlementRecord`] - Per-input outcome entry for settlement reports
//!
//! # Examples
//!
//! ```
//! use core_types::{Value, ExecError, ErrorKind};
//!
//! let v = Value::Int(42);
//! assert_eq!(v.type_name(), "int");
//!
//! let error = ExecError::new(ErrorKind::TypeError, "not a list");
//! assert!(matches!(error.kind, ErrorKind::TypeError));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{ErrorKind, ExecError};
pub use value::{SettlementRecord, SettlementStatus, Value};
