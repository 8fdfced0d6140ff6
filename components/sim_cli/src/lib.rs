//! Cadence demo CLI library
//!
//! Provides the demo runner and supporting modules for the `cadence-sim`
//! binary: canned scenarios that drive the scheduling core and report what
//! ran, in what order, at what simulated time.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod demos;
pub mod error;

pub use cli::Cli;
pub use demos::{DemoReport, DemoRunner, DEMO_NAMES};
pub use error::{CliError, CliResult};
