//! Deterministic cooperative scheduler for the Cadence runtime.
//!
//! This crate provides the single-threaded scheduling core: a monotonic
//! clock abstraction, the paired microtask/macrotask queues, and the event
//! loop that drives them.
//!
//! # Overview
//!
//! - [`Scheduler`] - Host-owned event loop handle driving both queues
//! - [`SimClock`] / [`SystemClock`] - Simulated and real [`TimeSource`]s
//! - [`MicrotaskQueue`] / [`MacrotaskQueue`] - The ordered queue pair
//! - [`SchedulerConfig`] - Delay clamp, chain bound, trace switch
//! - [`TraceEvent`] - Serializable execution trace entries
//!
//! # Scheduling model
//!
//! Exactly one callback runs at a time. The loop drains microtasks to
//! exhaustion, then runs the single due macrotask with the least
//! `(deadline, sequence)`, and repeats until both queues are empty.
//! Callback failures are caught at the execution boundary and recorded;
//! they never terminate the loop.
//!
//! # Examples
//!
//! ```
//! use task_scheduler::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! scheduler.schedule_microtask(|_| Ok(()));
//! scheduler.run_until_idle().unwrap();
//! assert!(scheduler.is_idle());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod event_loop;
pub mod queue;
pub mod task;
pub mod trace;

// Re-export main types at crate root
pub use clock::{SimClock, SystemClock, TimeSource};
pub use config::SchedulerConfig;
pub use event_loop::{LoopError, RunOutcome, Scheduler};
pub use queue::{MacrotaskQueue, MicrotaskQueue};
pub use task::{MacroTask, MicroTask, TaskFn, TaskId};
pub use trace::TraceEvent;
