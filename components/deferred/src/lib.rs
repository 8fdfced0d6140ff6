//! Deferred values for the Cadence runtime.
//!
//! This crate provides the settle-once future state machine, the
//! combinators that compose futures, and the suspension adapter that turns
//! a linear step sequence into a chain of reactions.
//!
//! # Overview
//!
//! - [`Future`] - Settle-once deferred value with reaction chaining
//! - [`combine_all`] / [`combine_all_settled`] / [`combine_any`] /
//!   [`combine_race`] - Aggregation over future lists
//! - [`SuspendedSequence`] - Linear steps resumed through reactions
//!
//! Settlement is observed strictly asynchronously: attaching a reaction —
//! even to an already-settled future — enqueues a microtask on the
//! scheduler; nothing runs inline.
//!
//! # Examples
//!
//! ```
//! use core_types::Value;
//! use deferred::{Future, Resolved};
//! use task_scheduler::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! let future = Future::pending();
//! let chained = future.attach_fulfill(&scheduler, |_, value| {
//!     Ok(Resolved::Immediate(value))
//! });
//!
//! future.settle_fulfilled(&scheduler, Value::Int(5));
//! scheduler.run_until_idle().unwrap();
//! assert_eq!(chained.value(), Some(Value::Int(5)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod combinators;
pub mod future;
pub mod sequence;

// Re-export main types at crate root
pub use combinators::{combine_all, combine_all_settled, combine_any, combine_race};
pub use future::{FulfillHandler, Future, FutureState, RejectHandler, Resolved, Resolver};
pub use sequence::{run_suspended, SuspendStep, SuspendedSequence};
