//! Execution trace.
//!
//! When tracing is enabled the scheduler records one event per scheduling
//! decision. The trace is plain data, drained by the host; it exists for
//! diagnostics and tests and has no effect on scheduling.

use serde::{Deserialize, Serialize};

/// One recorded scheduling event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// A macrotask entered the queue
    MacroScheduled {
        /// Task id
        id: u64,
        /// Computed deadline after clamping
        deadline: u64,
        /// Insertion stamp
        sequence: u64,
    },
    /// A pending macrotask was cancelled
    MacroCancelled {
        /// Task id
        id: u64,
    },
    /// A macrotask began executing
    MacroStarted {
        /// Task id
        id: u64,
        /// Clock reading at start
        at: u64,
    },
    /// A microtask entered the queue
    MicroScheduled {
        /// Insertion stamp
        sequence: u64,
    },
    /// A microtask began executing
    MicroStarted {
        /// Insertion stamp
        sequence: u64,
        /// Clock reading at start
        at: u64,
    },
    /// The loop advanced the clock to the nearest deadline
    ClockAdvanced {
        /// New clock reading
        to: u64,
    },
    /// A callback returned an error
    TaskFailed {
        /// The failure message
        message: String,
    },
    /// A future rejected with no reject handler attached
    UnhandledRejection {
        /// Id of the rejected future
        source_id: u64,
        /// The rejection message
        message: String,
    },
    /// Both queues drained; the loop went idle
    LoopIdle {
        /// Clock reading at idle
        at: u64,
    },
}
