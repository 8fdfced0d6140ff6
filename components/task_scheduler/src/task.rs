//! Queued units of work.
//!
//! Both task kinds wrap a boxed `FnOnce` callback that receives the
//! scheduler handle, so running work can enqueue further work. A task is
//! consumed by execution; there is no re-run.

use crate::event_loop::Scheduler;
use core_types::ExecError;

/// Identifier of a scheduled macrotask, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// The callback type for both task kinds.
///
/// Callbacks receive the scheduler so they can schedule further microtasks
/// or delayed tasks. An `Err` return is caught at the execution boundary
/// and recorded as a task failure; it never unwinds the loop.
pub type TaskFn = Box<dyn FnOnce(&Scheduler) -> Result<(), ExecError> + Send>;

/// A delayed (timer/host-callback priority) task.
///
/// Macrotasks are ordered by `(deadline, sequence)` and run only when the
/// microtask queue is empty.
pub struct MacroTask {
    /// Cancellation handle
    pub id: TaskId,
    /// Clock reading when the task was scheduled
    pub scheduled_at: u64,
    /// Earliest clock reading at which the task may run
    pub deadline: u64,
    /// Insertion stamp; ties on `deadline` break in insertion order
    pub sequence: u64,
    callback: TaskFn,
}

impl MacroTask {
    /// Creates a macrotask from a closure and its ordering keys.
    pub fn new<F>(id: TaskId, scheduled_at: u64, deadline: u64, sequence: u64, callback: F) -> Self
    where
        F: FnOnce(&Scheduler) -> Result<(), ExecError> + Send + 'static,
    {
        Self {
            id,
            scheduled_at,
            deadline,
            sequence,
            callback: Box::new(callback),
        }
    }

    /// Executes the task, consuming it.
    pub fn run(self, scheduler: &Scheduler) -> Result<(), ExecError> {
        (self.callback)(scheduler)
    }
}

impl std::fmt::Debug for MacroTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacroTask")
            .field("id", &self.id)
            .field("deadline", &self.deadline)
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// A high-priority task, drained to exhaustion before any macrotask runs.
pub struct MicroTask {
    /// Insertion stamp; microtasks run in insertion order
    pub sequence: u64,
    callback: TaskFn,
}

impl MicroTask {
    /// Creates a microtask from a closure and its insertion stamp.
    pub fn new<F>(sequence: u64, callback: F) -> Self
    where
        F: FnOnce(&Scheduler) -> Result<(), ExecError> + Send + 'static,
    {
        Self {
            sequence,
            callback: Box::new(callback),
        }
    }

    /// Executes the microtask, consuming it.
    pub fn run(self, scheduler: &Scheduler) -> Result<(), ExecError> {
        (self.callback)(scheduler)
    }
}

impl std::fmt::Debug for MicroTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicroTask")
            .field("sequence", &self.sequence)
            .finish()
    }
}
