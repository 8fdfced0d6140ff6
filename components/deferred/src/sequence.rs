//! The suspension adapter.
//!
//! Models a function body that pauses at defined points: a linear sequence
//! of steps where each step after the first runs only once the future
//! carrying the previous step's outcome has settled. The first step runs
//! synchronously, like the code before a body's first suspension point;
//! every later step resumes as a fulfillment reaction — a fresh microtask
//! even when the awaited future is already settled.
//!
//! A rejection at any awaited point short-circuits the remaining steps and
//! rejects the overall future.

use crate::future::{FulfillHandler, Future, Resolved};
use core_types::{ExecError, Value};
use task_scheduler::Scheduler;

/// One step of a suspended sequence.
///
/// Receives the previous step's value and either completes with a plain
/// value (`Immediate`), suspends on another future (`Chained`), or fails.
pub type SuspendStep = FulfillHandler;

/// Builder for a suspended sequence of steps.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use deferred::{Resolved, SuspendedSequence};
/// use task_scheduler::Scheduler;
///
/// let scheduler = Scheduler::new();
/// let overall = SuspendedSequence::new()
///     .step(|_, _| Ok(Resolved::Immediate(Value::Int(1))))
///     .step(|_, value| Ok(Resolved::Immediate(value)))
///     .run(&scheduler);
///
/// scheduler.run_until_idle().unwrap();
/// assert_eq!(overall.value(), Some(Value::Int(1)));
/// ```
#[derive(Default)]
pub struct SuspendedSequence {
    steps: Vec<SuspendStep>,
}

impl SuspendedSequence {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn step<F>(mut self, step: F) -> Self
    where
        F: FnOnce(&Scheduler, Value) -> Result<Resolved, ExecError> + Send + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Number of collected steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no steps were collected.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the sequence; see [`run_suspended`].
    pub fn run(self, scheduler: &Scheduler) -> Future {
        run_suspended(scheduler, self.steps)
    }
}

impl std::fmt::Debug for SuspendedSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuspendedSequence")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Runs a step sequence, returning the future for the overall outcome.
///
/// The first step executes before this function returns, with
/// `Value::Undefined` as input. Each later step is registered as a
/// fulfillment reaction on the previous outcome, so it runs in its own
/// microtask with the settled value as input; rejections skip the
/// remaining steps and reject the overall future. An empty sequence
/// fulfills with `Undefined`.
pub fn run_suspended(scheduler: &Scheduler, steps: Vec<SuspendStep>) -> Future {
    let mut steps = steps.into_iter();
    let Some(first) = steps.next() else {
        return Future::fulfilled(scheduler, Value::Undefined);
    };
    let mut chain = match first(scheduler, Value::Undefined) {
        Ok(Resolved::Immediate(value)) => Future::fulfilled(scheduler, value),
        Ok(Resolved::Chained(future)) => future,
        Err(error) => Future::rejected(scheduler, error),
    };
    for step in steps {
        chain = chain.attach(scheduler, Some(step), None);
    }
    chain
}
