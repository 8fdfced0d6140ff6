//! The event loop.
//!
//! A [`Scheduler`] is a cloneable handle to one loop instance, owned by the
//! host and passed to every component; there is no global loop. The loop
//! drains microtasks to exhaustion, then runs the single due macrotask with
//! the least `(deadline, sequence)`, and repeats until both queues are
//! empty.
//!
//! The queues and diagnostic registries live behind one mutex. The lock is
//! released before any callback is invoked; the `running` flag, not the
//! lock, is what enforces the single execution stack.

use crate::clock::{SimClock, TimeSource};
use crate::config::SchedulerConfig;
use crate::queue::{clamp_delay, MacrotaskQueue, MicrotaskQueue};
use crate::task::{MacroTask, MicroTask, TaskId};
use crate::trace::TraceEvent;
use core_types::ExecError;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the run methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
    /// A run method was entered from inside a running callback.
    #[error("run loop entered from inside a running callback")]
    Reentrant,
}

/// How a budgeted run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Both queues drained within the budget
    Completed,
    /// The budget ran out with work still queued
    BudgetExhausted,
}

/// Callback type for repeating macrotasks; reused across occurrences.
type RepeatFn = dyn FnMut(&Scheduler) -> Result<(), ExecError> + Send;

struct LoopInner {
    micro: MicrotaskQueue,
    macros: MacrotaskQueue,
    running: bool,
    next_sequence: u64,
    next_task_id: u64,
    /// Ids of repeating tasks that have not been cancelled.
    intervals: HashSet<TaskId>,
    config: SchedulerConfig,
    task_failures: Vec<ExecError>,
    unhandled: Vec<(u64, ExecError)>,
    trace: Vec<TraceEvent>,
}

impl LoopInner {
    fn record(&mut self, event: TraceEvent) {
        if self.config.trace_enabled {
            self.trace.push(event);
        }
    }
}

/// Handle to one event loop instance.
///
/// Clones share the same loop. Callbacks receive a `&Scheduler` when they
/// run, so queued work can always reach the loop that runs it without any
/// ambient global.
///
/// # Examples
///
/// ```
/// use task_scheduler::Scheduler;
///
/// let scheduler = Scheduler::new();
/// scheduler.schedule_delayed(|_| Ok(()), 1000);
/// scheduler.run_until_idle().unwrap();
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Mutex<LoopInner>>,
    time: Arc<dyn TimeSource>,
}

impl Scheduler {
    /// Creates a scheduler with a fresh [`SimClock`] and default config.
    pub fn new() -> Self {
        Self::with_parts(SchedulerConfig::default(), Arc::new(SimClock::new()))
    }

    /// Creates a scheduler with the given config and a fresh [`SimClock`].
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::with_parts(config, Arc::new(SimClock::new()))
    }

    /// Creates a scheduler driven by the given time source.
    pub fn with_time_source(time: Arc<dyn TimeSource>) -> Self {
        Self::with_parts(SchedulerConfig::default(), time)
    }

    /// Creates a scheduler from explicit parts.
    pub fn with_parts(config: SchedulerConfig, time: Arc<dyn TimeSource>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LoopInner {
                micro: MicrotaskQueue::new(),
                macros: MacrotaskQueue::new(),
                running: false,
                next_sequence: 0,
                next_task_id: 0,
                intervals: HashSet::new(),
                config,
                task_failures: Vec::new(),
                unhandled: Vec::new(),
                trace: Vec::new(),
            })),
            time,
        }
    }

    /// Current clock reading in milliseconds.
    pub fn now(&self) -> u64 {
        self.time.now()
    }

    /// A copy of the scheduler's configuration.
    pub fn config(&self) -> SchedulerConfig {
        self.inner.lock().config.clone()
    }

    /// Schedules a delayed macrotask; returns its cancellation id.
    ///
    /// The delay is clamped: negative requests run at the current time,
    /// requests above `config.max_delay_ms` are pinned to that maximum.
    pub fn schedule_delayed<F>(&self, callback: F, delay_ms: i64) -> TaskId
    where
        F: FnOnce(&Scheduler) -> Result<(), ExecError> + Send + 'static,
    {
        let now = self.time.now();
        let mut inner = self.inner.lock();
        let id = TaskId(inner.next_task_id);
        inner.next_task_id += 1;
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        let deadline = now.saturating_add(clamp_delay(delay_ms, inner.config.max_delay_ms));
        inner.record(TraceEvent::MacroScheduled {
            id: id.0,
            deadline,
            sequence,
        });
        inner
            .macros
            .enqueue(MacroTask::new(id, now, deadline, sequence, callback));
        id
    }

    /// Schedules a repeating macrotask; returns its cancellation id.
    ///
    /// The callback first runs after one interval and then after every
    /// further interval, measured from the previous occurrence. Each
    /// interval request is clamped like a delay. Repeating and one-shot
    /// tasks draw ids from the same pool, and
    /// [`cancel_delayed`](Self::cancel_delayed) clears either kind,
    /// including from inside the repeating callback itself, which stops
    /// all further occurrences.
    ///
    /// A callback failure is recorded like any task failure; the interval
    /// keeps firing. A repeating task that is never cancelled keeps the
    /// loop busy forever; like microtask starvation, that is the host's
    /// problem to contain (see [`run_with_budget`](Self::run_with_budget)).
    pub fn schedule_repeating<F>(&self, callback: F, interval_ms: i64) -> TaskId
    where
        F: FnMut(&Scheduler) -> Result<(), ExecError> + Send + 'static,
    {
        let id = {
            let mut inner = self.inner.lock();
            let id = TaskId(inner.next_task_id);
            inner.next_task_id += 1;
            inner.intervals.insert(id);
            id
        };
        self.enqueue_occurrence(id, interval_ms, Arc::new(Mutex::new(callback)));
        id
    }

    /// Cancels a pending macrotask or a repeating task.
    ///
    /// Unknown or already-executed ids are silently ignored.
    pub fn cancel_delayed(&self, id: TaskId) {
        let mut inner = self.inner.lock();
        let queued = inner.macros.cancel(id);
        let repeating = inner.intervals.remove(&id);
        if queued || repeating {
            inner.record(TraceEvent::MacroCancelled { id: id.0 });
        }
    }

    /// Appends a microtask.
    pub fn schedule_microtask<F>(&self, callback: F)
    where
        F: FnOnce(&Scheduler) -> Result<(), ExecError> + Send + 'static,
    {
        let mut inner = self.inner.lock();
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.record(TraceEvent::MicroScheduled { sequence });
        inner.micro.enqueue(MicroTask::new(sequence, callback));
    }

    /// Runs until both queues are empty.
    ///
    /// When only not-yet-due macrotasks remain, the loop waits on the time
    /// source for the nearest deadline; with a [`SimClock`] that advances
    /// the clock directly.
    pub fn run_until_idle(&self) -> Result<(), LoopError> {
        let _guard = self.acquire_run()?;
        loop {
            self.drain_micro();
            let next = self.inner.lock().macros.next_deadline();
            let Some(deadline) = next else {
                break;
            };
            if deadline > self.time.now() {
                self.time.wait_until(deadline);
                self.inner
                    .lock()
                    .record(TraceEvent::ClockAdvanced { to: deadline });
            }
            let due = self.inner.lock().macros.pop_due(self.time.now());
            if let Some(task) = due {
                self.execute_macro(task);
            }
        }
        let at = self.time.now();
        self.inner.lock().record(TraceEvent::LoopIdle { at });
        Ok(())
    }

    /// Drains the microtask queue to exhaustion.
    ///
    /// Microtasks enqueued during execution are also drained. Returns the
    /// number of microtasks executed.
    pub fn run_all_microtasks(&self) -> Result<usize, LoopError> {
        let _guard = self.acquire_run()?;
        Ok(self.drain_micro())
    }

    /// One loop cycle: drain microtasks, run at most one due macrotask,
    /// drain microtasks again.
    ///
    /// Does not advance the clock; a macrotask runs only if its deadline
    /// has passed. Returns whether work remains queued.
    pub fn process_one_cycle(&self) -> Result<bool, LoopError> {
        let _guard = self.acquire_run()?;
        self.drain_micro();
        let due = self.inner.lock().macros.pop_due(self.time.now());
        if let Some(task) = due {
            self.execute_macro(task);
        }
        self.drain_micro();
        Ok(!self.is_idle())
    }

    /// Like [`run_until_idle`](Self::run_until_idle), but stops after
    /// executing `max_units` callbacks.
    ///
    /// This is the containment harness for runaway work: a microtask that
    /// unconditionally re-enqueues itself starves the macrotask queue
    /// forever, and the loop will not correct that on its own.
    pub fn run_with_budget(&self, max_units: usize) -> Result<RunOutcome, LoopError> {
        let _guard = self.acquire_run()?;
        let mut used = 0;
        loop {
            if self.is_idle() {
                return Ok(RunOutcome::Completed);
            }
            if used >= max_units {
                return Ok(RunOutcome::BudgetExhausted);
            }
            let micro = self.inner.lock().micro.dequeue();
            if let Some(task) = micro {
                self.execute_micro(task);
                used += 1;
                continue;
            }
            let next = self.inner.lock().macros.next_deadline();
            let Some(deadline) = next else {
                return Ok(RunOutcome::Completed);
            };
            if deadline > self.time.now() {
                self.time.wait_until(deadline);
                self.inner
                    .lock()
                    .record(TraceEvent::ClockAdvanced { to: deadline });
            }
            let due = self.inner.lock().macros.pop_due(self.time.now());
            if let Some(task) = due {
                self.execute_macro(task);
                used += 1;
            }
        }
    }

    /// Returns true if both queues are empty.
    pub fn is_idle(&self) -> bool {
        let inner = self.inner.lock();
        inner.micro.is_empty() && inner.macros.is_empty()
    }

    /// Number of queued microtasks.
    pub fn pending_microtasks(&self) -> usize {
        self.inner.lock().micro.len()
    }

    /// Number of queued macrotasks.
    pub fn pending_macrotasks(&self) -> usize {
        self.inner.lock().macros.len()
    }

    /// Records a rejected future that has no reject handler.
    ///
    /// Reporting is diagnostic only; it never alters scheduling. A later
    /// [`retract_unhandled_rejection`](Self::retract_unhandled_rejection)
    /// withdraws the report.
    pub fn report_unhandled_rejection(&self, source_id: u64, error: ExecError) {
        let mut inner = self.inner.lock();
        if inner.unhandled.iter().any(|(id, _)| *id == source_id) {
            return;
        }
        inner.record(TraceEvent::UnhandledRejection {
            source_id,
            message: error.to_string(),
        });
        inner.unhandled.push((source_id, error));
    }

    /// Withdraws an unhandled-rejection report after a handler arrived.
    pub fn retract_unhandled_rejection(&self, source_id: u64) {
        self.inner
            .lock()
            .unhandled
            .retain(|(id, _)| *id != source_id);
    }

    /// Drains the unhandled-rejection registry.
    pub fn take_unhandled_rejections(&self) -> Vec<(u64, ExecError)> {
        std::mem::take(&mut self.inner.lock().unhandled)
    }

    /// Drains the task-failure registry.
    pub fn take_task_failures(&self) -> Vec<ExecError> {
        std::mem::take(&mut self.inner.lock().task_failures)
    }

    /// Drains the recorded trace.
    pub fn take_trace(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.inner.lock().trace)
    }

    /// Enqueues the next occurrence of a repeating task.
    fn enqueue_occurrence(&self, id: TaskId, interval_ms: i64, callback: Arc<Mutex<RepeatFn>>) {
        let now = self.time.now();
        let mut inner = self.inner.lock();
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        let deadline = now.saturating_add(clamp_delay(interval_ms, inner.config.max_delay_ms));
        inner.record(TraceEvent::MacroScheduled {
            id: id.0,
            deadline,
            sequence,
        });
        let runner = move |scheduler: &Scheduler| {
            let result = (*callback.lock())(scheduler);
            let active = scheduler.inner.lock().intervals.contains(&id);
            if active {
                scheduler.enqueue_occurrence(id, interval_ms, Arc::clone(&callback));
            }
            result
        };
        inner
            .macros
            .enqueue(MacroTask::new(id, now, deadline, sequence, runner));
    }

    fn acquire_run(&self) -> Result<RunGuard, LoopError> {
        let mut inner = self.inner.lock();
        if inner.running {
            return Err(LoopError::Reentrant);
        }
        inner.running = true;
        Ok(RunGuard {
            inner: Arc::clone(&self.inner),
        })
    }

    fn drain_micro(&self) -> usize {
        let mut count = 0;
        loop {
            let task = self.inner.lock().micro.dequeue();
            let Some(task) = task else {
                break;
            };
            self.execute_micro(task);
            count += 1;
        }
        count
    }

    fn execute_micro(&self, task: MicroTask) {
        let at = self.time.now();
        self.inner.lock().record(TraceEvent::MicroStarted {
            sequence: task.sequence,
            at,
        });
        if let Err(error) = task.run(self) {
            self.record_failure(error);
        }
    }

    fn execute_macro(&self, task: MacroTask) {
        let at = self.time.now();
        self.inner.lock().record(TraceEvent::MacroStarted {
            id: task.id.0,
            at,
        });
        if let Err(error) = task.run(self) {
            self.record_failure(error);
        }
    }

    fn record_failure(&self, error: ExecError) {
        let mut inner = self.inner.lock();
        inner.record(TraceEvent::TaskFailed {
            message: error.to_string(),
        });
        inner.task_failures.push(error);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Scheduler")
            .field("pending_microtasks", &inner.micro.len())
            .field("pending_macrotasks", &inner.macros.len())
            .field("running", &inner.running)
            .finish()
    }
}

struct RunGuard {
    inner: Arc<Mutex<LoopInner>>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.inner.lock().running = false;
    }
}
