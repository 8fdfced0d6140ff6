//! Demo scenarios driving the scheduling core.
//!
//! Each demo builds its own scheduler, runs a canned scenario to idle, and
//! reports the observed output lines plus the scheduler's diagnostics. The
//! scenarios mirror the classic single-threaded runtime behaviors:
//! interleaved log ordering, timers, settlement chains, combinators, and a
//! suspended sequence.

use crate::error::{CliError, CliResult};
use core_types::{ExecError, Value};
use deferred::{
    combine_all, combine_all_settled, combine_any, combine_race, Future, Resolved,
    SuspendedSequence,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use task_scheduler::{Scheduler, SchedulerConfig, TaskId, TraceEvent};

/// Names accepted by [`DemoRunner::run`].
pub const DEMO_NAMES: &[&str] = &[
    "ordering",
    "timers",
    "interval",
    "chain",
    "combinators",
    "suspended",
];

/// What a demo produced: output lines plus scheduler diagnostics.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    /// Demo name
    pub name: String,
    /// Output lines in execution order
    pub lines: Vec<String>,
    /// Execution trace (empty unless tracing was requested)
    pub trace: Vec<TraceEvent>,
    /// Callback failures caught by the scheduler
    pub task_failures: Vec<ExecError>,
    /// Rejections nothing ever observed
    pub unhandled_rejections: Vec<String>,
}

/// Shared output log for demo callbacks.
#[derive(Clone, Default)]
struct OutputLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl OutputLog {
    fn push(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    fn snapshot(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

/// Runs demo scenarios against fresh schedulers.
pub struct DemoRunner {
    trace: bool,
}

impl DemoRunner {
    /// Creates a runner; `trace` enables trace recording on each demo's
    /// scheduler.
    pub fn new(trace: bool) -> Self {
        Self { trace }
    }

    /// Runs a named demo to idle and returns its report.
    pub fn run(&self, name: &str) -> CliResult<DemoReport> {
        match name {
            "ordering" => self.demo_ordering(),
            "timers" => self.demo_timers(),
            "interval" => self.demo_interval(),
            "chain" => self.demo_chain(),
            "combinators" => self.demo_combinators(),
            "suspended" => self.demo_suspended(),
            other => Err(CliError::UnknownDemo(other.to_string())),
        }
    }

    fn scheduler(&self) -> Scheduler {
        Scheduler::with_config(SchedulerConfig {
            trace_enabled: self.trace,
            ..SchedulerConfig::default()
        })
    }

    fn finish(&self, name: &str, scheduler: &Scheduler, log: &OutputLog) -> DemoReport {
        DemoReport {
            name: name.to_string(),
            lines: log.snapshot(),
            trace: scheduler.take_trace(),
            task_failures: scheduler.take_task_failures(),
            unhandled_rejections: scheduler
                .take_unhandled_rejections()
                .into_iter()
                .map(|(id, error)| format!("future {}: {}", id, error))
                .collect(),
        }
    }

    /// Reaction vs microtask vs timer interleaving: logs 5, 1, 3, 4, 2.
    fn demo_ordering(&self) -> CliResult<DemoReport> {
        let scheduler = self.scheduler();
        let log = OutputLog::default();

        let l = log.clone();
        Future::fulfilled(&scheduler, Value::Undefined).attach_fulfill(
            &scheduler,
            move |_, value| {
                l.push("1");
                Ok(Resolved::Immediate(value))
            },
        );

        let l = log.clone();
        scheduler.schedule_delayed(
            move |_| {
                l.push("2");
                Ok(())
            },
            10,
        );

        let l = log.clone();
        scheduler.schedule_microtask(move |scheduler| {
            l.push("3");
            let l = l.clone();
            scheduler.schedule_microtask(move |_| {
                l.push("4");
                Ok(())
            });
            Ok(())
        });

        log.push("5");
        scheduler.run_until_idle()?;
        Ok(self.finish("ordering", &scheduler, &log))
    }

    /// Two timers settling futures at 1000ms and 2000ms.
    fn demo_timers(&self) -> CliResult<DemoReport> {
        let scheduler = self.scheduler();
        let log = OutputLog::default();

        for (message, delay) in [("Timer 1 resolved", 1000_i64), ("Timer 2 resolved", 2000_i64)] {
            let (future, resolver) = Future::create();
            scheduler.schedule_delayed(
                move |scheduler| {
                    resolver.fulfill(scheduler, Value::Str(message.to_string()));
                    Ok(())
                },
                delay,
            );
            let l = log.clone();
            future.attach_fulfill(&scheduler, move |scheduler, value| {
                l.push(format!("[{}ms] {}", scheduler.now(), value));
                Ok(Resolved::Immediate(value))
            });
        }

        scheduler.run_until_idle()?;
        Ok(self.finish("timers", &scheduler, &log))
    }

    /// A repeating task that counts five ticks, then cancels itself from
    /// inside its own callback.
    fn demo_interval(&self) -> CliResult<DemoReport> {
        let scheduler = self.scheduler();
        let log = OutputLog::default();

        let l = log.clone();
        let counter = Arc::new(Mutex::new(0_u32));
        let slot: Arc<Mutex<Option<TaskId>>> = Arc::new(Mutex::new(None));
        let c = counter.clone();
        let s = slot.clone();
        let id = scheduler.schedule_repeating(
            move |scheduler| {
                let mut count = c.lock();
                l.push(format!("Interval {}", *count));
                *count += 1;
                if *count == 5 {
                    if let Some(id) = s.lock().take() {
                        scheduler.cancel_delayed(id);
                    }
                }
                Ok(())
            },
            100,
        );
        *slot.lock() = Some(id);

        log.push("This is logged first");
        scheduler.run_until_idle()?;
        Ok(self.finish("interval", &scheduler, &log))
    }

    /// A settlement chain where a handler fails and a later handler
    /// recovers.
    fn demo_chain(&self) -> CliResult<DemoReport> {
        let scheduler = self.scheduler();
        let log = OutputLog::default();

        let source = Future::fulfilled(&scheduler, Value::Str("OK".to_string()));

        let l = log.clone();
        let failing = source.attach_fulfill(&scheduler, move |_, value| {
            l.push(format!("handler got {}", value));
            Err(ExecError::host("Error in handler"))
        });

        let l = log.clone();
        failing.attach_reject(&scheduler, move |_, error| {
            l.push(format!("caught: {}", error));
            Ok(Resolved::Immediate(Value::Undefined))
        });

        // a missing fulfill handler passes the value through unchanged
        let passed = source.attach(&scheduler, None, None);
        let l = log.clone();
        passed.attach_fulfill(&scheduler, move |_, value| {
            l.push(format!("passed through: {}", value));
            Ok(Resolved::Immediate(value))
        });

        scheduler.run_until_idle()?;
        Ok(self.finish("chain", &scheduler, &log))
    }

    /// The four combinators over timer-settled futures.
    fn demo_combinators(&self) -> CliResult<DemoReport> {
        let scheduler = self.scheduler();
        let log = OutputLog::default();

        let all = combine_all(
            &scheduler,
            vec![
                timer_future(&scheduler, "OK1", 1000, false),
                timer_future(&scheduler, "OK2", 2000, false),
            ],
        );
        let l = log.clone();
        all.attach_fulfill(&scheduler, move |_, value| {
            l.push(format!("all -> {}", value));
            Ok(Resolved::Immediate(value))
        });

        let settled = combine_all_settled(
            &scheduler,
            vec![
                timer_future(&scheduler, "OK1", 1000, false),
                timer_future(&scheduler, "Sorry", 2000, true),
            ],
        );
        let l = log.clone();
        settled.attach_fulfill(&scheduler, move |_, value| {
            l.push(format!("all_settled -> {}", value));
            Ok(Resolved::Immediate(value))
        });

        let any = combine_any(
            &scheduler,
            vec![
                timer_future(&scheduler, "OK1", 1000, false),
                timer_future(&scheduler, "Sorry", 2000, true),
            ],
        );
        let l = log.clone();
        any.attach_fulfill(&scheduler, move |_, value| {
            l.push(format!("any -> {}", value));
            Ok(Resolved::Immediate(value))
        });

        let race = combine_race(
            &scheduler,
            vec![
                timer_future(&scheduler, "OK1", 4000, false),
                timer_future(&scheduler, "OK2", 2000, false),
            ],
        );
        let l = log.clone();
        race.attach_fulfill(&scheduler, move |_, value| {
            l.push(format!("race -> {}", value));
            Ok(Resolved::Immediate(value))
        });

        scheduler.run_until_idle()?;
        Ok(self.finish("combinators", &scheduler, &log))
    }

    /// A suspended sequence awaiting a timer-settled future.
    fn demo_suspended(&self) -> CliResult<DemoReport> {
        let scheduler = self.scheduler();
        let log = OutputLog::default();

        let l = log.clone();
        let overall = SuspendedSequence::new()
            .step(move |scheduler, _| {
                l.push(format!("[{}ms] start", scheduler.now()));
                Ok(Resolved::Chained(timer_future(
                    scheduler, "woke", 5000, false,
                )))
            })
            .step({
                let l = log.clone();
                move |scheduler, value| {
                    l.push(format!("[{}ms] resumed with {}", scheduler.now(), value));
                    Ok(Resolved::Immediate(value))
                }
            })
            .run(&scheduler);

        let l = log.clone();
        overall.attach_fulfill(&scheduler, move |scheduler, value| {
            l.push(format!("[{}ms] sequence complete", scheduler.now()));
            Ok(Resolved::Immediate(value))
        });

        scheduler.run_until_idle()?;
        Ok(self.finish("suspended", &scheduler, &log))
    }
}

/// A future settled by a delayed task.
fn timer_future(scheduler: &Scheduler, label: &str, delay_ms: i64, reject: bool) -> Future {
    let (future, resolver) = Future::create();
    let label = label.to_string();
    scheduler.schedule_delayed(
        move |scheduler| {
            if reject {
                resolver.reject(scheduler, ExecError::host(label));
            } else {
                resolver.fulfill(scheduler, Value::Str(label));
            }
            Ok(())
        },
        delay_ms,
    );
    future
}
