//! Unit tests for the suspension adapter

use core_types::{ExecError, Value};
use deferred::{Future, FutureState, Resolved, SuspendedSequence};
use std::sync::{Arc, Mutex};
use task_scheduler::Scheduler;

#[test]
fn steps_thread_values_through_the_sequence() {
    let scheduler = Scheduler::new();

    let overall = SuspendedSequence::new()
        .step(|_, _| Ok(Resolved::Immediate(Value::Int(1))))
        .step(|_, value| match value {
            Value::Int(n) => Ok(Resolved::Immediate(Value::Int(n + 2))),
            other => Ok(Resolved::Immediate(other)),
        })
        .step(|_, value| match value {
            Value::Int(n) => Ok(Resolved::Immediate(Value::Int(n + 3))),
            other => Ok(Resolved::Immediate(other)),
        })
        .run(&scheduler);

    scheduler.run_until_idle().unwrap();
    assert_eq!(overall.value(), Some(Value::Int(6)));
}

#[test]
fn suspension_waits_for_the_awaited_future() {
    let scheduler = Scheduler::new();
    let awaited = Future::pending();
    let resumed = Arc::new(Mutex::new(false));

    let handoff = awaited.clone();
    let r = resumed.clone();
    let overall = SuspendedSequence::new()
        .step(move |_, _| Ok(Resolved::Chained(handoff)))
        .step(move |_, value| {
            *r.lock().unwrap() = true;
            Ok(Resolved::Immediate(value))
        })
        .run(&scheduler);

    scheduler.run_until_idle().unwrap();
    assert!(!*resumed.lock().unwrap());
    assert_eq!(overall.state(), FutureState::Pending);

    awaited.settle_fulfilled(&scheduler, Value::Str("ready".to_string()));
    scheduler.run_until_idle().unwrap();
    assert!(*resumed.lock().unwrap());
    assert_eq!(overall.value(), Some(Value::Str("ready".to_string())));
}

#[test]
fn awaiting_a_timer_backed_future_resumes_at_the_deadline() {
    // the delay(ms) pattern: a future settled by a delayed task
    let scheduler = Scheduler::new();
    let timer = Future::pending();

    let f = timer.clone();
    scheduler.schedule_delayed(
        move |scheduler| {
            f.settle_fulfilled(scheduler, Value::Undefined);
            Ok(())
        },
        5000,
    );

    let seen_at = Arc::new(Mutex::new(None));
    let s = seen_at.clone();
    let overall = SuspendedSequence::new()
        .step(move |_, _| Ok(Resolved::Chained(timer.clone())))
        .step(move |scheduler, value| {
            *s.lock().unwrap() = Some(scheduler.now());
            Ok(Resolved::Immediate(value))
        })
        .run(&scheduler);

    scheduler.run_until_idle().unwrap();
    assert_eq!(*seen_at.lock().unwrap(), Some(5000));
    assert_eq!(overall.state(), FutureState::Fulfilled);
}

#[test]
fn rejection_short_circuits_remaining_steps() {
    let scheduler = Scheduler::new();
    let reached = Arc::new(Mutex::new(false));

    let r = reached.clone();
    let overall = SuspendedSequence::new()
        .step(|_, _| Err(ExecError::host("step one failed")))
        .step(move |_, value| {
            *r.lock().unwrap() = true;
            Ok(Resolved::Immediate(value))
        })
        .run(&scheduler);

    scheduler.run_until_idle().unwrap();
    assert!(!*reached.lock().unwrap());
    assert_eq!(overall.state(), FutureState::Rejected);
    assert_eq!(overall.error().unwrap().message, "step one failed");
}

#[test]
fn awaited_rejection_short_circuits_remaining_steps() {
    let scheduler = Scheduler::new();
    let awaited = Future::pending();
    let reached = Arc::new(Mutex::new(false));

    let handoff = awaited.clone();
    let r = reached.clone();
    let overall = SuspendedSequence::new()
        .step(move |_, _| Ok(Resolved::Chained(handoff)))
        .step(move |_, value| {
            *r.lock().unwrap() = true;
            Ok(Resolved::Immediate(value))
        })
        .run(&scheduler);

    awaited.settle_rejected(&scheduler, ExecError::host("awaited failed"));
    scheduler.run_until_idle().unwrap();

    assert!(!*reached.lock().unwrap());
    assert_eq!(overall.state(), FutureState::Rejected);
    assert_eq!(overall.error().unwrap().message, "awaited failed");
}

#[test]
fn each_resumption_is_its_own_microtask() {
    let scheduler = Scheduler::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let o = order.clone();
    let _overall = SuspendedSequence::new()
        .step(move |_, _| {
            o.lock().unwrap().push("step-1");
            Ok(Resolved::Immediate(Value::Undefined))
        })
        .step({
            let o = order.clone();
            move |_, value| {
                o.lock().unwrap().push("step-2");
                Ok(Resolved::Immediate(value))
            }
        })
        .run(&scheduler);

    let o = order.clone();
    scheduler.schedule_microtask(move |_| {
        o.lock().unwrap().push("queued-between");
        Ok(())
    });

    scheduler.run_until_idle().unwrap();
    // step-1 ran synchronously; step-2's resumption microtask was queued
    // before the host microtask
    assert_eq!(
        *order.lock().unwrap(),
        vec!["step-1", "step-2", "queued-between"]
    );
}
