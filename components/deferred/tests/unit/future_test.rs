//! Unit tests for the Future state machine

use core_types::{ErrorKind, ExecError, Value};
use deferred::{Future, FutureState, Resolved};
use std::sync::{Arc, Mutex};
use task_scheduler::Scheduler;

#[test]
fn reaction_runs_after_settlement_with_the_value() {
    let scheduler = Scheduler::new();
    let future = Future::pending();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let s = seen.clone();
    future.attach_fulfill(&scheduler, move |_, value| {
        s.lock().unwrap().push(value.clone());
        Ok(Resolved::Immediate(value))
    });

    future.settle_fulfilled(&scheduler, Value::Int(5));
    assert!(seen.lock().unwrap().is_empty());

    scheduler.run_until_idle().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Value::Int(5)]);
}

#[test]
fn reaction_on_settled_future_is_a_fresh_microtask() {
    // the always-async rule: nothing runs inside attach, even when the
    // future is already settled
    let scheduler = Scheduler::new();
    let future = Future::fulfilled(&scheduler, Value::Int(7));
    let ran = Arc::new(Mutex::new(false));

    let r = ran.clone();
    future.attach_fulfill(&scheduler, move |_, value| {
        *r.lock().unwrap() = true;
        Ok(Resolved::Immediate(value))
    });

    assert!(!*ran.lock().unwrap());
    assert_eq!(scheduler.pending_microtasks(), 1);
    scheduler.run_until_idle().unwrap();
    assert!(*ran.lock().unwrap());
}

#[test]
fn reactions_run_in_registration_order() {
    let scheduler = Scheduler::new();
    let future = Future::pending();
    let order = Arc::new(Mutex::new(Vec::new()));

    for i in 0..3 {
        let o = order.clone();
        future.attach_fulfill(&scheduler, move |_, value| {
            o.lock().unwrap().push(i);
            Ok(Resolved::Immediate(value))
        });
    }

    future.settle_fulfilled(&scheduler, Value::Null);
    scheduler.run_until_idle().unwrap();
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn fulfillment_passes_through_missing_handler() {
    // attach(f, none, on_reject) on a fulfilled f keeps the value and
    // disposition unchanged
    let scheduler = Scheduler::new();
    let future = Future::fulfilled(&scheduler, Value::Str("kept".to_string()));

    let chained = future.attach_reject(&scheduler, |_, error| Err(error));
    scheduler.run_until_idle().unwrap();

    assert_eq!(chained.state(), FutureState::Fulfilled);
    assert_eq!(chained.value(), Some(Value::Str("kept".to_string())));
}

#[test]
fn rejection_passes_through_missing_handler() {
    let scheduler = Scheduler::new();
    let future = Future::rejected(&scheduler, ExecError::host("down"));

    let chained = future.attach_fulfill(&scheduler, |_, value| Ok(Resolved::Immediate(value)));
    scheduler.run_until_idle().unwrap();

    assert_eq!(chained.state(), FutureState::Rejected);
    assert_eq!(chained.error().unwrap().message, "down");
}

#[test]
fn handler_error_rejects_the_result_future() {
    let scheduler = Scheduler::new();
    let future = Future::fulfilled(&scheduler, Value::Int(1));

    let chained = future.attach_fulfill(&scheduler, |_, _| {
        Err(ExecError::new(ErrorKind::HostError, "handler failed"))
    });
    scheduler.run_until_idle().unwrap();

    assert_eq!(chained.state(), FutureState::Rejected);
    assert_eq!(chained.error().unwrap().message, "handler failed");
}

#[test]
fn reject_handler_recovers_into_fulfillment() {
    let scheduler = Scheduler::new();
    let future = Future::rejected(&scheduler, ExecError::host("first"));

    let chained = future.attach_reject(&scheduler, |_, error| {
        Ok(Resolved::Immediate(Value::Str(error.message)))
    });
    scheduler.run_until_idle().unwrap();

    assert_eq!(chained.state(), FutureState::Fulfilled);
    assert_eq!(chained.value(), Some(Value::Str("first".to_string())));
}

#[test]
fn chained_resolution_follows_the_inner_future() {
    let scheduler = Scheduler::new();
    let outer = Future::fulfilled(&scheduler, Value::Undefined);
    let inner = Future::pending();

    let handoff = inner.clone();
    let chained = outer.attach_fulfill(&scheduler, move |_, _| Ok(Resolved::Chained(handoff)));

    scheduler.run_until_idle().unwrap();
    assert_eq!(chained.state(), FutureState::Pending);

    inner.settle_fulfilled(&scheduler, Value::Int(9));
    scheduler.run_until_idle().unwrap();
    assert_eq!(chained.value(), Some(Value::Int(9)));
}

#[test]
fn chained_rejection_follows_the_inner_future() {
    let scheduler = Scheduler::new();
    let outer = Future::fulfilled(&scheduler, Value::Undefined);
    let inner = Future::pending();

    let handoff = inner.clone();
    let chained = outer.attach_fulfill(&scheduler, move |_, _| Ok(Resolved::Chained(handoff)));

    inner.settle_rejected(&scheduler, ExecError::host("inner failed"));
    scheduler.run_until_idle().unwrap();

    assert_eq!(chained.state(), FutureState::Rejected);
    assert_eq!(chained.error().unwrap().message, "inner failed");
}

#[test]
fn resolving_with_itself_rejects_with_type_error() {
    let scheduler = Scheduler::new();
    let future = Future::fulfilled(&scheduler, Value::Undefined);

    let slot: Arc<Mutex<Option<Future>>> = Arc::new(Mutex::new(None));
    let s = slot.clone();
    let chained = future.attach_fulfill(&scheduler, move |_, _| {
        let own = s.lock().unwrap().take().expect("result future stored");
        Ok(Resolved::Chained(own))
    });
    *slot.lock().unwrap() = Some(chained.clone());

    scheduler.run_until_idle().unwrap();
    assert_eq!(chained.state(), FutureState::Rejected);
    assert_eq!(chained.error().unwrap().kind, ErrorKind::TypeError);
}

#[test]
fn finally_runs_on_both_dispositions_and_passes_through() {
    let scheduler = Scheduler::new();
    let calls = Arc::new(Mutex::new(0));

    let fulfilled = Future::fulfilled(&scheduler, Value::Int(3));
    let c = calls.clone();
    let after_ok = fulfilled.attach_finally(&scheduler, move |_| {
        *c.lock().unwrap() += 1;
        Ok(())
    });

    let rejected = Future::rejected(&scheduler, ExecError::host("no"));
    let c = calls.clone();
    let after_err = rejected.attach_finally(&scheduler, move |_| {
        *c.lock().unwrap() += 1;
        Ok(())
    });

    scheduler.run_until_idle().unwrap();
    assert_eq!(*calls.lock().unwrap(), 2);
    assert_eq!(after_ok.value(), Some(Value::Int(3)));
    assert_eq!(after_err.state(), FutureState::Rejected);
    assert_eq!(after_err.error().unwrap().message, "no");
}

#[test]
fn finally_failure_rejects_the_result() {
    let scheduler = Scheduler::new();
    let future = Future::fulfilled(&scheduler, Value::Int(1));

    let chained = future.attach_finally(&scheduler, |_| Err(ExecError::host("cleanup failed")));
    scheduler.run_until_idle().unwrap();

    assert_eq!(chained.state(), FutureState::Rejected);
    assert_eq!(chained.error().unwrap().message, "cleanup failed");
}

#[test]
fn unhandled_rejection_is_reported_once() {
    let scheduler = Scheduler::new();
    let future = Future::pending();
    future.settle_rejected(&scheduler, ExecError::host("lost"));
    scheduler.run_until_idle().unwrap();

    let reports = scheduler.take_unhandled_rejections();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, future.id());
}

#[test]
fn late_handler_retracts_unhandled_report() {
    let scheduler = Scheduler::new();
    let future = Future::pending();
    future.settle_rejected(&scheduler, ExecError::host("lost"));

    let _chained = future.attach_reject(&scheduler, |_, error| {
        Ok(Resolved::Immediate(Value::Str(error.message)))
    });
    scheduler.run_until_idle().unwrap();

    assert!(scheduler.take_unhandled_rejections().is_empty());
}

#[test]
fn rejection_with_stored_reaction_is_not_reported() {
    let scheduler = Scheduler::new();
    let future = Future::pending();
    let _chained = future.attach_fulfill(&scheduler, |_, value| Ok(Resolved::Immediate(value)));

    future.settle_rejected(&scheduler, ExecError::host("handled downstream"));
    scheduler.run_until_idle().unwrap();

    // the rejection propagated to the chained future; only that future,
    // which nothing observes, is reported
    let reports = scheduler.take_unhandled_rejections();
    assert_eq!(reports.len(), 1);
    assert_ne!(reports[0].0, future.id());
}
