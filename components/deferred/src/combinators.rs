//! Future combinators.
//!
//! Pure compositions over a list of input futures, built entirely on
//! [`Future::attach`]. Each combinator returns a fresh future; later
//! settlements of other inputs never change an outcome the combinator has
//! already committed to, because settlement is one-shot.
//!
//! Empty input lists keep their asymmetric behavior: `combine_all` and
//! `combine_all_settled` fulfill immediately with an empty list,
//! `combine_any` rejects immediately with an empty aggregate, and
//! `combine_race` never settles.

use crate::future::{Future, Resolved};
use core_types::{ExecError, SettlementRecord, Value};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use task_scheduler::Scheduler;

/// Fulfills with every input's value, in input order, once all inputs
/// fulfill; rejects with the reason of the first input to reject.
pub fn combine_all(scheduler: &Scheduler, futures: Vec<Future>) -> Future {
    let result = Future::pending();
    if futures.is_empty() {
        result.settle_fulfilled(scheduler, Value::List(Vec::new()));
        return result;
    }

    let slots: Arc<Mutex<Vec<Option<Value>>>> = Arc::new(Mutex::new(vec![None; futures.len()]));
    let remaining = Arc::new(AtomicUsize::new(futures.len()));

    for (index, future) in futures.iter().enumerate() {
        let slots = Arc::clone(&slots);
        let remaining = Arc::clone(&remaining);
        let on_ok = result.clone();
        let on_err = result.clone();
        future.attach(
            scheduler,
            Some(Box::new(move |scheduler, value| {
                slots.lock()[index] = Some(value);
                if remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                    let values = slots
                        .lock()
                        .iter_mut()
                        .map(|slot| slot.take().unwrap_or_default())
                        .collect();
                    on_ok.settle_fulfilled(scheduler, Value::List(values));
                }
                Ok(Resolved::Immediate(Value::Undefined))
            })),
            Some(Box::new(move |scheduler, error| {
                on_err.settle_rejected(scheduler, error);
                Ok(Resolved::Immediate(Value::Undefined))
            })),
        );
    }
    result
}

/// Fulfills with one [`SettlementRecord`] per input, in input order, once
/// every input has settled. Never rejects.
pub fn combine_all_settled(scheduler: &Scheduler, futures: Vec<Future>) -> Future {
    let result = Future::pending();
    if futures.is_empty() {
        result.settle_fulfilled(scheduler, Value::List(Vec::new()));
        return result;
    }

    let slots: Arc<Mutex<Vec<Option<SettlementRecord>>>> =
        Arc::new(Mutex::new(vec![None; futures.len()]));
    let remaining = Arc::new(AtomicUsize::new(futures.len()));

    for (index, future) in futures.iter().enumerate() {
        let record = {
            let slots = Arc::clone(&slots);
            let remaining = Arc::clone(&remaining);
            let result = result.clone();
            move |scheduler: &Scheduler, entry: SettlementRecord| {
                slots.lock()[index] = Some(entry);
                if remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                    let entries = slots
                        .lock()
                        .iter_mut()
                        .map(|slot| match slot.take() {
                            Some(entry) => Value::Settlement(Box::new(entry)),
                            None => Value::Undefined,
                        })
                        .collect();
                    result.settle_fulfilled(scheduler, Value::List(entries));
                }
            }
        };
        let on_ok = record.clone();
        let on_err = record;
        future.attach(
            scheduler,
            Some(Box::new(move |scheduler, value| {
                on_ok(scheduler, SettlementRecord::fulfilled(value));
                Ok(Resolved::Immediate(Value::Undefined))
            })),
            Some(Box::new(move |scheduler, error| {
                on_err(scheduler, SettlementRecord::rejected(error));
                Ok(Resolved::Immediate(Value::Undefined))
            })),
        );
    }
    result
}

/// Fulfills with the value of the first input to fulfill; rejects only if
/// every input rejects, with an aggregate of the reasons in input order.
pub fn combine_any(scheduler: &Scheduler, futures: Vec<Future>) -> Future {
    let result = Future::pending();
    if futures.is_empty() {
        result.settle_rejected(scheduler, ExecError::aggregate(Vec::new()));
        return result;
    }

    let reasons: Arc<Mutex<Vec<Option<ExecError>>>> =
        Arc::new(Mutex::new(vec![None; futures.len()]));
    let rejected = Arc::new(AtomicUsize::new(0));
    let total = futures.len();

    for (index, future) in futures.iter().enumerate() {
        let reasons = Arc::clone(&reasons);
        let rejected = Arc::clone(&rejected);
        let on_ok = result.clone();
        let on_err = result.clone();
        future.attach(
            scheduler,
            Some(Box::new(move |scheduler, value| {
                on_ok.settle_fulfilled(scheduler, value);
                Ok(Resolved::Immediate(Value::Undefined))
            })),
            Some(Box::new(move |scheduler, error| {
                reasons.lock()[index] = Some(error);
                if rejected.fetch_add(1, Ordering::SeqCst) + 1 == total {
                    let causes = reasons
                        .lock()
                        .iter_mut()
                        .map(|slot| slot.take().unwrap_or_else(|| ExecError::host("missing")))
                        .collect();
                    on_err.settle_rejected(scheduler, ExecError::aggregate(causes));
                }
                Ok(Resolved::Immediate(Value::Undefined))
            })),
        );
    }
    result
}

/// Settles with the outcome of whichever input settles first,
/// chronologically, keeping its disposition.
///
/// An empty input list returns a future that never settles.
pub fn combine_race(scheduler: &Scheduler, futures: Vec<Future>) -> Future {
    let result = Future::pending();
    for future in &futures {
        let on_ok = result.clone();
        let on_err = result.clone();
        future.attach(
            scheduler,
            Some(Box::new(move |scheduler, value| {
                on_ok.settle_fulfilled(scheduler, value);
                Ok(Resolved::Immediate(Value::Undefined))
            })),
            Some(Box::new(move |scheduler, error| {
                on_err.settle_rejected(scheduler, error);
                Ok(Resolved::Immediate(Value::Undefined))
            })),
        );
    }
    result
}
