//! The future state machine.
//!
//! A [`Future`] is a cloneable handle to a settle-once deferred value.
//! Reactions registered while pending are stored in registration order;
//! settlement enqueues them as microtasks. Reactions registered after
//! settlement are enqueued immediately — still as microtasks, never run
//! inline, so settlement is always observed asynchronously.
//!
//! The future's state lock is never held while a handler runs; handlers
//! execute inside microtasks dequeued by the scheduler.

use core_types::{ErrorKind, ExecError, Value};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use task_scheduler::Scheduler;

static NEXT_FUTURE_ID: AtomicU64 = AtomicU64::new(1);

/// The state of a future.
///
/// Transitions are monotonic: `Pending -> Fulfilled` or
/// `Pending -> Rejected`, never reversed, never repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureState {
    /// Neither fulfilled nor rejected yet
    Pending,
    /// Settled with a value
    Fulfilled,
    /// Settled with an error
    Rejected,
}

/// What a handler settles its result future with.
///
/// This is the closed capability interface for chaining: a handler either
/// produces a plain value or defers to another future. There is no
/// structural probing of values.
#[derive(Debug)]
pub enum Resolved {
    /// Fulfill the result future with this value
    Immediate(Value),
    /// Settle the result future with whatever this future settles with
    Chained(Future),
}

/// Fulfillment handler: receives the settled value, produces the result
/// future's settlement.
pub type FulfillHandler =
    Box<dyn FnOnce(&Scheduler, Value) -> Result<Resolved, ExecError> + Send>;

/// Rejection handler: receives the rejection reason. Returning `Ok`
/// recovers (the result future fulfills); returning `Err` re-rejects.
pub type RejectHandler =
    Box<dyn FnOnce(&Scheduler, ExecError) -> Result<Resolved, ExecError> + Send>;

/// A reaction stored on a pending future.
enum Reaction {
    /// Handlers registered via `attach`, feeding `result`
    Handlers {
        on_fulfill: Option<FulfillHandler>,
        on_reject: Option<RejectHandler>,
        result: Future,
    },
    /// Internal settlement forwarding created by chained resolution
    Forward { target: Future },
}

enum SettledOutcome {
    Fulfilled(Value),
    Rejected(ExecError),
}

struct FutureInner {
    state: FutureState,
    result: Option<Value>,
    error: Option<ExecError>,
    reactions: Vec<Reaction>,
    /// Any attached reaction propagates a rejection onward, so only a
    /// rejection with no reactions at all is reportable.
    observed: bool,
    /// Forwarding hops this future's settlement has traveled through.
    chain_hops: u32,
}

/// A settle-once deferred value.
///
/// Handles are cheap clones sharing one state cell. The future is settled
/// through [`settle_fulfilled`](Future::settle_fulfilled) /
/// [`settle_rejected`](Future::settle_rejected); both are silent no-ops on
/// an already-settled future.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use deferred::{Future, FutureState};
/// use task_scheduler::Scheduler;
///
/// let scheduler = Scheduler::new();
/// let future = Future::pending();
/// assert_eq!(future.state(), FutureState::Pending);
///
/// future.settle_fulfilled(&scheduler, Value::Int(42));
/// assert_eq!(future.state(), FutureState::Fulfilled);
///
/// // settling again is ignored
/// future.settle_rejected(&scheduler, core_types::ExecError::host("late"));
/// assert_eq!(future.state(), FutureState::Fulfilled);
/// ```
#[derive(Clone)]
pub struct Future {
    id: u64,
    inner: Arc<Mutex<FutureInner>>,
}

/// Settlement handle returned by [`Future::create`] and passed to
/// executors, exposing only the settling half of the future.
#[derive(Clone)]
pub struct Resolver {
    future: Future,
}

impl Resolver {
    /// Fulfills the underlying future; a no-op once settled.
    pub fn fulfill(&self, scheduler: &Scheduler, value: Value) {
        self.future.settle_fulfilled(scheduler, value);
    }

    /// Rejects the underlying future; a no-op once settled.
    pub fn reject(&self, scheduler: &Scheduler, error: ExecError) {
        self.future.settle_rejected(scheduler, error);
    }
}

impl Future {
    /// Creates a pending future.
    pub fn pending() -> Self {
        Self {
            id: NEXT_FUTURE_ID.fetch_add(1, Ordering::SeqCst),
            inner: Arc::new(Mutex::new(FutureInner {
                state: FutureState::Pending,
                result: None,
                error: None,
                reactions: Vec::new(),
                observed: false,
                chain_hops: 0,
            })),
        }
    }

    /// Creates a pending future together with its settlement handle.
    pub fn create() -> (Future, Resolver) {
        let future = Future::pending();
        let resolver = Resolver {
            future: future.clone(),
        };
        (future, resolver)
    }

    /// Creates a future already fulfilled with `value`.
    pub fn fulfilled(scheduler: &Scheduler, value: Value) -> Self {
        let future = Future::pending();
        future.settle_fulfilled(scheduler, value);
        future
    }

    /// Creates a future already rejected with `error`.
    pub fn rejected(scheduler: &Scheduler, error: ExecError) -> Self {
        let future = Future::pending();
        future.settle_rejected(scheduler, error);
        future
    }

    /// Creates a future settled by an executor run synchronously, before
    /// this constructor returns.
    ///
    /// An `Err` from the executor rejects the future; an error returned
    /// after the executor already settled it is ignored.
    pub fn with_executor<F>(scheduler: &Scheduler, executor: F) -> Self
    where
        F: FnOnce(&Scheduler, &Resolver) -> Result<(), ExecError>,
    {
        let (future, resolver) = Future::create();
        if let Err(error) = executor(scheduler, &resolver) {
            future.settle_rejected(scheduler, error);
        }
        future
    }

    /// This future's unique id, used in unhandled-rejection reports.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> FutureState {
        self.inner.lock().state
    }

    /// The fulfillment value, once fulfilled.
    pub fn value(&self) -> Option<Value> {
        self.inner.lock().result.clone()
    }

    /// The rejection reason, once rejected.
    pub fn error(&self) -> Option<ExecError> {
        self.inner.lock().error.clone()
    }

    /// Number of stored reactions (pending futures only).
    pub fn reaction_count(&self) -> usize {
        self.inner.lock().reactions.len()
    }

    /// Fulfills the future.
    ///
    /// The first settlement wins: stored reactions are enqueued as
    /// microtasks in registration order and the reaction list is cleared.
    /// Settling an already-settled future is a silent no-op.
    pub fn settle_fulfilled(&self, scheduler: &Scheduler, value: Value) {
        let (reactions, hops) = {
            let mut inner = self.inner.lock();
            if inner.state != FutureState::Pending {
                return;
            }
            inner.state = FutureState::Fulfilled;
            inner.result = Some(value.clone());
            (std::mem::take(&mut inner.reactions), inner.chain_hops)
        };
        for reaction in reactions {
            dispatch(
                scheduler,
                reaction,
                SettledOutcome::Fulfilled(value.clone()),
                hops,
            );
        }
    }

    /// Rejects the future.
    ///
    /// Symmetric to [`settle_fulfilled`](Future::settle_fulfilled). A
    /// rejection with no reactions attached is reported to the scheduler's
    /// unhandled-rejection registry; attaching a reaction later retracts
    /// the report.
    pub fn settle_rejected(&self, scheduler: &Scheduler, error: ExecError) {
        let (reactions, hops, report) = {
            let mut inner = self.inner.lock();
            if inner.state != FutureState::Pending {
                return;
            }
            inner.state = FutureState::Rejected;
            inner.error = Some(error.clone());
            let report = !inner.observed;
            (std::mem::take(&mut inner.reactions), inner.chain_hops, report)
        };
        if report {
            scheduler.report_unhandled_rejection(self.id, error.clone());
        }
        for reaction in reactions {
            dispatch(
                scheduler,
                reaction,
                SettledOutcome::Rejected(error.clone()),
                hops,
            );
        }
    }

    /// Registers handlers and returns the future they feed.
    ///
    /// The result future is returned synchronously regardless of this
    /// future's state. On a pending future the reaction is stored; on a
    /// settled future the matching reaction is enqueued as a fresh
    /// microtask immediately — it never runs inside this call. An absent
    /// handler slot passes the value or rejection through to the result
    /// future unchanged.
    pub fn attach(
        &self,
        scheduler: &Scheduler,
        on_fulfill: Option<FulfillHandler>,
        on_reject: Option<RejectHandler>,
    ) -> Future {
        let result = Future::pending();
        let reaction = Reaction::Handlers {
            on_fulfill,
            on_reject,
            result: result.clone(),
        };
        let settled = {
            let mut inner = self.inner.lock();
            inner.observed = true;
            match settled_outcome(&inner) {
                None => {
                    inner.reactions.push(reaction);
                    None
                }
                Some(outcome) => Some((outcome, inner.chain_hops, reaction)),
            }
        };
        if let Some((outcome, hops, reaction)) = settled {
            if matches!(outcome, SettledOutcome::Rejected(_)) {
                scheduler.retract_unhandled_rejection(self.id);
            }
            dispatch(scheduler, reaction, outcome, hops);
        }
        result
    }

    /// Registers a fulfillment handler; rejections pass through.
    pub fn attach_fulfill<F>(&self, scheduler: &Scheduler, on_fulfill: F) -> Future
    where
        F: FnOnce(&Scheduler, Value) -> Result<Resolved, ExecError> + Send + 'static,
    {
        self.attach(scheduler, Some(Box::new(on_fulfill)), None)
    }

    /// Registers a rejection handler; fulfillments pass through.
    pub fn attach_reject<F>(&self, scheduler: &Scheduler, on_reject: F) -> Future
    where
        F: FnOnce(&Scheduler, ExecError) -> Result<Resolved, ExecError> + Send + 'static,
    {
        self.attach(scheduler, None, Some(Box::new(on_reject)))
    }

    /// Registers a callback that runs on either disposition.
    ///
    /// The callback observes no value; the original value and disposition
    /// pass through to the result future unless the callback itself fails,
    /// which rejects it.
    pub fn attach_finally<F>(&self, scheduler: &Scheduler, on_settled: F) -> Future
    where
        F: FnOnce(&Scheduler) -> Result<(), ExecError> + Send + 'static,
    {
        let shared = Arc::new(Mutex::new(Some(on_settled)));
        let taken = Arc::clone(&shared);
        let on_fulfill: FulfillHandler = Box::new(move |scheduler, value| {
            if let Some(callback) = taken.lock().take() {
                callback(scheduler)?;
            }
            Ok(Resolved::Immediate(value))
        });
        let on_reject: RejectHandler = Box::new(move |scheduler, error| {
            if let Some(callback) = shared.lock().take() {
                callback(scheduler)?;
            }
            Err(error)
        });
        self.attach(scheduler, Some(on_fulfill), Some(on_reject))
    }

    /// Subscribes `target` to settle with this future's outcome.
    fn subscribe_forward(&self, scheduler: &Scheduler, target: Future) {
        let reaction = Reaction::Forward { target };
        let settled = {
            let mut inner = self.inner.lock();
            inner.observed = true;
            match settled_outcome(&inner) {
                None => {
                    inner.reactions.push(reaction);
                    None
                }
                Some(outcome) => Some((outcome, inner.chain_hops, reaction)),
            }
        };
        if let Some((outcome, hops, reaction)) = settled {
            if matches!(outcome, SettledOutcome::Rejected(_)) {
                scheduler.retract_unhandled_rejection(self.id);
            }
            dispatch(scheduler, reaction, outcome, hops);
        }
    }

    fn set_chain_hops(&self, hops: u32) {
        self.inner.lock().chain_hops = hops;
    }
}

impl std::fmt::Debug for Future {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Future")
            .field("id", &self.id)
            .field("state", &inner.state)
            .field("reactions", &inner.reactions.len())
            .finish()
    }
}

fn settled_outcome(inner: &FutureInner) -> Option<SettledOutcome> {
    match inner.state {
        FutureState::Pending => None,
        FutureState::Fulfilled => Some(SettledOutcome::Fulfilled(
            inner.result.clone().unwrap_or_default(),
        )),
        FutureState::Rejected => Some(SettledOutcome::Rejected(
            inner
                .error
                .clone()
                .unwrap_or_else(|| ExecError::new(ErrorKind::InternalError, "reason missing")),
        )),
    }
}

/// Settles `target` from a handler's return value.
fn resolve(scheduler: &Scheduler, target: &Future, resolved: Resolved) {
    match resolved {
        Resolved::Immediate(value) => target.settle_fulfilled(scheduler, value),
        Resolved::Chained(source) => {
            if source.id() == target.id() {
                target.settle_rejected(
                    scheduler,
                    ExecError::new(ErrorKind::TypeError, "future resolved with itself"),
                );
                return;
            }
            source.subscribe_forward(scheduler, target.clone());
        }
    }
}

/// Enqueues one reaction as a microtask carrying the settled outcome.
fn dispatch(scheduler: &Scheduler, reaction: Reaction, outcome: SettledOutcome, hops: u32) {
    match reaction {
        Reaction::Handlers {
            on_fulfill,
            on_reject,
            result,
        } => match outcome {
            SettledOutcome::Fulfilled(value) => {
                scheduler.schedule_microtask(move |scheduler| {
                    match on_fulfill {
                        Some(handler) => match handler(scheduler, value) {
                            Ok(resolved) => resolve(scheduler, &result, resolved),
                            Err(error) => result.settle_rejected(scheduler, error),
                        },
                        None => result.settle_fulfilled(scheduler, value),
                    }
                    Ok(())
                });
            }
            SettledOutcome::Rejected(error) => {
                scheduler.schedule_microtask(move |scheduler| {
                    match on_reject {
                        Some(handler) => match handler(scheduler, error) {
                            Ok(resolved) => resolve(scheduler, &result, resolved),
                            Err(error) => result.settle_rejected(scheduler, error),
                        },
                        None => result.settle_rejected(scheduler, error),
                    }
                    Ok(())
                });
            }
        },
        Reaction::Forward { target } => {
            let next_hops = hops.saturating_add(1);
            scheduler.schedule_microtask(move |scheduler| {
                if next_hops > scheduler.config().max_chain_depth {
                    target.settle_rejected(
                        scheduler,
                        ExecError::new(
                            ErrorKind::InternalError,
                            format!("settlement chain exceeded {} hops", next_hops - 1),
                        ),
                    );
                    return Ok(());
                }
                target.set_chain_hops(next_hops);
                match outcome {
                    SettledOutcome::Fulfilled(value) => {
                        target.settle_fulfilled(scheduler, value)
                    }
                    SettledOutcome::Rejected(error) => target.settle_rejected(scheduler, error),
                }
                Ok(())
            });
        }
    }
}
