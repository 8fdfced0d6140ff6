//! Contract tests for the task_scheduler component
//!
//! These tests pin down the public surface other components build against:
//! method signatures, silent no-op guarantees, and the ordering keys.

use core_types::ExecError;
use std::sync::Arc;
use task_scheduler::{
    LoopError, RunOutcome, Scheduler, SchedulerConfig, SimClock, SystemClock, TaskId, TimeSource,
    TraceEvent,
};

mod scheduler_contract {
    use super::*;

    #[test]
    fn schedule_delayed_returns_task_id() {
        let scheduler = Scheduler::new();
        let id: TaskId = scheduler.schedule_delayed(|_| Ok(()), 0);
        let _ = id;
    }

    #[test]
    fn schedule_repeating_returns_task_id_from_the_shared_pool() {
        let scheduler = Scheduler::new();
        let a: TaskId = scheduler.schedule_delayed(|_| Ok(()), 0);
        let b: TaskId = scheduler.schedule_repeating(|_| Ok(()), 0);
        assert_ne!(a, b);
        // cancel_delayed clears either kind
        scheduler.cancel_delayed(b);
        scheduler.run_until_idle().unwrap();
    }

    #[test]
    fn cancel_delayed_accepts_unknown_id() {
        let scheduler = Scheduler::new();
        // unknown id is a silent no-op, not an error
        scheduler.cancel_delayed(TaskId(9999));
    }

    #[test]
    fn cancel_delayed_accepts_executed_id() {
        let scheduler = Scheduler::new();
        let id = scheduler.schedule_delayed(|_| Ok(()), 0);
        scheduler.run_until_idle().unwrap();
        scheduler.cancel_delayed(id);
    }

    #[test]
    fn schedule_microtask_returns_unit() {
        let scheduler = Scheduler::new();
        scheduler.schedule_microtask(|_| Ok(()));
    }

    #[test]
    fn run_methods_return_results() {
        let scheduler = Scheduler::new();
        let _: Result<(), LoopError> = scheduler.run_until_idle();
        let _: Result<usize, LoopError> = scheduler.run_all_microtasks();
        let _: Result<bool, LoopError> = scheduler.process_one_cycle();
        let _: Result<RunOutcome, LoopError> = scheduler.run_with_budget(1);
    }

    #[test]
    fn callbacks_receive_the_owning_scheduler() {
        let scheduler = Scheduler::new();
        scheduler.schedule_microtask(|inner: &Scheduler| {
            inner.schedule_microtask(|_| Ok(()));
            Ok(())
        });
        scheduler.run_until_idle().unwrap();
        assert!(scheduler.is_idle());
    }

    #[test]
    fn diagnostics_are_drained_not_peeked() {
        let scheduler = Scheduler::new();
        scheduler.schedule_microtask(|_| Err(ExecError::host("x")));
        scheduler.run_until_idle().unwrap();

        assert_eq!(scheduler.take_task_failures().len(), 1);
        assert!(scheduler.take_task_failures().is_empty());
    }

    #[test]
    fn unhandled_rejection_registry_round_trip() {
        let scheduler = Scheduler::new();
        scheduler.report_unhandled_rejection(1, ExecError::host("a"));
        let drained: Vec<(u64, ExecError)> = scheduler.take_unhandled_rejections();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].0, 1);
    }

    #[test]
    fn trace_is_a_vec_of_events() {
        let scheduler = Scheduler::with_config(SchedulerConfig {
            trace_enabled: true,
            ..SchedulerConfig::default()
        });
        scheduler.schedule_microtask(|_| Ok(()));
        scheduler.run_until_idle().unwrap();
        let trace: Vec<TraceEvent> = scheduler.take_trace();
        assert!(!trace.is_empty());
    }
}

mod clock_contract {
    use super::*;

    #[test]
    fn sim_clock_implements_time_source() {
        let clock: Arc<dyn TimeSource> = Arc::new(SimClock::new());
        assert_eq!(clock.now(), 0);
        clock.wait_until(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn system_clock_implements_time_source() {
        let clock: Arc<dyn TimeSource> = Arc::new(SystemClock::new());
        let _ = clock.now();
    }

    #[test]
    fn scheduler_accepts_any_time_source() {
        let scheduler = Scheduler::with_time_source(Arc::new(SimClock::new()));
        assert_eq!(scheduler.now(), 0);
    }
}

mod config_contract {
    use super::*;

    #[test]
    fn config_has_documented_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_delay_ms, 2_147_483_647);
        assert_eq!(config.max_chain_depth, 1024);
        assert!(!config.trace_enabled);
    }

    #[test]
    fn scheduler_exposes_its_config() {
        let config = SchedulerConfig {
            max_chain_depth: 4,
            ..SchedulerConfig::default()
        };
        let scheduler = Scheduler::with_config(config.clone());
        assert_eq!(scheduler.config(), config);
    }
}
