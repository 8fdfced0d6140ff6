//! Contract test entry point for task_scheduler

mod contract_test;
