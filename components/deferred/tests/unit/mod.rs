//! Unit test entry point for deferred

mod future_test;
mod sequence_test;
