//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Maximum timer delay in milliseconds, the 32-bit timer clamp.
pub const DEFAULT_MAX_DELAY_MS: u64 = 2_147_483_647;

/// Default bound on settlement-forwarding chains.
pub const DEFAULT_MAX_CHAIN_DEPTH: u32 = 1024;

/// Tunable limits and switches for a [`Scheduler`](crate::Scheduler).
///
/// # Examples
///
/// ```
/// use task_scheduler::SchedulerConfig;
///
/// let config = SchedulerConfig {
///     trace_enabled: true,
///     ..SchedulerConfig::default()
/// };
/// assert_eq!(config.max_delay_ms, 2_147_483_647);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay clamp for `schedule_delayed`; larger requests are pinned here
    pub max_delay_ms: u64,
    /// Bound on chained-settlement forwarding hops before a future is
    /// rejected with an internal error
    pub max_chain_depth: u32,
    /// Record [`TraceEvent`](crate::TraceEvent)s during execution
    pub trace_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            trace_enabled: false,
        }
    }
}
