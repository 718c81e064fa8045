//! Concurrency budget for one batch.
//!
//! Fixed when the batch starts (server hint or configured default) and never
//! changed while it runs.

use crate::config::DEFAULT_CONCURRENT_UPLOADS;

/// Maximum number of tasks in flight at once. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyBudget(usize);

impl ConcurrencyBudget {
    /// A budget of `max` slots; 0 is clamped to 1 so a batch can always make progress.
    pub fn new(max: usize) -> Self {
        Self(max.max(1))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Slots still free with `in_flight` transfers running. May be 0 when the window is full.
    pub fn available(self, in_flight: usize) -> usize {
        self.0.saturating_sub(in_flight)
    }

    /// Budget from an optional server hint, falling back to `default`.
    pub fn from_hint(hint: Option<usize>, default: ConcurrencyBudget) -> Self {
        hint.map(Self::new).unwrap_or(default)
    }
}

impl Default for ConcurrencyBudget {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENT_UPLOADS)
    }
}
