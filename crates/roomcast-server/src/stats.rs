//! Per-command dispatch counters.
//!
//! Every frame that reaches the dispatcher bumps the counter for its raw
//! command tag, recognized or not. Counts are process-local and reset with
//! the process; they exist for operational visibility and tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Dispatch counters keyed by raw command byte, self-synchronized.
#[derive(Debug, Default)]
pub struct CommandStats {
    counts: Mutex<HashMap<u8, u64>>,
}

impl CommandStats {
    /// Create a zeroed counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u8, u64>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one dispatch of `command`.
    pub fn record(&self, command: u8) {
        *self.lock().entry(command).or_default() += 1;
    }

    /// Dispatches seen for one command tag.
    #[must_use]
    pub fn count(&self, command: u8) -> u64 {
        self.lock().get(&command).copied().unwrap_or(0)
    }

    /// Snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<u8, u64> {
        self.lock().clone()
    }
}
