//! Bounded, append-only log of execution results.

use std::collections::VecDeque;

use triggerhub_domain::automation::ExecutionResult;

/// Entries kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Entries returned by a history query without an explicit limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// FIFO ring of the most recent execution results.
///
/// Appending past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct ExecutionHistory {
    entries: VecDeque<ExecutionResult>,
    capacity: usize,
}

impl Default for ExecutionHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ExecutionHistory {
    /// Create an empty history. A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    pub fn push(&mut self, result: ExecutionResult) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(result);
    }

    /// The last `limit` entries, oldest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<ExecutionResult> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of failed actions across retained entries.
    #[must_use]
    pub fn total_failed_actions(&self) -> usize {
        self.entries.iter().map(|entry| entry.actions_failed).sum()
    }
}
