//! Truncated exponential sleep schedule between polls.

use crate::policy::WaitPolicy;
use std::time::Duration;

/// Yields `initial, 2*initial, 4*initial, ...` capped at `max`, forever.
/// No jitter: the schedule is deterministic.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            next: initial.min(max),
            max,
        }
    }

    pub fn from_policy(policy: &WaitPolicy) -> Self {
        Self::new(policy.initial_interval(), policy.max_interval())
    }

    /// The interval the next call to `next()` will return.
    pub fn peek(&self) -> Duration {
        self.next
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = current.saturating_mul(2).min(self.max);
        Some(current)
    }
}
