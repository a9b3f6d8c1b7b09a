//! Batch outcome summary.

use crate::transport::TransportMetadata;
use std::time::Duration;

/// What happened during one `send()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Number of throttle pauses taken.
    pub throttle_pauses: u32,
    /// Total time spent in throttle pauses.
    pub throttled_for: Duration,
    /// Largest in-flight set size observed.
    pub max_in_flight: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, metadata: &TransportMetadata) {
        if metadata.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub(crate) fn observe_in_flight(&mut self, n: usize) {
        self.max_in_flight = self.max_in_flight.max(n);
    }

    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.completed() == self.total
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }
}
