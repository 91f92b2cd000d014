// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome counters shared by every worker.
#[derive(Debug, Default)]
pub struct Counters {
    successful_forwards: AtomicU64,
    failed_forwards: AtomicU64,
    exceptions: AtomicU64,
}

impl Counters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.successful_forwards.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed_forwards.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exception(&self) {
        self.exceptions.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn successful_forwards(&self) -> u64 {
        self.successful_forwards.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn failed_forwards(&self) -> u64 {
        self.failed_forwards.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn exceptions(&self) -> u64 {
        self.exceptions.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self, queue_count: usize) -> Statistics {
        Statistics {
            queue_count,
            exceptions: self.exceptions(),
            failed_uploads: self.failed_forwards(),
            successful_uploads: self.successful_forwards(),
        }
    }
}

/// Point-in-time view of the forwarder, as reported to operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub queue_count: usize,
    pub exceptions: u64,
    pub failed_uploads: u64,
    pub successful_uploads: u64,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QueueCount={}, Exceptions={}, FailedUploads={}, SuccessfulUpload={}",
            self.queue_count, self.exceptions, self.failed_uploads, self.successful_uploads
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_format() {
        let counters = Counters::new();
        counters.record_success();
        counters.record_success();
        counters.record_failure();
        counters.record_exception();
        counters.record_exception();
        counters.record_exception();

        assert_eq!(
            counters.snapshot(7).to_string(),
            "QueueCount=7, Exceptions=3, FailedUploads=1, SuccessfulUpload=2"
        );
    }

    #[test]
    fn test_fresh_counters_are_zero() {
        assert_eq!(Counters::new().snapshot(0), Statistics::default());
    }
}
