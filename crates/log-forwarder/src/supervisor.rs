// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::forwarder::Forwarder;
use crate::stats::Counters;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Top-level scheduling loop.
///
/// Each cycle starts `worker_count` workers racing to drain the queue, waits
/// for all of them, then pauses `interval` before the next cycle.
pub struct Supervisor {
    forwarder: Forwarder,
    counters: Arc<Counters>,
    worker_count: usize,
    interval: Duration,
    cancel_token: CancellationToken,
}

impl Supervisor {
    #[must_use]
    pub fn new(
        forwarder: Forwarder,
        counters: Arc<Counters>,
        worker_count: usize,
        interval: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            forwarder,
            counters,
            worker_count,
            interval,
            cancel_token,
        }
    }

    /// Runs one pool of workers to completion. Returns the number of records
    /// pulled from the queue.
    pub async fn run_cycle(&self) -> usize {
        let mut set = JoinSet::new();
        for _ in 0..self.worker_count {
            let forwarder = self.forwarder.clone();
            set.spawn(async move { forwarder.drain().await });
        }

        let mut pulled = 0;
        while let Some(result) = set.join_next().await {
            match result {
                Ok(n) => pulled += n,
                Err(e) => {
                    // the record in flight is lost with the worker
                    error!("FORWARDER | Worker failed: {}", e);
                    self.counters.record_exception();
                }
            }
        }
        pulled
    }

    /// Cycles until the cancel token fires.
    pub async fn run(self) {
        debug!(
            "FORWARDER | Supervisor started with {} workers every {:?}",
            self.worker_count, self.interval
        );

        while !self.cancel_token.is_cancelled() {
            let pulled = self.run_cycle().await;
            if pulled > 0 {
                debug!("FORWARDER | Cycle forwarded {} records", pulled);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.cancel_token.cancelled() => break,
            }
        }

        debug!("FORWARDER | Supervisor stopped");
    }
}
