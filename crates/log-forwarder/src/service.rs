// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::ForwarderConfig;
use crate::error::ForwarderError;
use crate::forwarder::Forwarder;
use crate::queue::RecordQueue;
use crate::record::LogRecord;
use crate::sink::{CloudWatchSink, CloudWatchSinkConfig, RemoteLogSink};
use crate::stats::{Counters, Statistics};
use crate::supervisor::Supervisor;
use crate::token_store::TokenStore;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Handle to a running forwarder.
///
/// Dropping the handle cancels the supervisor without waiting for it; the
/// cycle in progress still runs to completion in the background.
#[derive(Debug)]
pub struct ForwarderHandle {
    cancel_token: CancellationToken,
    task: Option<JoinHandle<()>>,
    started: Arc<AtomicBool>,
}

impl ForwarderHandle {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signals the supervisor and waits for the cycle in progress to finish.
    pub async fn stop(mut self) -> Result<(), ForwarderError> {
        self.cancel_token.cancel();
        let result = match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| ForwarderError::Runtime(e.to_string())),
            None => Ok(()),
        };
        info!("FORWARDER | Stopped");
        result
    }
}

impl Drop for ForwarderHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            debug!("FORWARDER | Handle dropped, cancelling supervisor");
        }
        self.cancel_token.cancel();
        self.started.store(false, Ordering::SeqCst);
    }
}

/// Owns the pipeline state and exposes the producer and introspection
/// surface.
///
/// Construction only wires dependencies; nothing runs until [`start`].
///
/// [`start`]: LogForwarder::start
pub struct LogForwarder {
    group_name: String,
    worker_count: usize,
    max_attempts: usize,
    cycle_interval: Duration,
    queue: Arc<RecordQueue>,
    tokens: Arc<TokenStore>,
    counters: Arc<Counters>,
    sink: Arc<dyn RemoteLogSink>,
    correlation_id: Uuid,
    started: Arc<AtomicBool>,
}

impl LogForwarder {
    #[must_use]
    pub fn new(config: &ForwarderConfig, sink: Arc<dyn RemoteLogSink>) -> Self {
        Self {
            group_name: config.group_name.clone(),
            worker_count: config.worker_count,
            max_attempts: config.max_attempts,
            cycle_interval: config.cycle_interval,
            queue: Arc::new(RecordQueue::new()),
            tokens: Arc::new(TokenStore::new()),
            counters: Arc::new(Counters::new()),
            sink,
            correlation_id: Uuid::new_v4(),
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wires a forwarder shipping to the CloudWatch Logs endpoint described
    /// by `config`.
    pub async fn from_config(config: &ForwarderConfig) -> Self {
        let sink = CloudWatchSink::new(CloudWatchSinkConfig::from(config)).await;
        Self::new(config, Arc::new(sink))
    }

    /// Queues captured records. Never blocks on delivery.
    pub fn submit_records<I>(&self, records: I)
    where
        I: IntoIterator<Item = LogRecord>,
    {
        self.queue.enqueue_batch(records);
    }

    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.counters.snapshot(self.queue.len())
    }

    /// Queues `count` synthetic records on the fallback stream, each carrying
    /// this instance's correlation id, and returns that id.
    pub fn warm_service(&self, count: usize) -> Uuid {
        let id = self.correlation_id.to_string();
        self.queue.enqueue_batch((0..count).map(|_| {
            LogRecord::new("", json!({ "message": id }))
                .with_level("Fatal")
                .with_source("log-forwarder")
        }));
        debug!("FORWARDER | Queued {} warm-up records", count);
        self.correlation_id
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    #[must_use]
    pub fn forwarder(&self) -> Forwarder {
        Forwarder::new(
            &self.group_name,
            Arc::clone(&self.queue),
            Arc::clone(&self.tokens),
            Arc::clone(&self.counters),
            Arc::clone(&self.sink),
            self.max_attempts,
        )
    }

    #[must_use]
    pub fn supervisor(&self, cancel_token: CancellationToken) -> Supervisor {
        Supervisor::new(
            self.forwarder(),
            Arc::clone(&self.counters),
            self.worker_count,
            self.cycle_interval,
            cancel_token,
        )
    }

    /// Launches the supervisor on the current tokio runtime.
    pub fn start(&self) -> Result<ForwarderHandle, ForwarderError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ForwarderError::AlreadyStarted);
        }

        let cancel_token = CancellationToken::new();
        let supervisor = self.supervisor(cancel_token.clone());
        let task = tokio::spawn(supervisor.run());
        info!(
            "FORWARDER | Started forwarding to log group {} with {} workers",
            self.group_name, self.worker_count
        );

        Ok(ForwarderHandle {
            cancel_token,
            task: Some(task),
            started: Arc::clone(&self.started),
        })
    }
}
