// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-record delivery protocol.
//!
//! ```text
//!              ┌──────────────┐
//!   record ───>│   Sending    │<────────────────────┐
//!              └──────┬───────┘                     │
//!        ┌────────────┼──────────────┬──────────┐   │ next attempt
//!        v            v              v          v   │ (max_attempts)
//!    Success    StaleToken       NotFound     Other │
//!   (store token) (refresh all)  (provision,  (abandon,
//!                     │           forget)     exception)
//!                     └──────────────┴──────────────┘
//! ```
//!
//! Refreshes and provisioning consume an attempt like any send: the budget
//! bounds loop iterations, not network writes. Diagnostics only go to
//! `tracing`, never back into the queue being drained.

use crate::queue::RecordQueue;
use crate::record::LogRecord;
use crate::sink::{RemoteLogSink, SinkError};
use crate::stats::Counters;
use crate::token_store::TokenStore;
use http::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// How a single record left the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted with `200 OK`.
    Forwarded,
    /// Accepted with another status; counted as a failed forward.
    Rejected(StatusCode),
    /// Unrecoverable error; counted as an exception.
    Abandoned,
    /// Attempt budget spent on refreshes and provisioning; not counted.
    Exhausted,
}

/// A worker draining the shared queue into the log store.
///
/// Cheap to clone: every clone shares the queue, token store, counters and
/// sink.
#[derive(Clone)]
pub struct Forwarder {
    group_name: Arc<str>,
    queue: Arc<RecordQueue>,
    tokens: Arc<TokenStore>,
    counters: Arc<Counters>,
    sink: Arc<dyn RemoteLogSink>,
    max_attempts: usize,
}

impl Forwarder {
    #[must_use]
    pub fn new(
        group_name: &str,
        queue: Arc<RecordQueue>,
        tokens: Arc<TokenStore>,
        counters: Arc<Counters>,
        sink: Arc<dyn RemoteLogSink>,
        max_attempts: usize,
    ) -> Self {
        Self {
            group_name: Arc::from(group_name),
            queue,
            tokens,
            counters,
            sink,
            max_attempts,
        }
    }

    /// Forwards records until the queue reports empty. Returns how many
    /// records this worker pulled.
    pub async fn drain(&self) -> usize {
        let mut pulled = 0;
        while let Some(record) = self.queue.try_dequeue() {
            pulled += 1;
            self.forward(record).await;
        }
        pulled
    }

    /// Delivers one record as a single-event batch.
    pub async fn forward(&self, record: LogRecord) -> Delivery {
        let stream = record.stream_name().to_string();
        let events = match record.to_event() {
            Ok(event) => [event],
            Err(e) => {
                debug!("FORWARDER | Failed to serialize record for {}: {}", stream, e);
                self.counters.record_exception();
                return Delivery::Abandoned;
            }
        };

        for attempt in 1..=self.max_attempts {
            let token = self.tokens.get(&stream);
            let result = self
                .sink
                .submit(&self.group_name, &stream, token.as_deref(), &events)
                .await;

            match result {
                Ok(response) => {
                    match response.next_token {
                        Some(next_token) => self.tokens.set(&stream, next_token),
                        None => self.tokens.forget(&stream),
                    }
                    return if response.status == StatusCode::OK {
                        self.counters.record_success();
                        Delivery::Forwarded
                    } else {
                        debug!(
                            "FORWARDER | Stream {} answered {}, counting as failed",
                            stream, response.status
                        );
                        self.counters.record_failure();
                        Delivery::Rejected(response.status)
                    };
                }
                Err(SinkError::StaleToken { expected }) => {
                    debug!(
                        "FORWARDER | Stale token on {} (attempt {}, expected {:?}), refreshing",
                        stream, attempt, expected
                    );
                    match self.sink.list_streams(&self.group_name).await {
                        Ok(streams) => self
                            .tokens
                            .replace_all(streams.into_iter().map(|s| (s.stream_name, s.token))),
                        Err(e) => {
                            debug!("FORWARDER | Failed to refresh tokens: {}", e);
                            self.counters.record_exception();
                            return Delivery::Abandoned;
                        }
                    }
                }
                Err(SinkError::NotFound(message)) => {
                    debug!(
                        "FORWARDER | Destination missing for {} (attempt {}): {}",
                        stream, attempt, message
                    );
                    // someone else may have created them already
                    if let Err(e) = self.sink.ensure_group(&self.group_name).await {
                        debug!("FORWARDER | Ignoring log group creation error: {}", e);
                    }
                    if let Err(e) = self.sink.ensure_stream(&self.group_name, &stream).await {
                        debug!("FORWARDER | Ignoring log stream creation error: {}", e);
                    }
                    self.tokens.forget(&stream);
                }
                Err(e) => {
                    debug!("FORWARDER | Dropping record for {}: {}", stream, e);
                    self.counters.record_exception();
                    return Delivery::Abandoned;
                }
            }
        }

        warn!(
            "FORWARDER | Dropping record for {} after {} attempts",
            stream, self.max_attempts
        );
        Delivery::Exhausted
    }
}
