// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Boundary between the forwarder and the remote log store.
//!
//! The store appends events to named streams inside named groups and orders
//! writes with opaque sequence tokens: every accepted write returns the token
//! the next write to that stream must present.

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};

pub mod cloudwatch;

pub use cloudwatch::{CloudWatchSink, CloudWatchSinkConfig};

/// One event of a batch, as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: i64,
    pub message: String,
}

/// Accepted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    /// Token for the next write to the same stream, if the store issued one.
    pub next_token: Option<String>,
    pub status: StatusCode,
}

/// A stream as listed by the store, with its current upload token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamToken {
    pub stream_name: String,
    pub token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The token presented is not the one the stream expects next.
    #[error("Invalid sequence token, expected {expected:?}")]
    StaleToken { expected: Option<String> },

    /// The group or the stream does not exist.
    #[error("Log group or stream not found: {0}")]
    NotFound(String),

    /// Transport failures and every other rejection.
    #[error("Log store error {0:?}: {1}")]
    Other(Option<StatusCode>, String),
}

#[async_trait]
pub trait RemoteLogSink: Send + Sync {
    /// Appends `events` to `stream`, presenting `token` when one is known.
    async fn submit(
        &self,
        group: &str,
        stream: &str,
        token: Option<&str>,
        events: &[LogEvent],
    ) -> Result<SubmitResponse, SinkError>;

    /// Lists every stream of `group` with its current upload token.
    async fn list_streams(&self, group: &str) -> Result<Vec<StreamToken>, SinkError>;

    /// Creates `group`. Creating an existing group is not an error.
    async fn ensure_group(&self, group: &str) -> Result<(), SinkError>;

    /// Creates `stream` in `group`. Creating an existing stream is not an error.
    async fn ensure_stream(&self, group: &str, stream: &str) -> Result<(), SinkError>;
}
