// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Scripted log store for exercising the delivery protocol

#![allow(dead_code)]

use async_trait::async_trait;
use log_forwarder::sink::{LogEvent, RemoteLogSink, SinkError, StreamToken, SubmitResponse};
use http::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Answer to one `submit` call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Accept and issue `<stream>-<n>` as the next token
    Accept,
    /// Accept with a non-OK status
    AcceptWithStatus(StatusCode),
    /// Accept without issuing a token
    AcceptWithoutToken,
    Stale,
    NotFound,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit {
        stream: String,
        token: Option<String>,
    },
    ListStreams,
    EnsureGroup,
    EnsureStream(String),
}

pub struct MockSink {
    script: Mutex<VecDeque<Reply>>,
    default_reply: Reply,
    calls: Mutex<Vec<Call>>,
    issued: Mutex<HashMap<String, String>>,
    counter: AtomicU64,
    listing: Mutex<Vec<StreamToken>>,
    fail_listing: bool,
    fail_provisioning: bool,
    delay: Option<Duration>,
}

impl MockSink {
    /// Replies with `script` in order, then with `default_reply` forever.
    pub fn new(script: Vec<Reply>, default_reply: Reply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            default_reply,
            calls: Mutex::new(Vec::new()),
            issued: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
            listing: Mutex::new(Vec::new()),
            fail_listing: false,
            fail_provisioning: false,
            delay: None,
        }
    }

    pub fn accepting() -> Self {
        Self::new(vec![], Reply::Accept)
    }

    pub fn with_listing(self, listing: Vec<(&str, Option<&str>)>) -> Self {
        *self.listing.lock().unwrap() = listing
            .into_iter()
            .map(|(stream, token)| StreamToken {
                stream_name: stream.to_string(),
                token: token.map(str::to_string),
            })
            .collect();
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_provisioning(mut self) -> Self {
        self.fail_provisioning = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submits(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Submit { .. }))
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn list_calls(&self) -> usize {
        self.count(&Call::ListStreams)
    }

    /// Last token handed out for `stream`.
    pub fn issued(&self, stream: &str) -> Option<String> {
        self.issued.lock().unwrap().get(stream).cloned()
    }

    fn issue(&self, stream: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("{stream}-{n}");
        self.issued
            .lock()
            .unwrap()
            .insert(stream.to_string(), token.clone());
        token
    }
}

#[async_trait]
impl RemoteLogSink for MockSink {
    async fn submit(
        &self,
        _group: &str,
        stream: &str,
        token: Option<&str>,
        _events: &[LogEvent],
    ) -> Result<SubmitResponse, SinkError> {
        self.calls.lock().unwrap().push(Call::Submit {
            stream: stream.to_string(),
            token: token.map(str::to_string),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            Reply::Accept => Ok(SubmitResponse {
                next_token: Some(self.issue(stream)),
                status: StatusCode::OK,
            }),
            Reply::AcceptWithStatus(status) => Ok(SubmitResponse {
                next_token: Some(self.issue(stream)),
                status,
            }),
            Reply::AcceptWithoutToken => Ok(SubmitResponse {
                next_token: None,
                status: StatusCode::OK,
            }),
            Reply::Stale => Err(SinkError::StaleToken { expected: None }),
            Reply::NotFound => Err(SinkError::NotFound(format!("{stream} does not exist"))),
            Reply::Fail => Err(SinkError::Other(
                Some(StatusCode::INTERNAL_SERVER_ERROR),
                "boom".to_string(),
            )),
        }
    }

    async fn list_streams(&self, _group: &str) -> Result<Vec<StreamToken>, SinkError> {
        self.calls.lock().unwrap().push(Call::ListStreams);
        if self.fail_listing {
            return Err(SinkError::Other(None, "listing unavailable".to_string()));
        }
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn ensure_group(&self, _group: &str) -> Result<(), SinkError> {
        self.calls.lock().unwrap().push(Call::EnsureGroup);
        if self.fail_provisioning {
            return Err(SinkError::Other(None, "already exists".to_string()));
        }
        Ok(())
    }

    async fn ensure_stream(&self, _group: &str, stream: &str) -> Result<(), SinkError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::EnsureStream(stream.to_string()));
        if self.fail_provisioning {
            return Err(SinkError::Other(None, "already exists".to_string()));
        }
        Ok(())
    }
}
