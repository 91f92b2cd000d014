// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! CloudWatch Logs client built on the AWS SDK.
//!
//! Requests are signed with the configured access key. The SDK's own retry
//! layer is disabled: the forwarder drives retries itself. Rejections are
//! mapped as follows:
//!
//! | Service error                       | Maps to                   |
//! |-------------------------------------|---------------------------|
//! | `InvalidSequenceTokenException`     | [`SinkError::StaleToken`] |
//! | `ResourceNotFoundException`         | [`SinkError::NotFound`]   |
//! | `ResourceAlreadyExistsException`    | success, for creates      |
//! | anything else                       | [`SinkError::Other`]      |

use crate::config::{Credentials, ForwarderConfig};
use crate::region::Region;
use crate::sink::{LogEvent, RemoteLogSink, SinkError, StreamToken, SubmitResponse};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatchlogs::config::http::HttpResponse;
use aws_sdk_cloudwatchlogs::config::{Builder as LogsConfigBuilder, Credentials as AwsCredentials};
use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudwatchlogs::operation::create_log_group::CreateLogGroupError;
use aws_sdk_cloudwatchlogs::operation::create_log_stream::CreateLogStreamError;
use aws_sdk_cloudwatchlogs::operation::describe_log_streams::DescribeLogStreamsError;
use aws_sdk_cloudwatchlogs::operation::put_log_events::PutLogEventsError;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use aws_sdk_cloudwatchlogs::Client;
use http::StatusCode;
use std::time::Duration;
use tracing::{debug, error};

/// Upper bound on `DescribeLogStreams` pages fetched for one listing.
pub const MAX_LIST_PAGES: usize = 64;

pub struct CloudWatchSinkConfig {
    /// Base URL, e.g. `https://logs.us-east-1.amazonaws.com`
    pub endpoint: String,
    /// Signing region
    pub region: Region,
    /// Falls back to the SDK's default provider chain when `None`
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
}

impl From<&ForwarderConfig> for CloudWatchSinkConfig {
    fn from(config: &ForwarderConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            region: config.region,
            credentials: Some(config.credentials.clone()),
            timeout: config.request_timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloudWatchSink {
    client: Client,
}

impl CloudWatchSink {
    pub async fn new(config: CloudWatchSinkConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.code()))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.timeout)
                    .build(),
            );

        if let Some(credentials) = &config.credentials {
            loader = loader.credentials_provider(AwsCredentials::new(
                &credentials.access_key,
                &credentials.secret_key,
                None,
                None,
                "log-forwarder",
            ));
        }

        let shared = loader.load().await;
        let logs_config = LogsConfigBuilder::from(&shared)
            .endpoint_url(config.endpoint.trim_end_matches('/'))
            .build();

        debug!(
            "FORWARDER | Created log store client for {} in {}",
            config.endpoint, config.region
        );

        Self {
            client: Client::from_conf(logs_config),
        }
    }
}

/// Maps a failure with no dedicated [`SinkError`] variant.
fn classify<E>(err: &SdkError<E, HttpResponse>) -> SinkError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err
        .raw_response()
        .and_then(|raw| StatusCode::from_u16(raw.status().as_u16()).ok());
    let message = match err
        .as_service_error()
        .map(|service| (service.code(), service.message()))
    {
        Some((Some(code), Some(message))) => format!("{code}: {message}"),
        Some((Some(code), None)) => code.to_string(),
        Some((None, Some(message))) => message.to_string(),
        _ => DisplayErrorContext(err).to_string(),
    };
    debug!("FORWARDER | Log store call failed with {:?}: {}", status, message);
    SinkError::Other(status, message)
}

#[async_trait]
impl RemoteLogSink for CloudWatchSink {
    async fn submit(
        &self,
        group: &str,
        stream: &str,
        token: Option<&str>,
        events: &[LogEvent],
    ) -> Result<SubmitResponse, SinkError> {
        let events = events
            .iter()
            .map(|event| {
                InputLogEvent::builder()
                    .timestamp(event.timestamp)
                    .message(&event.message)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SinkError::Other(None, format!("invalid log event: {e}")))?;

        let output = self
            .client
            .put_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .set_log_events(Some(events))
            .set_sequence_token(token.map(str::to_string))
            .send()
            .await
            .map_err(|err| match err.as_service_error() {
                Some(PutLogEventsError::InvalidSequenceTokenException(stale)) => {
                    SinkError::StaleToken {
                        expected: stale.expected_sequence_token().map(str::to_string),
                    }
                }
                Some(PutLogEventsError::ResourceNotFoundException(missing)) => {
                    SinkError::NotFound(missing.message().unwrap_or_default().to_string())
                }
                _ => classify(&err),
            })?;

        if let Some(rejected) = output.rejected_log_events_info() {
            error!("FORWARDER | Events rejected on stream {}: {:?}", stream, rejected);
        }

        Ok(SubmitResponse {
            next_token: output.next_sequence_token().map(str::to_string),
            status: StatusCode::OK,
        })
    }

    async fn list_streams(&self, group: &str) -> Result<Vec<StreamToken>, SinkError> {
        let mut streams = Vec::new();
        let mut next_token: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let page = self
                .client
                .describe_log_streams()
                .log_group_name(group)
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(|err| match err.as_service_error() {
                    Some(DescribeLogStreamsError::ResourceNotFoundException(missing)) => {
                        SinkError::NotFound(missing.message().unwrap_or_default().to_string())
                    }
                    _ => classify(&err),
                })?;

            streams.extend(page.log_streams().iter().filter_map(|stream| {
                stream.log_stream_name().map(|name| StreamToken {
                    stream_name: name.to_string(),
                    token: stream.upload_sequence_token().map(str::to_string),
                })
            }));

            match page.next_token() {
                Some(token) if Some(token) != next_token.as_deref() => {
                    next_token = Some(token.to_string());
                }
                _ => {
                    debug!("FORWARDER | Listed {} streams in {}", streams.len(), group);
                    return Ok(streams);
                }
            }
        }

        Err(SinkError::Other(
            None,
            format!("listing streams of {group} did not finish within {MAX_LIST_PAGES} pages"),
        ))
    }

    async fn ensure_group(&self, group: &str) -> Result<(), SinkError> {
        match self.client.create_log_group().log_group_name(group).send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(CreateLogGroupError::is_resource_already_exists_exception) =>
            {
                Ok(())
            }
            Err(err) => Err(classify(&err)),
        }
    }

    async fn ensure_stream(&self, group: &str, stream: &str) -> Result<(), SinkError> {
        match self
            .client
            .create_log_stream()
            .log_group_name(group)
            .log_stream_name(stream)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(CreateLogStreamError::is_resource_already_exists_exception) =>
            {
                Ok(())
            }
            Err(err) => Err(classify(&err)),
        }
    }
}
