// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::future::Future;
use std::time::Duration;
use std::{env, process::ExitCode};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use log_forwarder::{config::ForwarderConfig, record::LogRecord, service::LogForwarder};

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var("LOG_FORWARDER_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,aws_config=off,aws_smithy_runtime=off,{}", log_level);

    let filter = match EnvFilter::try_new(env_filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("could not parse log level in configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    debug!("Logging subsystem enabled");

    let config = match ForwarderConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on log forwarder startup: {e}");
            return ExitCode::FAILURE;
        }
    };

    let forwarder = LogForwarder::from_config(&config).await;

    let handle = match forwarder.start() {
        Ok(h) => h,
        Err(e) => {
            error!("Error starting log forwarder: {e}");
            return ExitCode::FAILURE;
        }
    };

    let lines = BufReader::new(tokio::io::stdin()).lines();
    forward_lines(
        &forwarder,
        lines,
        config.stats_interval,
        tokio::signal::ctrl_c(),
    )
    .await;

    if let Err(e) = handle.stop().await {
        error!("Error stopping log forwarder: {e}");
        return ExitCode::FAILURE;
    }
    info!("{}", forwarder.statistics());
    ExitCode::SUCCESS
}

/// Feeds `lines` to the forwarder and reports statistics every
/// `stats_period` until `shutdown` resolves.
async fn forward_lines<R, S>(
    forwarder: &LogForwarder,
    mut lines: Lines<R>,
    stats_period: Duration,
    shutdown: S,
) where
    R: AsyncBufRead + Unpin,
    S: Future,
{
    let mut stats_interval = interval(stats_period);
    stats_interval.tick().await; // discard first tick, which is instantaneous
    let mut lines_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line(), if lines_open => match line {
                Ok(Some(line)) => {
                    if let Some(record) = parse_line(&line) {
                        forwarder.submit_records(std::iter::once(record));
                    }
                }
                Ok(None) => {
                    info!("stdin closed, forwarding remaining records until interrupted");
                    lines_open = false;
                }
                Err(e) => {
                    warn!("Failed to read from stdin: {e}");
                    lines_open = false;
                }
            },
            _ = stats_interval.tick() => {
                info!("{}", forwarder.statistics());
            }
            _ = &mut shutdown => {
                info!("Shutting down log forwarder");
                break;
            }
        }
    }
}

/// Reads one JSON record per line; anything else becomes the payload of a
/// record on the fallback stream.
fn parse_line(line: &str) -> Option<LogRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<LogRecord>(line) {
        Ok(record) => Some(record),
        Err(_) => Some(LogRecord::new(
            "",
            serde_json::Value::String(line.to_string()),
        )),
    }
}
