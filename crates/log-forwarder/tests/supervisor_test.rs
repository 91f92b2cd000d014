// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod common;

use common::mocks::MockSink;
use common::test_config;
use log_forwarder::config::ForwarderConfig;
use log_forwarder::record::LogRecord;
use log_forwarder::service::LogForwarder;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tokio_util::sync::CancellationToken;

fn setup(config: ForwarderConfig, sink: MockSink) -> (LogForwarder, Arc<MockSink>) {
    let sink = Arc::new(sink);
    let service = LogForwarder::new(&config, sink.clone());
    (service, sink)
}

#[tokio::test]
async fn test_cycle_on_empty_queue_submits_nothing() {
    let (service, sink) = setup(test_config(), MockSink::accepting());
    let supervisor = service.supervisor(CancellationToken::new());

    assert_eq!(supervisor.run_cycle().await, 0);
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn test_cycle_drains_queue_with_worker_pool() {
    let (service, sink) = setup(
        test_config(),
        MockSink::accepting().with_delay(Duration::from_millis(5)),
    );
    let records: Vec<_> = (0..20)
        .map(|n| LogRecord::new(format!("app-{}", n % 4), json!(n)))
        .collect();
    service.submit_records(records);

    let pulled = service.supervisor(CancellationToken::new()).run_cycle().await;

    assert_eq!(pulled, 20);
    assert_eq!(sink.submits().len(), 20);
    let stats = service.statistics();
    assert_eq!(stats.successful_uploads, 20);
    assert_eq!(stats.queue_count, 0);
}

#[tokio::test]
async fn test_concurrent_streams_keep_independent_tokens() {
    let config = ForwarderConfig {
        worker_count: 2,
        ..test_config()
    };
    let (service, sink) = setup(
        config,
        MockSink::accepting().with_delay(Duration::from_millis(20)),
    );
    service.submit_records(vec![
        LogRecord::new("orders", json!(1)),
        LogRecord::new("billing", json!(2)),
    ]);

    let pulled = service.supervisor(CancellationToken::new()).run_cycle().await;

    assert_eq!(pulled, 2);
    let tokens = service.tokens().snapshot();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens.get("orders"), sink.issued("orders").as_ref());
    assert_eq!(tokens.get("billing"), sink.issued("billing").as_ref());
    let streams: HashSet<_> = tokens.values().map(|t| t.split('-').next()).collect();
    assert_eq!(streams.len(), 2);
    assert_eq!(service.statistics().successful_uploads, 2);
}

#[tokio::test(start_paused = true)]
async fn test_supervisor_pauses_between_cycles() {
    let (service, sink) = setup(test_config(), MockSink::accepting());
    let cancel_token = CancellationToken::new();
    let task = tokio::spawn(service.supervisor(cancel_token.clone()).run());

    // first cycle finds nothing and the supervisor goes to sleep
    sleep(Duration::from_millis(10)).await;
    service.submit_records(vec![LogRecord::new("orders", json!(1))]);

    sleep(Duration::from_millis(500)).await;
    assert!(sink.submits().is_empty());
    assert_eq!(service.statistics().queue_count, 1);

    sleep(Duration::from_millis(600)).await;
    assert_eq!(sink.submits().len(), 1);
    assert_eq!(service.statistics().queue_count, 0);

    cancel_token.cancel();
    task.await.expect("supervisor task failed");
}

#[tokio::test]
async fn test_stop_interrupts_pause() {
    let config = ForwarderConfig {
        cycle_interval: Duration::from_secs(3600),
        ..test_config()
    };
    let (service, _sink) = setup(config, MockSink::accepting());
    let handle = service.start().expect("failed to start");

    sleep(Duration::from_millis(20)).await;
    timeout(Duration::from_secs(1), handle.stop())
        .await
        .expect("stop did not interrupt the pause")
        .expect("failed to stop");
}

#[tokio::test]
async fn test_cancelled_supervisor_runs_no_cycle() {
    let (service, sink) = setup(test_config(), MockSink::accepting());
    service.submit_records(vec![LogRecord::new("orders", json!(1))]);
    let cancel_token = CancellationToken::new();
    cancel_token.cancel();

    service.supervisor(cancel_token).run().await;

    assert!(sink.calls().is_empty());
    assert_eq!(service.statistics().queue_count, 1);
}
