// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Stream used for records whose application alias is blank.
pub const FALLBACK_STREAM_NAME: &str = "Custom";

/// Workers spawned by the supervisor on every cycle.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Loop iterations allowed per record, whatever caused the retry.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Pause between two supervisor cycles.
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_millis(1000);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(60);
