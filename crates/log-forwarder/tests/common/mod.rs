// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities and mocks for integration tests

pub mod mocks;

use log_forwarder::config::{Credentials, ForwarderConfig};
use log_forwarder::region::Region;

#[allow(dead_code)]
pub fn test_config() -> ForwarderConfig {
    ForwarderConfig::new(
        "test-group",
        Credentials {
            access_key: "AKID".to_string(),
            secret_key: "secret".to_string(),
        },
        Region::UsEast1,
    )
}
