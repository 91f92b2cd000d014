// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while configuring or controlling the forwarder.
///
/// Delivery failures never surface here: they are absorbed by the workers
/// and only show up in the counters.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to determine region from '{0}'")]
    UnknownRegion(String),

    #[error("Forwarder already started")]
    AlreadyStarted,

    #[error("Runtime error: {0}")]
    Runtime(String),
}
