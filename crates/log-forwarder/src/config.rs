// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{
    DEFAULT_CYCLE_INTERVAL, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STATS_INTERVAL,
    DEFAULT_WORKER_COUNT,
};
use crate::error::ForwarderError;
use crate::region::Region;
use serde::Deserialize;
use std::env;
use std::fmt::{self, Debug};
use std::time::Duration;

pub const CONNECTION_DETAILS_VAR: &str = "LOG_FORWARDER_CONNECTION_DETAILS";
pub const GROUP_NAME_VAR: &str = "LOG_FORWARDER_GROUP_NAME";

/// Access key pair presented to the log store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials {{ access_key: {}, .. }}", self.access_key)
    }
}

/// JSON document held by `LOG_FORWARDER_CONNECTION_DETAILS`.
#[derive(Deserialize)]
struct ConnectionDetails {
    #[serde(rename = "AWSAccessKey")]
    access_key: String,
    #[serde(rename = "AWSSecretAccessKey")]
    secret_key: String,
    #[serde(rename = "AWSRegionEndpoint", default)]
    region: String,
}

#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Log group every stream is written to
    pub group_name: String,
    pub credentials: Credentials,
    pub region: Region,
    /// Base URL of the log store, derived from the region unless overridden
    pub endpoint: String,
    /// Workers spawned per cycle
    pub worker_count: usize,
    /// Loop iterations allowed per record
    pub max_attempts: usize,
    pub cycle_interval: Duration,
    pub request_timeout: Duration,
    /// How often the binary reports statistics
    pub stats_interval: Duration,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl ForwarderConfig {
    #[must_use]
    pub fn new(group_name: impl Into<String>, credentials: Credentials, region: Region) -> Self {
        Self {
            group_name: group_name.into(),
            credentials,
            region,
            endpoint: region.endpoint(),
            worker_count: DEFAULT_WORKER_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            stats_interval: DEFAULT_STATS_INTERVAL,
            log_level: "info".to_string(),
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ForwarderError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from any key/value source.
    ///
    /// Destination settings are required; everything else falls back to its
    /// default when unset or unparseable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ForwarderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let details = lookup(CONNECTION_DETAILS_VAR)
            .ok_or(ForwarderError::MissingSetting(CONNECTION_DETAILS_VAR))?;
        let details: ConnectionDetails = serde_json::from_str(&details).map_err(|e| {
            ForwarderError::InvalidConfig(format!("{CONNECTION_DETAILS_VAR} is not valid: {e}"))
        })?;
        let group_name =
            lookup(GROUP_NAME_VAR).ok_or(ForwarderError::MissingSetting(GROUP_NAME_VAR))?;

        let region = Region::parse(&details.region, true)?;
        let mut config = Self::new(
            group_name.trim(),
            Credentials {
                access_key: details.access_key,
                secret_key: details.secret_key,
            },
            region,
        );

        if let Some(endpoint) = lookup("LOG_FORWARDER_ENDPOINT") {
            config.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(workers) = parse_var(&lookup, "LOG_FORWARDER_WORKERS") {
            config.worker_count = workers;
        }
        if let Some(attempts) = parse_var(&lookup, "LOG_FORWARDER_MAX_ATTEMPTS") {
            config.max_attempts = attempts;
        }
        if let Some(ms) = parse_var(&lookup, "LOG_FORWARDER_CYCLE_INTERVAL_MS") {
            config.cycle_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var(&lookup, "LOG_FORWARDER_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "LOG_FORWARDER_STATS_INTERVAL_SECS") {
            config.stats_interval = Duration::from_secs(secs);
        }
        if let Some(level) = lookup("LOG_FORWARDER_LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ForwarderError> {
        if self.group_name.trim().is_empty() {
            return Err(ForwarderError::InvalidConfig(format!(
                "{GROUP_NAME_VAR} cannot be empty"
            )));
        }

        if self.credentials.access_key.trim().is_empty()
            || self.credentials.secret_key.trim().is_empty()
        {
            return Err(ForwarderError::InvalidConfig(
                "access key and secret key cannot be empty".to_string(),
            ));
        }

        if self.endpoint.trim().is_empty() {
            return Err(ForwarderError::InvalidConfig(
                "endpoint cannot be empty".to_string(),
            ));
        }

        if self.worker_count == 0 {
            return Err(ForwarderError::InvalidConfig(
                "worker count must be greater than 0".to_string(),
            ));
        }

        if self.stats_interval.is_zero() {
            return Err(ForwarderError::InvalidConfig(
                "stats interval must be greater than 0".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(ForwarderError::InvalidConfig(
                "max attempts must be greater than 0".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ForwarderError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|val| val.trim().parse::<T>().ok())
}
