// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ForwarderError;
use std::fmt;
use tracing::warn;

/// Regions the log store is reachable in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    UsEast1,
    UsWest1,
    UsWest2,
    UsGovCloudWest1,
    SaEast1,
    EuCentral1,
    EuWest1,
    ApNortheast1,
    ApSoutheast1,
    ApSoutheast2,
}

impl Region {
    /// Parses a region name, also accepting loose spellings such as `USEast`
    /// or `eu_west`.
    ///
    /// With `default_on_error`, anything unrecognized resolves to
    /// [`Region::UsEast1`] instead of failing.
    pub fn parse(input: &str, default_on_error: bool) -> Result<Region, ForwarderError> {
        let lower = input.trim().to_lowercase();
        let squashed: String = lower.chars().filter(char::is_ascii_alphanumeric).collect();

        let region = match lower.as_str() {
            "us-east-1" => Some(Region::UsEast1),
            "us-west-1" => Some(Region::UsWest1),
            "us-west-2" => Some(Region::UsWest2),
            "us-gov-west-1" | "us-govcloudwest-1" => Some(Region::UsGovCloudWest1),
            "sa-east-1" => Some(Region::SaEast1),
            "eu-central-1" => Some(Region::EuCentral1),
            "eu-west-1" => Some(Region::EuWest1),
            "ap-northeast-1" => Some(Region::ApNortheast1),
            "ap-southeast-1" => Some(Region::ApSoutheast1),
            "ap-southeast-2" => Some(Region::ApSoutheast2),
            _ => None,
        }
        .or_else(|| {
            // loose names only ever meant the first region of each area
            if squashed.contains("useast") {
                Some(Region::UsEast1)
            } else if squashed.contains("uswest") {
                Some(Region::UsWest1)
            } else if squashed.contains("usgov") {
                Some(Region::UsGovCloudWest1)
            } else if squashed.contains("saeast") {
                Some(Region::SaEast1)
            } else if squashed.contains("eucentral") {
                Some(Region::EuCentral1)
            } else if squashed.contains("euwest") {
                Some(Region::EuWest1)
            } else if squashed.contains("apnortheast") {
                Some(Region::ApNortheast1)
            } else if squashed.contains("apsoutheast") {
                Some(Region::ApSoutheast1)
            } else {
                None
            }
        });

        match region {
            Some(region) => Ok(region),
            None if default_on_error => {
                warn!(
                    "FORWARDER | Unknown region '{}', defaulting to {}",
                    input,
                    Region::default()
                );
                Ok(Region::default())
            }
            None => Err(ForwarderError::UnknownRegion(input.to_string())),
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Region::UsEast1 => "us-east-1",
            Region::UsWest1 => "us-west-1",
            Region::UsWest2 => "us-west-2",
            Region::UsGovCloudWest1 => "us-gov-west-1",
            Region::SaEast1 => "sa-east-1",
            Region::EuCentral1 => "eu-central-1",
            Region::EuWest1 => "eu-west-1",
            Region::ApNortheast1 => "ap-northeast-1",
            Region::ApSoutheast1 => "ap-southeast-1",
            Region::ApSoutheast2 => "ap-southeast-2",
        }
    }

    /// Public endpoint of the log store in this region.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("https://logs.{}.amazonaws.com", self.code())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
