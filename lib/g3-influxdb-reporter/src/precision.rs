/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use yaml_rust::Yaml;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimestampPrecision {
    #[default]
    Seconds,
    MilliSeconds,
    MicroSeconds,
    NanoSeconds,
}

impl TimestampPrecision {
    /// Value of the `precision` query parameter of the `/write` api.
    pub fn query_value(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::MilliSeconds => "ms",
            Self::MicroSeconds => "u",
            Self::NanoSeconds => "ns",
        }
    }

    pub fn timestamp(self, time: &DateTime<Utc>) -> i128 {
        let secs = i128::from(time.timestamp());
        let nanos = i128::from(time.timestamp_subsec_nanos());
        match self {
            Self::Seconds => secs,
            Self::MilliSeconds => secs * 1_000 + nanos / 1_000_000,
            Self::MicroSeconds => secs * 1_000_000 + nanos / 1_000,
            Self::NanoSeconds => secs * 1_000_000_000 + nanos,
        }
    }

    pub(crate) fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::String(s) = value {
            TimestampPrecision::from_str(s)
        } else {
            Err(anyhow!(
                "yaml value type for timestamp precision should be string"
            ))
        }
    }
}

impl FromStr for TimestampPrecision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(TimestampPrecision::Seconds),
            "ms" => Ok(TimestampPrecision::MilliSeconds),
            "u" | "µ" | "μ" => Ok(TimestampPrecision::MicroSeconds),
            "ns" => Ok(TimestampPrecision::NanoSeconds),
            _ => Err(anyhow!(
                "invalid timestamp precision {s}, should be one of ns, u, ms, s"
            )),
        }
    }
}
