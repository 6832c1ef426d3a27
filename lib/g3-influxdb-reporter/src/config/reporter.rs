/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use http::Uri;
use yaml_rust::{Yaml, yaml};

use super::{AdditionalTagsConfig, Authentication, Environment, HttpClientConfig, Settings};
use crate::filter::TagFilter;
use crate::precision::TimestampPrecision;

const DEFAULT_PERCENTILES: [f64; 6] = [50.0, 70.0, 90.0, 95.0, 99.0, 99.9];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl FromStr for Protocol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(anyhow!("unsupported protocol {s}")),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => f.write_str("http"),
            Protocol::Https => f.write_str("https"),
        }
    }
}

/// Raw reporter configuration, as parsed from yaml.
#[derive(Clone, Debug)]
pub struct InfluxdbReporterConfig {
    host: String,
    port: u16,
    protocol: Protocol,
    database: String,
    authentication: Option<Authentication>,
    percentiles: Vec<f64>,
    precision: TimestampPrecision,
    post_empty_distributions: bool,
    tag_filter: TagFilter,
    additional_tags: AdditionalTagsConfig,
    pub(crate) client: HttpClientConfig,
}

impl Default for InfluxdbReporterConfig {
    fn default() -> Self {
        InfluxdbReporterConfig {
            host: "127.0.0.1".to_string(),
            port: 8086,
            protocol: Protocol::Http,
            database: "mydb".to_string(),
            authentication: None,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            precision: TimestampPrecision::Seconds,
            post_empty_distributions: false,
            tag_filter: TagFilter::accept_all(),
            additional_tags: AdditionalTagsConfig::default(),
            client: HttpClientConfig::default(),
        }
    }
}

impl InfluxdbReporterConfig {
    pub fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = InfluxdbReporterConfig::default();

        super::foreach_kv(map, |k, v| config.set(k, v))?;

        config.check()?;
        Ok(config)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        let key = super::normalize(k);
        match key.as_str() {
            "host" | "hostname" => {
                self.host = super::value::as_string(v)?;
                Ok(())
            }
            "port" => {
                self.port = super::value::as_u16(v)?;
                Ok(())
            }
            "protocol" => {
                let s = super::value::as_string(v)?;
                self.protocol = Protocol::from_str(&s)?;
                Ok(())
            }
            "database" | "db" => {
                self.database = super::value::as_string(v)?;
                Ok(())
            }
            "authentication" | "auth" => {
                self.authentication = Some(
                    Authentication::parse_yaml(v)
                        .context(format!("invalid authentication value for key {k}"))?,
                );
                Ok(())
            }
            "percentiles" => {
                self.percentiles = super::value::as_list(v, super::value::as_f64)
                    .context(format!("invalid percentile list value for key {k}"))?;
                Ok(())
            }
            "precision" => {
                self.precision = TimestampPrecision::parse_yaml(v)
                    .context(format!("invalid timestamp precision value for key {k}"))?;
                Ok(())
            }
            "post_empty_distributions" => {
                self.post_empty_distributions = super::value::as_bool(v)?;
                Ok(())
            }
            "tag_filter" => {
                self.tag_filter = TagFilter::parse_yaml(v)
                    .context(format!("invalid tag filter value for key {k}"))?;
                Ok(())
            }
            "additional_tags" => {
                self.additional_tags = AdditionalTagsConfig::parse_yaml(v)
                    .context(format!("invalid additional tags value for key {k}"))?;
                Ok(())
            }
            _ => {
                if self.client.set_by_yaml_kv(&key, v)? {
                    Ok(())
                } else {
                    Err(anyhow!("invalid key {k}"))
                }
            }
        }
    }

    fn check(&mut self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            return Err(anyhow!("host is not set"));
        }
        if self.database.is_empty() {
            return Err(anyhow!("database is not set"));
        }
        if self.percentiles.is_empty() {
            return Err(anyhow!("percentiles should not be empty"));
        }
        for p in &self.percentiles {
            if !(0.0..=100.0).contains(p) {
                return Err(anyhow!("percentile {p} is out of range [0, 100]"));
            }
        }
        Ok(())
    }

    fn build_url(&self) -> anyhow::Result<Uri> {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let url = format!(
            "{}://{host}:{}/write?precision={}&db={}",
            self.protocol,
            self.port,
            self.precision.query_value(),
            self.database
        );
        Uri::from_str(&url).map_err(|e| anyhow!("invalid influxdb write url {url}: {e}"))
    }

    pub fn resolve(&self, env: &Environment) -> anyhow::Result<Settings> {
        let url = self.build_url()?;
        let authorization = match &self.authentication {
            Some(auth) => Some(auth.header_value()?),
            None => None,
        };
        Ok(Settings {
            url,
            authorization,
            percentiles: self.percentiles.clone(),
            tag_filter: self.tag_filter.clone(),
            additional_tags: self.additional_tags.build(env),
            precision: self.precision,
            post_empty_distributions: self.post_empty_distributions,
        })
    }
}
