/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::Context;
use yaml_rust::Yaml;

/// Options of the underlying http transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        HttpClientConfig {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl HttpClientConfig {
    /// Returns `Ok(false)` if the key is not a http client option.
    pub(crate) fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<bool> {
        match k {
            "connect_timeout" => {
                self.connect_timeout = super::value::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(true)
            }
            "request_timeout" => {
                self.request_timeout = super::value::as_duration(v)
                    .context(format!("invalid humanize duration value for key {k}"))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
