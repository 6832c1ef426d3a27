/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use yaml_rust::Yaml;

use crate::types::MetricTagMap;

/// Identity of the process the metrics are collected in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    pub service: String,
    pub host: String,
    pub instance: String,
    pub tags: MetricTagMap,
}

impl Environment {
    pub fn new<S, H>(service: S, host: H) -> Self
    where
        S: Into<String>,
        H: Into<String>,
    {
        let service = service.into();
        let host = host.into();
        let instance = format!("{service}@{host}");
        Environment {
            service,
            host,
            instance,
            tags: MetricTagMap::default(),
        }
    }

    /// Use the host name reported by the system, falling back to
    /// `localhost`.
    pub fn detect<S: Into<String>>(service: S) -> Self {
        let host = system_hostname().unwrap_or_else(|| "localhost".to_string());
        Environment::new(service, host)
    }

    pub fn with_instance<I: Into<String>>(mut self, instance: I) -> Self {
        self.instance = instance.into();
        self
    }

    pub fn with_tag<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.tags.insert(name, value);
        self
    }
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    let uname = rustix::system::uname();
    let name = uname.nodename().to_string_lossy();
    if name.is_empty() {
        None
    } else {
        Some(name.into_owned())
    }
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    None
}

/// Which environment derived tags are added to every record, plus the
/// explicitly configured ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdditionalTagsConfig {
    service: bool,
    host: bool,
    instance: bool,
    blocked_hosts: Vec<String>,
    tags: MetricTagMap,
}

impl Default for AdditionalTagsConfig {
    fn default() -> Self {
        AdditionalTagsConfig {
            service: true,
            host: true,
            instance: true,
            blocked_hosts: Vec::new(),
            tags: MetricTagMap::default(),
        }
    }
}

impl AdditionalTagsConfig {
    pub(crate) fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = value else {
            return Err(anyhow!(
                "yaml value type for additional tags should be 'map'"
            ));
        };

        let mut config = AdditionalTagsConfig::default();
        super::foreach_kv(map, |k, v| match super::normalize(k).as_str() {
            "service" => {
                config.service = super::value::as_bool(v)?;
                Ok(())
            }
            "host" => {
                config.host = super::value::as_bool(v)?;
                Ok(())
            }
            "instance" => {
                config.instance = super::value::as_bool(v)?;
                Ok(())
            }
            "blocked_hosts" => {
                config.blocked_hosts = super::value::as_list(v, super::value::as_string)?;
                Ok(())
            }
            "tags" => {
                config.tags = super::value::as_tag_map(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }

    /// Environment tags first, explicit tags override them on key collision.
    pub fn build(&self, env: &Environment) -> MetricTagMap {
        let mut tags = MetricTagMap::default();
        if self.service {
            tags.insert("service", env.service.as_str());
        }
        if self.host && !self.blocked_hosts.iter().any(|h| h == &env.host) {
            tags.insert("host", env.host.as_str());
        }
        if self.instance {
            tags.insert("instance", env.instance.as_str());
        }
        tags.extend(&env.tags);
        tags.extend(&self.tags);
        tags
    }
}
