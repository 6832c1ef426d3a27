/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader, yaml};

pub(crate) mod value;

mod auth;
pub use auth::Authentication;

mod client;
pub use client::HttpClientConfig;

mod environment;
pub use environment::{AdditionalTagsConfig, Environment};

mod reporter;
pub use reporter::{InfluxdbReporterConfig, Protocol};

mod settings;
pub use settings::Settings;
#[cfg(test)]
pub(crate) use settings::test_util;

pub(crate) fn normalize(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

pub(crate) fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

/// Load the reporter config map from a yaml document.
///
/// An empty document yields the default configuration.
pub fn load_str(s: &str) -> anyhow::Result<yaml::Hash> {
    let docs = YamlLoader::load_from_str(s).map_err(|e| anyhow!("invalid yaml: {e}"))?;
    match docs.into_iter().next() {
        Some(Yaml::Hash(map)) => Ok(map),
        Some(Yaml::Null) | None => Ok(yaml::Hash::new()),
        Some(_) => Err(anyhow!("the reporter config should be a yaml map")),
    }
}
