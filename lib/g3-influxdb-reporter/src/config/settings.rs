/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use http::{HeaderValue, Uri};

use crate::filter::TagFilter;
use crate::precision::TimestampPrecision;
use crate::types::MetricTagMap;

/// Resolved, immutable reporter settings.
///
/// A new value is built on every reconfiguration, the live one is never
/// modified.
#[derive(Clone, Debug)]
pub struct Settings {
    pub(crate) url: Uri,
    pub(crate) authorization: Option<HeaderValue>,
    pub(crate) percentiles: Vec<f64>,
    pub(crate) tag_filter: TagFilter,
    pub(crate) additional_tags: MetricTagMap,
    pub(crate) precision: TimestampPrecision,
    pub(crate) post_empty_distributions: bool,
}

impl Settings {
    #[inline]
    pub fn url(&self) -> &Uri {
        &self.url
    }

    #[inline]
    pub fn authorization(&self) -> Option<&HeaderValue> {
        self.authorization.as_ref()
    }

    #[inline]
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    #[inline]
    pub fn tag_filter(&self) -> &TagFilter {
        &self.tag_filter
    }

    #[inline]
    pub fn additional_tags(&self) -> &MetricTagMap {
        &self.additional_tags
    }

    #[inline]
    pub fn precision(&self) -> TimestampPrecision {
        self.precision
    }

    #[inline]
    pub fn post_empty_distributions(&self) -> bool {
        self.post_empty_distributions
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::str::FromStr;

    use super::*;

    /// Settings pointing at a local server, without any extra tag.
    pub(crate) fn local_settings(precision: TimestampPrecision) -> Settings {
        Settings {
            url: Uri::from_str(&format!(
                "http://127.0.0.1:8086/write?precision={}&db=test",
                precision.query_value()
            ))
            .unwrap(),
            authorization: None,
            percentiles: vec![50.0, 95.0],
            tag_filter: TagFilter::accept_all(),
            additional_tags: MetricTagMap::default(),
            precision,
            post_empty_distributions: false,
        }
    }
}
