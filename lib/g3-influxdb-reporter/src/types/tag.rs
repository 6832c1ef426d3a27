/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use crate::escape;
use crate::filter::TagFilter;

/// Key-unique tag set, iterated in key order.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricTagMap {
    inner: BTreeMap<String, String>,
}

impl MetricTagMap {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.insert(name.into(), value.into())
    }

    /// Merge `other` into this map, values from `other` win on key collision.
    #[inline]
    pub fn extend(&mut self, other: &MetricTagMap) {
        for (k, v) in &other.inner {
            self.inner.insert(k.clone(), v.clone());
        }
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(|v| v.as_str())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Each accepted tag is rendered as `,key=value`, so the result can be
    /// appended directly to an escaped measurement name.
    pub fn display_influxdb<'a>(&'a self, filter: &'a TagFilter) -> DisplayInfluxdbTags<'a> {
        DisplayInfluxdbTags {
            inner: self,
            filter,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for MetricTagMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        MetricTagMap {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

pub struct DisplayInfluxdbTags<'a> {
    inner: &'a MetricTagMap,
    filter: &'a TagFilter,
}

impl fmt::Display for DisplayInfluxdbTags<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.inner.iter() {
            if !self.filter.accept(name) {
                log::trace!("tag {name} dropped by tag filter");
                continue;
            }
            f.write_char(',')?;
            write!(f, "{}={}", escape::key(name), escape::key(value))?;
        }
        Ok(())
    }
}
