/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hdrhistogram::{Counter, Histogram};

use super::MetricTagMap;

/// Summary of the values recorded by a histogram, range sampler or timer
/// during one reporting period.
pub trait Distribution: Send + Sync {
    fn count(&self) -> i64;
    fn sum(&self) -> i64;
    fn min(&self) -> i64;
    fn max(&self) -> i64;

    /// Value at the given percentile, in the range `[0, 100]`.
    fn percentile(&self, percentile: f64) -> f64;
}

impl<T> Distribution for Histogram<T>
where
    T: Counter + Send + Sync,
{
    fn count(&self) -> i64 {
        i64::try_from(self.len()).unwrap_or(i64::MAX)
    }

    fn sum(&self) -> i64 {
        let mut sum: u64 = 0;
        for v in self.iter_recorded() {
            let value = self.median_equivalent(v.value_iterated_to());
            sum = sum.saturating_add(value.saturating_mul(v.count_at_value().as_u64()));
        }
        i64::try_from(sum).unwrap_or(i64::MAX)
    }

    fn min(&self) -> i64 {
        if self.is_empty() {
            return 0;
        }
        i64::try_from(Histogram::min(self)).unwrap_or(i64::MAX)
    }

    fn max(&self) -> i64 {
        i64::try_from(Histogram::max(self)).unwrap_or(i64::MAX)
    }

    fn percentile(&self, percentile: f64) -> f64 {
        self.value_at_percentile(percentile) as f64
    }
}

/// One instrument of a snapshot: name, tags and the value of the period.
#[derive(Clone)]
pub struct Instrument<T> {
    pub name: String,
    pub tags: MetricTagMap,
    pub value: T,
}

impl<T> Instrument<T> {
    pub fn new<N: Into<String>>(name: N, value: T) -> Self {
        Instrument {
            name: name.into(),
            tags: MetricTagMap::default(),
            value,
        }
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

pub type CounterInstrument = Instrument<i64>;
pub type GaugeInstrument = Instrument<f64>;
pub type DistributionInstrument = Instrument<Arc<dyn Distribution>>;

/// Everything the host framework collected during one reporting period.
#[derive(Clone)]
pub struct PeriodSnapshot {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub counters: Vec<CounterInstrument>,
    pub gauges: Vec<GaugeInstrument>,
    pub histograms: Vec<DistributionInstrument>,
    pub range_samplers: Vec<DistributionInstrument>,
    pub timers: Vec<DistributionInstrument>,
}

impl PeriodSnapshot {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        PeriodSnapshot {
            from,
            to,
            counters: Vec::new(),
            gauges: Vec::new(),
            histograms: Vec::new(),
            range_samplers: Vec::new(),
            timers: Vec::new(),
        }
    }

    pub fn instrument_count(&self) -> usize {
        self.counters.len()
            + self.gauges.len()
            + self.histograms.len()
            + self.range_samplers.len()
            + self.timers.len()
    }
}
