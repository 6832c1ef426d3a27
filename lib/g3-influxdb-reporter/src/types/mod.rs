/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod tag;
pub use tag::{DisplayInfluxdbTags, MetricTagMap};

mod value;
pub use value::{DisplayInfluxdbValue, MetricValue};

mod snapshot;
pub use snapshot::{
    CounterInstrument, Distribution, DistributionInstrument, GaugeInstrument, Instrument,
    PeriodSnapshot,
};
