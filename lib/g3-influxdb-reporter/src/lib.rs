/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub mod config;
pub mod delivery;
pub mod types;

mod escape;

mod filter;
pub use filter::TagFilter;

mod precision;
pub use precision::TimestampPrecision;

mod encode;
pub use encode::{EncodedLines, LineProtocolEncoder, encode};

mod reporter;
pub use reporter::{InfluxdbReporter, MetricReporter};
