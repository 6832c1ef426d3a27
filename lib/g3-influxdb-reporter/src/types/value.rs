/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Double(f64),
    Signed(i64),
}

impl MetricValue {
    pub fn display_influxdb(&self) -> DisplayInfluxdbValue<'_> {
        DisplayInfluxdbValue(self)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Signed(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Double(value)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Signed(i) => itoa::Buffer::new().format(*i).fmt(f),
            MetricValue::Double(v) => ryu::Buffer::new().format(*v).fmt(f),
        }
    }
}

pub struct DisplayInfluxdbValue<'a>(&'a MetricValue);

impl fmt::Display for DisplayInfluxdbValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            MetricValue::Signed(i) => {
                itoa::Buffer::new().format(*i).fmt(f)?;
                f.write_char('i')
            }
            MetricValue::Double(v) => ryu::Buffer::new().format(*v).fmt(f),
        }
    }
}
