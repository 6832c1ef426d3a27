/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::{self, Write};

/// Display wrapper for a measurement name.
///
/// Only space and comma are escaped, as required by the line protocol.
pub struct DisplayMeasurement<'a>(&'a str);

/// Display wrapper for tag keys, tag values and field keys.
///
/// Space, comma and equal sign are escaped.
pub struct DisplayKey<'a>(&'a str);

#[inline]
pub fn measurement(name: &str) -> DisplayMeasurement<'_> {
    DisplayMeasurement(name)
}

#[inline]
pub fn key(s: &str) -> DisplayKey<'_> {
    DisplayKey(s)
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str, special: &[char]) -> fmt::Result {
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if special.contains(&c) {
            f.write_str(&s[start..i])?;
            f.write_char('\\')?;
            f.write_char(c)?;
            start = i + c.len_utf8();
        }
    }
    f.write_str(&s[start..])
}

impl fmt::Display for DisplayMeasurement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, self.0, &[' ', ','])
    }
}

impl fmt::Display for DisplayKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, self.0, &[' ', '=', ','])
    }
}
