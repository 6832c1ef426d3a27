/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::Write;

use itoa::Buffer;

use crate::config::Settings;
use crate::escape;
use crate::types::{Distribution, Instrument, MetricTagMap, MetricValue, PeriodSnapshot};

#[derive(Clone, Copy)]
enum RecordValue<'a> {
    Counter(i64),
    Gauge(f64),
    Distribution(&'a dyn Distribution),
}

/// Builds the InfluxDB line protocol payload of one reporting period.
///
/// Records are emitted in the order counters, gauges, histograms, range
/// samplers, timers. Within a record the tags are sorted by key.
pub struct LineProtocolEncoder<'a> {
    settings: &'a Settings,
    timestamp: i128,
    buf: Vec<u8>,
    lines: usize,
    tag_buf: MetricTagMap,
}

impl<'a> LineProtocolEncoder<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        LineProtocolEncoder {
            settings,
            timestamp: 0,
            buf: Vec::new(),
            lines: 0,
            tag_buf: MetricTagMap::default(),
        }
    }

    pub fn encode(mut self, snapshot: &PeriodSnapshot) -> EncodedLines {
        self.timestamp = self.settings.precision.timestamp(&snapshot.to);
        self.buf.reserve(snapshot.instrument_count() * 64);

        for c in &snapshot.counters {
            self.emit(c, RecordValue::Counter(c.value));
        }
        for g in &snapshot.gauges {
            self.emit(g, RecordValue::Gauge(g.value));
        }
        for group in [
            &snapshot.histograms,
            &snapshot.range_samplers,
            &snapshot.timers,
        ] {
            for d in group {
                self.emit(d, RecordValue::Distribution(d.value.as_ref()));
            }
        }
        EncodedLines {
            lines: self.lines,
            buf: self.buf,
        }
    }

    fn emit<T>(&mut self, instrument: &Instrument<T>, value: RecordValue<'_>) {
        match value {
            RecordValue::Distribution(d)
                if d.count() == 0 && !self.settings.post_empty_distributions =>
            {
                log::trace!("skip empty distribution {}", instrument.name);
                return;
            }
            // influxdb has no representation for nan and inf
            RecordValue::Gauge(v) if !v.is_finite() => {
                log::trace!("skip non-finite gauge {} value {v}", instrument.name);
                return;
            }
            _ => {}
        }

        self.serialize_name_tags(&instrument.name, &instrument.tags);
        match value {
            RecordValue::Counter(v) => self.serialize_counter(v),
            RecordValue::Gauge(v) => self.serialize_gauge(v),
            RecordValue::Distribution(d) => self.serialize_distribution(d),
        }
        self.serialize_timestamp();
        self.buf.push(b'\n');
        self.lines += 1;
    }

    fn serialize_name_tags(&mut self, name: &str, tags: &MetricTagMap) {
        let settings = self.settings;
        let _ = write!(&mut self.buf, "{}", escape::measurement(name));

        if settings.additional_tags.is_empty() {
            let _ = write!(
                &mut self.buf,
                "{}",
                tags.display_influxdb(&settings.tag_filter)
            );
        } else {
            self.tag_buf.clone_from(tags);
            self.tag_buf.extend(&settings.additional_tags);
            let _ = write!(
                &mut self.buf,
                "{}",
                self.tag_buf.display_influxdb(&settings.tag_filter)
            );
        }
        self.buf.push(b' ');
    }

    fn serialize_counter(&mut self, value: i64) {
        let _ = write!(
            &mut self.buf,
            "count={}",
            MetricValue::Signed(value).display_influxdb()
        );
    }

    fn serialize_gauge(&mut self, value: f64) {
        let _ = write!(
            &mut self.buf,
            "value={}",
            MetricValue::Double(value).display_influxdb()
        );
    }

    fn serialize_distribution(&mut self, d: &dyn Distribution) {
        let _ = write!(
            &mut self.buf,
            "count={},sum={},min={}",
            MetricValue::Signed(d.count()).display_influxdb(),
            MetricValue::Signed(d.sum()).display_influxdb(),
            MetricValue::Signed(d.min()).display_influxdb(),
        );
        for p in &self.settings.percentiles {
            let _ = write!(
                &mut self.buf,
                ",p{}={}",
                MetricValue::Double(*p),
                MetricValue::Double(d.percentile(*p)).display_influxdb()
            );
        }
        let _ = write!(
            &mut self.buf,
            ",max={}",
            MetricValue::Signed(d.max()).display_influxdb()
        );
    }

    fn serialize_timestamp(&mut self) {
        let mut ts_buffer = Buffer::new();
        let ts = ts_buffer.format(self.timestamp);
        self.buf.push(b' ');
        self.buf.extend_from_slice(ts.as_bytes());
    }
}

/// Encoded payload and the number of records in it.
pub struct EncodedLines {
    lines: usize,
    buf: Vec<u8>,
}

impl EncodedLines {
    #[inline]
    pub fn lines(&self) -> usize {
        self.lines
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode the whole snapshot.
pub fn encode(snapshot: &PeriodSnapshot, settings: &Settings) -> EncodedLines {
    LineProtocolEncoder::new(settings).encode(snapshot)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use hdrhistogram::Histogram;

    use super::*;
    use crate::config::test_util::local_settings;
    use crate::filter::TagFilter;
    use crate::precision::TimestampPrecision;
    use crate::types::{CounterInstrument, DistributionInstrument, GaugeInstrument};

    struct FixedDistribution {
        count: i64,
        sum: i64,
        min: i64,
        max: i64,
    }

    impl Distribution for FixedDistribution {
        fn count(&self) -> i64 {
            self.count
        }

        fn sum(&self) -> i64 {
            self.sum
        }

        fn min(&self) -> i64 {
            self.min
        }

        fn max(&self) -> i64 {
            self.max
        }

        fn percentile(&self, percentile: f64) -> f64 {
            percentile * 2.0
        }
    }

    fn snapshot(secs: i64, nanos: u32) -> PeriodSnapshot {
        let to = DateTime::from_timestamp(secs, nanos).unwrap();
        let from = DateTime::<Utc>::from_timestamp(secs - 60, 0).unwrap();
        PeriodSnapshot::new(from, to)
    }

    fn to_string(snapshot: &PeriodSnapshot, settings: &Settings) -> String {
        String::from_utf8(encode(snapshot, settings).into_bytes()).unwrap()
    }

    fn fixed(count: i64) -> Arc<dyn Distribution> {
        Arc::new(FixedDistribution {
            count,
            sum: 30,
            min: 1,
            max: 20,
        })
    }

    #[test]
    fn counter_no_tags() {
        let settings = local_settings(TimestampPrecision::Seconds);
        let mut s = snapshot(1000, 0);
        s.counters.push(CounterInstrument::new("requests", 42));
        assert_eq!(to_string(&s, &settings), "requests count=42i 1000\n");
    }

    #[test]
    fn counter_with_additional_tags() {
        let mut settings = local_settings(TimestampPrecision::Seconds);
        settings.additional_tags = MetricTagMap::from_iter([("host", "a1")]);
        let mut s = snapshot(1000, 0);
        s.counters
            .push(CounterInstrument::new("requests", 42).with_tag("env", "prod"));
        assert_eq!(
            to_string(&s, &settings),
            "requests,env=prod,host=a1 count=42i 1000\n"
        );
    }

    #[test]
    fn additional_tags_override() {
        let mut settings = local_settings(TimestampPrecision::Seconds);
        settings.additional_tags = MetricTagMap::from_iter([("host", "a1")]);
        let mut s = snapshot(1000, 0);
        s.gauges
            .push(GaugeInstrument::new("load", 0.5).with_tag("host", "other"));
        assert_eq!(to_string(&s, &settings), "load,host=a1 value=0.5 1000\n");
    }

    #[test]
    fn gauge() {
        let settings = local_settings(TimestampPrecision::Seconds);
        let mut s = snapshot(1000, 0);
        s.gauges.push(GaugeInstrument::new("temperature", 21.0));
        s.gauges.push(GaugeInstrument::new("ratio", -0.125));
        assert_eq!(
            to_string(&s, &settings),
            "temperature value=21.0 1000\nratio value=-0.125 1000\n"
        );
    }

    #[test]
    fn non_finite_gauge_skipped() {
        let settings = local_settings(TimestampPrecision::Seconds);
        let mut s = snapshot(1000, 0);
        s.gauges.push(GaugeInstrument::new("nan", f64::NAN));
        s.gauges.push(GaugeInstrument::new("ok", 2.5));
        s.gauges.push(GaugeInstrument::new("inf", f64::INFINITY));
        s.gauges.push(GaugeInstrument::new("neg_inf", f64::NEG_INFINITY));
        let encoded = encode(&s, &settings);
        assert_eq!(encoded.lines(), 1);
        assert_eq!(encoded.as_bytes(), b"ok value=2.5 1000\n");
    }

    #[test]
    fn distribution_fields() {
        let settings = local_settings(TimestampPrecision::Seconds);
        let mut s = snapshot(1000, 0);
        s.histograms
            .push(DistributionInstrument::new("latency", fixed(3)).with_tag("op", "get"));
        assert_eq!(
            to_string(&s, &settings),
            "latency,op=get count=3i,sum=30i,min=1i,p50.0=100.0,p95.0=190.0,max=20i 1000\n"
        );
    }

    #[test]
    fn percentile_order_follows_config() {
        let mut settings = local_settings(TimestampPrecision::Seconds);
        settings.percentiles = vec![99.9, 0.5, 70.0];
        let mut s = snapshot(1000, 0);
        s.timers.push(DistributionInstrument::new("t", fixed(1)));
        assert_eq!(
            to_string(&s, &settings),
            "t count=1i,sum=30i,min=1i,p99.9=199.8,p0.5=1.0,p70.0=140.0,max=20i 1000\n"
        );
    }

    #[test]
    fn hdr_histogram() {
        let settings = local_settings(TimestampPrecision::Seconds);
        let mut h = Histogram::<u64>::new(3).unwrap();
        for v in 1..=100 {
            h.record(v).unwrap();
        }
        let mut s = snapshot(1000, 0);
        s.range_samplers
            .push(DistributionInstrument::new("queue", Arc::new(h)));
        assert_eq!(
            to_string(&s, &settings),
            "queue count=100i,sum=5050i,min=1i,p50.0=50.0,p95.0=95.0,max=100i 1000\n"
        );
    }

    #[test]
    fn empty_distribution_skipped() {
        let settings = local_settings(TimestampPrecision::Seconds);
        let mut s = snapshot(1000, 0);
        s.histograms.push(DistributionInstrument::new("h", fixed(0)));
        s.range_samplers
            .push(DistributionInstrument::new("r", Arc::new(Histogram::<u64>::new(3).unwrap())));
        s.timers.push(DistributionInstrument::new("t", fixed(0)));
        let encoded = encode(&s, &settings);
        assert!(encoded.is_empty());
        assert_eq!(encoded.lines(), 0);
        assert!(encoded.as_bytes().is_empty());
    }

    #[test]
    fn empty_distribution_posted_on_demand() {
        let mut settings = local_settings(TimestampPrecision::Seconds);
        settings.post_empty_distributions = true;
        let mut s = snapshot(1000, 0);
        s.histograms.push(DistributionInstrument::new("h", fixed(0)));
        assert_eq!(
            to_string(&s, &settings),
            "h count=0i,sum=30i,min=1i,p50.0=100.0,p95.0=190.0,max=20i 1000\n"
        );
    }

    #[test]
    fn kind_order() {
        let settings = local_settings(TimestampPrecision::Seconds);
        let mut s = snapshot(7, 0);
        s.timers.push(DistributionInstrument::new("timer", fixed(1)));
        s.range_samplers
            .push(DistributionInstrument::new("sampler", fixed(1)));
        s.histograms.push(DistributionInstrument::new("histo", fixed(1)));
        s.gauges.push(GaugeInstrument::new("gauge", 1.0));
        s.counters.push(CounterInstrument::new("c2", 2));
        s.counters.push(CounterInstrument::new("c1", 1));
        let encoded = encode(&s, &settings);
        assert_eq!(encoded.lines(), 6);
        let text = String::from_utf8(encoded.into_bytes()).unwrap();
        let names: Vec<&str> = text
            .lines()
            .map(|l| l.split(' ').next().unwrap())
            .collect();
        assert_eq!(names, vec!["c2", "c1", "gauge", "histo", "sampler", "timer"]);
    }

    #[test]
    fn escaping() {
        let settings = local_settings(TimestampPrecision::Seconds);
        let mut s = snapshot(1, 0);
        s.counters.push(
            CounterInstrument::new("http requests,total", 1).with_tag("path key", "/a=b,c d"),
        );
        assert_eq!(
            to_string(&s, &settings),
            "http\\ requests\\,total,path\\ key=/a\\=b\\,c\\ d count=1i 1\n"
        );
    }

    #[test]
    fn filtered_tags() {
        let mut settings = local_settings(TimestampPrecision::Seconds);
        settings.tag_filter = TagFilter::new(&["**"], &["secret", "host"]).unwrap();
        settings.additional_tags = MetricTagMap::from_iter([("host", "a1")]);
        let mut s = snapshot(1, 0);
        s.counters.push(
            CounterInstrument::new("c", 1)
                .with_tag("secret", "x")
                .with_tag("env", "prod"),
        );
        s.counters
            .push(CounterInstrument::new("d", 2).with_tag("secret", "x"));
        assert_eq!(to_string(&s, &settings), "c,env=prod count=1i 1\nd count=2i 1\n");
    }

    #[test]
    fn timestamp_precision() {
        let cases = [
            (TimestampPrecision::Seconds, "1"),
            (TimestampPrecision::MilliSeconds, "1500"),
            (TimestampPrecision::MicroSeconds, "1500000"),
            (TimestampPrecision::NanoSeconds, "1500000000"),
        ];
        for (precision, ts) in cases {
            let settings = local_settings(precision);
            let mut s = snapshot(1, 500_000_000);
            s.counters.push(CounterInstrument::new("c", 1));
            assert_eq!(to_string(&s, &settings), format!("c count=1i {ts}\n"));
        }
    }

    #[test]
    fn empty_snapshot() {
        let settings = local_settings(TimestampPrecision::NanoSeconds);
        let s = snapshot(1, 0);
        assert!(encode(&s, &settings).is_empty());
    }
}
