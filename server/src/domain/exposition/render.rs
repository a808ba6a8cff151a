//! Prometheus text exposition (format 0.0.4)
//!
//! Renders an expiry-filtered snapshot plus the two gateway bookkeeping
//! counters. Input order is preserved; callers pass the identity-sorted
//! snapshot so output is deterministic.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::data::registry::{SampleValue, StoredSample};
use crate::domain::ingest::IngestStats;

/// Render the full scrape page for a snapshot
pub fn render_exposition(samples: &[StoredSample], stats: &IngestStats) -> String {
    let mut out = String::with_capacity(256 + samples.len() * 128);

    out.push_str("# HELP promgate_ingest_success samples stored from well-formed payloads\n");
    out.push_str("# TYPE promgate_ingest_success counter\n");
    let _ = writeln!(out, "promgate_ingest_success {}", stats.success());

    out.push_str("# HELP promgate_ingest_failed payloads rejected by the decoder\n");
    out.push_str("# TYPE promgate_ingest_failed counter\n");
    let _ = writeln!(out, "promgate_ingest_failed {}", stats.failure());

    for sample in samples {
        write_sample(&mut out, sample);
    }

    out
}

fn write_sample(out: &mut String, sample: &StoredSample) {
    let name = &sample.descriptor.name;
    let labels = &sample.descriptor.labels;

    if !sample.descriptor.help.is_empty() {
        let _ = writeln!(
            out,
            "# HELP {} {}",
            name,
            escape_help(&sample.descriptor.help)
        );
    }

    match &sample.value {
        SampleValue::Scalar { value, kind } => {
            let _ = writeln!(out, "# TYPE {} {}", name, kind.exposition_type());
            let _ = writeln!(out, "{}{} {}", name, format_labels(labels, None), value);
        }
        SampleValue::Histogram {
            count,
            sum,
            buckets,
        } => {
            let _ = writeln!(out, "# TYPE {} histogram", name);
            for (bound, cumulative) in buckets {
                let _ = writeln!(
                    out,
                    "{}_bucket{} {}",
                    name,
                    format_labels(labels, Some(("le", &bound.to_string()))),
                    cumulative
                );
            }
            let _ = writeln!(
                out,
                "{}_bucket{} {}",
                name,
                format_labels(labels, Some(("le", "+Inf"))),
                count
            );
            let _ = writeln!(out, "{}_sum{} {}", name, format_labels(labels, None), sum);
            let _ = writeln!(
                out,
                "{}_count{} {}",
                name,
                format_labels(labels, None),
                count
            );
        }
        SampleValue::Summary {
            count,
            sum,
            quantiles,
        } => {
            let _ = writeln!(out, "# TYPE {} summary", name);
            for (quantile, value) in quantiles {
                let _ = writeln!(
                    out,
                    "{}{} {}",
                    name,
                    format_labels(labels, Some(("quantile", &quantile.to_string()))),
                    value
                );
            }
            let _ = writeln!(out, "{}_sum{} {}", name, format_labels(labels, None), sum);
            let _ = writeln!(
                out,
                "{}_count{} {}",
                name,
                format_labels(labels, None),
                count
            );
        }
    }
}

/// Format a label set, optionally with one extra pair (`le`/`quantile`)
/// appended after the sample's own labels
fn format_labels(labels: &BTreeMap<String, String>, extra: Option<(&str, &str)>) -> String {
    if labels.is_empty() && extra.is_none() {
        return String::new();
    }

    let mut out = String::from("{");
    let mut first = true;
    for (label, value) in labels {
        if !first {
            out.push(',');
        }
        let _ = write!(out, "{}=\"{}\"", label, escape_label_value(value));
        first = false;
    }
    if let Some((label, value)) = extra {
        if !first {
            out.push(',');
        }
        let _ = write!(out, "{}=\"{}\"", label, escape_label_value(value));
    }
    out.push('}');
    out
}

fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

fn escape_help(help: &str) -> String {
    let mut out = String::with_capacity(help.len());
    for c in help.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::registry::{Descriptor, ValueKind, identity};
    use chrono::{TimeDelta, Utc};

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample(
        name: &str,
        labels: BTreeMap<String, String>,
        help: &str,
        value: SampleValue,
    ) -> StoredSample {
        StoredSample {
            identity: identity(name, &labels),
            descriptor: Descriptor {
                name: name.to_string(),
                labels,
                help: help.to_string(),
            },
            value,
            expires_at: Utc::now() + TimeDelta::seconds(90),
        }
    }

    #[test]
    fn test_counters_always_present() {
        let stats = IngestStats::new();
        stats.record_success(4);
        stats.record_failure();

        let page = render_exposition(&[], &stats);
        assert!(page.contains("# TYPE promgate_ingest_success counter"));
        assert!(page.contains("promgate_ingest_success 4\n"));
        assert!(page.contains("promgate_ingest_failed 1\n"));
    }

    #[test]
    fn test_scalar_rendering() {
        let s = sample(
            "counter1",
            labels(&[("role", "barista")]),
            "a counter that counts stuff",
            SampleValue::Scalar {
                value: 10000.0,
                kind: ValueKind::Counter,
            },
        );

        let page = render_exposition(&[s], &IngestStats::new());
        assert!(page.contains("# HELP counter1 a counter that counts stuff\n"));
        assert!(page.contains("# TYPE counter1 counter\n"));
        assert!(page.contains("counter1{role=\"barista\"} 10000\n"));
    }

    #[test]
    fn test_scalar_without_help_or_labels() {
        let s = sample(
            "g",
            BTreeMap::new(),
            "",
            SampleValue::Scalar {
                value: 1.5,
                kind: ValueKind::Gauge,
            },
        );

        let page = render_exposition(&[s], &IngestStats::new());
        assert!(!page.contains("# HELP g"));
        assert!(page.contains("# TYPE g gauge\n"));
        assert!(page.contains("g 1.5\n"));
    }

    #[test]
    fn test_histogram_rendering() {
        let s = sample(
            "h1",
            labels(&[("period", "20th century")]),
            "history of stuff",
            SampleValue::Histogram {
                count: 12,
                sum: 100.0,
                buckets: vec![(0.5, 3), (100.0, 12)],
            },
        );

        let page = render_exposition(&[s], &IngestStats::new());
        assert!(page.contains("# TYPE h1 histogram\n"));
        assert!(page.contains("h1_bucket{period=\"20th century\",le=\"0.5\"} 3\n"));
        assert!(page.contains("h1_bucket{period=\"20th century\",le=\"100\"} 12\n"));
        assert!(page.contains("h1_bucket{period=\"20th century\",le=\"+Inf\"} 12\n"));
        assert!(page.contains("h1_sum{period=\"20th century\"} 100\n"));
        assert!(page.contains("h1_count{period=\"20th century\"} 12\n"));
    }

    #[test]
    fn test_summary_rendering() {
        let s = sample(
            "summary1",
            BTreeMap::new(),
            "summary of stuff",
            SampleValue::Summary {
                count: 2,
                sum: 100.0,
                quantiles: vec![(0.5, 80.2), (0.9, 20.3)],
            },
        );

        let page = render_exposition(&[s], &IngestStats::new());
        assert!(page.contains("# TYPE summary1 summary\n"));
        assert!(page.contains("summary1{quantile=\"0.5\"} 80.2\n"));
        assert!(page.contains("summary1{quantile=\"0.9\"} 20.3\n"));
        assert!(page.contains("summary1_sum 100\n"));
        assert!(page.contains("summary1_count 2\n"));
    }

    #[test]
    fn test_label_value_escaping() {
        let s = sample(
            "m",
            labels(&[("path", "a\"b\\c")]),
            "",
            SampleValue::Scalar {
                value: 1.0,
                kind: ValueKind::Untyped,
            },
        );

        let page = render_exposition(&[s], &IngestStats::new());
        assert!(page.contains("m{path=\"a\\\"b\\\\c\"} 1\n"));
    }
}
