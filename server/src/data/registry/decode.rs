//! Payload decoding
//!
//! Parses an inbound JSON document of scalar, histogram and summary
//! descriptors into normalized [`StoredSample`]s with an absolute expiry.
//!
//! The parse contract is all-or-nothing: a document that does not match the
//! expected shape, or any descriptor missing its `name`, rejects the whole
//! batch. The one deliberate exception is bucket/quantile keys that fail to
//! parse as floating point; those are dropped from that entry's map only,
//! matching the producer-side format this gateway has always accepted.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::identity::identity;
use super::sample::{Descriptor, SampleValue, StoredSample, ValueKind};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{kind} descriptor with empty name")]
    EmptyName { kind: &'static str },
}

// =============================================================================
// Wire format
// =============================================================================
//
// Field aliases accept the capitalized spellings some producers emit; the
// original gateway's decoder matched JSON fields case-insensitively.

#[derive(Debug, Deserialize)]
struct SampleDocument {
    #[serde(default, alias = "Single")]
    single: Vec<ScalarEntry>,
    #[serde(default, alias = "Histogram")]
    histogram: Vec<HistogramEntry>,
    #[serde(default, alias = "Summary")]
    summary: Vec<SummaryEntry>,
}

#[derive(Debug, Deserialize)]
struct ScalarEntry {
    #[serde(alias = "Name")]
    name: String,
    #[serde(default, alias = "Help")]
    help: String,
    #[serde(default, alias = "Labels")]
    labels: BTreeMap<String, String>,
    #[serde(default, alias = "Expires")]
    expires: i64,
    #[serde(default, alias = "Value")]
    value: f64,
    #[serde(default, alias = "Valuetype", alias = "ValueType")]
    valuetype: String,
}

#[derive(Debug, Deserialize)]
struct HistogramEntry {
    #[serde(alias = "Name")]
    name: String,
    #[serde(default, alias = "Help")]
    help: String,
    #[serde(default, alias = "Labels")]
    labels: BTreeMap<String, String>,
    #[serde(default, alias = "Expires")]
    expires: i64,
    #[serde(default, alias = "Count")]
    count: u64,
    #[serde(default, alias = "Sum")]
    sum: f64,
    #[serde(default, alias = "Buckets")]
    buckets: BTreeMap<String, u64>,
}

#[derive(Debug, Deserialize)]
struct SummaryEntry {
    #[serde(alias = "Name")]
    name: String,
    #[serde(default, alias = "Help")]
    help: String,
    #[serde(default, alias = "Labels")]
    labels: BTreeMap<String, String>,
    #[serde(default, alias = "Expires")]
    expires: i64,
    #[serde(default, alias = "Count")]
    count: u64,
    #[serde(default, alias = "Sum")]
    sum: f64,
    #[serde(default, alias = "Quantiles")]
    quantiles: BTreeMap<String, f64>,
}

// =============================================================================
// Decode
// =============================================================================

/// Decode a payload received at `received_at` into stored samples.
///
/// `expires` on a descriptor is a TTL override in seconds relative to
/// `received_at`; `0` (or absent) selects `default_ttl`.
pub fn decode(
    payload: &[u8],
    received_at: DateTime<Utc>,
    default_ttl: TimeDelta,
) -> Result<Vec<StoredSample>, DecodeError> {
    let doc: SampleDocument = serde_json::from_slice(payload)?;

    let mut samples =
        Vec::with_capacity(doc.single.len() + doc.histogram.len() + doc.summary.len());

    for entry in doc.single {
        require_name(&entry.name, "scalar")?;
        let value = SampleValue::Scalar {
            value: entry.value,
            kind: ValueKind::parse(&entry.valuetype),
        };
        samples.push(build_sample(
            entry.name,
            entry.labels,
            entry.help,
            entry.expires,
            value,
            received_at,
            default_ttl,
        ));
    }

    for entry in doc.histogram {
        require_name(&entry.name, "histogram")?;
        let value = SampleValue::Histogram {
            count: entry.count,
            sum: entry.sum,
            buckets: parse_float_keys(&entry.name, "bucket", entry.buckets),
        };
        samples.push(build_sample(
            entry.name,
            entry.labels,
            entry.help,
            entry.expires,
            value,
            received_at,
            default_ttl,
        ));
    }

    for entry in doc.summary {
        require_name(&entry.name, "summary")?;
        let value = SampleValue::Summary {
            count: entry.count,
            sum: entry.sum,
            quantiles: parse_float_keys(&entry.name, "quantile", entry.quantiles),
        };
        samples.push(build_sample(
            entry.name,
            entry.labels,
            entry.help,
            entry.expires,
            value,
            received_at,
            default_ttl,
        ));
    }

    Ok(samples)
}

fn require_name(name: &str, kind: &'static str) -> Result<(), DecodeError> {
    if name.is_empty() {
        return Err(DecodeError::EmptyName { kind });
    }
    Ok(())
}

fn build_sample(
    name: String,
    labels: BTreeMap<String, String>,
    help: String,
    expires: i64,
    value: SampleValue,
    received_at: DateTime<Utc>,
    default_ttl: TimeDelta,
) -> StoredSample {
    // An out-of-range override clamps rather than failing the batch: a TTL
    // past the calendar horizon never expires, a huge negative one is
    // already expired.
    let ttl = if expires != 0 {
        TimeDelta::try_seconds(expires).unwrap_or(if expires < 0 {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        })
    } else {
        default_ttl
    };
    let expires_at = received_at.checked_add_signed(ttl).unwrap_or(if ttl < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    });

    StoredSample {
        identity: identity(&name, &labels),
        descriptor: Descriptor { name, labels, help },
        value,
        expires_at,
    }
}

/// Parse string-keyed map keys as f64 bounds, dropping keys that fail to
/// parse. A dropped key thins the map for that entry only; it never fails
/// the batch.
fn parse_float_keys<V: Copy>(
    metric: &str,
    key_kind: &'static str,
    raw: BTreeMap<String, V>,
) -> Vec<(f64, V)> {
    let mut out: Vec<(f64, V)> = raw
        .iter()
        .filter_map(|(key, value)| match key.trim().parse::<f64>() {
            Ok(bound) => Some((bound, *value)),
            Err(_) => {
                tracing::debug!(metric, key_kind, key = %key, "Dropping unparseable key");
                None
            }
        })
        .collect();
    out.sort_by(|a, b| a.0.total_cmp(&b.0));
    out
}
