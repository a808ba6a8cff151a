//! Stored sample types
//!
//! Every stored sample carries the shared descriptor fields, exactly one
//! kind-tagged value and an absolute expiry computed at ingestion time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Exposition type of a scalar sample, derived from the producer's
/// `valuetype` string. Unknown or missing kinds fall back to `Untyped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Gauge,
    Counter,
    Untyped,
}

impl ValueKind {
    /// Case-insensitive parse; anything unrecognized is `Untyped`.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "gauge" => ValueKind::Gauge,
            "counter" => ValueKind::Counter,
            _ => ValueKind::Untyped,
        }
    }

    /// Type string used in `# TYPE` exposition lines
    pub fn exposition_type(&self) -> &'static str {
        match self {
            ValueKind::Gauge => "gauge",
            ValueKind::Counter => "counter",
            ValueKind::Untyped => "untyped",
        }
    }
}

/// Common identity and metadata fields shared by every sample kind
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: String,
    /// Sorted label set; a `BTreeMap` so identity and rendering are
    /// independent of producer insertion order
    pub labels: BTreeMap<String, String>,
    pub help: String,
}

/// Kind-tagged sample value
///
/// Bucket and quantile maps are kept as bound-sorted vectors because f64
/// keys are neither `Ord` nor `Hash`; sorted order also makes exposition
/// output deterministic.
#[derive(Debug, Clone)]
pub enum SampleValue {
    Scalar {
        value: f64,
        kind: ValueKind,
    },
    Histogram {
        count: u64,
        sum: f64,
        /// Upper bound to cumulative count, ascending by bound
        buckets: Vec<(f64, u64)>,
    },
    Summary {
        count: u64,
        sum: f64,
        /// Quantile to observed value, ascending by quantile
        quantiles: Vec<(f64, f64)>,
    },
}

/// A registry entry: descriptor, value and absolute expiry
#[derive(Debug, Clone)]
pub struct StoredSample {
    /// Deterministic storage key derived from name + sorted labels
    pub identity: String,
    pub descriptor: Descriptor,
    pub value: SampleValue,
    pub expires_at: DateTime<Utc>,
}
