//! Sample ingestion
//!
//! The pipeline consumes inbound payloads from the samples topic, decodes
//! them and upserts into the registry; the janitor sweeps expired entries
//! on a fixed interval. Both coordinate with the rest of the process only
//! through the shared registry.

mod janitor;
mod pipeline;

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::core::TopicMessage;

pub use janitor::Janitor;
pub use pipeline::IngestPipeline;

/// An inbound payload with its receive timestamp, as handed to the topic
/// by the transport
#[derive(Clone)]
pub struct InboundMessage {
    pub payload: Bytes,
    pub received_at: DateTime<Utc>,
}

impl TopicMessage for InboundMessage {
    fn size_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// Ingestion bookkeeping counters, exposed on the scrape page alongside
/// ordinary samples
#[derive(Default)]
pub struct IngestStats {
    success: AtomicU64,
    failure: AtomicU64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `n` samples stored from a well-formed payload
    pub fn record_success(&self, n: u64) {
        self.success.fetch_add(n, Ordering::Relaxed);
    }

    /// Record one rejected payload
    pub fn record_failure(&self) {
        self.failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn success(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failure(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }
}
