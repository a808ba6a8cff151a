//! Ingestion pipeline
//!
//! Subscribes to the samples topic, decodes payloads and upserts into the
//! registry. Decode and counter bookkeeping happen here, not in the
//! registry or the transport.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{InboundMessage, IngestStats};
use crate::core::{Topic, TopicError};
use crate::data::registry::{SampleRegistry, decode};

pub struct IngestPipeline {
    registry: Arc<SampleRegistry>,
    stats: Arc<IngestStats>,
    default_ttl: TimeDelta,
}

impl IngestPipeline {
    pub fn new(
        registry: Arc<SampleRegistry>,
        stats: Arc<IngestStats>,
        default_ttl: TimeDelta,
    ) -> Self {
        Self {
            registry,
            stats,
            default_ttl,
        }
    }

    pub fn start(
        self,
        topic: &Topic<InboundMessage>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let mut subscriber = topic.subscribe();

        tokio::spawn(async move {
            let mut shutdown_requested = false;

            loop {
                if shutdown_requested {
                    // Drain remaining messages before shutdown
                    match tokio::time::timeout(Duration::from_millis(100), subscriber.recv()).await
                    {
                        Ok(Ok(msg)) => {
                            self.run(&msg);
                            continue;
                        }
                        Ok(Err(TopicError::Lagged(n))) => {
                            tracing::warn!(lagged = n, "IngestPipeline lagged during drain");
                            continue;
                        }
                        _ => break,
                    }
                }

                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        // A dropped sender counts as shutdown too
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::debug!("IngestPipeline received shutdown, draining...");
                            shutdown_requested = true;
                        }
                    }
                    result = subscriber.recv() => {
                        match result {
                            Ok(msg) => self.run(&msg),
                            Err(TopicError::Lagged(n)) => {
                                tracing::warn!(lagged = n, "IngestPipeline lagged");
                            }
                            Err(_) => break,
                        }
                    }
                }
            }
            tracing::debug!("IngestPipeline shutdown complete");
        })
    }

    fn run(&self, msg: &InboundMessage) {
        match decode(&msg.payload, msg.received_at, self.default_ttl) {
            Ok(batch) => {
                let count = batch.len() as u64;
                self.registry.upsert(batch);
                self.stats.record_success(count);
                tracing::trace!(samples = count, "Ingested batch");
            }
            Err(e) => {
                self.stats.record_failure();
                tracing::warn!(error = %e, "Rejected payload");
            }
        }
    }
}
