//! Periodic eviction of expired samples
//!
//! Snapshot reads already filter expired entries; the janitor exists so
//! stale entries are also reclaimed when nothing is scraping.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::data::registry::SampleRegistry;

pub struct Janitor {
    registry: Arc<SampleRegistry>,
    interval: Duration,
}

impl Janitor {
    pub fn new(registry: Arc<SampleRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    pub fn start(self, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it so the first
            // sweep happens one interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        // A dropped sender counts as shutdown too
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let removed = self.registry.evict_expired(Utc::now());
                        if removed > 0 {
                            tracing::debug!(removed, "Evicted expired samples");
                        }
                    }
                }
            }
            tracing::debug!("Janitor shutdown complete");
        })
    }
}
