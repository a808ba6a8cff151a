//! Expiring sample registry
//!
//! Concurrency-safe store mapping sample identity to the most recently
//! ingested value. Writers (upsert, eviction) take the lock exclusively;
//! snapshot readers hold the shared lock only long enough to copy entries
//! out, so exposition rendering never runs under the lock.

mod decode;
mod identity;
mod sample;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

pub use decode::{DecodeError, decode};
pub use identity::identity;
pub use sample::{Descriptor, SampleValue, StoredSample, ValueKind};

/// Identity-keyed store of live samples
#[derive(Default)]
pub struct SampleRegistry {
    samples: RwLock<HashMap<String, StoredSample>>,
}

impl SampleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace each sample by identity (last-write-wins).
    ///
    /// Each entry replacement is atomic with respect to readers; the batch
    /// as a whole holds the write lock once, so a concurrent snapshot sees
    /// either none or all of it.
    pub fn upsert(&self, batch: Vec<StoredSample>) {
        let mut samples = self.samples.write();
        for sample in batch {
            samples.insert(sample.identity.clone(), sample);
        }
    }

    /// Copy out every entry still live at `now`, sorted by identity.
    ///
    /// An entry whose `expires_at` equals `now` is already stale and is
    /// excluded. Expired entries are left in place for the janitor.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Vec<StoredSample> {
        let mut live: Vec<StoredSample> = {
            let samples = self.samples.read();
            samples.values().cloned().collect()
        };
        live.retain(|s| s.expires_at > now);
        live.sort_by(|a, b| a.identity.cmp(&b.identity));
        live
    }

    /// Delete every entry with `expires_at <= now`; returns the number
    /// removed.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut samples = self.samples.write();
        let before = samples.len();
        samples.retain(|_, s| s.expires_at > now);
        before - samples.len()
    }

    /// Number of entries currently stored, including expired ones the
    /// janitor has not yet swept.
    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::collections::BTreeMap;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn scalar(name: &str, value: f64, expires_at: DateTime<Utc>) -> StoredSample {
        let labels = BTreeMap::new();
        StoredSample {
            identity: identity(name, &labels),
            descriptor: Descriptor {
                name: name.to_string(),
                labels,
                help: String::new(),
            },
            value: SampleValue::Scalar {
                value,
                kind: ValueKind::Gauge,
            },
            expires_at,
        }
    }

    #[test]
    fn test_upsert_then_snapshot() {
        let registry = SampleRegistry::new();
        registry.upsert(vec![
            scalar("b", 2.0, t0() + TimeDelta::seconds(90)),
            scalar("a", 1.0, t0() + TimeDelta::seconds(90)),
        ]);

        let snap = registry.snapshot(t0());
        assert_eq!(snap.len(), 2);
        // Sorted by identity
        assert_eq!(snap[0].descriptor.name, "a");
        assert_eq!(snap[1].descriptor.name, "b");
    }

    #[test]
    fn test_snapshot_excludes_at_exact_expiry() {
        let registry = SampleRegistry::new();
        let expires = t0() + TimeDelta::seconds(90);
        registry.upsert(vec![scalar("g", 1.0, expires)]);

        assert_eq!(registry.snapshot(expires - TimeDelta::seconds(1)).len(), 1);
        // Equality excludes
        assert!(registry.snapshot(expires).is_empty());
        assert!(registry.snapshot(expires + TimeDelta::seconds(1)).is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let registry = SampleRegistry::new();
        registry.upsert(vec![scalar("g", 1.0, t0() + TimeDelta::seconds(90))]);
        registry.upsert(vec![scalar("g", 2.0, t0() + TimeDelta::seconds(300))]);

        assert_eq!(registry.len(), 1);
        let snap = registry.snapshot(t0());
        match snap[0].value {
            SampleValue::Scalar { value, .. } => assert_eq!(value, 2.0),
            _ => panic!("expected scalar"),
        }
        // Expiry was reset along with the value
        assert_eq!(snap[0].expires_at, t0() + TimeDelta::seconds(300));
    }

    #[test]
    fn test_reingest_resurrects_expired_identity() {
        let registry = SampleRegistry::new();
        registry.upsert(vec![scalar("g", 1.0, t0() - TimeDelta::seconds(1))]);
        assert!(registry.snapshot(t0()).is_empty());

        registry.upsert(vec![scalar("g", 5.0, t0() + TimeDelta::seconds(60))]);
        assert_eq!(registry.snapshot(t0()).len(), 1);
    }

    #[test]
    fn test_evict_expired_removes_exactly_stale() {
        let registry = SampleRegistry::new();
        registry.upsert(vec![
            scalar("stale", 1.0, t0()),
            scalar("older", 1.0, t0() - TimeDelta::seconds(10)),
            scalar("live", 1.0, t0() + TimeDelta::seconds(10)),
        ]);

        assert_eq!(registry.evict_expired(t0()), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot(t0())[0].descriptor.name, "live");
    }

    #[test]
    fn test_evict_expired_idempotent() {
        let registry = SampleRegistry::new();
        registry.upsert(vec![scalar("stale", 1.0, t0())]);

        assert_eq!(registry.evict_expired(t0()), 1);
        assert_eq!(registry.evict_expired(t0()), 0);
    }

    #[test]
    fn test_decode_upsert_snapshot_round_trip() {
        let registry = SampleRegistry::new();
        let payload = br#"{"single":[{"name":"counter1","value":10000,"valuetype":"counter","help":"h","labels":{"role":"barista"}}]}"#;
        let batch = decode(payload, t0(), TimeDelta::seconds(90)).unwrap();
        registry.upsert(batch);

        // Still live one second before expiry
        let snap = registry.snapshot(t0() + TimeDelta::seconds(89));
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].identity, "counter1{role=\"barista\"}");
        match snap[0].value {
            SampleValue::Scalar { value, kind } => {
                assert_eq!(value, 10000.0);
                assert_eq!(kind, ValueKind::Counter);
            }
            _ => panic!("expected scalar"),
        }

        // Gone one second after expiry
        assert!(registry.snapshot(t0() + TimeDelta::seconds(91)).is_empty());
    }

    #[test]
    fn test_snapshot_leaves_expired_in_place() {
        let registry = SampleRegistry::new();
        registry.upsert(vec![scalar("stale", 1.0, t0() - TimeDelta::seconds(1))]);

        assert!(registry.snapshot(t0()).is_empty());
        // The snapshot filtered but did not delete
        assert_eq!(registry.len(), 1);
    }
}
