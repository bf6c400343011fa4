//! The suppression decision engine.
//!
//! Decides, per fingerprint, whether a new notification is allowed right now,
//! and records snooze/mute decisions. The engine owns the persistent store
//! and a set of sharded per-fingerprint locks; its concurrency contract is
//! explicit rather than ambient:
//!
//! - A dispatcher must hold [`SuppressionEngine::lock`] for the fingerprint
//!   across its whole read-decide-send-write sequence. Two concurrent
//!   dispatches of the same alert otherwise both observe "unset" and both
//!   deliver before either records a snooze.
//! - Callback-driven writes for a fingerprint take the same lock, so a human
//!   pressing "mute" cannot lose to an in-flight dispatch about to record a
//!   snooze for the same alert.
//!
//! Locks are sharded by the fingerprint's first byte; unrelated alerts in
//! different shards proceed concurrently.

use std::time::Duration;

use chrono::{DateTime, Duration as TimeDelta, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::record::SuppressionState;
use crate::store::SuppressionStore;

/// Number of lock shards. Collisions only cost serialization, never
/// correctness.
const LOCK_SHARDS: usize = 64;

/// Per-fingerprint suppression state machine over a persistent store.
pub struct SuppressionEngine {
    store: SuppressionStore,
    locks: Vec<Mutex<()>>,
}

impl SuppressionEngine {
    /// Creates an engine owning the given store.
    #[must_use]
    pub fn new(store: SuppressionStore) -> Self {
        Self {
            store,
            locks: (0..LOCK_SHARDS).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Acquires the lock shard guarding this fingerprint.
    ///
    /// Hold the returned guard across any read-decide-write sequence that
    /// must be atomic with respect to other writers of the same alert.
    pub async fn lock(&self, fp: &Fingerprint) -> MutexGuard<'_, ()> {
        self.locks[usize::from(fp.as_bytes()[0]) % LOCK_SHARDS]
            .lock()
            .await
    }

    /// Returns whether a notification for this fingerprint may be sent now.
    ///
    /// Side-effect-free: no record or an expired snooze allows sending; an
    /// active snooze or a mute suppresses.
    ///
    /// # Errors
    ///
    /// Propagates store read failures and corrupt-record errors; a corrupt
    /// record fails the call instead of defaulting to either decision.
    pub fn should_send(&self, fp: &Fingerprint) -> Result<bool> {
        self.should_send_at(fp, Utc::now())
    }

    /// Clock-injected form of [`should_send`](Self::should_send).
    ///
    /// The snooze boundary resolves to "send allowed": at `now == until` the
    /// alert may fire again.
    pub fn should_send_at(&self, fp: &Fingerprint, now: DateTime<Utc>) -> Result<bool> {
        match self.store.get(fp)? {
            None => Ok(true),
            Some(SuppressionState::Snoozed { until }) => Ok(now >= until),
            Some(SuppressionState::Muted) => Ok(false),
        }
    }

    /// Records a snooze expiring `duration` from now, overwriting any prior
    /// state including a mute.
    ///
    /// # Errors
    ///
    /// Propagates store write failures.
    pub fn record_snooze(&self, fp: &Fingerprint, duration: Duration) -> Result<()> {
        let span = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        let until = Utc::now()
            .checked_add_signed(span)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.store.set(fp, &SuppressionState::Snoozed { until })?;
        debug!(fingerprint = %fp, until = %until, "snooze recorded");
        Ok(())
    }

    /// Records an indefinite mute, overwriting any prior state including an
    /// active snooze.
    ///
    /// # Errors
    ///
    /// Propagates store write failures.
    pub fn record_mute(&self, fp: &Fingerprint) -> Result<()> {
        self.store.set(fp, &SuppressionState::Muted)?;
        info!(fingerprint = %fp, "alert muted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn engine_in(dir: &tempfile::TempDir) -> SuppressionEngine {
        SuppressionEngine::new(SuppressionStore::open(dir.path()).unwrap())
    }

    fn fp(key: &str) -> Fingerprint {
        Fingerprint::of(key).unwrap()
    }

    #[test]
    fn unset_fingerprint_allows_send() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);
        assert!(engine.should_send(&fp("fresh")).unwrap());
    }

    #[test]
    fn active_snooze_suppresses() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);
        let fp = fp("snoozed");

        engine
            .record_snooze(&fp, Duration::from_secs(3600))
            .unwrap();
        assert!(!engine.should_send(&fp).unwrap());
    }

    #[tokio::test]
    async fn snooze_expires_over_time() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);
        let fp = fp("short-snooze");

        engine.record_snooze(&fp, Duration::from_millis(20)).unwrap();
        assert!(!engine.should_send(&fp).unwrap());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(engine.should_send(&fp).unwrap());
    }

    #[test]
    fn snooze_boundary_allows_send() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);
        let fp = fp("boundary");
        let until = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        engine
            .store
            .set(&fp, &SuppressionState::Snoozed { until })
            .unwrap();

        assert!(!engine
            .should_send_at(&fp, until - TimeDelta::milliseconds(1))
            .unwrap());
        // now == until resolves to "send allowed".
        assert!(engine.should_send_at(&fp, until).unwrap());
        assert!(engine
            .should_send_at(&fp, until + TimeDelta::milliseconds(1))
            .unwrap());
    }

    #[test]
    fn mute_suppresses_even_after_expired_snooze() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);
        let fp = fp("muted");

        // Snooze that has already expired.
        engine.record_snooze(&fp, Duration::ZERO).unwrap();
        assert!(engine.should_send(&fp).unwrap());

        engine.record_mute(&fp).unwrap();
        assert!(!engine.should_send(&fp).unwrap());
        assert!(!engine
            .should_send_at(&fp, DateTime::<Utc>::MAX_UTC)
            .unwrap());
    }

    #[test]
    fn snooze_after_mute_unmutes() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);
        let fp = fp("overwrite");

        engine.record_mute(&fp).unwrap();
        engine.record_snooze(&fp, Duration::ZERO).unwrap();
        // Snooze replaced the mute and has already expired.
        assert!(engine.should_send(&fp).unwrap());
    }

    #[test]
    fn mute_after_snooze_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_in(&dir);
        let fp = fp("overwrite-back");

        engine
            .record_snooze(&fp, Duration::from_secs(3600))
            .unwrap();
        engine.record_mute(&fp).unwrap();
        assert!(!engine.should_send(&fp).unwrap());
    }

    #[test]
    fn state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let fp = fp("durable");
        {
            let engine = engine_in(&dir);
            engine.record_mute(&fp).unwrap();
        }
        let engine = engine_in(&dir);
        assert!(!engine.should_send(&fp).unwrap());
    }

    #[tokio::test]
    async fn lock_serializes_same_fingerprint() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(engine_in(&dir));
        let fp = fp("contended");
        let in_section = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            let in_section = Arc::clone(&in_section);
            handles.push(tokio::spawn(async move {
                let _guard = engine.lock(&fp).await;
                let concurrent = in_section.fetch_add(1, Ordering::SeqCst);
                assert_eq!(concurrent, 0, "critical section was not exclusive");
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
