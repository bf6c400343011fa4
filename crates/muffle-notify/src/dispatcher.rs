//! Single-flight dispatch: evaluate, send, record.

use std::sync::Arc;

use muffle_core::{canonical_json, Fingerprint, SuppressionEngine};
use serde::Serialize;
use tracing::{debug, info};

use crate::channel::Notifier;
use crate::config::NotifyConfig;
use crate::error::Result;
use crate::message::render_message;

/// Dispatches notifications through the suppression engine.
///
/// `maybe_notify` runs as one critical section per alert: the engine's
/// per-fingerprint lock is held from the suppression read until the snooze
/// write, so concurrent dispatches of the same alert cannot both deliver, and
/// a callback-driven mute for the alert serializes behind the in-flight send.
pub struct Dispatcher {
    engine: Arc<SuppressionEngine>,
    channel: Arc<dyn Notifier>,
    config: NotifyConfig,
}

impl Dispatcher {
    /// Creates a dispatcher over the given engine and channel.
    #[must_use]
    pub fn new(
        engine: Arc<SuppressionEngine>,
        channel: Arc<dyn Notifier>,
        config: NotifyConfig,
    ) -> Self {
        Self {
            engine,
            channel,
            config,
        }
    }

    /// Sends the notification unless its alert is currently suppressed.
    ///
    /// Returns `Ok(true)` if the message was delivered (and the default
    /// snooze recorded), `Ok(false)` if suppression swallowed it — no
    /// network call, no store write.
    ///
    /// # Errors
    ///
    /// Key serialization and store errors propagate; so do delivery
    /// failures, which leave the suppression state untouched so the next
    /// attempt retries the send.
    pub async fn maybe_notify<K: Serialize + ?Sized>(&self, key: &K, text: &str) -> Result<bool> {
        let key_json = canonical_json(key)?;
        let fp = Fingerprint::of_canonical_json(&key_json);

        let _guard = self.engine.lock(&fp).await;

        if !self.engine.should_send(&fp)? {
            debug!(fingerprint = %fp, "notification suppressed");
            return Ok(false);
        }

        let message = render_message(text, &key_json, &fp);
        self.channel.notify(&message).await?;

        self.engine.record_snooze(&fp, self.config.default_snooze)?;
        info!(
            fingerprint = %fp,
            snooze_secs = self.config.default_snooze.as_secs(),
            "notification delivered"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::NotifyFuture;
    use crate::error::NotifyError;
    use crate::message::ChatMessage;
    use muffle_core::SuppressionStore;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Notifier that records delivered messages, optionally failing instead.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<ChatMessage>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify<'a>(&'a self, message: &'a ChatMessage) -> NotifyFuture<'a> {
            Box::pin(async move {
                if self.fail {
                    return Err(NotifyError::Delivery {
                        reason: "webhook returned HTTP 503".to_string(),
                        status: Some(503),
                    });
                }
                self.sent.lock().unwrap().push(message.clone());
                Ok(())
            })
        }
    }

    fn dispatcher_in(
        dir: &tempfile::TempDir,
        notifier: Arc<RecordingNotifier>,
        snooze: Duration,
    ) -> Dispatcher {
        let store = SuppressionStore::open(dir.path()).unwrap();
        let engine = Arc::new(SuppressionEngine::new(store));
        let config = NotifyConfig::new("https://hooks.example.com/T000/B000")
            .unwrap()
            .with_default_snooze(snooze);
        Dispatcher::new(engine, notifier, config)
    }

    #[tokio::test]
    async fn first_send_delivers_then_suppresses() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher =
            dispatcher_in(&dir, Arc::clone(&notifier), Duration::from_secs(3600));

        assert!(dispatcher.maybe_notify("cve-2026-0001", "patch db01").await.unwrap());
        assert!(!dispatcher.maybe_notify("cve-2026-0001", "patch db01").await.unwrap());
        assert_eq!(notifier.sent_count(), 1);
    }

    #[tokio::test]
    async fn distinct_keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher =
            dispatcher_in(&dir, Arc::clone(&notifier), Duration::from_secs(3600));

        assert!(dispatcher.maybe_notify("alert-a", "a").await.unwrap());
        assert!(dispatcher.maybe_notify("alert-b", "b").await.unwrap());
        assert_eq!(notifier.sent_count(), 2);
    }

    #[tokio::test]
    async fn delivered_message_carries_the_fingerprint_token() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher =
            dispatcher_in(&dir, Arc::clone(&notifier), Duration::from_secs(3600));

        dispatcher.maybe_notify("Bar", "Foo").await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        let actions = &sent[0].attachments[0].actions;
        let expected = Fingerprint::of("Bar").unwrap().to_hex();
        assert_eq!(actions[0].value, expected);
        assert_eq!(actions[1].value, expected);
    }

    #[tokio::test]
    async fn failed_delivery_records_no_snooze() {
        let dir = tempfile::tempdir().unwrap();
        let failing = Arc::new(RecordingNotifier::failing());
        let dispatcher = dispatcher_in(&dir, failing, Duration::from_secs(3600));

        let err = dispatcher.maybe_notify("flaky", "text").await.unwrap_err();
        assert!(matches!(err, NotifyError::Delivery { status: Some(503), .. }));

        // The engine never recorded anything, so a healthy channel delivers.
        let fp = Fingerprint::of("flaky").unwrap();
        assert!(dispatcher.engine.should_send(&fp).unwrap());
    }

    #[tokio::test]
    async fn concurrent_dispatch_of_same_key_delivers_once() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = Arc::new(dispatcher_in(
            &dir,
            Arc::clone(&notifier),
            Duration::from_secs(3600),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let dispatcher = Arc::clone(&dispatcher);
            handles.push(tokio::spawn(async move {
                dispatcher.maybe_notify("raced", "text").await.unwrap()
            }));
        }

        let mut delivered = 0;
        for handle in handles {
            if handle.await.unwrap() {
                delivered += 1;
            }
        }
        assert_eq!(delivered, 1);
        assert_eq!(notifier.sent_count(), 1);
    }

    #[tokio::test]
    async fn muted_alert_is_never_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher =
            dispatcher_in(&dir, Arc::clone(&notifier), Duration::from_secs(3600));

        let fp = Fingerprint::of("muted-alert").unwrap();
        dispatcher.engine.record_mute(&fp).unwrap();

        assert!(!dispatcher.maybe_notify("muted-alert", "text").await.unwrap());
        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn expired_snooze_allows_the_next_send() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher =
            dispatcher_in(&dir, Arc::clone(&notifier), Duration::from_millis(10));

        assert!(dispatcher.maybe_notify("periodic", "text").await.unwrap());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(dispatcher.maybe_notify("periodic", "text").await.unwrap());
        assert_eq!(notifier.sent_count(), 2);
    }
}
