//! The outbound delivery seam.
//!
//! [`Notifier`] is the capability the dispatcher consumes: deliver one
//! rendered message, succeed or fail. The production implementation POSTs
//! JSON to a configured webhook URL; tests substitute recording fakes.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::error::{NotifyError, Result};
use crate::message::ChatMessage;

/// Boxed future returned by [`Notifier::notify`].
pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A channel that can deliver one rendered message.
pub trait Notifier: Send + Sync {
    /// Delivers the message, returning once the channel accepted it.
    fn notify<'a>(&'a self, message: &'a ChatMessage) -> NotifyFuture<'a>;
}

/// Notifier that POSTs the message as JSON to a chat webhook.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    client: reqwest::Client,
    url: String,
}

impl WebhookChannel {
    /// Creates a channel for the given webhook URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Notifier for WebhookChannel {
    fn notify<'a>(&'a self, message: &'a ChatMessage) -> NotifyFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .json(message)
                .send()
                .await
                .map_err(|e| NotifyError::Delivery {
                    reason: format!("webhook POST failed: {e}"),
                    status: None,
                })?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.is_success() {
                debug!(status = %status, body = %body, "webhook accepted notification");
                Ok(())
            } else {
                // A non-2xx answer is a failed delivery; the suppression
                // state must stay untouched so the send can be retried.
                warn!(status = %status, body = %body, "webhook rejected notification");
                Err(NotifyError::Delivery {
                    reason: format!("webhook returned HTTP {status}"),
                    status: Some(status.as_u16()),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muffle_core::Fingerprint;

    #[tokio::test]
    async fn unreachable_webhook_is_a_delivery_error() {
        let channel = WebhookChannel::new("http://127.0.0.1:1/unreachable");
        let fp = Fingerprint::of("key").unwrap();
        let message = crate::message::render_message("text", "\"key\"", &fp);

        let err = channel.notify(&message).await.unwrap_err();
        match err {
            NotifyError::Delivery { status, .. } => assert_eq!(status, None),
            other => panic!("unexpected error: {other}"),
        }
    }
}
