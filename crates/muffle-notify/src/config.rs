//! Dispatcher configuration.

use std::time::Duration;

use crate::error::{NotifyError, Result};

/// Snooze recorded after a successful delivery when the caller does not
/// override it: one day.
pub const DEFAULT_SNOOZE: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the dispatcher and its webhook channel.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// The webhook URL notifications are POSTed to.
    pub webhook_url: String,
    /// Snooze recorded after each successful delivery.
    pub default_snooze: Duration,
}

impl NotifyConfig {
    /// Creates a configuration for the given webhook URL.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::InvalidConfig` if the URL is empty.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        let webhook_url = webhook_url.into();
        if webhook_url.is_empty() {
            return Err(NotifyError::InvalidConfig {
                reason: "webhook URL cannot be empty".to_string(),
            });
        }
        Ok(Self {
            webhook_url,
            default_snooze: DEFAULT_SNOOZE,
        })
    }

    /// Sets the snooze recorded after a successful delivery.
    #[must_use]
    pub const fn with_default_snooze(mut self, snooze: Duration) -> Self {
        self.default_snooze = snooze;
        self
    }
}
