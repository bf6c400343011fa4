//! Error types for the muffle-notify crate.

use muffle_core::SuppressError;
use thiserror::Error;

/// Errors that can occur while dispatching a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Key derivation or suppression-state access failed.
    #[error(transparent)]
    Suppress(#[from] SuppressError),

    /// The outbound delivery failed. No snooze is recorded for a failed
    /// delivery, so the next attempt retries it.
    #[error("delivery failed: {reason}")]
    Delivery {
        /// What went wrong.
        reason: String,
        /// HTTP status, when the webhook answered at all.
        status: Option<u16>,
    },

    /// The notifier configuration is unusable.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
}

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
