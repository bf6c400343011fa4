//! Error types for the muffle-core crate.

use thiserror::Error;

/// Errors that can occur while deriving keys or reading/writing suppression
/// state.
#[derive(Debug, Error)]
pub enum SuppressError {
    /// The alert key could not be canonically serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The persistent store failed to read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted record could not be decoded. Corrupt records fail the
    /// call; they are never coerced into a "send" or "suppress" decision.
    #[error("corrupt suppression record: {reason}")]
    CorruptState {
        /// Why the record was rejected.
        reason: String,
    },

    /// An inbound fingerprint token failed validation. Tokens round-trip
    /// through an external UI and are untrusted on the way back in.
    #[error("invalid fingerprint token: {reason}")]
    InvalidToken {
        /// Why the token was rejected.
        reason: String,
    },
}

impl From<serde_json::Error> for SuppressError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for suppression operations.
pub type Result<T> = std::result::Result<T, SuppressError>;
