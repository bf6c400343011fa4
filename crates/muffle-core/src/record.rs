//! Persisted suppression record codec.
//!
//! The store keeps one value per fingerprint: a tag byte followed by an
//! optional payload. Absence of a record means the alert has never been
//! suppressed. The tag is an explicit variant discriminant, decoded back
//! into [`SuppressionState`] on read; anything unrecognized is rejected as
//! corrupt rather than coerced into a decision.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Result, SuppressError};

/// Value tag for a snoozed record (payload: big-endian i64 unix millis).
const TAG_SNOOZED: u8 = 0x01;
/// Value tag for a muted record (no payload).
const TAG_MUTED: u8 = 0x02;

/// The persisted suppression state of one fingerprint.
///
/// Muted and snoozed are mutually exclusive: a write replaces the whole
/// record, so recording one always erases the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionState {
    /// Suppressed until the given instant, then sending is allowed again.
    Snoozed {
        /// When the snooze expires. The boundary resolves to "send
        /// allowed": at `now == until` the alert may fire.
        until: DateTime<Utc>,
    },
    /// Suppressed indefinitely until explicitly overwritten.
    Muted,
}

impl SuppressionState {
    /// Encodes the record to its stored value bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Snoozed { until } => {
                let mut buf = Vec::with_capacity(9);
                buf.push(TAG_SNOOZED);
                buf.extend_from_slice(&until.timestamp_millis().to_be_bytes());
                buf
            }
            Self::Muted => vec![TAG_MUTED],
        }
    }

    /// Decodes a stored value back into a suppression state.
    ///
    /// # Errors
    ///
    /// Returns `SuppressError::CorruptState` for an empty value, an unknown
    /// tag, a wrong payload length, or an out-of-range timestamp.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        match bytes.split_first() {
            Some((&TAG_SNOOZED, payload)) => {
                let millis: [u8; 8] =
                    payload
                        .try_into()
                        .map_err(|_| SuppressError::CorruptState {
                            reason: format!(
                                "snooze payload must be 8 bytes, got {}",
                                payload.len()
                            ),
                        })?;
                let millis = i64::from_be_bytes(millis);
                let until = Utc
                    .timestamp_millis_opt(millis)
                    .single()
                    .ok_or_else(|| SuppressError::CorruptState {
                        reason: format!("snooze timestamp out of range: {millis}"),
                    })?;
                Ok(Self::Snoozed { until })
            }
            Some((&TAG_MUTED, [])) => Ok(Self::Muted),
            Some((&TAG_MUTED, payload)) => Err(SuppressError::CorruptState {
                reason: format!("mute record carries {} unexpected bytes", payload.len()),
            }),
            Some((&tag, _)) => Err(SuppressError::CorruptState {
                reason: format!("unknown state tag {tag:#04x}"),
            }),
            None => Err(SuppressError::CorruptState {
                reason: "empty record".to_string(),
            }),
        }
    }
}
