//! Stable alert identity: canonical serialization plus one-way hash.
//!
//! An alert key is any serializable value the caller uses to say *what* an
//! alert is about (a vulnerability id, a host+check pair, ...). Equal keys
//! must always produce equal fingerprints, so the key is first rendered to a
//! canonical JSON form and then hashed. `serde_json`'s map type is
//! BTreeMap-backed, so object keys come out sorted regardless of insertion
//! order; field order of structs is fixed by their definition.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, SuppressError};

/// Renders an alert key to its canonical JSON encoding.
///
/// # Errors
///
/// Returns `SuppressError::Serialization` if the key cannot be represented
/// as JSON (e.g. a map with non-string keys).
pub fn canonical_json<K: Serialize + ?Sized>(key: &K) -> Result<String> {
    // Round-tripping through `Value` normalizes object key order.
    let value = serde_json::to_value(key)?;
    serde_json::to_string(&value).map_err(SuppressError::from)
}

/// A fixed-size fingerprint identifying one logical alert.
///
/// Derived as SHA-256 over the canonical JSON encoding of the alert key.
/// Used as the primary key of the suppression store and, hex-encoded, as the
/// opaque token embedded in outbound mute/snooze buttons.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Length of a fingerprint in bytes.
    pub const LEN: usize = 32;

    /// Derives the fingerprint of an alert key.
    ///
    /// Pure and deterministic: the same semantic key yields the same
    /// fingerprint across calls, processes, and restarts.
    ///
    /// # Errors
    ///
    /// Returns `SuppressError::Serialization` if the key cannot be
    /// canonically serialized.
    pub fn of<K: Serialize + ?Sized>(key: &K) -> Result<Self> {
        let canonical = canonical_json(key)?;
        Ok(Self::of_canonical_json(&canonical))
    }

    /// Hashes an already-canonicalized JSON encoding of an alert key.
    ///
    /// Callers that also need the canonical form (e.g. to embed it in an
    /// outbound message) can serialize once and hash the result here.
    #[must_use]
    pub fn of_canonical_json(canonical: &str) -> Self {
        Self(Sha256::digest(canonical.as_bytes()).into())
    }

    /// Returns the raw fingerprint bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the transport form: 64 lowercase hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a fingerprint from its hex transport form.
    ///
    /// The token comes back from an external UI and is validated as
    /// untrusted input before it is used as a store key.
    ///
    /// # Errors
    ///
    /// Returns `SuppressError::InvalidToken` on wrong length or non-hex
    /// characters.
    pub fn from_hex(token: &str) -> Result<Self> {
        if token.len() != Self::LEN * 2 {
            return Err(SuppressError::InvalidToken {
                reason: format!(
                    "expected {} hex characters, got {}",
                    Self::LEN * 2,
                    token.len()
                ),
            });
        }
        let bytes = hex::decode(token).map_err(|e| SuppressError::InvalidToken {
            reason: e.to_string(),
        })?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SuppressError::InvalidToken {
                reason: "decoded token has wrong length".to_string(),
            })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}
