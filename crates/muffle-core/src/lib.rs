//! Suppression engine for duplicate outbound notifications.
//!
//! `muffle-core` remembers, per logical alert, whether a notification was
//! recently sent (snoozed), explicitly muted, or never seen. Callers derive a
//! stable [`Fingerprint`] from an arbitrary serializable alert key, ask the
//! [`SuppressionEngine`] whether a new notification is allowed, and record the
//! outcome. State is persisted in an embedded [redb](https://docs.rs/redb)
//! database so suppression survives process restarts.
//!
//! # State machine
//!
//! Each fingerprint is in one of three states:
//!
//! - **Unset** (no record): sending is allowed.
//! - **Snoozed until `t`**: suppressed until `now >= t`, then allowed again.
//! - **Muted**: suppressed indefinitely until overwritten.
//!
//! Mute and snooze are mutually exclusive; writing one replaces the other.
//!
//! # Example
//!
//! ```no_run
//! use muffle_core::{Fingerprint, SuppressionEngine, SuppressionStore};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), muffle_core::SuppressError> {
//! let store = SuppressionStore::open(Path::new("./muffle-data"))?;
//! let engine = SuppressionEngine::new(store);
//!
//! let fp = Fingerprint::of(&("db01", "disk_full"))?;
//! if engine.should_send(&fp)? {
//!     // deliver the notification through your channel, then:
//!     engine.record_snooze(&fp, Duration::from_secs(24 * 3600))?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! The engine exposes per-fingerprint locks (sharded `tokio::sync::Mutex`
//! slots) via [`SuppressionEngine::lock`]. A dispatcher must hold the lock for
//! its whole read-decide-send-write sequence; callback-driven single-key
//! writes take the same lock so a human "mute" cannot be lost to an in-flight
//! dispatch of the same alert.

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/muffle-core/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod record;
pub mod store;

// Re-export main types at crate root
pub use engine::SuppressionEngine;
pub use error::{Result, SuppressError};
pub use fingerprint::{canonical_json, Fingerprint};
pub use record::SuppressionState;
pub use store::SuppressionStore;
