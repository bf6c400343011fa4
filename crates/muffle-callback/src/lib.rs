//! Inbound callback endpoint for mute/snooze button presses.
//!
//! The outbound message offers two buttons whose values carry the alert's
//! hex fingerprint. When a recipient presses one, the chat service POSTs a
//! form-encoded body to this endpoint; the handler recovers the fingerprint
//! from the button value and mutates suppression state directly — no access
//! to the original alert key is needed.
//!
//! Parsing failures yield HTTP 400 with no state mutation. Once the payload
//! parsed, the response is 200 even if individual writes fail; failures are
//! logged, not surfaced.

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/muffle-callback/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod handler;
pub mod server;

// Re-export main types at crate root
pub use error::{CallbackError, CallbackResult};
pub use handler::{parse_payload, CallbackAction, CallbackBody, SNOOZE_EXTENSION};
pub use server::CallbackServer;
