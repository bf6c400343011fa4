//! Outbound notification channel and dispatcher.
//!
//! `muffle-notify` sits in front of a chat webhook and the suppression engine
//! from `muffle-core`. The [`Dispatcher`] runs "evaluate, send, record" as
//! one critical section per alert: it derives the fingerprint, asks the
//! engine whether sending is allowed, delivers through a [`Notifier`], and on
//! success records the default snooze. A failed delivery records nothing, so
//! the next attempt retries.
//!
//! Rendered messages carry two action buttons, `mute` and `snooze`, whose
//! values are the hex fingerprint — the callback endpoint recovers the alert
//! identity from the button value without ever seeing the original key.

#![forbid(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/muffle-notify/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod message;

// Re-export main types at crate root
pub use channel::{Notifier, NotifyFuture, WebhookChannel};
pub use config::NotifyConfig;
pub use dispatcher::Dispatcher;
pub use error::{NotifyError, Result};
pub use message::{render_message, Attachment, AttachmentAction, ChatMessage};
