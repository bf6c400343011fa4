//! Outbound chat message rendering.
//!
//! The wire format follows the classic chat-webhook attachment shape: a text
//! body plus one attachment carrying interactive `mute` and `snooze` buttons.
//! Both buttons embed the hex fingerprint as their `value`, so the identity
//! of the alert round-trips opaquely through the UI and back into the
//! callback endpoint.

use muffle_core::Fingerprint;
use serde::{Deserialize, Serialize};

/// Action name carried by the mute button.
pub const ACTION_MUTE: &str = "mute";
/// Action name carried by the snooze button.
pub const ACTION_SNOOZE: &str = "snooze";

const ATTACHMENT_COLOR: &str = "#3AA3E3";

/// An interactive button inside an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentAction {
    /// Action name reported back by the callback (`mute` or `snooze`).
    pub name: String,
    /// Button label shown to the recipient.
    pub text: String,
    /// Control type; always `button`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Opaque value round-tripped through the UI: the hex fingerprint.
    pub value: String,
}

impl AttachmentAction {
    fn button(name: &str, label: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            text: label.to_string(),
            kind: "button".to_string(),
            value,
        }
    }
}

/// A message attachment holding the interactive controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment title.
    pub title: String,
    /// Plain-text fallback for clients without interactive support.
    pub fallback: String,
    /// Callback correlation id; the canonical JSON of the alert key.
    pub callback_id: String,
    /// Sidebar color.
    pub color: String,
    /// Attachment type; always `default`.
    pub attachment_type: String,
    /// The interactive buttons.
    pub actions: Vec<AttachmentAction>,
}

/// The outbound webhook message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message text.
    pub text: String,
    /// Attachments carrying the mute/snooze controls.
    pub attachments: Vec<Attachment>,
}

/// Renders the outbound message for one alert.
///
/// `key_json` is the canonical JSON of the alert key (used as the
/// attachment's `callback_id`); `fp` is the fingerprint embedded, hex
/// encoded, in both action buttons.
#[must_use]
pub fn render_message(text: &str, key_json: &str, fp: &Fingerprint) -> ChatMessage {
    let token = fp.to_hex();
    ChatMessage {
        text: text.to_string(),
        attachments: vec![Attachment {
            title: "You will be periodically reminded of this alert.".to_string(),
            fallback: "Unable to mute".to_string(),
            callback_id: key_json.to_string(),
            color: ATTACHMENT_COLOR.to_string(),
            attachment_type: "default".to_string(),
            actions: vec![
                AttachmentAction::button(ACTION_MUTE, "Mute", token.clone()),
                AttachmentAction::button(ACTION_SNOOZE, "Snooze", token),
            ],
        }],
    }
}
