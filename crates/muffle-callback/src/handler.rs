//! Payload parsing and action application.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use muffle_core::{Fingerprint, SuppressionEngine};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{CallbackError, CallbackResult};
use crate::server::CallbackState;

/// Snooze recorded when a human presses the snooze button: 30 days,
/// independent of the dispatcher's default snooze.
pub const SNOOZE_EXTENSION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// The form wrapper the chat service sends: a single `payload` field
/// holding JSON.
#[derive(Debug, Deserialize)]
struct CallbackForm {
    payload: String,
}

/// One button press inside the payload.
///
/// The chat service echoes more fields than we need (`text`, `type`, ...);
/// unknown fields are ignored on input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackAction {
    /// Action name as rendered into the outbound message.
    pub name: String,
    /// The opaque token from the button: the hex fingerprint.
    pub value: String,
}

/// The decoded callback payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackBody {
    /// The button presses in this callback.
    pub actions: Vec<CallbackAction>,
}

/// Parses a form-encoded request body into a [`CallbackBody`].
///
/// # Errors
///
/// Returns `CallbackError::PayloadParse` if the body is not form-encoded,
/// the `payload` field is absent, or the payload is not the expected JSON.
pub fn parse_payload(body: &str) -> CallbackResult<CallbackBody> {
    let form: CallbackForm = serde_urlencoded::from_str(body)
        .map_err(|e| CallbackError::PayloadParse(format!("form decode: {e}")))?;
    serde_json::from_str(&form.payload)
        .map_err(|e| CallbackError::PayloadParse(format!("payload JSON: {e}")))
}

/// Handles `POST /`: parse the payload, apply each action.
///
/// A parse failure is a 400 with no state mutation. Once parsing succeeded
/// the response is 200 regardless of individual write outcomes; invalid
/// tokens and store failures are logged and skipped.
pub async fn handle_callback(
    State(state): State<Arc<CallbackState>>,
    body: String,
) -> CallbackResult<&'static str> {
    let parsed = parse_payload(&body)?;
    debug!(actions = parsed.actions.len(), "callback received");

    for action in &parsed.actions {
        apply_action(&state.engine, action).await;
    }

    Ok("request executed")
}

/// Applies one button press to the suppression engine.
async fn apply_action(engine: &SuppressionEngine, action: &CallbackAction) {
    // The token round-trips through an external UI; validate before using
    // it as a store key.
    let fp = match Fingerprint::from_hex(&action.value) {
        Ok(fp) => fp,
        Err(e) => {
            warn!(action = %action.name, error = %e, "rejected callback token");
            return;
        }
    };

    match action.name.as_str() {
        "mute" => {
            let _guard = engine.lock(&fp).await;
            match engine.record_mute(&fp) {
                Ok(()) => info!(fingerprint = %fp, "muted via callback"),
                Err(e) => error!(fingerprint = %fp, error = %e, "mute write failed"),
            }
        }
        "snooze" => {
            let _guard = engine.lock(&fp).await;
            match engine.record_snooze(&fp, SNOOZE_EXTENSION) {
                Ok(()) => info!(fingerprint = %fp, "snoozed via callback"),
                Err(e) => error!(fingerprint = %fp, error = %e, "snooze write failed"),
            }
        }
        other => debug!(action = %other, "ignoring unknown callback action"),
    }
}
