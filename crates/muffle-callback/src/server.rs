//! Callback server wiring.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use muffle_core::SuppressionEngine;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{CallbackError, CallbackResult};
use crate::handler::handle_callback;

/// Shared state of the callback endpoint.
pub struct CallbackState {
    /// The suppression engine mutated by button presses.
    pub engine: Arc<SuppressionEngine>,
}

/// HTTP server exposing the mute/snooze callback endpoint.
#[derive(Clone)]
pub struct CallbackServer {
    state: Arc<CallbackState>,
}

impl CallbackServer {
    /// Creates a server over the given engine.
    #[must_use]
    pub fn new(engine: Arc<SuppressionEngine>) -> Self {
        Self {
            state: Arc::new(CallbackState { engine }),
        }
    }

    /// Builds the router; exposed so tests can drive it without a socket.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(handle_callback))
            .with_state(self.state.clone())
    }

    /// Binds the address and serves until a fatal error.
    ///
    /// # Errors
    ///
    /// Returns `CallbackError::BindFailed` if the address cannot be bound.
    pub async fn serve(&self, addr: SocketAddr) -> CallbackResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CallbackError::BindFailed(addr, e))?;

        info!(addr = %addr, "callback server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| CallbackError::Internal(e.to_string()))
    }
}
