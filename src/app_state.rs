//! Shared application state injected into all Axum handlers.

use crate::service::EventRouter;
use crate::ws::connection::ConnectionSettings;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event router owning the hub state and registry.
    pub router: EventRouter,
    /// Transport settings applied to every new WebSocket.
    pub connection: ConnectionSettings,
}
