//! # relay-hub
//!
//! Real-time relay hub between field devices (ESP32 telemetry/actuator
//! nodes) and web dashboards.
//!
//! Devices push sensor readings and actuator status; dashboards observe
//! that state and issue actuator commands that reach every connected
//! device. The hub is the single source of truth for current state and the
//! only router between the two audiences.
//!
//! ## Architecture
//!
//! ```text
//! Devices, Dashboards (WebSocket)      REST clients
//!     │                                    │
//!     ├── WS Handler (ws/)                 ├── REST Handlers (api/)
//!     │                                    │
//!     ├── EventRouter (service/) ──────────┤
//!     ├── CommandDispatcher (service/) ────┘
//!     │
//!     ├── StateStore (domain/)
//!     └── ConnectionRegistry (domain/) → per-connection outbound queues
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::domain::{ConnectionRegistry, StateStore};
use crate::service::EventRouter;
use crate::ws::connection::ConnectionSettings;
use crate::ws::handler::ws_handler;

/// Builds shared state in the cold-start configuration.
#[must_use]
pub fn build_state(connection: ConnectionSettings) -> AppState {
    let store = Arc::new(StateStore::new());
    let registry = Arc::new(ConnectionRegistry::new());
    AppState {
        router: EventRouter::new(store, registry),
        connection,
    }
}

/// Builds the full HTTP application: REST facade, `/ws` and middleware.
///
/// Any origin may reach every endpoint.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
