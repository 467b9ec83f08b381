//! WebSocket layer: upgrade handling, frame envelope, connection loop.
//!
//! The endpoint at `/ws` carries the named-event channel shared by devices
//! and dashboards. Which audience a socket belongs to is decided by the
//! events it sends, not by the endpoint.

pub mod connection;
pub mod handler;
pub mod messages;
