//! WebSocket frame envelope.
//!
//! Every text frame is `{"event": <name>, "data": <payload>}` in both
//! directions. Outbound frames are produced by serializing
//! [`crate::domain::HubEvent`] directly.

use serde::Deserialize;

use crate::domain::HubEvent;
use crate::error::HubError;

/// Inbound frame as read from the socket.
#[derive(Debug, Clone, Deserialize)]
pub struct WsFrame {
    /// Event name, e.g. `"sensor_data"`.
    pub event: String,
    /// Event payload; `null` when omitted.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WsFrame {
    /// Decodes a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MalformedPayload`] if the text is not a JSON
    /// envelope with an `event` field.
    pub fn decode(text: &str) -> Result<Self, HubError> {
        serde_json::from_str(text).map_err(|err| HubError::MalformedPayload(err.to_string()))
    }
}

/// Encodes an outbound event as a text frame.
///
/// # Errors
///
/// Returns [`HubError::Internal`] if the event cannot be serialized.
pub fn encode(event: &HubEvent) -> Result<String, HubError> {
    serde_json::to_string(event).map_err(|err| HubError::Internal(err.to_string()))
}
