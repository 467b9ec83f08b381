//! Outbound events the hub emits to connections.
//!
//! Every [`HubEvent`] serializes to the wire envelope
//! `{"event": <name>, "data": <payload>}`.

use serde::Serialize;

use super::actuator::{ActuatorState, ActuatorValue};
use super::sensor::SensorReading;

/// Lifecycle transition reported in a `device_status` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceTransition {
    /// A device announced itself.
    #[serde(rename = "esp32_connected")]
    Connected,
    /// The last connection claiming a device went away.
    #[serde(rename = "esp32_disconnected")]
    Disconnected,
}

/// Event emitted by the hub, either to one connection or to a room.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum HubEvent {
    /// Reply to a device that sent `esp32_connect`.
    ConnectionAck {
        /// Always `"connected"`.
        status: &'static str,
        /// The id the device was registered under.
        device_id: String,
    },

    /// Device registry change, sent to the web room.
    DeviceStatus {
        /// What happened to the device.
        #[serde(rename = "type")]
        transition: DeviceTransition,
        /// Device the transition applies to.
        device_id: String,
        /// Distinct registered devices after the transition.
        total_devices: usize,
    },

    /// Full sensor reading, sent to the web room.
    SensorUpdate(SensorReading),

    /// Reply to a device that sent `sensor_data`.
    DataReceived {
        /// Always `"ok"`.
        status: &'static str,
    },

    /// Full actuator state, sent to the web room.
    ActuatorUpdate(ActuatorState),

    /// Current state handed to a web client joining the web room.
    InitialData {
        /// Latest sensor reading.
        sensors: SensorReading,
        /// Current actuator values.
        actuators: ActuatorState,
        /// Distinct registered devices.
        connected_devices: usize,
    },

    /// Single actuator change forwarded to the device room.
    ActuatorCommand {
        /// Actuator name.
        #[serde(rename = "type")]
        actuator: String,
        /// Committed value.
        value: ActuatorValue,
    },

    /// Rejected input, sent to the originator only.
    Error {
        /// Always `"error"`.
        status: &'static str,
        /// Human-readable reason.
        message: String,
    },
}

impl HubEvent {
    /// Builds a `connection_ack` for `device_id`.
    #[must_use]
    pub fn connection_ack(device_id: impl Into<String>) -> Self {
        Self::ConnectionAck {
            status: "connected",
            device_id: device_id.into(),
        }
    }

    /// Builds a `data_received` acknowledgement.
    #[must_use]
    pub const fn data_received() -> Self {
        Self::DataReceived { status: "ok" }
    }

    /// Builds an `error` event carrying `message`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            status: "error",
            message: message.into(),
        }
    }

    /// Returns the wire event name.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::ConnectionAck { .. } => "connection_ack",
            Self::DeviceStatus { .. } => "device_status",
            Self::SensorUpdate(_) => "sensor_update",
            Self::DataReceived { .. } => "data_received",
            Self::ActuatorUpdate(_) => "actuator_update",
            Self::InitialData { .. } => "initial_data",
            Self::ActuatorCommand { .. } => "actuator_command",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_status_wire_shape() {
        let event = HubEvent::DeviceStatus {
            transition: DeviceTransition::Connected,
            device_id: "dev1".to_string(),
            total_devices: 1,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap_or_default(),
            json!({
                "event": "device_status",
                "data": {"type": "esp32_connected", "device_id": "dev1", "total_devices": 1}
            })
        );
    }

    #[test]
    fn actuator_command_carries_typed_value() {
        let event = HubEvent::ActuatorCommand {
            actuator: "led".to_string(),
            value: ActuatorValue::Bool(true),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap_or_default(),
            json!({"event": "actuator_command", "data": {"type": "led", "value": true}})
        );
    }

    #[test]
    fn event_name_matches_serialized_tag() {
        let events = [
            HubEvent::connection_ack("x"),
            HubEvent::data_received(),
            HubEvent::SensorUpdate(SensorReading::default()),
            HubEvent::ActuatorUpdate(ActuatorState::default()),
            HubEvent::error("bad"),
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap_or_default();
            assert_eq!(
                json.get("event").and_then(|v| v.as_str()),
                Some(event.event_name())
            );
        }
    }
}
