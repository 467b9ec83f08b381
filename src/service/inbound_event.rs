//! Inbound events decoded from the real-time channel.
//!
//! Payloads are decoded leniently, one field at a time: a field that is
//! missing or has the wrong type takes its default and is logged, and the
//! remaining fields are kept. A payload is never rejected.

use serde_json::{Map, Value};

use crate::domain::SensorPatch;
use crate::error::HubError;

/// An event a connection can deliver to the hub.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// `esp32_connect`: a device announces its id.
    DeviceConnect {
        /// Caller-supplied device id, if any.
        device_id: Option<String>,
    },
    /// `sensor_data`: a device pushes a reading.
    SensorReport(SensorPatch),
    /// `actuator_status`: a device reports its actuator values.
    ActuatorReport(Map<String, Value>),
    /// `web_connect`: a dashboard joins the web room.
    WebJoin,
    /// `control_actuator`: a dashboard asks for an actuator change.
    ControlActuator {
        /// Target actuator name.
        actuator: Option<String>,
        /// Raw requested value.
        value: Value,
    },
    /// `esp32_join`: a device joins the device room.
    DeviceJoin,
    /// The connection went away. Never decoded from the wire.
    Disconnect,
}

impl InboundEvent {
    /// Decodes the event called `name` with payload `data`.
    ///
    /// Both the device firmware names (`esp32_connect`, `sensor_data`, ...)
    /// and the descriptive names (`device-connect`, `sensor-report`, ...)
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownEvent`] if `name` is not a handled event.
    pub fn parse(name: &str, data: Value) -> Result<Self, HubError> {
        let event = match name {
            "esp32_connect" | "device-connect" => Self::DeviceConnect {
                device_id: Payload::new(name, data).text("device_id"),
            },
            "sensor_data" | "sensor-report" => {
                let payload = Payload::new(name, data);
                Self::SensorReport(SensorPatch {
                    temperature: payload.number("temperature"),
                    humidity: payload.number("humidity"),
                    light: payload.number("light"),
                })
            }
            "actuator_status" | "actuator-report" => {
                Self::ActuatorReport(Payload::new(name, data).fields)
            }
            "web_connect" | "web-join" => Self::WebJoin,
            "control_actuator" | "control-actuator" => {
                let mut payload = Payload::new(name, data);
                Self::ControlActuator {
                    actuator: payload.text("type"),
                    value: payload.take("value"),
                }
            }
            "esp32_join" | "device-join" => Self::DeviceJoin,
            other => return Err(HubError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DeviceConnect { .. } => "device-connect",
            Self::SensorReport(_) => "sensor-report",
            Self::ActuatorReport(_) => "actuator-report",
            Self::WebJoin => "web-join",
            Self::ControlActuator { .. } => "control-actuator",
            Self::DeviceJoin => "device-join",
            Self::Disconnect => "disconnect",
        }
    }
}

/// Payload object of one inbound frame, read field by field.
struct Payload<'a> {
    event: &'a str,
    fields: Map<String, Value>,
}

impl<'a> Payload<'a> {
    fn new(event: &'a str, data: Value) -> Self {
        let fields = match data {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            other => {
                tracing::warn!(event, payload = %other, "payload is not an object, using defaults");
                Map::new()
            }
        };
        Self { event, fields }
    }

    fn malformed(&self, field: &str, value: &Value) {
        tracing::warn!(event = self.event, field, %value, "malformed field, using default");
    }

    /// Numeric field; absent, `null` or non-numeric yields `None`.
    fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Null => None,
            value => value.as_f64().or_else(|| {
                self.malformed(field, value);
                None
            }),
        }
    }

    /// Text field; numbers and booleans are stringified.
    fn text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            value => {
                self.malformed(field, value);
                None
            }
        }
    }

    /// Removes a field verbatim; absent yields `null`.
    fn take(&mut self, field: &str) -> Value {
        self.fields.remove(field).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_both_naming_schemes() {
        let wire = InboundEvent::parse("esp32_connect", json!({"device_id": "dev1"}));
        let alias = InboundEvent::parse("device-connect", json!({"device_id": "dev1"}));
        let Ok(wire) = wire else {
            panic!("esp32_connect should parse");
        };
        assert_eq!(
            wire,
            InboundEvent::DeviceConnect {
                device_id: Some("dev1".to_string())
            }
        );
        assert_eq!(alias.ok(), Some(wire));
    }

    #[test]
    fn missing_payloads_use_defaults() {
        assert_eq!(
            InboundEvent::parse("esp32_connect", Value::Null).ok(),
            Some(InboundEvent::DeviceConnect { device_id: None })
        );
        assert_eq!(
            InboundEvent::parse("web_connect", Value::Null).ok(),
            Some(InboundEvent::WebJoin)
        );
        assert_eq!(
            InboundEvent::parse("actuator_status", Value::Null).ok(),
            Some(InboundEvent::ActuatorReport(Map::new()))
        );
    }

    #[test]
    fn malformed_sensor_field_keeps_valid_siblings() {
        let parsed = InboundEvent::parse(
            "sensor_data",
            json!({"temperature": "hot", "humidity": 40, "light": null}),
        );
        assert_eq!(
            parsed.ok(),
            Some(InboundEvent::SensorReport(SensorPatch {
                temperature: None,
                humidity: Some(40.0),
                light: None,
            }))
        );
    }

    #[test]
    fn non_object_payload_uses_defaults() {
        assert_eq!(
            InboundEvent::parse("sensor_data", json!([1, 2, 3])).ok(),
            Some(InboundEvent::SensorReport(SensorPatch::default()))
        );
        assert_eq!(
            InboundEvent::parse("actuator_status", json!("on")).ok(),
            Some(InboundEvent::ActuatorReport(Map::new()))
        );
    }

    #[test]
    fn scalar_device_ids_are_stringified() {
        assert_eq!(
            InboundEvent::parse("esp32_connect", json!({"device_id": 42})).ok(),
            Some(InboundEvent::DeviceConnect {
                device_id: Some("42".to_string())
            })
        );
        assert_eq!(
            InboundEvent::parse("esp32_connect", json!({"device_id": {"nested": 1}})).ok(),
            Some(InboundEvent::DeviceConnect { device_id: None })
        );
    }

    #[test]
    fn malformed_control_type_keeps_value() {
        assert_eq!(
            InboundEvent::parse("control_actuator", json!({"type": ["led"], "value": 1})).ok(),
            Some(InboundEvent::ControlActuator {
                actuator: None,
                value: json!(1),
            })
        );
    }

    #[test]
    fn control_payload_keeps_raw_value() {
        let parsed = InboundEvent::parse("control_actuator", json!({"type": "led", "value": "true"}));
        assert_eq!(
            parsed.ok(),
            Some(InboundEvent::ControlActuator {
                actuator: Some("led".to_string()),
                value: json!("true"),
            })
        );
    }

    #[test]
    fn unknown_and_disconnect_names_are_rejected() {
        assert!(matches!(
            InboundEvent::parse("self_destruct", Value::Null),
            Err(HubError::UnknownEvent(_))
        ));
        assert!(InboundEvent::parse("disconnect", Value::Null).is_err());
    }
}
