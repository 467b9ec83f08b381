//! Actuator command normalization and commit.
//!
//! [`CommandDispatcher`] is the single path by which a web-originated
//! control request (live channel or REST) changes actuator state. The raw
//! value is first typed according to the actuator it targets; only a value
//! that parses is stored and forwarded to the device room.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::domain::actuator::{LED, RELAY, SERVO_ANGLE};
use crate::domain::{ActuatorValue, ConnectionRegistry, HubEvent, Room, StateStore};
use crate::error::HubError;

/// How a raw control value is typed before it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorKind {
    /// On/off actuator (`led`, `relay`).
    Switch,
    /// Integer angle actuator (`servo_angle`).
    Angle,
    /// Any other actuator; the value is stored untouched.
    Other,
}

impl ActuatorKind {
    /// Classifies an actuator by name.
    #[must_use]
    pub fn of(actuator: &str) -> Self {
        match actuator {
            LED | RELAY => Self::Switch,
            SERVO_ANGLE => Self::Angle,
            _ => Self::Other,
        }
    }
}

/// A command that was committed and forwarded to devices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActuatorCommand {
    /// Actuator name.
    pub actuator: String,
    /// Typed value the actuator was set to.
    pub value: ActuatorValue,
}

/// Types a raw value for `actuator`.
///
/// # Errors
///
/// Returns [`HubError::Validation`] if the value does not fit a switch or
/// angle actuator.
pub fn parse_value(actuator: &str, raw: Value) -> Result<ActuatorValue, HubError> {
    match ActuatorKind::of(actuator) {
        ActuatorKind::Switch => parse_switch(&raw)
            .map(ActuatorValue::Bool)
            .ok_or_else(|| HubError::validation(actuator, format!("expected a boolean, got {raw}"))),
        ActuatorKind::Angle => parse_angle(&raw)
            .map(ActuatorValue::Integer)
            .ok_or_else(|| HubError::validation(actuator, format!("expected an integer, got {raw}"))),
        ActuatorKind::Other => Ok(ActuatorValue::Raw(raw)),
    }
}

fn parse_switch(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Some(true),
            "false" | "0" | "off" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_angle(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Commits typed actuator commands and forwards them to devices.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    store: Arc<StateStore>,
    registry: Arc<ConnectionRegistry>,
}

impl CommandDispatcher {
    /// Creates a dispatcher over the shared store and registry.
    #[must_use]
    pub fn new(store: Arc<StateStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }

    /// Types `raw`, stores it under `actuator` and sends an
    /// `actuator_command` to the device room.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if `actuator` is blank or `raw` does
    /// not parse. Nothing is stored or sent in that case.
    pub async fn dispatch(&self, actuator: &str, raw: Value) -> Result<ActuatorCommand, HubError> {
        let actuator = actuator.trim();
        if actuator.is_empty() {
            return Err(HubError::validation("actuator", "missing actuator name"));
        }
        let value = parse_value(actuator, raw)?;

        self.store
            .update_actuators([(actuator.to_string(), value.clone())])
            .await;
        let devices = self
            .registry
            .broadcast(
                Room::Devices,
                HubEvent::ActuatorCommand {
                    actuator: actuator.to_string(),
                    value: value.clone(),
                },
            )
            .await;

        tracing::info!(actuator, ?value, devices, "actuator command sent");
        Ok(ActuatorCommand {
            actuator: actuator.to_string(),
            value,
        })
    }
}
