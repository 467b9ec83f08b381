//! Actuator state and typed actuator values.
//!
//! The actuator set is open: besides the well-known `led`, `relay` and
//! `servo_angle`, devices may report any key and it is kept verbatim.

use std::collections::BTreeMap;

use serde::Serialize;

/// Key of the LED actuator.
pub const LED: &str = "led";
/// Key of the relay actuator.
pub const RELAY: &str = "relay";
/// Key of the servo angle actuator.
pub const SERVO_ANGLE: &str = "servo_angle";

/// A single actuator value after classification.
///
/// Serialized untagged so `Bool(true)` is `true` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActuatorValue {
    /// On/off actuators such as `led` and `relay`.
    Bool(bool),
    /// Integer actuators such as `servo_angle`.
    Integer(i64),
    /// Anything else, stored as it arrived.
    Raw(serde_json::Value),
}

impl From<serde_json::Value> for ActuatorValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Raw(serde_json::Value::Number(n)),
            },
            other => Self::Raw(other),
        }
    }
}

/// Current value of every known actuator, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActuatorState(BTreeMap<String, ActuatorValue>);

impl ActuatorState {
    /// Returns the value for `name`, if any device or command has set it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActuatorValue> {
        self.0.get(name)
    }

    /// Number of actuators tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no actuator is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges `changes` over the current state. Unknown keys are added.
    pub fn merge<I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = (String, ActuatorValue)>,
    {
        self.0.extend(changes);
    }
}

impl Default for ActuatorState {
    /// Everything off, servo at zero.
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(LED.to_string(), ActuatorValue::Bool(false));
        map.insert(RELAY.to_string(), ActuatorValue::Bool(false));
        map.insert(SERVO_ANGLE.to_string(), ActuatorValue::Integer(0));
        Self(map)
    }
}
