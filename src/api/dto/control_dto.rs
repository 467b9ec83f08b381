//! Actuator control DTO.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ActuatorValue;
use crate::service::ActuatorCommand;

/// Response body for a committed `GET /api/control/{actuator}/{value}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ControlResponse {
    /// Always `"success"`.
    #[schema(value_type = String, example = "success")]
    pub status: &'static str,
    /// Actuator that was set.
    pub actuator: String,
    /// Typed value it was set to.
    #[schema(value_type = Object)]
    pub value: ActuatorValue,
}

impl From<ActuatorCommand> for ControlResponse {
    fn from(command: ActuatorCommand) -> Self {
        Self {
            status: "success",
            actuator: command.actuator,
            value: command.value,
        }
    }
}
