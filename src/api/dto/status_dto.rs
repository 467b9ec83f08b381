//! Hub status DTO.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ActuatorState, SensorReading};
use crate::service::HubStatus;

/// Response body for `GET /api/status`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Latest sensor reading.
    pub sensors: SensorReading,
    /// Actuator name → current value.
    #[schema(value_type = Object)]
    pub actuators: ActuatorState,
    /// Distinct registered devices.
    pub connected_devices: usize,
}

impl From<HubStatus> for StatusResponse {
    fn from(status: HubStatus) -> Self {
        Self {
            sensors: status.sensors,
            actuators: status.actuators,
            connected_devices: status.connected_devices,
        }
    }
}
