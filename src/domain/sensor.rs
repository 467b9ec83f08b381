//! Sensor readings pushed by devices.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Latest sensor reading shared by the whole hub.
///
/// Starts zeroed with no `last_update`. Only the most recent values are
/// kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SensorReading {
    /// Temperature as reported by the device.
    pub temperature: f64,
    /// Relative humidity as reported by the device.
    pub humidity: f64,
    /// Ambient light level; zero until a device reports it.
    pub light: f64,
    /// Time of the last accepted report, `null` before the first one.
    pub last_update: Option<DateTime<Utc>>,
}

/// Partial sensor update carried by a `sensor_data` event.
///
/// Absent fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorPatch {
    /// New temperature, if reported.
    pub temperature: Option<f64>,
    /// New humidity, if reported.
    pub humidity: Option<f64>,
    /// New light level, if reported.
    pub light: Option<f64>,
}

impl SensorReading {
    /// Merges `patch` into the reading and stamps `last_update` with `at`.
    pub fn apply(&mut self, patch: &SensorPatch, at: DateTime<Utc>) {
        if let Some(t) = patch.temperature {
            self.temperature = t;
        }
        if let Some(h) = patch.humidity {
            self.humidity = h;
        }
        if let Some(l) = patch.light {
            self.light = l;
        }
        self.last_update = Some(at);
    }
}
