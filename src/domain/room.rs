//! Broadcast audiences.

use std::fmt;

use serde::Serialize;

/// A named broadcast audience. A connection belongs to at most one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Room {
    /// Field devices that receive actuator commands.
    Devices,
    /// Dashboard observers that receive state updates.
    Web,
}

impl Room {
    /// Returns the room name as used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Devices => "esp32_devices",
            Self::Web => "web_clients",
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
