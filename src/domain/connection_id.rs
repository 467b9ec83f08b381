//! Type-safe connection identifier.
//!
//! [`ConnectionId`] wraps a [`uuid::Uuid`] (v4) so that live socket
//! handles cannot be confused with caller-supplied device identifiers,
//! which are free-form strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one live real-time connection.
///
/// Minted when a socket is accepted and never reused. Used as the key for
/// room membership and device claims in [`super::ConnectionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let id = ConnectionId::new();
        let Ok(parsed) = id.to_string().parse::<uuid::Uuid>() else {
            panic!("display should be a UUID");
        };
        assert_eq!(parsed, id.0);
    }
}
