//! Hub configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing or unparsable values fall
//! back to their defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::ws::connection::ConnectionSettings;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5000;

/// Top-level hub configuration.
///
/// Loaded once at startup via [`HubConfig::from_env`].
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:5000`).
    pub listen_addr: SocketAddr,

    /// Outbound queue depth per connection.
    pub outbound_buffer: usize,

    /// Seconds between keep-alive pings.
    pub ping_interval_secs: u64,

    /// Seconds of silence before a connection is dropped.
    pub ping_timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            outbound_buffer: 256,
            ping_interval_secs: 25,
            ping_timeout_secs: 60,
        }
    }
}

impl HubConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `BIND_ADDR` is set but is not an IP address.
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let bind_addr: IpAddr = match std::env::var("BIND_ADDR") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.listen_addr.ip(),
        };
        let port = parse_env("PORT", DEFAULT_PORT);

        Ok(Self {
            listen_addr: SocketAddr::new(bind_addr, port),
            outbound_buffer: parse_env("HUB_OUTBOUND_BUFFER", defaults.outbound_buffer).max(1),
            ping_interval_secs: parse_env("HUB_PING_INTERVAL_SECS", defaults.ping_interval_secs)
                .max(1),
            ping_timeout_secs: parse_env("HUB_PING_TIMEOUT_SECS", defaults.ping_timeout_secs)
                .max(1),
        })
    }

    /// Transport settings for new WebSocket connections.
    #[must_use]
    pub const fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            outbound_buffer: self.outbound_buffer,
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            ping_timeout: Duration::from_secs(self.ping_timeout_secs),
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces_on_5000() {
        let config = HubConfig::default();
        assert_eq!(config.listen_addr.to_string(), "0.0.0.0:5000");
        let settings = config.connection_settings();
        assert_eq!(settings.ping_interval, Duration::from_secs(25));
        assert_eq!(settings.ping_timeout, Duration::from_secs(60));
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        assert_eq!(parse_env("RELAY_HUB_TEST_SURELY_UNSET", 42_u16), 42);
    }
}
