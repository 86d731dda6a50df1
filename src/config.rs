// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the connection parameters shared by all bridge clients.
use std::time::Duration;

/// Default TCP port of the robot bridge.
pub const DEFAULT_BRIDGE_PORT: u16 = 11411;
/// Default time to wait for an endpoint to become ready.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default time to wait for the reply to a command.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default time to wait for a state message.
pub const DEFAULT_UDP_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection parameters of a bridge client.
///
/// Every client constructor takes an `Option<BridgeConfig>`; `None` selects the defaults
/// of that client.
///
/// ```
/// use baxter::BridgeConfig;
/// use std::time::Duration;
///
/// let config = BridgeConfig::default()
///     .with_port(11500)
///     .with_connect_timeout(Duration::from_secs(2));
/// assert_eq!(config.port, 11500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConfig {
    /// TCP port of the bridge.
    pub port: u16,
    /// How long a constructor waits for the endpoint to accept the connection and the handshake.
    pub connect_timeout: Duration,
    /// How long a blocking command waits for its reply.
    pub response_timeout: Duration,
    /// How long `read_once` waits for a state message.
    pub udp_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            port: DEFAULT_BRIDGE_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            udp_timeout: DEFAULT_UDP_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_udp_timeout(mut self, timeout: Duration) -> Self {
        self.udp_timeout = timeout;
        self
    }
}
