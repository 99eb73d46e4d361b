//! Tunnel configuration.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

/// Configuration for a tunnelling connection.
///
/// The defaults match a client and server on the same host; a real
/// deployment at least sets `local_ip` and `server_ip`.
///
/// # Examples
///
/// ```
/// use knx_tunnel::TunnelConfig;
///
/// let config = TunnelConfig {
///     local_ip: [192, 168, 1, 50].into(),
///     server_ip: [192, 168, 1, 10].into(),
///     ..TunnelConfig::default()
/// };
/// assert_eq!(config.server_control_port, 3671);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelConfig {
    /// Local bind address, advertised in HPAIs
    pub local_ip: Ipv4Addr,
    /// Control socket bind port (0 = ephemeral)
    pub control_port: u16,
    /// Data socket bind port (0 = ephemeral)
    pub data_port: u16,
    /// Server address
    pub server_ip: Ipv4Addr,
    /// Server control port
    pub server_control_port: u16,
    /// Idle time before a CONNECTIONSTATE_REQUEST heartbeat
    pub heartbeat_interval: Duration,
    /// Time to await a CONNECT_RESPONSE
    pub connect_response_timeout: Duration,
    /// Time to await a CONNECTIONSTATE_RESPONSE
    pub connectionstate_response_timeout: Duration,
    /// Time to await a DISCONNECT_RESPONSE
    pub disconnect_response_timeout: Duration,
    /// Time to await a TUNNELLING_ACK
    pub tunnelling_ack_timeout: Duration,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::LOCALHOST,
            control_port: 0,
            data_port: 0,
            server_ip: Ipv4Addr::LOCALHOST,
            server_control_port: crate::protocol::constants::KNXNETIP_DEFAULT_PORT,
            heartbeat_interval: Duration::from_secs(60),
            connect_response_timeout: Duration::from_secs(10),
            connectionstate_response_timeout: Duration::from_secs(10),
            disconnect_response_timeout: Duration::from_secs(5),
            tunnelling_ack_timeout: Duration::from_secs(1),
        }
    }
}

impl TunnelConfig {
    /// The server control endpoint
    pub fn server_control_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.server_ip, self.server_control_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TunnelConfig::default();
        assert_eq!(config.local_ip, Ipv4Addr::LOCALHOST);
        assert_eq!(config.control_port, 0);
        assert_eq!(config.data_port, 0);
        assert_eq!(config.server_control_port, 3671);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(60));
        assert_eq!(config.connect_response_timeout, Duration::from_secs(10));
        assert_eq!(config.connectionstate_response_timeout, Duration::from_secs(10));
        assert_eq!(config.disconnect_response_timeout, Duration::from_secs(5));
        assert_eq!(config.tunnelling_ack_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_server_control_addr() {
        let config = TunnelConfig {
            server_ip: [10, 0, 0, 5].into(),
            server_control_port: 3700,
            ..TunnelConfig::default()
        };
        assert_eq!(
            config.server_control_addr(),
            SocketAddrV4::new([10, 0, 0, 5].into(), 3700)
        );
    }
}
