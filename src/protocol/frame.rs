//! KNXnet/IP frame header and endpoint substructures.
//!
//! This module handles the outer transport framing shared by every
//! KNXnet/IP service: the six-byte header, the Host Protocol Address
//! Information (HPAI) endpoint descriptor, and the tunnelling CRI/CRD
//! connection blocks.
//!
//! ## Frame Structure
//!
//! ```text
//! ┌─────────────────────────────┐
//! │  Header (6 bytes)           │
//! │  - Header Length: 0x06      │
//! │  - Protocol Version: 0x10   │
//! │  - Service Type: 2 bytes    │
//! │  - Total Length: 2 bytes    │
//! ├─────────────────────────────┤
//! │  Body (variable)            │
//! │  - Service-specific data    │
//! └─────────────────────────────┘
//! ```
//!
//! All multi-byte integers are big-endian.

use crate::addressing::IndividualAddress;
use crate::error::{KnxError, Result};
use crate::protocol::constants::{
    ConnectionType, HostProtocol, KnxLayer, ServiceType, HEADER_SIZE_10, KNXNETIP_VERSION_10,
};
use std::net::SocketAddrV4;

/// KNXnet/IP frame header (6 bytes)
///
/// ```text
/// ┌──────────────┬──────────────┬─────────────────────┐
/// │ Header Len   │ Protocol Ver │  Service Type ID    │
/// │   (1 byte)   │   (1 byte)   │     (2 bytes)       │
/// ├──────────────┴──────────────┴─────────────────────┤
/// │           Total Length (2 bytes)                   │
/// └────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnxnetIpHeader {
    /// Service type identifier
    pub service_type: ServiceType,
    /// Total length of frame (header + body)
    pub total_length: u16,
}

impl KnxnetIpHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 6;

    /// Create a new header for the given body length
    pub const fn new(service_type: ServiceType, body_length: u16) -> Self {
        Self {
            service_type,
            total_length: Self::SIZE as u16 + body_length,
        }
    }

    /// Parse a header from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too small, the header length byte
    /// is not 0x06, the protocol version is not 0x10, or the service type
    /// is unknown.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }

        if data[0] != HEADER_SIZE_10 {
            return Err(KnxError::invalid_header());
        }
        if data[1] != KNXNETIP_VERSION_10 {
            return Err(KnxError::unsupported_version());
        }

        let service_type_raw = u16::from_be_bytes([data[2], data[3]]);
        let total_length = u16::from_be_bytes([data[4], data[5]]);

        let service_type = ServiceType::from_u16(service_type_raw)
            .ok_or_else(KnxError::unsupported_service_type)?;

        Ok(Self {
            service_type,
            total_length,
        })
    }

    /// Encode the header into a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns a buffer-too-small error if `buf` holds fewer than 6 bytes.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }

        buf[0] = HEADER_SIZE_10;
        buf[1] = KNXNETIP_VERSION_10;
        buf[2..4].copy_from_slice(&self.service_type.as_u16().to_be_bytes());
        buf[4..6].copy_from_slice(&self.total_length.to_be_bytes());

        Ok(Self::SIZE)
    }

    /// Get the expected body length from the header
    pub const fn body_length(&self) -> u16 {
        self.total_length.saturating_sub(Self::SIZE as u16)
    }
}

/// Host Protocol Address Information (HPAI)
///
/// Endpoint descriptor carried in connection management frames.
///
/// ```text
/// ┌──────────────┬──────────────┬─────────────────────┐
/// │ Structure Len│ Host Protocol│   IP Address        │
/// │   (1 byte)   │   (1 byte)   │   (4 bytes IPv4)    │
/// ├──────────────┴──────────────┴─────────────────────┤
/// │                Port (2 bytes)                      │
/// └────────────────────────────────────────────────────┘
/// ```
///
/// Only IPv4/UDP (host protocol 0x01) is supported; other codes are a
/// decode error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hpai {
    /// IPv4 address (4 octets)
    pub ip_address: [u8; 4],
    /// UDP port
    pub port: u16,
}

impl Hpai {
    /// Size of HPAI structure for IPv4
    pub const SIZE: usize = 8;

    /// Create a new HPAI for IPv4 UDP
    pub const fn new(ip_address: [u8; 4], port: u16) -> Self {
        Self { ip_address, port }
    }

    /// Parse HPAI from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too small, the structure length is
    /// not 8, or the host protocol is not IPv4/UDP.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }

        if data[0] != Self::SIZE as u8 {
            return Err(KnxError::invalid_header());
        }
        match HostProtocol::from_u8(data[1]) {
            Some(HostProtocol::Ipv4Udp) => {}
            _ => return Err(KnxError::unsupported_host_protocol()),
        }

        let ip_address = [data[2], data[3], data[4], data[5]];
        let port = u16::from_be_bytes([data[6], data[7]]);

        Ok(Self { ip_address, port })
    }

    /// Encode HPAI into bytes.
    ///
    /// # Errors
    ///
    /// Returns a buffer-too-small error if `buf` holds fewer than 8 bytes.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }

        buf[0] = Self::SIZE as u8;
        buf[1] = HostProtocol::Ipv4Udp.as_u8();
        buf[2..6].copy_from_slice(&self.ip_address);
        buf[6..8].copy_from_slice(&self.port.to_be_bytes());

        Ok(Self::SIZE)
    }

    /// The endpoint as a socket address
    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip_address.into(), self.port)
    }
}

impl From<SocketAddrV4> for Hpai {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(addr.ip().octets(), addr.port())
    }
}

/// Connection Request Information (CRI) for a tunnelling connection.
///
/// Wire form: `04 04 02 00` (length, tunnel connection, link layer,
/// reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnelCri {
    /// Requested KNX layer (`TUNNEL_LINKLAYER` for this client)
    pub knx_layer: KnxLayer,
}

impl TunnelCri {
    /// Size of the tunnelling CRI block
    pub const SIZE: usize = 4;

    /// CRI requesting a link-layer tunnel
    pub const fn link_layer() -> Self {
        Self {
            knx_layer: KnxLayer::LinkLayer,
        }
    }

    /// Encode CRI to bytes
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }

        buf[0] = Self::SIZE as u8;
        buf[1] = ConnectionType::Tunnel.as_u8();
        buf[2] = self.knx_layer.as_u8();
        buf[3] = 0x00; // Reserved

        Ok(Self::SIZE)
    }

    /// Decode CRI from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error unless the block describes a link-layer tunnel
    /// connection.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }
        if data[0] != Self::SIZE as u8 {
            return Err(KnxError::invalid_header());
        }
        if ConnectionType::from_u8(data[1]) != Some(ConnectionType::Tunnel) {
            return Err(KnxError::unsupported_connection_type());
        }
        let knx_layer = match KnxLayer::from_u8(data[2]) {
            Some(KnxLayer::LinkLayer) => KnxLayer::LinkLayer,
            _ => return Err(KnxError::unsupported_knx_layer()),
        };

        Ok(Self { knx_layer })
    }
}

/// Connection Response Data (CRD) for a tunnelling connection.
///
/// Carries the individual address of the KNX bus endpoint the server
/// assigned to the tunnel. Wire form: `04 04` + 2-octet address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnelCrd {
    /// Individual address of the assigned bus endpoint
    pub address: IndividualAddress,
}

impl TunnelCrd {
    /// Size of the tunnelling CRD block
    pub const SIZE: usize = 4;

    /// Create a CRD with the given bus endpoint address
    pub const fn new(address: IndividualAddress) -> Self {
        Self { address }
    }

    /// Encode CRD to bytes
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }

        buf[0] = Self::SIZE as u8;
        buf[1] = ConnectionType::Tunnel.as_u8();
        buf[2..4].copy_from_slice(&self.address.raw().to_be_bytes());

        Ok(Self::SIZE)
    }

    /// Decode CRD from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error unless the block describes a tunnel connection.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }
        if data[0] != Self::SIZE as u8 {
            return Err(KnxError::invalid_header());
        }
        if ConnectionType::from_u8(data[1]) != Some(ConnectionType::Tunnel) {
            return Err(KnxError::unsupported_connection_type());
        }

        let address = IndividualAddress::from(u16::from_be_bytes([data[2], data[3]]));
        Ok(Self { address })
    }
}
