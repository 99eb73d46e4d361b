//! KNXnet/IP service frame builders and parsers.
//!
//! One struct per tunnelling service, each with `encode` (into a caller
//! buffer, returning the byte count) and `parse` (from a frame body). The
//! [`ServiceFrame`] sum type at the bottom dispatches decoding on the
//! service type and encoding by match, so the tunnel state machine deals in
//! exactly one frame type.
//!
//! ## Protocol Flow
//!
//! ```text
//! Client                          Server
//!   |                                |
//!   |------- CONNECT_REQUEST ------->|
//!   |<------ CONNECT_RESPONSE -------|
//!   |                                |
//!   |------ TUNNELLING_REQUEST ----->|
//!   |<------ TUNNELLING_ACK ---------|
//!   |                                |
//!   |--- CONNECTIONSTATE_REQUEST --->|  (every 60s)
//!   |<-- CONNECTIONSTATE_RESPONSE ---|
//!   |                                |
//!   |------ DISCONNECT_REQUEST ----->|
//!   |<----- DISCONNECT_RESPONSE -----|
//! ```

use crate::error::{KnxError, Result};
use crate::protocol::constants::{ServiceType, StatusCode};
use crate::protocol::frame::{Hpai, KnxnetIpHeader, TunnelCrd, TunnelCri};

/// Write the six-byte header for `service` and return the body offset.
fn encode_header(service: ServiceType, total_len: usize, buf: &mut [u8]) -> Result<usize> {
    if buf.len() < total_len {
        return Err(KnxError::buffer_too_small());
    }
    KnxnetIpHeader::new(service, (total_len - KnxnetIpHeader::SIZE) as u16).encode(buf)
}

/// `CONNECT_REQUEST` service (0x0205)
///
/// Body: control HPAI ‖ data HPAI ‖ tunnelling CRI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Control endpoint (connection management traffic)
    pub control_endpoint: Hpai,
    /// Data endpoint (tunnelling traffic)
    pub data_endpoint: Hpai,
    /// Connection request information
    pub cri: TunnelCri,
}

impl ConnectRequest {
    /// Total encoded size (header + 2 HPAIs + CRI)
    pub const SIZE: usize = KnxnetIpHeader::SIZE + 2 * Hpai::SIZE + TunnelCri::SIZE;

    /// Create a link-layer tunnel `CONNECT_REQUEST`
    pub const fn new(control_endpoint: Hpai, data_endpoint: Hpai) -> Self {
        Self {
            control_endpoint,
            data_endpoint,
            cri: TunnelCri::link_layer(),
        }
    }

    /// Build the complete frame, returning the number of bytes written
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let mut offset = encode_header(ServiceType::ConnectRequest, Self::SIZE, buf)?;
        offset += self.control_endpoint.encode(&mut buf[offset..])?;
        offset += self.data_endpoint.encode(&mut buf[offset..])?;
        offset += self.cri.encode(&mut buf[offset..])?;
        Ok(offset)
    }

    /// Parse from a frame body
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 2 * Hpai::SIZE + TunnelCri::SIZE {
            return Err(KnxError::frame_length_mismatch());
        }

        let control_endpoint = Hpai::parse(&data[0..8])?;
        let data_endpoint = Hpai::parse(&data[8..16])?;
        let cri = TunnelCri::parse(&data[16..20])?;

        Ok(Self {
            control_endpoint,
            data_endpoint,
            cri,
        })
    }
}

/// `CONNECT_RESPONSE` service (0x0206)
///
/// Body: channel ‖ status ‖ data HPAI ‖ CRD. The HPAI and CRD are absent
/// when the status signals an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectResponse {
    /// Communication channel id assigned by the server
    pub channel_id: u8,
    /// Connection status
    pub status: StatusCode,
    /// Data endpoint and bus address, present only on success
    pub endpoint: Option<(Hpai, TunnelCrd)>,
}

impl ConnectResponse {
    /// Create a successful response
    pub const fn ok(channel_id: u8, data_endpoint: Hpai, crd: TunnelCrd) -> Self {
        Self {
            channel_id,
            status: StatusCode::NoError,
            endpoint: Some((data_endpoint, crd)),
        }
    }

    /// Create an error response
    pub const fn error(status: StatusCode) -> Self {
        Self {
            channel_id: 0,
            status,
            endpoint: None,
        }
    }

    /// Build the complete frame
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let body_len = match self.endpoint {
            Some(_) => 2 + Hpai::SIZE + TunnelCrd::SIZE,
            None => 2,
        };
        let mut offset =
            encode_header(ServiceType::ConnectResponse, KnxnetIpHeader::SIZE + body_len, buf)?;

        buf[offset] = self.channel_id;
        buf[offset + 1] = self.status.as_u8();
        offset += 2;

        if let Some((data_endpoint, crd)) = &self.endpoint {
            offset += data_endpoint.encode(&mut buf[offset..])?;
            offset += crd.encode(&mut buf[offset..])?;
        }

        Ok(offset)
    }

    /// Parse from a frame body
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(KnxError::frame_length_mismatch());
        }

        let channel_id = data[0];
        let status = StatusCode::from_u8(data[1]).ok_or_else(KnxError::unknown_status)?;

        let endpoint = if status.is_ok() {
            if data.len() < 2 + Hpai::SIZE + TunnelCrd::SIZE {
                return Err(KnxError::frame_length_mismatch());
            }
            let data_endpoint = Hpai::parse(&data[2..10])?;
            let crd = TunnelCrd::parse(&data[10..14])?;
            Some((data_endpoint, crd))
        } else {
            None
        };

        Ok(Self {
            channel_id,
            status,
            endpoint,
        })
    }

    /// Check if the connection was accepted
    pub const fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// `CONNECTIONSTATE_REQUEST` service (0x0207), the heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionstateRequest {
    /// Communication channel id
    pub channel_id: u8,
    /// Control endpoint of the client
    pub control_endpoint: Hpai,
}

impl ConnectionstateRequest {
    /// Total encoded size
    pub const SIZE: usize = KnxnetIpHeader::SIZE + 2 + Hpai::SIZE;

    /// Create a new heartbeat request
    pub const fn new(channel_id: u8, control_endpoint: Hpai) -> Self {
        Self {
            channel_id,
            control_endpoint,
        }
    }

    /// Build the complete frame
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let mut offset = encode_header(ServiceType::ConnectionstateRequest, Self::SIZE, buf)?;

        buf[offset] = self.channel_id;
        buf[offset + 1] = 0x00; // Reserved
        offset += 2;

        offset += self.control_endpoint.encode(&mut buf[offset..])?;
        Ok(offset)
    }

    /// Parse from a frame body
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 2 + Hpai::SIZE {
            return Err(KnxError::frame_length_mismatch());
        }

        Ok(Self {
            channel_id: data[0],
            control_endpoint: Hpai::parse(&data[2..10])?,
        })
    }
}

/// `CONNECTIONSTATE_RESPONSE` service (0x0208)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionstateResponse {
    /// Communication channel id
    pub channel_id: u8,
    /// Connection status
    pub status: StatusCode,
}

impl ConnectionstateResponse {
    /// Total encoded size
    pub const SIZE: usize = KnxnetIpHeader::SIZE + 2;

    /// Create a new heartbeat response
    pub const fn new(channel_id: u8, status: StatusCode) -> Self {
        Self { channel_id, status }
    }

    /// Build the complete frame
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let offset = encode_header(ServiceType::ConnectionstateResponse, Self::SIZE, buf)?;
        buf[offset] = self.channel_id;
        buf[offset + 1] = self.status.as_u8();
        Ok(offset + 2)
    }

    /// Parse from a frame body
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(KnxError::frame_length_mismatch());
        }

        Ok(Self {
            channel_id: data[0],
            status: StatusCode::from_u8(data[1]).ok_or_else(KnxError::unknown_status)?,
        })
    }

    /// Check if the connection is still alive
    pub const fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// `DISCONNECT_REQUEST` service (0x0209)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectRequest {
    /// Communication channel id
    pub channel_id: u8,
    /// Control endpoint of the requesting side
    pub control_endpoint: Hpai,
}

impl DisconnectRequest {
    /// Total encoded size
    pub const SIZE: usize = KnxnetIpHeader::SIZE + 2 + Hpai::SIZE;

    /// Create a new disconnect request
    pub const fn new(channel_id: u8, control_endpoint: Hpai) -> Self {
        Self {
            channel_id,
            control_endpoint,
        }
    }

    /// Build the complete frame
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let mut offset = encode_header(ServiceType::DisconnectRequest, Self::SIZE, buf)?;

        buf[offset] = self.channel_id;
        buf[offset + 1] = 0x00; // Reserved
        offset += 2;

        offset += self.control_endpoint.encode(&mut buf[offset..])?;
        Ok(offset)
    }

    /// Parse from a frame body
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 2 + Hpai::SIZE {
            return Err(KnxError::frame_length_mismatch());
        }

        Ok(Self {
            channel_id: data[0],
            control_endpoint: Hpai::parse(&data[2..10])?,
        })
    }
}

/// `DISCONNECT_RESPONSE` service (0x020A)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectResponse {
    /// Communication channel id
    pub channel_id: u8,
    /// Disconnect status
    pub status: StatusCode,
}

impl DisconnectResponse {
    /// Total encoded size
    pub const SIZE: usize = KnxnetIpHeader::SIZE + 2;

    /// Create a new disconnect response
    pub const fn new(channel_id: u8, status: StatusCode) -> Self {
        Self { channel_id, status }
    }

    /// Build the complete frame
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let offset = encode_header(ServiceType::DisconnectResponse, Self::SIZE, buf)?;
        buf[offset] = self.channel_id;
        buf[offset + 1] = self.status.as_u8();
        Ok(offset + 2)
    }

    /// Parse from a frame body
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(KnxError::frame_length_mismatch());
        }

        Ok(Self {
            channel_id: data[0],
            status: StatusCode::from_u8(data[1]).ok_or_else(KnxError::unknown_status)?,
        })
    }
}

/// Connection header prefixed to tunnelling bodies
///
/// Wire form: `04 channel seq 00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHeader {
    /// Communication channel id
    pub channel_id: u8,
    /// Sequence counter (wraps 255 → 0)
    pub sequence_counter: u8,
}

impl ConnectionHeader {
    /// Size of the connection header
    pub const SIZE: usize = 4;

    /// Create a new connection header
    pub const fn new(channel_id: u8, sequence_counter: u8) -> Self {
        Self {
            channel_id,
            sequence_counter,
        }
    }

    /// Encode to bytes
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }

        buf[0] = Self::SIZE as u8;
        buf[1] = self.channel_id;
        buf[2] = self.sequence_counter;
        buf[3] = 0x00; // Reserved

        Ok(Self::SIZE)
    }

    /// Decode from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }
        if data[0] != Self::SIZE as u8 {
            return Err(KnxError::invalid_header());
        }

        Ok(Self {
            channel_id: data[1],
            sequence_counter: data[2],
        })
    }
}

/// `TUNNELLING_REQUEST` service (0x0420)
///
/// Body: connection header ‖ cEMI telegram. The telegram bytes are
/// borrowed; decoding is zero-copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnellingRequest<'a> {
    /// Connection header (channel + sequence)
    pub connection_header: ConnectionHeader,
    /// cEMI telegram bytes
    pub cemi: &'a [u8],
}

impl<'a> TunnellingRequest<'a> {
    /// Create a new `TUNNELLING_REQUEST`
    pub const fn new(connection_header: ConnectionHeader, cemi: &'a [u8]) -> Self {
        Self {
            connection_header,
            cemi,
        }
    }

    /// Total encoded size for this request
    pub const fn size(&self) -> usize {
        KnxnetIpHeader::SIZE + ConnectionHeader::SIZE + self.cemi.len()
    }

    /// Build the complete frame
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let total_len = self.size();
        let mut offset = encode_header(ServiceType::TunnellingRequest, total_len, buf)?;

        offset += self.connection_header.encode(&mut buf[offset..])?;
        buf[offset..offset + self.cemi.len()].copy_from_slice(self.cemi);
        offset += self.cemi.len();

        Ok(offset)
    }

    /// Parse from a frame body
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < ConnectionHeader::SIZE {
            return Err(KnxError::frame_length_mismatch());
        }

        Ok(Self {
            connection_header: ConnectionHeader::parse(&data[0..4])?,
            cemi: &data[4..],
        })
    }
}

/// `TUNNELLING_ACK` service (0x0421)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnellingAck {
    /// Connection header (channel + acknowledged sequence)
    pub connection_header: ConnectionHeader,
    /// Acknowledgement status
    pub status: StatusCode,
}

impl TunnellingAck {
    /// Total encoded size
    pub const SIZE: usize = KnxnetIpHeader::SIZE + ConnectionHeader::SIZE + 1;

    /// Create a new `TUNNELLING_ACK`
    pub const fn new(connection_header: ConnectionHeader, status: StatusCode) -> Self {
        Self {
            connection_header,
            status,
        }
    }

    /// Build the complete frame
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let mut offset = encode_header(ServiceType::TunnellingAck, Self::SIZE, buf)?;
        offset += self.connection_header.encode(&mut buf[offset..])?;
        buf[offset] = self.status.as_u8();
        Ok(offset + 1)
    }

    /// Parse from a frame body
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < ConnectionHeader::SIZE + 1 {
            return Err(KnxError::frame_length_mismatch());
        }

        Ok(Self {
            connection_header: ConnectionHeader::parse(&data[0..4])?,
            status: StatusCode::from_u8(data[4]).ok_or_else(KnxError::unknown_status)?,
        })
    }

    /// Check if the request was acknowledged successfully
    pub const fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

// =============================================================================
// Service Frame Sum Type
// =============================================================================

/// A decoded KNXnet/IP frame, one variant per tunnelling service.
///
/// Decoding dispatches on the header's service type; encoding dispatches by
/// match. A datagram shorter than the header's declared total length is a
/// decode error, and trailing bytes beyond it are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFrame<'a> {
    ConnectRequest(ConnectRequest),
    ConnectResponse(ConnectResponse),
    ConnectionstateRequest(ConnectionstateRequest),
    ConnectionstateResponse(ConnectionstateResponse),
    DisconnectRequest(DisconnectRequest),
    DisconnectResponse(DisconnectResponse),
    TunnellingRequest(TunnellingRequest<'a>),
    TunnellingAck(TunnellingAck),
}

impl<'a> ServiceFrame<'a> {
    /// Decode a complete KNXnet/IP datagram.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed headers, unknown service types,
    /// truncated bodies, or service bodies that fail their own validation.
    pub fn decode(data: &'a [u8]) -> Result<Self> {
        let header = KnxnetIpHeader::parse(data)?;

        let total = header.total_length as usize;
        if data.len() < total || total < KnxnetIpHeader::SIZE {
            return Err(KnxError::frame_length_mismatch());
        }
        let body = &data[KnxnetIpHeader::SIZE..total];

        match header.service_type {
            ServiceType::ConnectRequest => Ok(Self::ConnectRequest(ConnectRequest::parse(body)?)),
            ServiceType::ConnectResponse => {
                Ok(Self::ConnectResponse(ConnectResponse::parse(body)?))
            }
            ServiceType::ConnectionstateRequest => Ok(Self::ConnectionstateRequest(
                ConnectionstateRequest::parse(body)?,
            )),
            ServiceType::ConnectionstateResponse => Ok(Self::ConnectionstateResponse(
                ConnectionstateResponse::parse(body)?,
            )),
            ServiceType::DisconnectRequest => {
                Ok(Self::DisconnectRequest(DisconnectRequest::parse(body)?))
            }
            ServiceType::DisconnectResponse => {
                Ok(Self::DisconnectResponse(DisconnectResponse::parse(body)?))
            }
            ServiceType::TunnellingRequest => {
                Ok(Self::TunnellingRequest(TunnellingRequest::parse(body)?))
            }
            ServiceType::TunnellingAck => Ok(Self::TunnellingAck(TunnellingAck::parse(body)?)),
        }
    }

    /// Encode the frame into a byte buffer, returning the byte count
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Self::ConnectRequest(f) => f.encode(buf),
            Self::ConnectResponse(f) => f.encode(buf),
            Self::ConnectionstateRequest(f) => f.encode(buf),
            Self::ConnectionstateResponse(f) => f.encode(buf),
            Self::DisconnectRequest(f) => f.encode(buf),
            Self::DisconnectResponse(f) => f.encode(buf),
            Self::TunnellingRequest(f) => f.encode(buf),
            Self::TunnellingAck(f) => f.encode(buf),
        }
    }

    /// The service type of this frame
    pub const fn service_type(&self) -> ServiceType {
        match self {
            Self::ConnectRequest(_) => ServiceType::ConnectRequest,
            Self::ConnectResponse(_) => ServiceType::ConnectResponse,
            Self::ConnectionstateRequest(_) => ServiceType::ConnectionstateRequest,
            Self::ConnectionstateResponse(_) => ServiceType::ConnectionstateResponse,
            Self::DisconnectRequest(_) => ServiceType::DisconnectRequest,
            Self::DisconnectResponse(_) => ServiceType::DisconnectResponse,
            Self::TunnellingRequest(_) => ServiceType::TunnellingRequest,
            Self::TunnellingAck(_) => ServiceType::TunnellingAck,
        }
    }
}
