//! KNXnet/IP protocol constants and symbolic registries.
//!
//! Every wire-level code used by the tunnelling protocol lives here, each
//! with a bidirectional mapping: `from_u8`/`as_u8` for the byte form and
//! `name`/`from_name` for the symbolic form used in logs and diagnostics.
//! Unknown bytes return `None` and surface as decode errors at the call
//! sites rather than mapping silently to a default.

/// KNXnet/IP protocol version 1.0
pub const KNXNETIP_VERSION_10: u8 = 0x10;

/// Standard KNXnet/IP header length (6 bytes)
pub const HEADER_SIZE_10: u8 = 0x06;

/// Standard UDP port for KNXnet/IP communication
pub const KNXNETIP_DEFAULT_PORT: u16 = 3671;

/// Maximum size of a KNXnet/IP frame
pub const MAX_FRAME_SIZE: usize = 512;

/// Maximum cEMI telegram payload (bytes following the APCI octet)
pub const MAX_TELEGRAM_PAYLOAD: usize = 253;

// =============================================================================
// Service Type Identifiers
// =============================================================================

/// Service type constant for CONNECT_REQUEST (0x0205)
pub const SERVICE_CONNECT_REQUEST: u16 = 0x0205;
/// Service type constant for CONNECT_RESPONSE (0x0206)
pub const SERVICE_CONNECT_RESPONSE: u16 = 0x0206;
/// Service type constant for CONNECTIONSTATE_REQUEST (0x0207)
pub const SERVICE_CONNECTIONSTATE_REQUEST: u16 = 0x0207;
/// Service type constant for CONNECTIONSTATE_RESPONSE (0x0208)
pub const SERVICE_CONNECTIONSTATE_RESPONSE: u16 = 0x0208;
/// Service type constant for DISCONNECT_REQUEST (0x0209)
pub const SERVICE_DISCONNECT_REQUEST: u16 = 0x0209;
/// Service type constant for DISCONNECT_RESPONSE (0x020A)
pub const SERVICE_DISCONNECT_RESPONSE: u16 = 0x020A;
/// Service type constant for TUNNELLING_REQUEST (0x0420)
pub const SERVICE_TUNNELLING_REQUEST: u16 = 0x0420;
/// Service type constant for TUNNELLING_ACK (0x0421)
pub const SERVICE_TUNNELLING_ACK: u16 = 0x0421;

/// KNXnet/IP service type identifiers (tunnelling subset)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ServiceType {
    /// `CONNECT_REQUEST` - Connection request
    ConnectRequest = 0x0205,
    /// `CONNECT_RESPONSE` - Connection response
    ConnectResponse = 0x0206,
    /// `CONNECTIONSTATE_REQUEST` - Connection state request (heartbeat)
    ConnectionstateRequest = 0x0207,
    /// `CONNECTIONSTATE_RESPONSE` - Connection state response
    ConnectionstateResponse = 0x0208,
    /// `DISCONNECT_REQUEST` - Disconnect request
    DisconnectRequest = 0x0209,
    /// `DISCONNECT_RESPONSE` - Disconnect response
    DisconnectResponse = 0x020A,
    /// `TUNNELLING_REQUEST` - Tunnelling data request
    TunnellingRequest = 0x0420,
    /// `TUNNELLING_ACK` - Tunnelling acknowledgement
    TunnellingAck = 0x0421,
}

impl ServiceType {
    /// Convert a u16 to `ServiceType`
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0205 => Some(Self::ConnectRequest),
            0x0206 => Some(Self::ConnectResponse),
            0x0207 => Some(Self::ConnectionstateRequest),
            0x0208 => Some(Self::ConnectionstateResponse),
            0x0209 => Some(Self::DisconnectRequest),
            0x020A => Some(Self::DisconnectResponse),
            0x0420 => Some(Self::TunnellingRequest),
            0x0421 => Some(Self::TunnellingAck),
            _ => None,
        }
    }

    /// Convert `ServiceType` to u16
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

// =============================================================================
// Status Codes
// =============================================================================

/// KNXnet/IP status codes carried in Connect/Connectionstate/Disconnect
/// responses and tunnelling acknowledgements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StatusCode {
    /// Operation successful
    #[default]
    NoError = 0x00,
    /// Requested host protocol not supported
    HostProtocolType = 0x01,
    /// Requested protocol version not supported
    VersionNotSupported = 0x02,
    /// Received sequence number out of order
    SequenceNumber = 0x04,
    /// No active connection with the given channel id
    ConnectionId = 0x21,
    /// Requested connection type not supported
    ConnectionType = 0x22,
    /// Requested connection option not supported
    ConnectionOption = 0x23,
    /// Server cannot accept another connection
    NoMoreConnections = 0x24,
    /// Error in the data connection for the channel
    DataConnection = 0x26,
    /// Error in the KNX subnetwork connection for the channel
    KnxConnection = 0x27,
    /// Requested tunnelling layer not supported
    TunnellingLayer = 0x29,
}

impl StatusCode {
    /// Convert a u8 to `StatusCode`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::NoError),
            0x01 => Some(Self::HostProtocolType),
            0x02 => Some(Self::VersionNotSupported),
            0x04 => Some(Self::SequenceNumber),
            0x21 => Some(Self::ConnectionId),
            0x22 => Some(Self::ConnectionType),
            0x23 => Some(Self::ConnectionOption),
            0x24 => Some(Self::NoMoreConnections),
            0x26 => Some(Self::DataConnection),
            0x27 => Some(Self::KnxConnection),
            0x29 => Some(Self::TunnellingLayer),
            _ => None,
        }
    }

    /// Convert `StatusCode` to u8
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Symbolic name of the status code
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoError => "e_no_error",
            Self::HostProtocolType => "e_host_protocol_type",
            Self::VersionNotSupported => "e_version_not_supported",
            Self::SequenceNumber => "e_sequence_number",
            Self::ConnectionId => "e_connection_id",
            Self::ConnectionType => "e_connection_type",
            Self::ConnectionOption => "e_connection_option",
            Self::NoMoreConnections => "e_no_more_connections",
            Self::DataConnection => "e_data_connection",
            Self::KnxConnection => "e_knx_connection",
            Self::TunnellingLayer => "e_tunnelling_layer",
        }
    }

    /// Look up a status code by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "e_no_error" => Some(Self::NoError),
            "e_host_protocol_type" => Some(Self::HostProtocolType),
            "e_version_not_supported" => Some(Self::VersionNotSupported),
            "e_sequence_number" => Some(Self::SequenceNumber),
            "e_connection_id" => Some(Self::ConnectionId),
            "e_connection_type" => Some(Self::ConnectionType),
            "e_connection_option" => Some(Self::ConnectionOption),
            "e_no_more_connections" => Some(Self::NoMoreConnections),
            "e_data_connection" => Some(Self::DataConnection),
            "e_knx_connection" => Some(Self::KnxConnection),
            "e_tunnelling_layer" => Some(Self::TunnellingLayer),
            _ => None,
        }
    }

    /// Check for `e_no_error`
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::NoError)
    }
}

// =============================================================================
// Connection Types
// =============================================================================

/// KNXnet/IP connection type codes (CRI/CRD)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionType {
    /// Device management connection
    DeviceMgmt = 0x03,
    /// Tunnelling connection (the only type this client establishes)
    Tunnel = 0x04,
    /// Remote logging connection
    RemoteLogging = 0x06,
    /// Remote configuration connection
    RemoteConfig = 0x07,
    /// Object server connection
    ObjectServer = 0x08,
}

impl ConnectionType {
    /// Convert a u8 to `ConnectionType`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x03 => Some(Self::DeviceMgmt),
            0x04 => Some(Self::Tunnel),
            0x06 => Some(Self::RemoteLogging),
            0x07 => Some(Self::RemoteConfig),
            0x08 => Some(Self::ObjectServer),
            _ => None,
        }
    }

    /// Convert `ConnectionType` to u8
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Symbolic name of the connection type
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeviceMgmt => "device_mgmt_connection",
            Self::Tunnel => "tunnel_connection",
            Self::RemoteLogging => "remlog_connection",
            Self::RemoteConfig => "remconf_connection",
            Self::ObjectServer => "objsvr_connection",
        }
    }

    /// Look up a connection type by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "device_mgmt_connection" => Some(Self::DeviceMgmt),
            "tunnel_connection" => Some(Self::Tunnel),
            "remlog_connection" => Some(Self::RemoteLogging),
            "remconf_connection" => Some(Self::RemoteConfig),
            "objsvr_connection" => Some(Self::ObjectServer),
            _ => None,
        }
    }
}

// =============================================================================
// Host Protocol Codes
// =============================================================================

/// HPAI host protocol codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HostProtocol {
    /// IPv4 over UDP (the only protocol this client supports)
    Ipv4Udp = 0x01,
    /// IPv4 over TCP
    Ipv4Tcp = 0x02,
}

impl HostProtocol {
    /// Convert a u8 to `HostProtocol`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Ipv4Udp),
            0x02 => Some(Self::Ipv4Tcp),
            _ => None,
        }
    }

    /// Convert `HostProtocol` to u8
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Symbolic name of the host protocol
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ipv4Udp => "ipv4_udp",
            Self::Ipv4Tcp => "ipv4_tcp",
        }
    }

    /// Look up a host protocol by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ipv4_udp" => Some(Self::Ipv4Udp),
            "ipv4_tcp" => Some(Self::Ipv4Tcp),
            _ => None,
        }
    }
}

// =============================================================================
// KNX Layers
// =============================================================================

/// KNX layer codes carried in the tunnelling CRI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KnxLayer {
    /// Link layer tunnel (the only layer this client requests)
    LinkLayer = 0x02,
    /// Raw tunnel
    Raw = 0x04,
    /// Busmonitor tunnel
    Busmonitor = 0x80,
}

impl KnxLayer {
    /// Convert a u8 to `KnxLayer`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x02 => Some(Self::LinkLayer),
            0x04 => Some(Self::Raw),
            0x80 => Some(Self::Busmonitor),
            _ => None,
        }
    }

    /// Convert `KnxLayer` to u8
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Symbolic name of the KNX layer
    pub const fn name(self) -> &'static str {
        match self {
            Self::LinkLayer => "tunnel_linklayer",
            Self::Raw => "tunnel_raw",
            Self::Busmonitor => "tunnel_busmonitor",
        }
    }

    /// Look up a KNX layer by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tunnel_linklayer" => Some(Self::LinkLayer),
            "tunnel_raw" => Some(Self::Raw),
            "tunnel_busmonitor" => Some(Self::Busmonitor),
            _ => None,
        }
    }
}

// =============================================================================
// cEMI Message Codes
// =============================================================================

/// cEMI message codes (L_Data subset carried over the tunnel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageCode {
    /// `L_Data.req` - Data request (client to bus)
    LDataReq = 0x11,
    /// `L_Data.ind` - Data indication (bus to client)
    LDataInd = 0x29,
    /// `L_Data.con` - Data confirmation
    LDataCon = 0x2E,
}

impl MessageCode {
    /// Convert a u8 to `MessageCode`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x11 => Some(Self::LDataReq),
            0x29 => Some(Self::LDataInd),
            0x2E => Some(Self::LDataCon),
            _ => None,
        }
    }

    /// Convert `MessageCode` to u8
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Symbolic name of the message code
    pub const fn name(self) -> &'static str {
        match self {
            Self::LDataReq => "l_data_req",
            Self::LDataInd => "l_data_ind",
            Self::LDataCon => "l_data_con",
        }
    }

    /// Look up a message code by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "l_data_req" => Some(Self::LDataReq),
            "l_data_ind" => Some(Self::LDataInd),
            "l_data_con" => Some(Self::LDataCon),
            _ => None,
        }
    }
}

// =============================================================================
// Group Services (APCI)
// =============================================================================

/// KNX application services carried by group telegrams.
///
/// The two-bit APCI value sits in the high bits of the APCI octet:
/// `0` = read, `1` = response, `2` = write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GroupService {
    /// `A_GroupValue_Read`
    Read = 0,
    /// `A_GroupValue_Response`
    Response = 1,
    /// `A_GroupValue_Write`
    Write = 2,
}

impl GroupService {
    /// Convert an APCI value to `GroupService`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Read),
            1 => Some(Self::Response),
            2 => Some(Self::Write),
            _ => None,
        }
    }

    /// Convert `GroupService` to its APCI value
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Symbolic name of the service
    pub const fn name(self) -> &'static str {
        match self {
            Self::Read => "group_read",
            Self::Response => "group_response",
            Self::Write => "group_write",
        }
    }

    /// Look up a service by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "group_read" => Some(Self::Read),
            "group_response" => Some(Self::Response),
            "group_write" => Some(Self::Write),
            _ => None,
        }
    }
}
