//! Error types for KNXnet/IP tunnelling operations.
//!
//! One public [`KnxError`] enum covers the whole crate, with one structured
//! error per area (frame, telegram, datapoint, address, transport). Each
//! structured error wraps a kind enum so callers can probe the failure
//! without string matching.

use core::fmt;

/// Result type alias for KNX operations.
pub type Result<T> = core::result::Result<T, KnxError>;

// =============================================================================
// Error Kind Enums
// =============================================================================

/// KNXnet/IP frame codec error variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameErrorKind {
    /// Header length byte is not 0x06
    InvalidHeader,
    /// Protocol version is not 0x10
    UnsupportedVersion,
    /// Service type id is not one of the tunnelling/core services
    UnsupportedServiceType,
    /// Body is shorter than the header's total length claims
    LengthMismatch,
    /// HPAI host protocol code is not IPv4/UDP
    UnsupportedHostProtocol,
    /// CRI/CRD connection type is not TUNNEL_CONNECTION
    UnsupportedConnectionType,
    /// CRI KNX layer is not TUNNEL_LINKLAYER
    UnsupportedKnxLayer,
    /// Status byte maps to no known status code
    UnknownStatus,
    /// Output buffer too small for the encoded frame
    BufferTooSmall,
}

/// cEMI telegram codec error variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramErrorKind {
    /// Message code is not L_Data.req/.ind/.con
    UnsupportedMessageCode,
    /// APCI maps to no group read/response/write service
    UnsupportedService,
    /// Telegram shorter than its length fields claim
    Truncated,
    /// Payload exceeds 253 bytes, or inline value exceeds 6 bits
    PayloadTooLarge,
}

/// Datapoint codec error variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatapointErrorKind {
    /// Value outside the numeric range of the datapoint type
    ValueOutOfRange,
    /// Non-ASCII character where ASCII is required, or Latin-1 conversion
    /// failed
    CharsetViolation,
    /// DPT 16 string exceeds 14 encoded bytes
    StringTooLong,
    /// Input bytes do not form a valid value of the datapoint type
    InvalidData,
    /// Descriptor names no supported datapoint type
    UnsupportedType,
    /// Value variant does not match the datapoint type
    ValueMismatch,
}

/// Address parsing/encoding error variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressErrorKind {
    InvalidIndividualAddress,
    InvalidGroupAddress,
    OutOfRange,
}

/// Transport error variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    BindFailed,
    SendFailed,
    ReceiveFailed,
    Closed,
}

// =============================================================================
// Main Error Type
// =============================================================================

/// KNX protocol error.
///
/// This is the error type returned by all fallible operations in the crate.
/// Codec errors are always returned to the caller; the tunnel state machine
/// never propagates them across the actor boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnxError {
    /// KNXnet/IP frame codec errors (header, HPAI, CRI/CRD, length)
    Frame(FrameError),
    /// cEMI telegram codec errors (message code, APCI, payload)
    Telegram(TelegramError),
    /// Datapoint codec errors (range, charset, descriptor)
    Datapoint(DatapointError),
    /// Address parse/format errors
    Address(AddressError),
    /// UDP transport errors (bind, send, receive)
    Transport(TransportError),
}

// =============================================================================
// Structured Error Types
// =============================================================================

/// Frame codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameError {
    kind: FrameErrorKind,
}

impl FrameError {
    pub(crate) const fn new(kind: FrameErrorKind) -> Self {
        Self { kind }
    }

    /// The precise frame failure
    pub const fn kind(&self) -> FrameErrorKind {
        self.kind
    }

    /// Check if the service type was unknown
    pub fn is_unsupported_service_type(&self) -> bool {
        matches!(self.kind, FrameErrorKind::UnsupportedServiceType)
    }

    /// Check if the body was shorter than the declared total length
    pub fn is_length_mismatch(&self) -> bool {
        matches!(self.kind, FrameErrorKind::LengthMismatch)
    }
}

/// Telegram codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelegramError {
    kind: TelegramErrorKind,
}

impl TelegramError {
    pub(crate) const fn new(kind: TelegramErrorKind) -> Self {
        Self { kind }
    }

    /// The precise telegram failure
    pub const fn kind(&self) -> TelegramErrorKind {
        self.kind
    }

    /// Check if the APCI named no supported group service
    pub fn is_unsupported_service(&self) -> bool {
        matches!(self.kind, TelegramErrorKind::UnsupportedService)
    }
}

/// Datapoint codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatapointError {
    kind: DatapointErrorKind,
}

impl DatapointError {
    pub(crate) const fn new(kind: DatapointErrorKind) -> Self {
        Self { kind }
    }

    /// The precise datapoint failure
    pub const fn kind(&self) -> DatapointErrorKind {
        self.kind
    }

    /// Check if the value was outside the type's numeric range
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind, DatapointErrorKind::ValueOutOfRange)
    }

    /// Check if a character-set rule was violated
    pub fn is_charset_violation(&self) -> bool {
        matches!(self.kind, DatapointErrorKind::CharsetViolation)
    }
}

/// Address error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressError {
    kind: AddressErrorKind,
}

impl AddressError {
    pub(crate) const fn new(kind: AddressErrorKind) -> Self {
        Self { kind }
    }

    /// The precise address failure
    pub const fn kind(&self) -> AddressErrorKind {
        self.kind
    }

    /// Check if an address component was out of range
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind, AddressErrorKind::OutOfRange)
    }
}

/// Transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportError {
    kind: TransportErrorKind,
}

impl TransportError {
    pub(crate) const fn new(kind: TransportErrorKind) -> Self {
        Self { kind }
    }

    /// The precise transport failure
    pub const fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

// =============================================================================
// Convenience Constructors
// =============================================================================

impl KnxError {
    // Frame errors
    #[inline]
    pub(crate) const fn invalid_header() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::InvalidHeader))
    }

    #[inline]
    pub(crate) const fn unsupported_version() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::UnsupportedVersion))
    }

    #[inline]
    pub(crate) const fn unsupported_service_type() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::UnsupportedServiceType))
    }

    #[inline]
    pub(crate) const fn frame_length_mismatch() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::LengthMismatch))
    }

    #[inline]
    pub(crate) const fn unsupported_host_protocol() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::UnsupportedHostProtocol))
    }

    #[inline]
    pub(crate) const fn unsupported_connection_type() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::UnsupportedConnectionType))
    }

    #[inline]
    pub(crate) const fn unsupported_knx_layer() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::UnsupportedKnxLayer))
    }

    #[inline]
    pub(crate) const fn unknown_status() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::UnknownStatus))
    }

    #[inline]
    pub(crate) const fn buffer_too_small() -> Self {
        Self::Frame(FrameError::new(FrameErrorKind::BufferTooSmall))
    }

    // Telegram errors
    #[inline]
    pub(crate) const fn unsupported_message_code() -> Self {
        Self::Telegram(TelegramError::new(TelegramErrorKind::UnsupportedMessageCode))
    }

    #[inline]
    pub(crate) const fn unsupported_service() -> Self {
        Self::Telegram(TelegramError::new(TelegramErrorKind::UnsupportedService))
    }

    #[inline]
    pub(crate) const fn telegram_truncated() -> Self {
        Self::Telegram(TelegramError::new(TelegramErrorKind::Truncated))
    }

    #[inline]
    pub(crate) const fn payload_too_large() -> Self {
        Self::Telegram(TelegramError::new(TelegramErrorKind::PayloadTooLarge))
    }

    // Datapoint errors
    #[inline]
    pub(crate) const fn dpt_value_out_of_range() -> Self {
        Self::Datapoint(DatapointError::new(DatapointErrorKind::ValueOutOfRange))
    }

    #[inline]
    pub(crate) const fn dpt_charset_violation() -> Self {
        Self::Datapoint(DatapointError::new(DatapointErrorKind::CharsetViolation))
    }

    #[inline]
    pub(crate) const fn dpt_string_too_long() -> Self {
        Self::Datapoint(DatapointError::new(DatapointErrorKind::StringTooLong))
    }

    #[inline]
    pub(crate) const fn invalid_dpt_data() -> Self {
        Self::Datapoint(DatapointError::new(DatapointErrorKind::InvalidData))
    }

    #[inline]
    pub(crate) const fn unsupported_dpt() -> Self {
        Self::Datapoint(DatapointError::new(DatapointErrorKind::UnsupportedType))
    }

    #[inline]
    pub(crate) const fn dpt_value_mismatch() -> Self {
        Self::Datapoint(DatapointError::new(DatapointErrorKind::ValueMismatch))
    }

    // Address errors
    #[inline]
    pub(crate) const fn invalid_individual_address() -> Self {
        Self::Address(AddressError::new(AddressErrorKind::InvalidIndividualAddress))
    }

    #[inline]
    pub(crate) const fn invalid_group_address() -> Self {
        Self::Address(AddressError::new(AddressErrorKind::InvalidGroupAddress))
    }

    #[inline]
    pub(crate) const fn address_out_of_range() -> Self {
        Self::Address(AddressError::new(AddressErrorKind::OutOfRange))
    }

    // Transport errors
    #[inline]
    pub(crate) const fn bind_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::BindFailed))
    }

    #[inline]
    pub(crate) const fn send_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::SendFailed))
    }

    #[inline]
    pub(crate) const fn receive_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::ReceiveFailed))
    }

    #[inline]
    pub(crate) const fn transport_closed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::Closed))
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

impl fmt::Display for KnxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnxError::Frame(e) => write!(f, "Frame error: {:?}", e.kind),
            KnxError::Telegram(e) => write!(f, "Telegram error: {:?}", e.kind),
            KnxError::Datapoint(e) => write!(f, "Datapoint error: {:?}", e.kind),
            KnxError::Address(e) => write!(f, "Address error: {:?}", e.kind),
            KnxError::Transport(e) => write!(f, "Transport error: {:?}", e.kind),
        }
    }
}

impl std::error::Error for KnxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_probes() {
        let err = KnxError::frame_length_mismatch();
        match err {
            KnxError::Frame(e) => assert!(e.is_length_mismatch()),
            _ => panic!("wrong category"),
        }

        let err = KnxError::dpt_value_out_of_range();
        match err {
            KnxError::Datapoint(e) => assert!(e.is_out_of_range()),
            _ => panic!("wrong category"),
        }
    }

    #[test]
    fn test_display() {
        let err = KnxError::unsupported_service_type();
        assert_eq!(format!("{}", err), "Frame error: UnsupportedServiceType");
    }
}
