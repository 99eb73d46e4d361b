//! Common External Message Interface (cEMI) telegram codec.
//!
//! cEMI is the framing used for KNX telegrams inside KNXnet/IP tunnelling
//! bodies. This module encodes and decodes the `L_Data.req/.ind/.con`
//! frames carrying group read/response/write services.
//!
//! ## Frame Structure
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Message Code (1 byte)                    │
//! ├──────────────────────────────────────────┤
//! │ Additional Info Length (1 byte)          │
//! ├──────────────────────────────────────────┤
//! │ Additional Info (variable, skipped)      │
//! ├──────────────────────────────────────────┤
//! │ Control Field 1 (1 byte, 0xBC on encode) │
//! │ Control Field 2 (1 byte, 0xE0 on encode) │
//! │ Source Address (2 bytes)                 │
//! │ Destination Address (2 bytes)            │
//! │ Data Length (1 byte) = TPDU bytes - 1    │
//! │ TPCI/APCI (2 bytes)                      │
//! │ Data (variable)                          │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Values of at most 6 bits ride inline in the low bits of the APCI octet
//! with a data length of 1; larger values follow the APCI octet as plain
//! bytes with a data length of 1 + n.

use crate::addressing::{GroupAddress, IndividualAddress};
use crate::error::{KnxError, Result};
use crate::protocol::constants::{GroupService, MessageCode, MAX_TELEGRAM_PAYLOAD};

/// Control field 1 emitted on encode: standard frame, no repeat,
/// broadcast, low priority.
const CTRL1_STANDARD: u8 = 0xBC;

/// Control field 2 emitted on encode: group destination, hop count 6.
const CTRL2_GROUP_HOP6: u8 = 0xE0;

/// Direction of a telegram through the tunnel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramKind {
    /// `L_Data.req` - client to bus
    Request,
    /// `L_Data.ind` - bus to client
    Indication,
    /// `L_Data.con` - bus confirmation of a request
    Confirmation,
}

impl TelegramKind {
    /// The cEMI message code for this kind
    pub const fn message_code(self) -> MessageCode {
        match self {
            Self::Request => MessageCode::LDataReq,
            Self::Indication => MessageCode::LDataInd,
            Self::Confirmation => MessageCode::LDataCon,
        }
    }

    const fn from_message_code(code: MessageCode) -> Self {
        match code {
            MessageCode::LDataReq => Self::Request,
            MessageCode::LDataInd => Self::Indication,
            MessageCode::LDataCon => Self::Confirmation,
        }
    }
}

/// Application payload of a group telegram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramPayload {
    /// Value of at most 6 bits, carried inline in the APCI octet
    Inline(u8),
    /// Byte payload following the APCI octet (up to 253 bytes)
    Data(Vec<u8>),
}

impl TelegramPayload {
    /// Number of TPDU bytes past the TPCI octet
    fn tpdu_len(&self) -> usize {
        match self {
            Self::Inline(_) => 1,
            Self::Data(bytes) => 1 + bytes.len(),
        }
    }
}

/// A KNX group telegram.
///
/// # Examples
///
/// ```
/// use knx_tunnel::protocol::cemi::{Telegram, TelegramKind, TelegramPayload};
/// use knx_tunnel::protocol::constants::GroupService;
///
/// let telegram = Telegram {
///     kind: TelegramKind::Request,
///     source: "1.1.1".parse().unwrap(),
///     destination: "0/0/3".parse().unwrap(),
///     service: GroupService::Write,
///     payload: TelegramPayload::Inline(1),
/// };
///
/// let mut buf = [0u8; 32];
/// let len = telegram.encode(&mut buf).unwrap();
/// let decoded = Telegram::decode(&buf[..len]).unwrap();
/// assert_eq!(decoded, telegram);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    /// Frame direction (request/indication/confirmation)
    pub kind: TelegramKind,
    /// Source individual address
    pub source: IndividualAddress,
    /// Destination group address
    pub destination: GroupAddress,
    /// Group service (read/response/write)
    pub service: GroupService,
    /// Application payload
    pub payload: TelegramPayload,
}

impl Telegram {
    /// Minimum size of a decodable telegram: message code, additional info
    /// length, two control fields, source, destination, data length, TPCI
    /// and APCI octets.
    pub const MIN_SIZE: usize = 11;

    /// Create a group write request
    pub fn group_write(
        source: IndividualAddress,
        destination: GroupAddress,
        payload: TelegramPayload,
    ) -> Self {
        Self {
            kind: TelegramKind::Request,
            source,
            destination,
            service: GroupService::Write,
            payload,
        }
    }

    /// Create a group read request
    pub fn group_read(source: IndividualAddress, destination: GroupAddress) -> Self {
        Self {
            kind: TelegramKind::Request,
            source,
            destination,
            service: GroupService::Read,
            payload: TelegramPayload::Inline(0),
        }
    }

    /// Create a group response
    pub fn group_response(
        source: IndividualAddress,
        destination: GroupAddress,
        payload: TelegramPayload,
    ) -> Self {
        Self {
            kind: TelegramKind::Request,
            source,
            destination,
            service: GroupService::Response,
            payload,
        }
    }

    /// Total encoded size of this telegram
    pub fn size(&self) -> usize {
        // mc + add_info_len + ctrl1 + ctrl2 + src(2) + dst(2) + len + tpci
        9 + self.payload.tpdu_len()
    }

    /// Encode the telegram into a byte buffer.
    ///
    /// Emits zero additional-info bytes and the fixed control fields
    /// `0xBC`/`0xE0`.
    ///
    /// # Errors
    ///
    /// Returns a payload-too-large error for inline values above 6 bits or
    /// byte payloads above 253 bytes, and a buffer-too-small error if the
    /// output does not fit.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        match &self.payload {
            TelegramPayload::Inline(value) if *value > 0x3F => {
                return Err(KnxError::payload_too_large());
            }
            TelegramPayload::Data(bytes) if bytes.len() > MAX_TELEGRAM_PAYLOAD => {
                return Err(KnxError::payload_too_large());
            }
            _ => {}
        }

        let size = self.size();
        if buf.len() < size {
            return Err(KnxError::buffer_too_small());
        }

        buf[0] = self.kind.message_code().as_u8();
        buf[1] = 0x00; // no additional info
        buf[2] = CTRL1_STANDARD;
        buf[3] = CTRL2_GROUP_HOP6;
        buf[4..6].copy_from_slice(&self.source.raw().to_be_bytes());
        buf[6..8].copy_from_slice(&self.destination.raw().to_be_bytes());
        buf[8] = self.payload.tpdu_len() as u8;
        buf[9] = 0x00; // TPCI: unnumbered data

        let apci_high = self.service.as_u8() << 6;
        match &self.payload {
            TelegramPayload::Inline(value) => {
                buf[10] = apci_high | value;
            }
            TelegramPayload::Data(bytes) => {
                buf[10] = apci_high;
                buf[11..11 + bytes.len()].copy_from_slice(bytes);
            }
        }

        Ok(size)
    }

    /// Encode into a fresh byte vector
    pub fn encode_vec(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size()];
        let len = self.encode(&mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    /// Decode a telegram from bytes.
    ///
    /// Skips the additional-info block and ignores the control fields.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown message codes, APCIs that map to no
    /// group service, or telegrams shorter than their length fields claim.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(KnxError::telegram_truncated());
        }

        let code =
            MessageCode::from_u8(data[0]).ok_or_else(KnxError::unsupported_message_code)?;
        let kind = TelegramKind::from_message_code(code);

        // Service information starts past the additional info block
        let info = 2 + data[1] as usize;
        if data.len() < info + 8 {
            return Err(KnxError::telegram_truncated());
        }

        let source = IndividualAddress::from(u16::from_be_bytes([data[info + 2], data[info + 3]]));
        let destination = GroupAddress::from(u16::from_be_bytes([data[info + 4], data[info + 5]]));

        let tpdu_len = data[info + 6] as usize;
        if tpdu_len == 0 {
            return Err(KnxError::telegram_truncated());
        }
        let tpdu_end = info + 8 + tpdu_len;
        if data.len() < tpdu_end {
            return Err(KnxError::telegram_truncated());
        }

        let tpci_byte = data[info + 7];
        let apci_byte = data[info + 8];
        let apci = ((tpci_byte & 0x03) << 2) | ((apci_byte & 0xC0) >> 6);
        let service = GroupService::from_u8(apci).ok_or_else(KnxError::unsupported_service)?;

        let payload = if tpdu_len == 1 {
            TelegramPayload::Inline(apci_byte & 0x3F)
        } else {
            TelegramPayload::Data(data[info + 9..tpdu_end].to_vec())
        };

        Ok(Self {
            kind,
            source,
            destination,
            service,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_group_write_bytes() {
        // L_Data.ind, group_write, 1.1.1 -> 0/0/3, value 0x1917
        let telegram = Telegram {
            kind: TelegramKind::Indication,
            source: IndividualAddress::new(1, 1, 1).unwrap(),
            destination: GroupAddress::new(0, 0, 3).unwrap(),
            service: GroupService::Write,
            payload: TelegramPayload::Data(vec![0x19, 0x17]),
        };

        let encoded = telegram.encode_vec().unwrap();
        let expected: [u8; 13] = [
            0x29, 0x00, 0xBC, 0xE0, 0x11, 0x01, 0x00, 0x03, 0x03, 0x00, 0x80, 0x19, 0x17,
        ];
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_encode_inline_write() {
        // Switch-on to 1/2/3 rides inline in the APCI octet
        let telegram = Telegram::group_write(
            IndividualAddress::new(1, 1, 1).unwrap(),
            GroupAddress::new(1, 2, 3).unwrap(),
            TelegramPayload::Inline(1),
        );

        let encoded = telegram.encode_vec().unwrap();
        assert_eq!(
            encoded,
            [0x11, 0x00, 0xBC, 0xE0, 0x11, 0x01, 0x0A, 0x03, 0x01, 0x00, 0x81]
        );
    }

    #[test]
    fn test_encode_group_read() {
        let telegram = Telegram::group_read(
            IndividualAddress::new(1, 2, 5).unwrap(),
            GroupAddress::new(5, 6, 7).unwrap(),
        );

        let encoded = telegram.encode_vec().unwrap();
        assert_eq!(
            encoded,
            [0x11, 0x00, 0xBC, 0xE0, 0x12, 0x05, 0x2E, 0x07, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn test_decode_group_write_inline() {
        let data = [0x29, 0x00, 0xBC, 0xE0, 0x11, 0x01, 0x0A, 0x03, 0x01, 0x00, 0x81];
        let telegram = Telegram::decode(&data).unwrap();

        assert_eq!(telegram.kind, TelegramKind::Indication);
        assert_eq!(telegram.source.to_string(), "1.1.1");
        assert_eq!(telegram.destination.to_string(), "1/2/3");
        assert_eq!(telegram.service, GroupService::Write);
        assert_eq!(telegram.payload, TelegramPayload::Inline(1));
    }

    #[test]
    fn test_decode_group_response_bytes() {
        let data = [
            0x29, 0x00, 0xBC, 0xE0, 0x11, 0x01, 0x00, 0x03, 0x03, 0x00, 0x40, 0x0D, 0xDC,
        ];
        let telegram = Telegram::decode(&data).unwrap();
        assert_eq!(telegram.service, GroupService::Response);
        assert_eq!(telegram.payload, TelegramPayload::Data(vec![0x0D, 0xDC]));
    }

    #[test]
    fn test_decode_skips_additional_info() {
        let data = [
            0x29, 0x04, // 4 bytes additional info follow
            0x01, 0x02, 0x03, 0x04, // additional info (skipped)
            0xBC, 0xE0, 0x11, 0x01, 0x0A, 0x03, 0x01, 0x00, 0x80,
        ];
        let telegram = Telegram::decode(&data).unwrap();
        assert_eq!(telegram.destination.to_string(), "1/2/3");
        assert_eq!(telegram.payload, TelegramPayload::Inline(0));
    }

    #[test]
    fn test_decode_ignores_control_fields() {
        // Nonstandard control fields still decode
        let data = [0x2E, 0x00, 0x00, 0x00, 0x11, 0x01, 0x0A, 0x03, 0x01, 0x00, 0x82];
        let telegram = Telegram::decode(&data).unwrap();
        assert_eq!(telegram.kind, TelegramKind::Confirmation);
        assert_eq!(telegram.payload, TelegramPayload::Inline(2));
    }

    #[test]
    fn test_round_trip_all_kinds() {
        for kind in [
            TelegramKind::Request,
            TelegramKind::Indication,
            TelegramKind::Confirmation,
        ] {
            let telegram = Telegram {
                kind,
                source: IndividualAddress::new(2, 3, 4).unwrap(),
                destination: GroupAddress::new(10, 5, 200).unwrap(),
                service: GroupService::Response,
                payload: TelegramPayload::Data(vec![0xDE, 0xAD, 0xBE, 0xEF]),
            };
            let encoded = telegram.encode_vec().unwrap();
            assert_eq!(Telegram::decode(&encoded).unwrap(), telegram);
        }
    }

    #[test]
    fn test_round_trip_inline_boundary() {
        // 0x3F is the largest inline value
        let telegram = Telegram::group_write(
            IndividualAddress::new(1, 1, 1).unwrap(),
            GroupAddress::new(1, 2, 3).unwrap(),
            TelegramPayload::Inline(0x3F),
        );
        let encoded = telegram.encode_vec().unwrap();
        assert_eq!(Telegram::decode(&encoded).unwrap(), telegram);
    }

    #[test]
    fn test_encode_inline_too_large() {
        let telegram = Telegram::group_write(
            IndividualAddress::new(1, 1, 1).unwrap(),
            GroupAddress::new(1, 2, 3).unwrap(),
            TelegramPayload::Inline(0x40),
        );
        assert!(telegram.encode_vec().is_err());
    }

    #[test]
    fn test_encode_payload_too_large() {
        let telegram = Telegram::group_write(
            IndividualAddress::new(1, 1, 1).unwrap(),
            GroupAddress::new(1, 2, 3).unwrap(),
            TelegramPayload::Data(vec![0u8; 254]),
        );
        assert!(telegram.encode_vec().is_err());

        let telegram = Telegram::group_write(
            IndividualAddress::new(1, 1, 1).unwrap(),
            GroupAddress::new(1, 2, 3).unwrap(),
            TelegramPayload::Data(vec![0u8; 253]),
        );
        assert!(telegram.encode_vec().is_ok());
    }

    #[test]
    fn test_decode_unknown_message_code() {
        let data = [0xFF, 0x00, 0xBC, 0xE0, 0x11, 0x01, 0x0A, 0x03, 0x01, 0x00, 0x80];
        assert!(Telegram::decode(&data).is_err());
    }

    #[test]
    fn test_decode_unknown_apci() {
        // APCI bits name a memory service, not a group service
        let data = [0x29, 0x00, 0xBC, 0xE0, 0x11, 0x01, 0x0A, 0x03, 0x01, 0x02, 0x80];
        let err = Telegram::decode(&data).unwrap_err();
        match err {
            KnxError::Telegram(e) => assert!(e.is_unsupported_service()),
            _ => panic!("wrong category"),
        }
    }

    #[test]
    fn test_decode_truncated() {
        let data = [0x29, 0x00, 0xBC, 0xE0, 0x11];
        assert!(Telegram::decode(&data).is_err());

        // Data length claims more bytes than present
        let data = [0x29, 0x00, 0xBC, 0xE0, 0x11, 0x01, 0x0A, 0x03, 0x05, 0x00, 0x80];
        assert!(Telegram::decode(&data).is_err());
    }
}
