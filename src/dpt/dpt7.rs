//! DPT 7.xxx - 16-bit unsigned (0-65535)
//!
//! Pulse counts, time periods, brightness.
//!
//! ```text
//! Encoding: UUUUUUUU UUUUUUUU  (big-endian)
//! ```

use crate::error::{KnxError, Result};

/// Maximum encodable value
pub const MAX: u32 = 65_535;

/// Encode an unsigned value.
///
/// # Errors
///
/// Returns a range error above 65535.
pub fn encode(value: u32) -> Result<[u8; 2]> {
    let value = u16::try_from(value).map_err(|_| KnxError::dpt_value_out_of_range())?;
    Ok(value.to_be_bytes())
}

/// Decode an unsigned value
pub fn decode(data: &[u8]) -> Result<u32> {
    match data {
        [hi, lo] => Ok(u32::from(u16::from_be_bytes([*hi, *lo]))),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(5000).unwrap(), [0x13, 0x88]);
        assert_eq!(encode(65_535).unwrap(), [0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_out_of_range() {
        assert!(encode(65_536).is_err());
    }

    #[test]
    fn test_round_trip() {
        for value in [0u32, 1, 255, 256, 5000, 65_535] {
            let bytes = encode(value).unwrap();
            assert_eq!(decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_invalid_length() {
        assert!(decode(&[0x01]).is_err());
        assert!(decode(&[0x01, 0x02, 0x03]).is_err());
    }
}
