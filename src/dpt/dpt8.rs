//! DPT 8.xxx - 16-bit signed (-32768..32767)
//!
//! Deltas and differences.
//!
//! ```text
//! Encoding: SVVVVVVV VVVVVVVV  (big-endian two's complement)
//! ```

use crate::error::{KnxError, Result};

/// Encode a signed value.
///
/// # Errors
///
/// Returns a range error outside -32768..32767.
pub fn encode(value: i32) -> Result<[u8; 2]> {
    let value = i16::try_from(value).map_err(|_| KnxError::dpt_value_out_of_range())?;
    Ok(value.to_be_bytes())
}

/// Decode a signed value
pub fn decode(data: &[u8]) -> Result<i32> {
    match data {
        [hi, lo] => Ok(i32::from(i16::from_be_bytes([*hi, *lo]))),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(-1).unwrap(), [0xFF, 0xFF]);
        assert_eq!(encode(-32_768).unwrap(), [0x80, 0x00]);
        assert_eq!(encode(32_767).unwrap(), [0x7F, 0xFF]);
    }

    #[test]
    fn test_encode_out_of_range() {
        assert!(encode(32_768).is_err());
        assert!(encode(-32_769).is_err());
    }

    #[test]
    fn test_round_trip() {
        for value in [-32_768i32, -1000, -1, 0, 1, 1000, 32_767] {
            let bytes = encode(value).unwrap();
            assert_eq!(decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_invalid_length() {
        assert!(decode(&[0x01]).is_err());
    }
}
