//! DPT 5.xxx - 8-bit unsigned (0-255)
//!
//! Percentages, angles, counters.
//!
//! ```text
//! Encoding: UUUUUUUU
//! ```

use crate::error::{KnxError, Result};

/// Maximum encodable value
pub const MAX: u32 = 255;

/// Encode an unsigned value.
///
/// # Errors
///
/// Returns a range error above 255.
pub fn encode(value: u32) -> Result<[u8; 1]> {
    if value > MAX {
        return Err(KnxError::dpt_value_out_of_range());
    }
    Ok([value as u8])
}

/// Decode an unsigned value.
///
/// A 6-bit inline zero is accepted alongside the full byte form.
pub fn decode(data: &[u8]) -> Result<u32> {
    match data {
        [byte] => Ok(u32::from(*byte)),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(0).unwrap(), [0x00]);
        assert_eq!(encode(255).unwrap(), [0xFF]);
        assert_eq!(encode(100).unwrap(), [0x64]);
    }

    #[test]
    fn test_encode_out_of_range() {
        assert!(encode(256).is_err());
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(&[0x64]).unwrap(), 100);
        assert_eq!(decode(&[0x00]).unwrap(), 0);
    }

    #[test]
    fn test_round_trip() {
        for value in [0u32, 1, 63, 64, 128, 255] {
            let bytes = encode(value).unwrap();
            assert_eq!(decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_invalid_length() {
        assert!(decode(&[]).is_err());
        assert!(decode(&[0x00, 0x01]).is_err());
    }
}
