//! DPT 6.xxx - 8-bit signed (-128..127)
//!
//! Percent deviations and relative counts, plus the 6.020 status/mode
//! composite.
//!
//! ```text
//! 6.xxx:  SVVVVVVV  (two's complement)
//! 6.020:  ABCDEFFF  (five status bits + 3-bit mode, mode in {0, 2, 4})
//! ```

use crate::error::{KnxError, Result};

/// Encode a signed value.
///
/// # Errors
///
/// Returns a range error outside -128..127.
pub fn encode(value: i32) -> Result<[u8; 1]> {
    let value = i8::try_from(value).map_err(|_| KnxError::dpt_value_out_of_range())?;
    Ok([value as u8])
}

/// Decode a signed value
pub fn decode(data: &[u8]) -> Result<i32> {
    match data {
        [byte] => Ok(i32::from(*byte as i8)),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}

/// Encode the DPT 6.020 status/mode composite.
///
/// # Errors
///
/// Returns a range error if the mode is not one of {0, 2, 4}.
pub fn encode_status(status: [bool; 5], mode: u8) -> Result<[u8; 1]> {
    if !matches!(mode, 0 | 2 | 4) {
        return Err(KnxError::dpt_value_out_of_range());
    }
    let mut byte = mode;
    for (i, bit) in status.iter().enumerate() {
        if *bit {
            byte |= 0x80 >> i;
        }
    }
    Ok([byte])
}

/// Decode the DPT 6.020 status/mode composite.
///
/// # Errors
///
/// Returns an invalid-data error if the mode field is not one of
/// {0, 2, 4}.
pub fn decode_status(data: &[u8]) -> Result<([bool; 5], u8)> {
    let [byte] = data else {
        return Err(KnxError::invalid_dpt_data());
    };
    let mode = byte & 0x07;
    if !matches!(mode, 0 | 2 | 4) {
        return Err(KnxError::invalid_dpt_data());
    }
    let mut status = [false; 5];
    for (i, bit) in status.iter_mut().enumerate() {
        *bit = byte & (0x80 >> i) != 0;
    }
    Ok((status, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode(-128).unwrap(), [0x80]);
        assert_eq!(encode(-1).unwrap(), [0xFF]);
        assert_eq!(encode(0).unwrap(), [0x00]);
        assert_eq!(encode(127).unwrap(), [0x7F]);
    }

    #[test]
    fn test_encode_out_of_range() {
        assert!(encode(128).is_err());
        assert!(encode(-129).is_err());
    }

    #[test]
    fn test_round_trip() {
        for value in [-128i32, -50, -1, 0, 1, 50, 127] {
            let bytes = encode(value).unwrap();
            assert_eq!(decode(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn test_status_round_trip() {
        let status = [true, false, true, false, true];
        let bytes = encode_status(status, 4).unwrap();
        assert_eq!(bytes, [0xAC]);
        assert_eq!(decode_status(&bytes).unwrap(), (status, 4));
    }

    #[test]
    fn test_status_invalid_mode() {
        assert!(encode_status([false; 5], 1).is_err());
        assert!(encode_status([false; 5], 7).is_err());
        assert!(decode_status(&[0x01]).is_err());
    }

    #[test]
    fn test_decode_invalid_length() {
        assert!(decode(&[]).is_err());
        assert!(decode_status(&[0x00, 0x00]).is_err());
    }
}
