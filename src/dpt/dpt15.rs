//! DPT 15.000 - Access data (4 bytes)
//!
//! Access-control code: six BCD digits, four status flags and a 4-bit
//! index.
//!
//! ```text
//! Byte 0: D1D1D1D1 D2D2D2D2
//! Byte 1: D3D3D3D3 D4D4D4D4
//! Byte 2: D5D5D5D5 D6D6D6D6
//! Byte 3: EPDC IIII  (error, permission, direction, encrypted, index)
//! ```

use crate::error::{KnxError, Result};

/// An access-data record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessData {
    /// Six code digits, most significant first, each 0-9
    pub digits: [u8; 6],
    /// Detection error flag
    pub error: bool,
    /// Permission accepted flag
    pub permission: bool,
    /// Read direction flag
    pub direction: bool,
    /// Encrypted code flag
    pub encrypted: bool,
    /// Index of the access identification code (0-15)
    pub index: u8,
}

/// Encode an access-data record.
///
/// # Errors
///
/// Returns a range error if a digit exceeds 9 or the index exceeds 15.
pub fn encode(access: AccessData) -> Result<[u8; 4]> {
    if access.digits.iter().any(|d| *d > 9) || access.index > 15 {
        return Err(KnxError::dpt_value_out_of_range());
    }

    let d = access.digits;
    let mut flags = access.index;
    if access.error {
        flags |= 0x80;
    }
    if access.permission {
        flags |= 0x40;
    }
    if access.direction {
        flags |= 0x20;
    }
    if access.encrypted {
        flags |= 0x10;
    }

    Ok([
        (d[0] << 4) | d[1],
        (d[2] << 4) | d[3],
        (d[4] << 4) | d[5],
        flags,
    ])
}

/// Decode an access-data record.
///
/// # Errors
///
/// Returns an invalid-data error for wrong length or non-BCD digits.
pub fn decode(data: &[u8]) -> Result<AccessData> {
    let [b0, b1, b2, b3] = data else {
        return Err(KnxError::invalid_dpt_data());
    };

    let digits = [b0 >> 4, b0 & 0x0F, b1 >> 4, b1 & 0x0F, b2 >> 4, b2 & 0x0F];
    if digits.iter().any(|d| *d > 9) {
        return Err(KnxError::invalid_dpt_data());
    }

    Ok(AccessData {
        digits,
        error: b3 & 0x80 != 0,
        permission: b3 & 0x40 != 0,
        direction: b3 & 0x20 != 0,
        encrypted: b3 & 0x10 != 0,
        index: b3 & 0x0F,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let access = AccessData {
            digits: [1, 2, 3, 4, 5, 6],
            error: false,
            permission: true,
            direction: false,
            encrypted: false,
            index: 3,
        };
        assert_eq!(encode(access).unwrap(), [0x12, 0x34, 0x56, 0x43]);
    }

    #[test]
    fn test_round_trip() {
        let access = AccessData {
            digits: [9, 8, 7, 6, 5, 4],
            error: true,
            permission: false,
            direction: true,
            encrypted: true,
            index: 15,
        };
        let bytes = encode(access).unwrap();
        assert_eq!(decode(&bytes).unwrap(), access);
    }

    #[test]
    fn test_encode_invalid() {
        let mut access = AccessData {
            digits: [0; 6],
            error: false,
            permission: false,
            direction: false,
            encrypted: false,
            index: 0,
        };
        access.digits[2] = 10;
        assert!(encode(access).is_err());

        access.digits[2] = 0;
        access.index = 16;
        assert!(encode(access).is_err());
    }

    #[test]
    fn test_decode_invalid() {
        assert!(decode(&[0x12, 0x34, 0x56]).is_err());
        // 0xA is not a BCD digit
        assert!(decode(&[0xA0, 0x00, 0x00, 0x00]).is_err());
    }
}
