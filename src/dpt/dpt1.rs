//! DPT 1.xxx - Boolean (1 bit)
//!
//! Switches, enables, alarms, up/down commands. The value occupies the low
//! bit; on the wire it usually rides inline in the APCI octet.
//!
//! ```text
//! Encoding: 0000000B  (B = value)
//! ```

use crate::error::{KnxError, Result};

/// Encode a boolean to its single-byte form
pub fn encode(value: bool) -> [u8; 1] {
    [u8::from(value)]
}

/// Decode a boolean from a 6-bit inline or 8-bit form.
///
/// # Errors
///
/// Returns an invalid-data error for empty input or a byte other than
/// 0 or 1.
pub fn decode(data: &[u8]) -> Result<bool> {
    match data {
        [0x00] => Ok(false),
        [0x01] => Ok(true),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}
