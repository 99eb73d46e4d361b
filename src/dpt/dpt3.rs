//! DPT 3.xxx - Controlled step (4 bits)
//!
//! Dimming and blind control: a direction bit plus a 3-bit step code.
//! Step code 0 means "stop"; 1-7 divide the range into 2^(code-1)
//! intervals.
//!
//! ```text
//! Encoding: 0000CSSS  (C = control/direction, SSS = step code)
//! ```
//!
//! Senders exist that emit the field with two or with four leading zero
//! bits; decoding accepts both widths since the low nibble is unaffected.

use crate::error::{KnxError, Result};

/// Maximum step code (3 bits)
pub const MAX_STEP_CODE: u8 = 7;

/// Encode a (control, step code) pair.
///
/// # Errors
///
/// Returns a range error if the step code exceeds 7.
pub fn encode(control: bool, step_code: u8) -> Result<[u8; 1]> {
    if step_code > MAX_STEP_CODE {
        return Err(KnxError::dpt_value_out_of_range());
    }
    Ok([(u8::from(control) << 3) | step_code])
}

/// Decode a (control, step code) pair.
///
/// # Errors
///
/// Returns an invalid-data error for empty input or set bits above the
/// four-bit field.
pub fn decode(data: &[u8]) -> Result<(bool, u8)> {
    match data {
        [byte] if *byte <= 0x0F => Ok((byte & 0x08 != 0, byte & 0x07)),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}
