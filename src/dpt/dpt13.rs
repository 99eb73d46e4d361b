//! DPT 13.xxx - 32-bit signed
//!
//! Energy, flow rate, long deltas.
//!
//! ```text
//! Encoding: 4 bytes, big-endian two's complement
//! ```

use crate::error::{KnxError, Result};

/// Encode a signed value
pub fn encode(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode a signed value
pub fn decode(data: &[u8]) -> Result<i32> {
    match data {
        [a, b, c, d] => Ok(i32::from_be_bytes([*a, *b, *c, *d])),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}
