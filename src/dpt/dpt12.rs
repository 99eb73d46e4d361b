//! DPT 12.xxx - 32-bit unsigned
//!
//! Counters.
//!
//! ```text
//! Encoding: 4 bytes, big-endian
//! ```

use crate::error::{KnxError, Result};

/// Encode an unsigned value
pub fn encode(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode an unsigned value
pub fn decode(data: &[u8]) -> Result<u32> {
    match data {
        [a, b, c, d] => Ok(u32::from_be_bytes([*a, *b, *c, *d])),
        _ => Err(KnxError::invalid_dpt_data()),
    }
}
